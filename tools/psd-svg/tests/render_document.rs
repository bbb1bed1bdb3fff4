use layer_types::Raster;
use psd_svg::{Session, parse_document};
use rendering::scene::PrimitiveCount;
use rendering::{RenderParams, TextRenderMode};
use text_raster::{TextBackend, TextFont};

/// Draws every string as a solid block of its fill color, each character half an em wide.
struct Blocks;

impl TextBackend for Blocks {
	fn measure_text(&self, text: &str, font: TextFont) -> f64 {
		text.chars().count() as f64 * font.size / 2.
	}

	fn fill_text(&self, _text: &str, _font: TextFont, fill: [u8; 4], width: u32, height: u32, _baseline: f64) -> Option<Raster> {
		Raster::from_rgba8(width, height, fill.repeat((width * height) as usize)).ok()
	}
}

const DOCUMENT: &str = r#"{
	"width": 200,
	"height": 100,
	"children": [
		{
			"name": "Background",
			"left": 0, "top": 0, "right": 2, "bottom": 1,
			"canvas": { "width": 2, "height": 1, "data": "/wAA//8AAP8=" }
		},
		{
			"name": "Group",
			"opacity": 128,
			"children": [
				{
					"name": "Hidden",
					"hidden": true,
					"left": 0, "top": 0, "right": 2, "bottom": 1,
					"canvas": { "width": 2, "height": 1, "data": "/wAA//8AAP8=" }
				},
				{
					"name": "Title",
					"left": 10, "top": 20, "right": 30, "bottom": 34,
					"text": { "text": "Hello & welcome", "style": { "fontSize": 12, "fontName": "Serif", "fillColor": { "r": 255, "g": 0, "b": 0 } } },
					"canvas": { "width": 1, "height": 1, "data": "AAAAAA==" },
					"effects": [
						{ "enabled": true, "kind": "stroke", "size": 2, "color": { "r": 0, "g": 0, "b": 0 } },
						{ "enabled": false, "kind": "solidFill", "color": { "r": 0, "g": 255, "b": 0 } }
					]
				}
			]
		}
	]
}"#;

fn session() -> Session<Blocks> {
	let _ = env_logger::builder().is_test(true).try_init();

	let mut session = Session::new(Blocks, RenderParams::default());
	let ticket = session.begin_load();
	assert!(session.finish_load(ticket, Some(parse_document(DOCUMENT).unwrap())));
	session
}

#[test]
fn renders_the_visible_layers() {
	let mut session = session();

	let frame = session.render().unwrap();
	assert_eq!(frame.requests.len(), 1);
	assert_eq!(frame.scene.count_primitives(), PrimitiveCount { images: 1, texts: 1 });

	let svg = session.render_resolved().unwrap().to_svg();
	assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100" width="200" height="100">"#));
	assert!(svg.contains(r#"href="data:image/png;base64,"#));
	assert!(svg.contains(r#"<g id="layer-1" opacity="0.50196"#));
	assert!(!svg.contains("layer-1-0"));
	assert!(svg.contains(r#"<g id="layer-1-1" filter="url(#layer-1-1-filter)">"#));
	assert!(svg.contains(r#"fill="rgba(255, 0, 0, 1)""#));
	assert!(svg.contains("Hello &amp; welcome"));
	assert!(svg.contains(r#"<feConvolveMatrix in="SourceAlpha" order="5""#));
	assert!(!svg.contains("rgba(0, 255, 0, 1)"));
}

#[test]
fn text_edits_show_up_in_the_next_render() {
	let mut session = session();
	assert_eq!(session.text_layers(), vec![(vec![1, 1], "Hello & welcome")]);

	session.edit_text(&[1, 1], "Bye").unwrap();

	let layer = session.document().unwrap().layer(&[1, 1]).unwrap().clone();
	assert_eq!((layer.right, layer.bottom), (28, 34));

	let svg = session.render_resolved().unwrap().to_svg();
	assert!(svg.contains(">\n\t\t\tBye\n"));
	assert!(!svg.contains("welcome"));
}

#[test]
fn edited_text_can_be_drawn_from_its_raster() {
	let mut session = session();
	session.edit_text(&[1, 1], "Bye").unwrap();

	let mut session = {
		let document = session.document().cloned();
		let mut raster_session = Session::new(Blocks, RenderParams { text_mode: TextRenderMode::Raster });
		let ticket = raster_session.begin_load();
		raster_session.finish_load(ticket, document);
		raster_session
	};

	let scene = session.render_resolved().unwrap();
	assert_eq!(scene.count_primitives(), PrimitiveCount { images: 2, texts: 0 });
	let svg = scene.to_svg();
	assert!(svg.contains(r#"<image id="layer-1-1-content" x="10" y="20" width="18" height="14" href="data:image/png;base64,"#));
}

fn load(json: &str) -> Session<Blocks> {
	let mut session = Session::new(Blocks, RenderParams::default());
	let ticket = session.begin_load();
	assert!(session.finish_load(ticket, Some(parse_document(json).unwrap())));
	session
}

#[test]
fn short_canvas_renders_as_an_empty_image() {
	let mut session = load(r#"{ "width": 4, "height": 4, "children": [{ "left": 0, "top": 0, "right": 2, "bottom": 2, "canvas": { "width": 2, "height": 2, "data": "AAAAAA==" } }] }"#);

	let svg = session.render_resolved().unwrap().to_svg();
	assert!(svg.contains(r#"<image id="layer-0-content" x="0" y="0" width="2" height="2"/>"#));
	assert!(!svg.contains("data:image/png"));
}

#[test]
fn unrecognized_effect_colors_fall_back_to_transparent_black() {
	let mut session = load(
		r#"{
			"width": 4,
			"height": 4,
			"children": [{
				"left": 0, "top": 0, "right": 1, "bottom": 1,
				"canvas": { "width": 1, "height": 1, "data": "/wAA/w==" },
				"effects": [{ "enabled": true, "kind": "solidFill", "color": { "fr": 0.5, "fg": 0.1, "fb": 0.2 } }]
			}]
		}"#,
	);

	let svg = session.render_resolved().unwrap().to_svg();
	assert!(svg.contains(r#"<feFlood flood-color="rgba(0, 0, 0, 0)""#));
}
