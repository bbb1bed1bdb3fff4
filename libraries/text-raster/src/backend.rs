use crate::font_cache::FontCache;
use crate::to_kurbo::{advance_width, to_kurbo};

use kurbo::PathEl;
use layer_types::Raster;
use resvg::tiny_skia;

/// The font a string is measured and drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFont<'a> {
	pub family: &'a str,
	/// Em size in pixels.
	pub size: f64,
}

/// Measures and draws single lines of text.
pub trait TextBackend {
	/// The advance width of `text` set in `font`, in pixels.
	fn measure_text(&self, text: &str, font: TextFont) -> f64;

	/// Draws `text` left-aligned with its baseline at `baseline` onto a fresh transparent `width` by `height` canvas.
	///
	/// `fill` is straight RGBA. Returns `None` if no drawing surface could be obtained.
	fn fill_text(&self, text: &str, font: TextFont, fill: [u8; 4], width: u32, height: u32, baseline: f64) -> Option<Raster>;
}

/// Draws text from glyph outlines of the fonts in a [`FontCache`].
#[derive(Debug, Clone, Default)]
pub struct GlyphRasterizer {
	pub fonts: FontCache,
}

/// Rough advance per character relative to the em size, used when no font is available at all.
const FALLBACK_ADVANCE: f64 = 0.5;

impl GlyphRasterizer {
	pub fn new(fonts: FontCache) -> Self {
		Self { fonts }
	}

	fn face<'a>(&'a self, family: &'a str) -> Option<rustybuzz::Face<'a>> {
		let Some((data, resolved)) = self.fonts.get(family) else {
			log::warn!("No font loaded for \"{family}\" and no fallback available");
			return None;
		};
		if resolved != family {
			log::debug!("Font \"{family}\" is not loaded, using \"{resolved}\" instead");
		}

		let face = rustybuzz::Face::from_slice(data, 0);
		if face.is_none() {
			log::warn!("Font data for \"{resolved}\" could not be parsed");
		}
		face
	}
}

impl TextBackend for GlyphRasterizer {
	fn measure_text(&self, text: &str, font: TextFont) -> f64 {
		match self.face(font.family) {
			Some(face) => advance_width(text, &face, font.size),
			None => text.chars().count() as f64 * font.size * FALLBACK_ADVANCE,
		}
	}

	fn fill_text(&self, text: &str, font: TextFont, fill: [u8; 4], width: u32, height: u32, baseline: f64) -> Option<Raster> {
		let mut pixmap = tiny_skia::Pixmap::new(width, height)?;

		if let Some(path) = self.face(font.family).and_then(|face| to_tiny_skia(&to_kurbo(text, &face, font.size, baseline))) {
			let [r, g, b, a] = fill;
			let mut paint = tiny_skia::Paint::default();
			paint.set_color_rgba8(r, g, b, a);
			paint.anti_alias = true;
			pixmap.fill_path(&path, &paint, tiny_skia::FillRule::Winding, tiny_skia::Transform::identity(), None);
		}

		let data = pixmap
			.pixels()
			.iter()
			.flat_map(|pixel| {
				let color = pixel.demultiply();
				[color.red(), color.green(), color.blue(), color.alpha()]
			})
			.collect();

		Raster::from_rgba8(width, height, data).ok()
	}
}

/// Returns `None` for an empty outline, such as a string of spaces.
fn to_tiny_skia(path: &kurbo::BezPath) -> Option<tiny_skia::Path> {
	let mut builder = tiny_skia::PathBuilder::new();
	for element in path.elements() {
		match *element {
			PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
			PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
			PathEl::QuadTo(p1, p2) => builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
			PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32, p3.x as f32, p3.y as f32),
			PathEl::ClosePath => builder.close(),
		}
	}
	builder.finish()
}

#[cfg(test)]
mod test {
	use super::*;

	const FONT: TextFont = TextFont { family: "serif", size: 10. };

	#[test]
	fn measures_without_fonts() {
		let rasterizer = GlyphRasterizer::default();
		assert_eq!(rasterizer.measure_text("abcd", FONT), 20.);
		assert_eq!(rasterizer.measure_text("", FONT), 0.);
	}

	#[test]
	fn unparsable_fonts_are_skipped() {
		let mut fonts = FontCache::new();
		fonts.insert("serif", b"not a font".to_vec());
		let rasterizer = GlyphRasterizer::new(fonts);
		assert_eq!(rasterizer.measure_text("ab", FONT), 10.);
	}

	#[test]
	fn fills_a_transparent_canvas_without_fonts() {
		let raster = GlyphRasterizer::default().fill_text("Hi", FONT, [0, 0, 0, 255], 8, 12, 10.).unwrap();
		assert_eq!((raster.width, raster.height), (8, 12));
		assert!(raster.data().iter().all(|&byte| byte == 0));
	}

	#[test]
	fn no_surface_for_empty_canvas() {
		assert!(GlyphRasterizer::default().fill_text("Hi", FONT, [0, 0, 0, 255], 0, 12, 10.).is_none());
	}

	#[test]
	fn converts_outlines() {
		let mut outline = kurbo::BezPath::new();
		outline.move_to((0., 0.));
		outline.line_to((4., 0.));
		outline.quad_to((4., 4.), (0., 4.));
		outline.close_path();

		let path = to_tiny_skia(&outline).unwrap();
		assert_eq!(path.bounds().width(), 4.);
		assert!(to_tiny_skia(&kurbo::BezPath::new()).is_none());
	}

	/// The first installed font that can be shaped and has an outline for `H`. No font file ships with the crate.
	fn system_font() -> Option<Vec<u8>> {
		let mut database = resvg::usvg::fontdb::Database::new();
		database.load_system_fonts();

		database.faces().filter(|face| face.index == 0).find_map(|face| {
			let data = database.with_face_data(face.id, |data, _| data.to_vec())?;
			let usable = rustybuzz::Face::from_slice(&data, 0).is_some_and(|parsed| parsed.glyph_index('H').is_some());
			usable.then_some(data)
		})
	}

	#[test]
	fn draws_glyphs_from_a_real_font() {
		use kurbo::Shape;

		let _ = env_logger::builder().is_test(true).try_init();
		let Some(data) = system_font() else {
			eprintln!("No usable system font installed, skipping glyph drawing");
			return;
		};

		let face = rustybuzz::Face::from_slice(&data, 0).unwrap();
		let single = advance_width("H", &face, 20.);
		assert!(single > 0.);
		assert!(advance_width("HH", &face, 20.) > single);
		assert_eq!(advance_width("", &face, 20.), 0.);

		let bounds = to_kurbo("H", &face, 20., 20.).bounding_box();
		assert!(bounds.y1 <= 20.5, "glyph should sit on the baseline, got {bounds:?}");
		assert!(bounds.height() > 5., "glyph is too short: {bounds:?}");
		assert!(bounds.x0 >= -1. && bounds.x1 <= single + 1., "glyph should stay within its advance: {bounds:?}");

		let mut fonts = FontCache::new();
		fonts.insert("serif", data);
		let rasterizer = GlyphRasterizer::new(fonts);
		let font = TextFont { family: "serif", size: 20. };
		assert_eq!(rasterizer.measure_text("H", font), single);

		let raster = rasterizer.fill_text("H", font, [255, 0, 0, 255], 24, 24, 20.).unwrap();
		assert!(raster.data().chunks(4).any(|pixel| pixel[3] > 0), "nothing was drawn");
		assert!(raster.data().chunks(4).filter(|pixel| pixel[3] == 255).all(|pixel| pixel[..3] == [255, 0, 0]));
	}
}
