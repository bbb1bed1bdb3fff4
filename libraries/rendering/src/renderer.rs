use crate::filter::{FilterInput, FilterPipeline, FilterPrimitive};
use crate::mask::MaskRegion;
use crate::scene::{ImagePrimitive, Scene, SceneContent, SceneNode, TextPrimitive};

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgSegment {
	Slice(&'static str),
	String(String),
}

impl From<String> for SvgSegment {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<&'static str> for SvgSegment {
	fn from(value: &'static str) -> Self {
		Self::Slice(value)
	}
}

/// A list of [`SvgSegment`]s.
///
/// Can be modified with `list.push("hello".into())`. Use `list.to_string()` to convert the segments into one string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SvgSegmentList(Vec<SvgSegment>);

impl core::ops::Deref for SvgSegmentList {
	type Target = Vec<SvgSegment>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl core::ops::DerefMut for SvgSegmentList {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl core::fmt::Display for SvgSegmentList {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		for segment in self.iter() {
			f.write_str(match segment {
				SvgSegment::Slice(x) => x,
				SvgSegment::String(x) => x,
			})?;
		}
		Ok(())
	}
}

/// Escapes the characters that may not appear literally in SVG text content or attribute values.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
	if !text.contains(['&', '<', '>', '"', '\'']) {
		return Cow::Borrowed(text);
	}

	let mut escaped = String::with_capacity(text.len() + 8);
	for character in text.chars() {
		match character {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&apos;"),
			_ => escaped.push(character),
		}
	}
	Cow::Owned(escaped)
}

/// Mutable state used whilst rendering to an SVG
#[derive(Debug, Default)]
pub struct SvgRender {
	pub svg: SvgSegmentList,
	pub svg_defs: String,
	indent: usize,
}

impl SvgRender {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn indent(&mut self) {
		self.svg.push("\n".into());
		self.svg.push("\t".repeat(self.indent).into());
	}

	/// Add an outer `<svg>...</svg>` tag sized to the document, with a `viewBox` and the `<defs />`
	pub fn format_svg(&mut self, width: u32, height: u32) {
		let defs = &self.svg_defs;
		let svg_header = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}"><defs>{defs}</defs>"#);
		self.svg.insert(0, svg_header.into());
		self.svg.push("\n</svg>".into());
	}

	/// Renders into a fresh renderer at the current depth and appends the result to the `<defs />`.
	pub fn push_defs(&mut self, inner: impl FnOnce(&mut SvgRender)) {
		let mut defs = SvgRender { indent: 1, ..Default::default() };
		inner(&mut defs);
		self.svg_defs.push_str(&defs.svg.to_string());
		self.svg_defs.push_str(&defs.svg_defs);
	}

	pub fn leaf_tag(&mut self, name: impl Into<SvgSegment>, attributes: impl FnOnce(&mut SvgRenderAttrs)) {
		self.indent();

		self.svg.push("<".into());
		self.svg.push(name.into());

		attributes(&mut SvgRenderAttrs(self));

		self.svg.push("/>".into());
	}

	pub fn leaf_node(&mut self, content: impl Into<SvgSegment>) {
		self.indent();
		self.svg.push(content.into());
	}

	pub fn parent_tag(&mut self, name: impl Into<SvgSegment>, attributes: impl FnOnce(&mut SvgRenderAttrs), inner: impl FnOnce(&mut Self)) {
		let name = name.into();
		self.indent();
		self.svg.push("<".into());
		self.svg.push(name.clone());
		// Wraps `self` in a newtype (1-tuple) which is then mutated by the `attributes` closure
		attributes(&mut SvgRenderAttrs(self));
		self.svg.push(">".into());
		let length = self.svg.len();
		self.indent += 1;
		inner(self);
		self.indent -= 1;
		if self.svg.len() != length {
			self.indent();
			self.svg.push("</".into());
			self.svg.push(name);
			self.svg.push(">".into());
		} else {
			self.svg.pop();
			self.svg.push("/>".into());
		}
	}
}

pub struct SvgRenderAttrs<'a>(&'a mut SvgRender);

impl SvgRenderAttrs<'_> {
	pub fn push_complex(&mut self, name: impl Into<SvgSegment>, value: impl FnOnce(&mut SvgRender)) {
		self.0.svg.push(" ".into());
		self.0.svg.push(name.into());
		self.0.svg.push("=\"".into());
		value(self.0);
		self.0.svg.push("\"".into());
	}

	/// Push an attribute whose value is escaped.
	pub fn push(&mut self, name: impl Into<SvgSegment>, value: impl AsRef<str>) {
		let value = escape_xml(value.as_ref()).into_owned();
		self.push_complex(name, move |renderer| renderer.svg.push(value.into()));
	}

	/// Push an attribute whose value needs no escaping, such as a number.
	pub fn push_val(&mut self, name: impl Into<SvgSegment>, value: impl ToString) {
		self.push_complex(name, move |renderer| renderer.svg.push(value.to_string().into()));
	}
}

pub trait Render {
	fn render_svg(&self, render: &mut SvgRender);
}

impl Scene {
	/// Serializes the scene as a standalone SVG document.
	pub fn to_svg(&self) -> String {
		let mut render = SvgRender::new();
		self.render_svg(&mut render);
		render.format_svg(self.width, self.height);
		render.svg.to_string()
	}
}

impl Render for Scene {
	fn render_svg(&self, render: &mut SvgRender) {
		self.nodes.iter().for_each(|node| node.render_svg(render));
	}
}

impl Render for SceneNode {
	fn render_svg(&self, render: &mut SvgRender) {
		let filter_id = self.filter_id();
		let mask_id = self.mask_id();

		if let Some(filter) = &self.filter {
			render.push_defs(|defs| render_filter(defs, &filter_id, filter));
		}
		if let Some(mask) = &self.mask {
			render.push_defs(|defs| render_mask(defs, &mask_id, mask));
		}

		render.parent_tag(
			"g",
			|attributes| {
				attributes.push("id", &self.id);
				if self.opacity < 1. {
					attributes.push_val("opacity", self.opacity.max(0.));
				}
				if self.filter.is_some() {
					attributes.push("filter", format!("url(#{filter_id})"));
				}
				if self.mask.is_some() {
					attributes.push("mask", format!("url(#{mask_id})"));
				}
			},
			|render| match &self.content {
				SceneContent::Group(children) => children.iter().for_each(|child| child.render_svg(render)),
				SceneContent::Image(image) => render_image(render, &self.content_id(), image),
				SceneContent::Text(text) => render_text(render, &self.content_id(), text),
			},
		);
	}
}

fn render_image(render: &mut SvgRender, id: &str, image: &ImagePrimitive) {
	render.leaf_tag("image", |attributes| {
		attributes.push("id", id);
		attributes.push_val("x", image.x);
		attributes.push_val("y", image.y);
		attributes.push_val("width", image.width);
		attributes.push_val("height", image.height);
		if let Some(href) = &image.href {
			attributes.push("href", href);
		}
	});
}

fn render_text(render: &mut SvgRender, id: &str, text: &TextPrimitive) {
	render.parent_tag(
		"text",
		|attributes| {
			attributes.push("id", id);
			attributes.push_val("x", text.x);
			attributes.push_val("y", text.y);
			attributes.push("dominant-baseline", "text-before-edge");
			if let Some(font_size) = text.font_size {
				attributes.push_val("font-size", font_size);
			}
			if let Some(font_family) = &text.font_family {
				attributes.push("font-family", font_family);
			}
			if let Some(fill) = &text.fill {
				attributes.push("fill", fill);
			}
		},
		|render| {
			if !text.text.is_empty() {
				render.leaf_node(escape_xml(&text.text).into_owned());
			}
		},
	);
}

fn render_mask(render: &mut SvgRender, id: &str, mask: &MaskRegion) {
	render.parent_tag(
		"mask",
		|attributes| attributes.push("id", id),
		|render| {
			render.leaf_tag("image", |attributes| {
				attributes.push_val("x", mask.x);
				attributes.push_val("y", mask.y);
				attributes.push_val("width", mask.width);
				attributes.push_val("height", mask.height);
				if let Some(href) = &mask.href {
					attributes.push("href", href);
				}
			})
		},
	);
}

fn render_filter(render: &mut SvgRender, id: &str, filter: &FilterPipeline) {
	render.parent_tag("filter", |attributes| attributes.push("id", id), |render| filter.primitives.iter().for_each(|primitive| render_primitive(render, primitive)));
}

fn render_primitive(render: &mut SvgRender, primitive: &FilterPrimitive) {
	match primitive {
		FilterPrimitive::Flood { color, result } => render.leaf_tag("feFlood", |attributes| {
			attributes.push("flood-color", color);
			attributes.push("result", result);
		}),
		FilterPrimitive::CompositeIn { input, mask, result } => render.leaf_tag("feComposite", |attributes| {
			attributes.push("in", input.as_str());
			attributes.push("in2", mask.as_str());
			attributes.push("operator", "in");
			attributes.push("result", result);
		}),
		FilterPrimitive::Offset { input, dx, dy, result } => render.leaf_tag("feOffset", |attributes| {
			attributes.push("in", input.as_str());
			attributes.push_val("dx", dx);
			attributes.push_val("dy", dy);
			attributes.push("result", result);
		}),
		FilterPrimitive::GaussianBlur { input, std_deviation, result } => render.leaf_tag("feGaussianBlur", |attributes| {
			attributes.push("in", input.as_str());
			attributes.push_val("stdDeviation", std_deviation);
			attributes.push("result", result);
		}),
		FilterPrimitive::ConvolveMatrix { input, kernel, result } => render.leaf_tag("feConvolveMatrix", |attributes| {
			attributes.push("in", input.as_str());
			attributes.push_val("order", kernel.order);
			attributes.push("divisor", "1");
			attributes.push("kernelMatrix", kernel.matrix_string().replace('\n', " "));
			attributes.push("result", result);
		}),
		FilterPrimitive::Merge { inputs, result } => render.parent_tag(
			"feMerge",
			|attributes| attributes.push("result", result),
			|render| {
				for input in inputs {
					render.leaf_tag("feMergeNode", |attributes| attributes.push("in", FilterInput::as_str(input)));
				}
			},
		),
	}
}
