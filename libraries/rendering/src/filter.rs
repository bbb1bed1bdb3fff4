//! Turns a layer's effect list into an SVG filter pipeline.
//!
//! Effects are synthesized in a fixed order: solid fills, then drop shadows, then strokes.
//! A solid fill replaces the layer's own graphic, while drop shadows and strokes are merged beneath it.
//! Every intermediate result is named `filter-{n}-*` where `n` is the number of primitives emitted before that stage started,
//! so the same effect list always yields the same pipeline.

use crate::color::color_to_string;

use glam::DVec2;
use layer_types::{Effect, EffectKind};

/// An input to a filter primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
	/// The layer's rendered content.
	SourceGraphic,
	/// The alpha channel of the layer's rendered content.
	SourceAlpha,
	/// The named result of an earlier primitive.
	Result(String),
}

impl FilterInput {
	pub fn as_str(&self) -> &str {
		match self {
			FilterInput::SourceGraphic => "SourceGraphic",
			FilterInput::SourceAlpha => "SourceAlpha",
			FilterInput::Result(name) => name,
		}
	}
}

/// A disc-shaped convolution kernel used to dilate a silhouette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeKernel {
	/// Width and height of the square kernel.
	pub order: usize,
	/// Row-major cells, each 0 or 1.
	pub cells: Vec<u8>,
}

impl StrokeKernel {
	/// The kernel rows separated by newlines, cells separated by spaces.
	pub fn matrix_string(&self) -> String {
		self.cells.chunks(self.order.max(1)).map(|row| row.iter().map(u8::to_string).collect::<Vec<_>>().join(" ")).collect::<Vec<_>>().join("\n")
	}
}

/// Largest stroke radius in pixels that image editors allow. Larger sizes are clamped to it.
pub const MAX_STROKE_SIZE: f64 = 250.;

/// Builds the kernel for a stroke of the given radius in pixels.
///
/// The kernel is `2 * ceil(radius) + 1` cells wide and a cell is set when its squared distance from the center is at most `radius²`.
/// The radius is clamped to `0..=MAX_STROKE_SIZE`, so the kernel never exceeds 501 cells per side.
pub fn stroke_kernel(radius: f64) -> StrokeKernel {
	let radius = radius.max(0.).min(MAX_STROKE_SIZE);
	let order = radius.ceil() as usize * 2 + 1;
	let center = (order - 1) as f64 / 2.;

	let cells = (0..order * order)
		.map(|index| {
			let x = (index % order) as f64 - center;
			let y = (index / order) as f64 - center;
			u8::from(x * x + y * y <= radius * radius)
		})
		.collect();

	StrokeKernel { order, cells }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterPrimitive {
	/// Fills the filter region with a color.
	Flood { color: String, result: String },
	/// Keeps `input` only where `mask` is opaque.
	CompositeIn { input: FilterInput, mask: FilterInput, result: String },
	Offset { input: FilterInput, dx: f64, dy: f64, result: String },
	GaussianBlur { input: FilterInput, std_deviation: f64, result: String },
	ConvolveMatrix { input: FilterInput, kernel: StrokeKernel, result: String },
	/// Stacks the inputs back to front.
	Merge { inputs: Vec<FilterInput>, result: String },
}

impl FilterPrimitive {
	pub fn result(&self) -> &str {
		match self {
			FilterPrimitive::Flood { result, .. }
			| FilterPrimitive::CompositeIn { result, .. }
			| FilterPrimitive::Offset { result, .. }
			| FilterPrimitive::GaussianBlur { result, .. }
			| FilterPrimitive::ConvolveMatrix { result, .. }
			| FilterPrimitive::Merge { result, .. } => result,
		}
	}
}

/// An ordered list of filter primitives. The output of the filter is the result of the last primitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterPipeline {
	pub primitives: Vec<FilterPrimitive>,
}

impl FilterPipeline {
	pub fn output(&self) -> Option<&str> {
		self.primitives.last().map(FilterPrimitive::result)
	}

	pub fn has_merge(&self) -> bool {
		self.primitives.iter().any(|primitive| matches!(primitive, FilterPrimitive::Merge { .. }))
	}
}

/// Builds the filter pipeline for a layer's effects, or `None` if no enabled effect produces a stage.
pub fn synthesize_filter(effects: &[Effect]) -> Option<FilterPipeline> {
	let mut primitives = Vec::new();
	// Replaced by the recolored layer when a solid fill is present
	let mut source = FilterInput::SourceGraphic;
	// Results composited beneath the layer, in generation order
	let mut beneath = Vec::new();

	let enabled = || effects.iter().filter(|effect| effect.enabled).map(|effect| &effect.kind);

	for kind in enabled() {
		let EffectKind::SolidFill { color } = kind else { continue };
		let stage = format!("filter-{}", primitives.len());

		primitives.push(FilterPrimitive::Flood {
			color: color_to_string(color.as_ref()),
			result: format!("{stage}-flood"),
		});
		primitives.push(FilterPrimitive::CompositeIn {
			input: FilterInput::Result(format!("{stage}-flood")),
			mask: FilterInput::SourceAlpha,
			result: format!("{stage}-fill"),
		});

		source = FilterInput::Result(format!("{stage}-fill"));
	}

	for kind in enabled() {
		let EffectKind::DropShadow { angle, distance, size, color } = kind else { continue };
		let stage = format!("filter-{}", primitives.len());

		// The angle points toward the light, so the shadow falls the opposite way. Canvas y grows downward.
		let angle = angle.unwrap_or(0.).to_radians();
		let offset = DVec2::new(-angle.cos(), angle.sin()) * distance.unwrap_or(0.);

		primitives.push(FilterPrimitive::Offset {
			input: FilterInput::SourceAlpha,
			dx: offset.x,
			dy: offset.y,
			result: format!("{stage}-hard-shadow"),
		});
		primitives.push(FilterPrimitive::GaussianBlur {
			input: FilterInput::Result(format!("{stage}-hard-shadow")),
			std_deviation: size.unwrap_or(0.).max(0.),
			result: format!("{stage}-shadow"),
		});
		primitives.push(FilterPrimitive::Flood {
			color: color_to_string(color.as_ref()),
			result: format!("{stage}-flood"),
		});
		primitives.push(FilterPrimitive::CompositeIn {
			input: FilterInput::Result(format!("{stage}-flood")),
			mask: FilterInput::Result(format!("{stage}-shadow")),
			result: format!("{stage}-blend"),
		});

		beneath.push(FilterInput::Result(format!("{stage}-blend")));
	}

	for kind in enabled() {
		let EffectKind::Stroke { size, color } = kind else { continue };
		let stage = format!("filter-{}", primitives.len());

		primitives.push(FilterPrimitive::ConvolveMatrix {
			input: FilterInput::SourceAlpha,
			kernel: stroke_kernel(size.unwrap_or(1.)),
			result: format!("{stage}-stroke"),
		});
		primitives.push(FilterPrimitive::Flood {
			color: color_to_string(color.as_ref()),
			result: format!("{stage}-flood"),
		});
		primitives.push(FilterPrimitive::CompositeIn {
			input: FilterInput::Result(format!("{stage}-flood")),
			mask: FilterInput::Result(format!("{stage}-stroke")),
			result: format!("{stage}-blend"),
		});

		beneath.push(FilterInput::Result(format!("{stage}-blend")));
	}

	if primitives.is_empty() {
		return None;
	}

	if !beneath.is_empty() {
		let result = format!("filter-{}", primitives.len());
		beneath.push(source);
		primitives.push(FilterPrimitive::Merge { inputs: beneath, result });
	}

	Some(FilterPipeline { primitives })
}
