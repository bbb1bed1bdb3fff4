use crate::{Color, LayerPath, Raster};

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

// =====
// Layer
// =====

fn default_opacity() -> f64 {
	1.
}

/// Accepts opacity either normalized to `0..=1` or in the document-native `0..=255` range.
fn normalized_opacity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
	let opacity = f64::deserialize(deserializer)?;
	Ok(if opacity > 1. { Layer::opacity_from_native(opacity.min(255.) as u8) } else { opacity.max(0.) })
}

/// A node in the document's layer tree.
///
/// Layers are immutable values. Editing produces a new layer which is swapped into a new tree with
/// [`Document::with_replaced_layer`](crate::Document::with_replaced_layer), leaving the old tree untouched.
/// Children are held behind [`Arc`] so unrelated subtrees are shared between tree snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub left: i32,
	#[serde(default)]
	pub top: i32,
	#[serde(default)]
	pub right: i32,
	#[serde(default)]
	pub bottom: i32,
	#[serde(default)]
	pub hidden: bool,
	#[serde(default = "default_opacity", deserialize_with = "normalized_opacity")]
	pub opacity: f64,
	#[serde(flatten)]
	pub content: LayerContent,
	#[serde(default)]
	pub effects: Vec<Effect>,
	#[serde(default)]
	pub mask: Option<LayerMask>,
}

impl Default for Layer {
	fn default() -> Self {
		Self {
			name: None,
			left: 0,
			top: 0,
			right: 0,
			bottom: 0,
			hidden: false,
			opacity: 1.,
			content: LayerContent::Raster { canvas: None },
			effects: Vec::new(),
			mask: None,
		}
	}
}

impl Layer {
	/// A group layer containing `children`, drawn back to front in the given order.
	pub fn group(children: impl IntoIterator<Item = Layer>) -> Self {
		Self {
			content: LayerContent::Group {
				children: children.into_iter().map(Arc::new).collect(),
			},
			..Default::default()
		}
	}

	/// A raster layer covering `[left, right) x [top, bottom)`, sized from the canvas.
	pub fn raster(left: i32, top: i32, canvas: Raster) -> Self {
		Self {
			left,
			top,
			right: left + canvas.width as i32,
			bottom: top + canvas.height as i32,
			content: LayerContent::Raster { canvas: Some(Arc::new(canvas)) },
			..Default::default()
		}
	}

	/// A text layer with the given content and, optionally, its already rasterized canvas.
	pub fn text(left: i32, top: i32, text: TextData, canvas: Option<Raster>) -> Self {
		let (right, bottom) = canvas.as_ref().map_or((left, top), |canvas| (left + canvas.width as i32, top + canvas.height as i32));
		Self {
			left,
			top,
			right,
			bottom,
			content: LayerContent::Text {
				text,
				canvas: canvas.map(Arc::new),
			},
			..Default::default()
		}
	}

	/// Converts a document-native `0..=255` opacity into the normalized `0..=1` range.
	pub fn opacity_from_native(opacity: u8) -> f64 {
		opacity as f64 / 255.
	}

	pub fn width(&self) -> i32 {
		self.right - self.left
	}

	pub fn height(&self) -> i32 {
		self.bottom - self.top
	}

	pub fn is_group(&self) -> bool {
		matches!(self.content, LayerContent::Group { .. })
	}

	pub fn children(&self) -> &[Arc<Layer>] {
		match &self.content {
			LayerContent::Group { children } => children,
			_ => &[],
		}
	}

	pub fn text_data(&self) -> Option<&TextData> {
		match &self.content {
			LayerContent::Text { text, .. } => Some(text),
			_ => None,
		}
	}

	/// The layer's own pixel content. Groups never have one.
	pub fn canvas(&self) -> Option<&Arc<Raster>> {
		match &self.content {
			LayerContent::Text { canvas, .. } | LayerContent::Raster { canvas } => canvas.as_ref(),
			LayerContent::Group { .. } => None,
		}
	}

	/// Iterate over this layer and every layer below it in document order, paired with their paths relative to this layer.
	pub fn iter(&self) -> LayerIter<'_> {
		LayerIter {
			stack: self.children().iter().enumerate().rev().map(|(index, layer)| (vec![index], layer)).collect(),
		}
	}
}

// ============
// LayerContent
// ============

/// The content of a layer. A node is exactly one of a group, a text leaf or a raster leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerContent {
	/// A layer whose content is a sequence of child layers rather than its own pixels.
	Group { children: Vec<Arc<Layer>> },
	/// A text leaf carrying both its text metadata and, once rasterized, its pixels.
	Text {
		text: TextData,
		#[serde(default)]
		canvas: Option<Arc<Raster>>,
	},
	/// A plain raster leaf.
	Raster {
		#[serde(default)]
		canvas: Option<Arc<Raster>>,
	},
}

// ====
// Text
// ====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextData {
	pub text: String,
	#[serde(default)]
	pub style: TextStyle,
}

impl TextData {
	pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
		Self { text: text.into(), style }
	}
}

/// Character style of a text layer. Every field is optional since decoders frequently omit them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
	/// Font size in pixels.
	#[serde(default)]
	pub font_size: Option<f64>,
	/// Font family name.
	#[serde(default)]
	pub font_name: Option<String>,
	#[serde(default)]
	pub fill_color: Option<Color>,
}

// =======
// Effects
// =======

/// A layer effect that can be toggled on and off without losing its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
	pub enabled: bool,
	#[serde(flatten)]
	pub kind: EffectKind,
}

impl Effect {
	pub fn enabled(kind: EffectKind) -> Self {
		Self { enabled: true, kind }
	}

	pub fn disabled(kind: EffectKind) -> Self {
		Self { enabled: false, kind }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EffectKind {
	/// Recolors the whole layer with a flat color.
	SolidFill {
		#[serde(default)]
		color: Option<Color>,
	},
	/// A blurred, offset copy of the layer's silhouette drawn beneath it.
	DropShadow {
		/// Light angle in degrees.
		#[serde(default)]
		angle: Option<f64>,
		/// Offset distance in pixels.
		#[serde(default)]
		distance: Option<f64>,
		/// Blur size in pixels.
		#[serde(default)]
		size: Option<f64>,
		#[serde(default)]
		color: Option<Color>,
	},
	/// An outline around the layer's silhouette drawn beneath it.
	Stroke {
		/// Stroke width in pixels.
		#[serde(default)]
		size: Option<f64>,
		#[serde(default)]
		color: Option<Color>,
	},
}

// ====
// Mask
// ====

/// A raster alpha mask constraining where a layer is visible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMask {
	#[serde(default)]
	pub left: i32,
	#[serde(default)]
	pub top: i32,
	#[serde(default)]
	pub right: i32,
	#[serde(default)]
	pub bottom: i32,
	#[serde(default)]
	pub canvas: Option<Arc<Raster>>,
	/// Whether the mask moves with the layer. Masks are currently always placed absolutely.
	#[serde(default)]
	pub position_relative_to_layer: bool,
	/// Mask value outside the mask's bounds.
	#[serde(default)]
	pub default_color: u8,
}

impl LayerMask {
	pub fn width(&self) -> i32 {
		self.right - self.left
	}

	pub fn height(&self) -> i32 {
		self.bottom - self.top
	}
}

// =========
// LayerIter
// =========

/// A depth-first iterator over a layer tree in document order, yielding each layer with its path.
#[derive(Debug, Default)]
pub struct LayerIter<'a> {
	pub(crate) stack: Vec<(LayerPath, &'a Arc<Layer>)>,
}

impl<'a> Iterator for LayerIter<'a> {
	type Item = (LayerPath, &'a Arc<Layer>);

	fn next(&mut self) -> Option<Self::Item> {
		self.stack.pop().map(|(path, layer)| {
			self.stack.extend(layer.children().iter().enumerate().rev().map(|(index, child)| {
				let mut child_path = path.clone();
				child_path.push(index);
				(child_path, child)
			}));
			(path, layer)
		})
	}
}
