use crate::color::color_to_string;
use crate::encoding::{EncodeRequest, ImageSlot, ImageStore};
use crate::filter::synthesize_filter;
use crate::mask::synthesize_mask;
use crate::scene::{ImagePrimitive, Scene, SceneContent, SceneNode, TextPrimitive};

use layer_types::{Document, Layer, LayerContent, LayerPath};
use std::sync::Arc;

/// How text layers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRenderMode {
	/// As a text primitive with the layer's string, drawn by the scene's consumer.
	#[default]
	Primitive,
	/// As an image of the layer's rasterized canvas. Falls back to a text primitive if the layer has no canvas.
	Raster,
}

/// Static state used whilst compositing
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderParams {
	pub text_mode: TextRenderMode,
}

/// Everything the compositor reads besides the layer tree itself.
#[derive(Debug, Clone, Copy)]
pub struct CompositeContext<'a> {
	/// Image data resolved so far. Unresolved rasters render as empty images.
	pub images: &'a ImageStore,
	pub params: RenderParams,
}

impl<'a> CompositeContext<'a> {
	pub fn new(images: &'a ImageStore, params: RenderParams) -> Self {
		Self { images, params }
	}
}

/// The scene node id of the layer at `path`, e.g. `layer-1-0`.
pub fn layer_id(path: &[usize]) -> String {
	path.iter().fold("layer".to_string(), |id, index| format!("{id}-{index}"))
}

/// Composites the whole document into a scene with a `(0, 0, width, height)` viewport.
pub fn composite_document(document: &Document, context: &CompositeContext) -> Scene {
	let nodes = document
		.children
		.iter()
		.enumerate()
		.filter_map(|(index, layer)| composite_layer(layer, &[index], context))
		.collect();

	Scene {
		width: document.width,
		height: document.height,
		nodes,
	}
}

/// Composites one layer and everything below it.
///
/// Hidden layers return `None` immediately: nothing below them is visited, so they contribute no filters, masks or images.
pub fn composite_layer(layer: &Layer, path: &[usize], context: &CompositeContext) -> Option<SceneNode> {
	if layer.hidden {
		return None;
	}

	let (x, y) = (layer.left, layer.top);
	let (width, height) = (layer.width().max(0), layer.height().max(0));

	let filter = synthesize_filter(&layer.effects);
	let mask = synthesize_mask(layer.mask.as_ref(), context.images.href(&ImageSlot::mask(path)));

	let image = || {
		let slot = ImageSlot::content(path);
		let href = context.images.href(&slot).map(str::to_string);
		SceneContent::Image(ImagePrimitive { x, y, width, height, slot, href })
	};

	let content = match &layer.content {
		LayerContent::Group { children } => SceneContent::Group(
			children
				.iter()
				.enumerate()
				.filter_map(|(index, child)| {
					let mut child_path = path.to_vec();
					child_path.push(index);
					composite_layer(child, &child_path, context)
				})
				.collect(),
		),
		LayerContent::Text { canvas: Some(_), .. } if context.params.text_mode == TextRenderMode::Raster => image(),
		LayerContent::Text { text, .. } => SceneContent::Text(TextPrimitive {
			x,
			y,
			text: text.text.clone(),
			font_size: text.style.font_size,
			font_family: text.style.font_name.clone(),
			fill: text.style.fill_color.as_ref().map(|color| color_to_string(Some(color))),
		}),
		LayerContent::Raster { .. } => image(),
	};

	Some(SceneNode {
		id: layer_id(path),
		opacity: layer.opacity,
		filter,
		mask,
		content,
	})
}

/// Requests encodes for every raster the composited scene shows that has not been requested yet.
///
/// Hidden subtrees are skipped, as are text canvases unless text is drawn as rasters.
pub fn request_images(document: &Document, images: &mut ImageStore, params: RenderParams) -> Vec<EncodeRequest> {
	fn visit(layers: &[Arc<Layer>], path: &mut LayerPath, images: &mut ImageStore, params: RenderParams, requests: &mut Vec<EncodeRequest>) {
		for (index, layer) in layers.iter().enumerate() {
			if layer.hidden {
				continue;
			}
			path.push(index);

			if let Some(canvas) = layer.mask.as_ref().and_then(|mask| mask.canvas.as_ref()) {
				requests.extend(images.request(ImageSlot::mask(path), canvas));
			}

			match &layer.content {
				LayerContent::Group { children } => visit(children, path, images, params, requests),
				LayerContent::Text { canvas: Some(canvas), .. } if params.text_mode == TextRenderMode::Raster => requests.extend(images.request(ImageSlot::content(path), canvas)),
				LayerContent::Text { .. } => {}
				LayerContent::Raster { canvas } => {
					if let Some(canvas) = canvas {
						requests.extend(images.request(ImageSlot::content(path), canvas));
					}
				}
			}

			path.pop();
		}
	}

	let mut requests = Vec::new();
	visit(&document.children, &mut Vec::new(), images, params, &mut requests);
	requests
}
