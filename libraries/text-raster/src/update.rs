use crate::backend::{TextBackend, TextFont};
use crate::font_cache::DEFAULT_FONT_FAMILY;

use layer_types::{Color, Layer, LayerContent};
use std::sync::Arc;

pub const DEFAULT_FONT_SIZE: f64 = 12.;
/// Canvas height relative to the font size.
///
/// The product is rounded to the nearest pixel, not up. That keeps 12px text on a 14px canvas and 11px text on a 13px one,
/// where taking the ceiling would give 15 and 14.
pub const LINE_HEIGHT: f64 = 1.2;

/// Straight RGBA for a fill color. A missing color is opaque black and unsupported color models are fully transparent.
pub fn fill_rgba(color: Option<&Color>) -> [u8; 4] {
	let channel = |value: f64| value.round().clamp(0., 255.) as u8;
	match color {
		None => [0, 0, 0, 255],
		Some(Color::Rgba { r, g, b, a }) => [channel(*r), channel(*g), channel(*b), channel(a.unwrap_or(1.) * 255.)],
		Some(other) => {
			log::debug!("{} text fills are not supported, drawing transparent text", other.model_name());
			[0, 0, 0, 0]
		}
	}
}

/// Replaces a text layer's string and redraws its canvas.
///
/// The canvas is sized to the measured string and one line of text, anchored at the layer's top left corner.
/// Layers without text or without a previous canvas are returned unchanged. If the backend cannot draw, the
/// geometry and text are still updated but the previous canvas is kept.
pub fn update_text_layer(layer: &Layer, text: &str, backend: &impl TextBackend) -> Layer {
	let LayerContent::Text { text: data, canvas: Some(canvas) } = &layer.content else {
		log::debug!("Layer {:?} has no rasterized text to update", layer.name);
		return layer.clone();
	};

	let mut data = data.clone();
	data.text = text.to_string();

	let font = TextFont {
		family: data.style.font_name.as_deref().unwrap_or(DEFAULT_FONT_FAMILY),
		size: data.style.font_size.unwrap_or(DEFAULT_FONT_SIZE),
	};
	let fill = fill_rgba(data.style.fill_color.as_ref());

	let width = backend.measure_text(text, font).ceil().max(1.) as u32;
	let height = (LINE_HEIGHT * font.size).round().max(1.) as u32;

	let canvas = match backend.fill_text(text, font, fill, width, height, font.size) {
		Some(raster) => Arc::new(raster),
		None => {
			log::warn!("Could not draw text layer {:?}, keeping its previous canvas", layer.name);
			canvas.clone()
		}
	};

	Layer {
		right: layer.left + width as i32,
		bottom: layer.top + height as i32,
		content: LayerContent::Text { text: data, canvas: Some(canvas) },
		..layer.clone()
	}
}
