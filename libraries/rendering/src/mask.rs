use layer_types::LayerMask;

/// A luminance mask showing the mask raster over the mask's own bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskRegion {
	pub x: i32,
	pub y: i32,
	pub width: i32,
	pub height: i32,
	/// Embeddable image data for the mask raster, once it has been encoded.
	pub href: Option<String>,
}

/// Builds the mask region for a layer's mask, or `None` if the layer has no mask.
///
/// Masks are always placed at their absolute document position.
pub fn synthesize_mask(mask: Option<&LayerMask>, href: Option<&str>) -> Option<MaskRegion> {
	let mask = mask?;

	// TODO: Offset by the layer's position once relative mask placement is supported
	if mask.position_relative_to_layer {
		log::debug!("Mask positioned relative to its layer, placing it absolutely instead");
	}

	Some(MaskRegion {
		x: mask.left,
		y: mask.top,
		width: mask.width(),
		height: mask.height(),
		href: href.map(str::to_string),
	})
}
