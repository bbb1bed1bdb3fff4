//! Rasterizes serialized scenes so they can be checked without a browser.

use resvg::tiny_skia;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
	#[error("Failed to parse the SVG: {0}")]
	Parse(#[from] usvg::Error),
	#[error("Cannot allocate a {width}x{height} pixel preview")]
	Allocation { width: u32, height: u32 },
	#[error("Failed to encode the preview as PNG: {0}")]
	Encode(String),
}

/// Fonts available to text primitives while rasterizing.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
	/// Also search the fonts installed on this machine.
	pub system_fonts: bool,
	/// Raw font files loaded ahead of the system fonts.
	pub fonts: Vec<Arc<Vec<u8>>>,
}

/// Renders an SVG document to a pixmap the size of its viewport.
pub fn rasterize_svg(svg: &str, preview: &PreviewOptions) -> Result<tiny_skia::Pixmap, PreviewError> {
	let mut options = usvg::Options::default();
	{
		let fontdb = options.fontdb_mut();
		for font in &preview.fonts {
			fontdb.load_font_data(font.as_ref().clone());
		}
		if preview.system_fonts {
			fontdb.load_system_fonts();
		}
	}

	let tree = usvg::Tree::from_str(svg, &options)?;
	let size = tree.size().to_int_size();
	let (width, height) = (size.width(), size.height());
	log::trace!("Rasterizing a {width}x{height} preview");

	let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(PreviewError::Allocation { width, height })?;
	resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
	Ok(pixmap)
}

/// Renders an SVG document and encodes the result as PNG file contents.
pub fn render_png(svg: &str, preview: &PreviewOptions) -> Result<Vec<u8>, PreviewError> {
	rasterize_svg(svg, preview)?.encode_png().map_err(|error| PreviewError::Encode(error.to_string()))
}
