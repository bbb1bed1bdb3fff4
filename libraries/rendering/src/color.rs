use layer_types::Color;

/// The color used wherever a color is missing or its color model is not supported.
pub const TRANSPARENT_BLACK: &str = "rgba(0, 0, 0, 0)";

/// Formats a color as a CSS `rgba()` string.
///
/// RGB channels are passed through unchanged and a missing alpha means opaque.
/// Color models other than RGB are not converted: they, like a missing color, degrade to [`TRANSPARENT_BLACK`].
pub fn color_to_string(color: Option<&Color>) -> String {
	match color {
		Some(Color::Rgba { r, g, b, a }) => format!("rgba({r}, {g}, {b}, {})", a.unwrap_or(1.)),
		Some(other) => {
			log::debug!("{} colors are not supported, falling back to transparent black", other.model_name());
			TRANSPARENT_BLACK.to_string()
		}
		None => TRANSPARENT_BLACK.to_string(),
	}
}
