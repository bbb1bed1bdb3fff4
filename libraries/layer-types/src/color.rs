use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A color value as it comes out of the document decoder.
///
/// The variant is picked from the shape of the value (which channel names are present), matching how the decoder emits colors.
/// Only [`Color::Rgba`] is understood by the renderer, the other color models are recognized so they can be carried through the tree unchanged.
/// Any other value becomes [`Color::Unknown`] instead of failing the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
	/// Direct RGB with channels in `0..=255` and an optional alpha in `0..=1`.
	Rgba { r: f64, g: f64, b: f64, a: Option<f64> },
	Cmyk { c: f64, m: f64, y: f64, k: f64 },
	Hsl { h: f64, s: f64, l: f64 },
	Hsb { h: f64, s: f64, b: f64 },
	Lab { l: f64, a: f64, b: f64 },
	Grayscale { k: f64 },
	/// A value of any other shape. Must stay the last variant, it accepts everything.
	Unknown(UnknownColor),
}

/// Placeholder for a color value that matches none of the known color models. Its contents are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnknownColor;

impl<'de> Deserialize<'de> for UnknownColor {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		serde::de::IgnoredAny::deserialize(deserializer)?;
		Ok(UnknownColor)
	}
}

impl Serialize for UnknownColor {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		use serde::ser::SerializeMap;

		serializer.serialize_map(Some(0))?.end()
	}
}

impl Color {
	pub const BLACK: Color = Color::rgb(0., 0., 0.);
	pub const WHITE: Color = Color::rgb(255., 255., 255.);

	/// An opaque RGB color without an explicit alpha channel.
	pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
		Self::Rgba { r, g, b, a: None }
	}

	pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
		Self::Rgba { r, g, b, a: Some(a) }
	}

	/// Name of the color model, used in diagnostics.
	pub fn model_name(&self) -> &'static str {
		match self {
			Color::Rgba { .. } => "RGB",
			Color::Cmyk { .. } => "CMYK",
			Color::Hsl { .. } => "HSL",
			Color::Hsb { .. } => "HSB",
			Color::Lab { .. } => "Lab",
			Color::Grayscale { .. } => "Grayscale",
			Color::Unknown(_) => "unknown",
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn variant_is_chosen_by_channel_names() {
		let rgb: Color = serde_json::from_str(r#"{"r": 10, "g": 20, "b": 30}"#).unwrap();
		assert_eq!(rgb, Color::rgb(10., 20., 30.));

		let rgba: Color = serde_json::from_str(r#"{"r": 1, "g": 2, "b": 3, "a": 0.5}"#).unwrap();
		assert_eq!(rgba, Color::rgba(1., 2., 3., 0.5));

		let hsl: Color = serde_json::from_str(r#"{"h": 0, "s": 0, "l": 0}"#).unwrap();
		assert_eq!(hsl, Color::Hsl { h: 0., s: 0., l: 0. });

		let lab: Color = serde_json::from_str(r#"{"l": 50, "a": 10, "b": -10}"#).unwrap();
		assert_eq!(lab, Color::Lab { l: 50., a: 10., b: -10. });

		let cmyk: Color = serde_json::from_str(r#"{"c": 0, "m": 1, "y": 2, "k": 3}"#).unwrap();
		assert_eq!(cmyk.model_name(), "CMYK");

		let gray: Color = serde_json::from_str(r#"{"k": 0.25}"#).unwrap();
		assert_eq!(gray, Color::Grayscale { k: 0.25 });
	}

	#[test]
	fn unrecognized_shapes_are_kept_as_unknown() {
		let float_rgb: Color = serde_json::from_str(r#"{"fr": 0.5, "fg": 0.1, "fb": 0.2}"#).unwrap();
		assert_eq!(float_rgb, Color::Unknown(UnknownColor));
		assert_eq!(float_rgb.model_name(), "unknown");

		let named: Color = serde_json::from_str(r#""red""#).unwrap();
		assert_eq!(named, Color::Unknown(UnknownColor));

		assert_eq!(serde_json::to_string(&float_rgb).unwrap(), "{}");
		assert_eq!(serde_json::from_str::<Color>("{}").unwrap(), Color::Unknown(UnknownColor));
	}
}
