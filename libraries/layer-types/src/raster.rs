use crate::DocumentError;

use serde::{Deserialize, Serialize};

mod base64_serde {
	//! Basic wrapper for [`serde`] to perform [`base64`] encoding

	use base64::Engine;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn as_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
	}

	pub fn from_base64<'a, D: Deserializer<'a>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		use serde::de::Error;

		String::deserialize(deserializer).and_then(|string| base64::engine::general_purpose::STANDARD.decode(string).map_err(|err| Error::custom(err.to_string())))
	}
}

/// A pixel buffer of straight (non-premultiplied) RGBA8 samples, row-major from the top left.
///
/// This is the "canvas" of a layer or mask. Rasters are immutable once built and shared between tree snapshots behind an `Arc`.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Raster {
	pub width: u32,
	pub height: u32,
	#[serde(serialize_with = "base64_serde::as_base64", deserialize_with = "base64_serde::from_base64")]
	data: Vec<u8>,
}

impl std::fmt::Debug for Raster {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let length = self.data.len();
		f.debug_struct("Raster")
			.field("width", &self.width)
			.field("height", &self.height)
			.field("data", if length < 100 { &self.data } else { &length })
			.finish()
	}
}

impl Raster {
	/// A fully transparent raster of the given size.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			data: vec![0; width as usize * height as usize * 4],
		}
	}

	/// Wraps existing RGBA8 samples, checking that the buffer matches the dimensions.
	pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DocumentError> {
		let expected = width as usize * height as usize * 4;
		if data.len() != expected {
			return Err(DocumentError::InvalidRaster { expected, actual: data.len() });
		}
		Ok(Self { width, height, data })
	}

	pub fn data(&self) -> &[u8] {
		&self.data
	}

	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// The RGBA sample at `(x, y)`, or `None` outside the raster.
	pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
		if x >= self.width || y >= self.height {
			return None;
		}
		let start = (y as usize * self.width as usize + x as usize) * 4;
		self.data.get(start..start + 4).map(|sample| [sample[0], sample[1], sample[2], sample[3]])
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn rejects_mismatched_buffers() {
		assert_eq!(Raster::from_rgba8(2, 2, vec![0; 15]), Err(DocumentError::InvalidRaster { expected: 16, actual: 15 }));
		assert!(Raster::from_rgba8(2, 2, vec![0; 16]).is_ok());
	}

	#[test]
	fn pixels_are_row_major() {
		let mut data = vec![0; 2 * 2 * 4];
		data[8..12].copy_from_slice(&[1, 2, 3, 4]);
		let raster = Raster::from_rgba8(2, 2, data).unwrap();
		assert_eq!(raster.pixel(0, 1), Some([1, 2, 3, 4]));
		assert_eq!(raster.pixel(2, 0), None);
	}

	#[test]
	fn serializes_samples_as_base64() {
		let raster = Raster::from_rgba8(1, 1, vec![255, 0, 0, 255]).unwrap();
		let json = serde_json::to_string(&raster).unwrap();
		assert_eq!(json, r#"{"width":1,"height":1,"data":"/wAA/w=="}"#);
		assert_eq!(serde_json::from_str::<Raster>(&json).unwrap(), raster);
	}
}
