//! Encoding of layer rasters into embeddable image data.
//!
//! Encoding happens asynchronously and requests may resolve in any order. Each request carries a generation number,
//! and a result is only kept if it answers the latest request issued for its slot, so a slow encode of an outdated
//! raster can never overwrite a newer one.

use base64::Engine;
use layer_types::{LayerPath, Raster};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Which raster of a layer an image slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
	/// The layer's own pixels.
	Content,
	/// The pixels of the layer's mask.
	Mask,
}

/// Identifies one embedded image in the scene by the layer it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageSlot {
	pub path: LayerPath,
	pub kind: SlotKind,
}

impl ImageSlot {
	pub fn content(path: &[usize]) -> Self {
		Self { path: path.to_vec(), kind: SlotKind::Content }
	}

	pub fn mask(path: &[usize]) -> Self {
		Self { path: path.to_vec(), kind: SlotKind::Mask }
	}
}

/// Encodes a raster as a PNG data URL.
///
/// Decoded rasters are not checked against their dimensions, so a buffer of the wrong length is reported as an error here.
pub fn encode_png_data_url(raster: &Raster) -> Result<String, image::ImageError> {
	use image::ImageEncoder;
	use image::error::{ParameterError, ParameterErrorKind};

	if raster.data().len() != raster.width as usize * raster.height as usize * 4 {
		return Err(image::ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch)));
	}

	let mut png = Vec::new();
	let encoder = image::codecs::png::PngEncoder::new(&mut png);
	encoder.write_image(raster.data(), raster.width, raster.height, image::ExtendedColorType::Rgba8)?;

	Ok(format!("data:image/png;base64,{}", base64::engine::general_purpose::STANDARD.encode(&png)))
}

/// A pending encode of one raster for one slot.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
	pub slot: ImageSlot,
	pub generation: u64,
	pub raster: Arc<Raster>,
}

impl EncodeRequest {
	pub async fn encode(self) -> EncodeResult {
		let href = match encode_png_data_url(&self.raster) {
			Ok(href) => Some(href),
			Err(error) => {
				log::warn!("Failed to encode the image for {:?}: {error}", self.slot);
				None
			}
		};

		EncodeResult {
			slot: self.slot,
			generation: self.generation,
			href,
		}
	}
}

/// The outcome of an [`EncodeRequest`]. A failed encode has no `href` and renders as an empty image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeResult {
	pub slot: ImageSlot,
	pub generation: u64,
	pub href: Option<String>,
}

#[derive(Debug)]
struct SlotState {
	raster: Arc<Raster>,
	generation: u64,
	resolved: bool,
	href: Option<String>,
}

/// Tracks the embedded image data of every raster in the scene.
#[derive(Debug, Default)]
pub struct ImageStore {
	next_generation: u64,
	slots: FxHashMap<ImageSlot, SlotState>,
}

impl ImageStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Issues an encode request for `raster` in `slot`.
	///
	/// Returns `None` when the very same raster has already been requested for this slot, so each raster is encoded once.
	/// A different raster supersedes any outstanding request; the slot keeps showing its previous image until the new one resolves.
	pub fn request(&mut self, slot: ImageSlot, raster: &Arc<Raster>) -> Option<EncodeRequest> {
		if self.slots.get(&slot).is_some_and(|state| Arc::ptr_eq(&state.raster, raster)) {
			return None;
		}

		let generation = self.next_generation;
		self.next_generation += 1;

		let href = self.slots.remove(&slot).and_then(|state| state.href);
		self.slots.insert(
			slot.clone(),
			SlotState {
				raster: raster.clone(),
				generation,
				resolved: false,
				href,
			},
		);

		Some(EncodeRequest {
			slot,
			generation,
			raster: raster.clone(),
		})
	}

	/// Stores an encode result if it answers the latest request for its slot. Returns whether it was kept.
	pub fn apply(&mut self, result: EncodeResult) -> bool {
		match self.slots.get_mut(&result.slot) {
			Some(state) if state.generation == result.generation => {
				state.href = result.href;
				state.resolved = true;
				true
			}
			_ => {
				log::debug!("Dropping superseded image encode for {:?} (generation {})", result.slot, result.generation);
				false
			}
		}
	}

	/// The image data currently shown for a slot, if any has resolved.
	pub fn href(&self, slot: &ImageSlot) -> Option<&str> {
		self.slots.get(slot).and_then(|state| state.href.as_deref())
	}

	/// Whether the latest request for the slot has resolved.
	pub fn is_resolved(&self, slot: &ImageSlot) -> bool {
		self.slots.get(slot).is_some_and(|state| state.resolved)
	}

	/// Number of requests still waiting for a result.
	pub fn pending_count(&self) -> usize {
		self.slots.values().filter(|state| !state.resolved).count()
	}

	/// Forgets every slot, for when a different document is loaded.
	///
	/// Generations keep counting up, so results of requests issued before clearing are never mistaken for new ones.
	pub fn clear(&mut self) {
		self.slots.clear();
	}
}
