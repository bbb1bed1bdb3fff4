use crate::error::SessionError;

use layer_types::{Document, LayerPath};
use rendering::{CompositeContext, EncodeRequest, EncodeResult, ImageStore, RenderParams, Scene, composite_document, request_images};
use text_raster::{TextBackend, update_text_layer};

/// Identifies one document load. Only the most recently begun load may install its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A composited scene plus the image encodes it is still waiting on.
#[derive(Debug)]
pub struct Frame {
	pub scene: Scene,
	/// Drive these and hand their results to [`Session::apply_encoded`], then render again to show the images.
	pub requests: Vec<EncodeRequest>,
}

/// The state of one viewing and editing session: the current document tree and the images encoded for it.
#[derive(Debug)]
pub struct Session<B: TextBackend> {
	document: Option<Document>,
	load_generation: u64,
	images: ImageStore,
	params: RenderParams,
	backend: B,
}

impl<B: TextBackend> Session<B> {
	pub fn new(backend: B, params: RenderParams) -> Self {
		Self {
			document: None,
			load_generation: 0,
			images: ImageStore::new(),
			params,
			backend,
		}
	}

	pub fn document(&self) -> Option<&Document> {
		self.document.as_ref()
	}

	pub fn params(&self) -> RenderParams {
		self.params
	}

	/// Starts loading a document, superseding any load still in flight.
	pub fn begin_load(&mut self) -> LoadTicket {
		self.load_generation += 1;
		LoadTicket(self.load_generation)
	}

	/// Installs the document produced by a load. Returns whether it was installed.
	///
	/// Nothing happens when nothing was selected (`None`) or when a newer load has begun since the ticket was issued.
	pub fn finish_load(&mut self, ticket: LoadTicket, document: Option<Document>) -> bool {
		let Some(document) = document else {
			log::debug!("Load {ticket:?} produced no document");
			return false;
		};
		if ticket.0 != self.load_generation {
			log::debug!("Ignoring superseded load {ticket:?}, the latest is {}", self.load_generation);
			return false;
		}

		log::info!("Loaded a {}x{} document with {} top level layers", document.width, document.height, document.children.len());
		self.document = Some(document);
		self.images.clear();
		true
	}

	/// The editable text layers, skipping any inside hidden layers.
	pub fn text_layers(&self) -> Vec<(LayerPath, &str)> {
		self.document.as_ref().map(Document::text_layers).unwrap_or_default()
	}

	/// Replaces the string of the text layer at `path`, redrawing it and swapping it into a new document tree.
	///
	/// Layers that are not rasterized text are left as they are.
	pub fn edit_text(&mut self, path: &[usize], text: &str) -> Result<(), SessionError> {
		let document = self.document.as_ref().ok_or(SessionError::NoDocument)?;
		let layer = document.layer(path)?;
		let updated = update_text_layer(layer, text, &self.backend);

		log::debug!("Text of layer {path:?} set to {text:?}");
		self.document = Some(document.with_replaced_layer(path, updated)?);
		Ok(())
	}

	/// Composites the current document with the images resolved so far and issues encodes for any raster not yet requested.
	pub fn render(&mut self) -> Option<Frame> {
		let document = self.document.as_ref()?;
		let requests = request_images(document, &mut self.images, self.params);
		let scene = composite_document(document, &CompositeContext::new(&self.images, self.params));
		Some(Frame { scene, requests })
	}

	/// Stores a finished encode. Returns whether it was still current.
	pub fn apply_encoded(&mut self, result: EncodeResult) -> bool {
		self.images.apply(result)
	}

	/// Renders, waits for every outstanding encode and renders again, so the scene embeds all of its images.
	pub fn render_resolved(&mut self) -> Option<Scene> {
		let frame = self.render()?;
		if frame.requests.is_empty() {
			return Some(frame.scene);
		}

		log::debug!("Encoding {} images", frame.requests.len());
		let results = futures::executor::block_on(futures::future::join_all(frame.requests.into_iter().map(EncodeRequest::encode)));
		for result in results {
			self.apply_encoded(result);
		}

		self.render().map(|frame| frame.scene)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use layer_types::{Layer, Raster, TextData, TextStyle};
	use text_raster::TextFont;

	struct Monospace;

	impl TextBackend for Monospace {
		fn measure_text(&self, text: &str, font: TextFont) -> f64 {
			text.len() as f64 * font.size / 2.
		}

		fn fill_text(&self, _text: &str, _font: TextFont, _fill: [u8; 4], width: u32, height: u32, _baseline: f64) -> Option<Raster> {
			Some(Raster::new(width, height))
		}
	}

	fn document(text: &str) -> Document {
		Document::new(100, 100, [Layer::text(0, 0, TextData::new(text, TextStyle::default()), Some(Raster::new(1, 1)))])
	}

	#[test]
	fn superseded_loads_are_ignored() {
		let mut session = Session::new(Monospace, RenderParams::default());

		let first = session.begin_load();
		let second = session.begin_load();
		assert!(session.finish_load(second, Some(document("second"))));
		assert!(!session.finish_load(first, Some(document("first"))));

		assert_eq!(session.text_layers(), vec![(vec![0], "second")]);
	}

	#[test]
	fn empty_selection_keeps_the_document() {
		let mut session = Session::new(Monospace, RenderParams::default());
		let ticket = session.begin_load();
		session.finish_load(ticket, Some(document("kept")));

		let ticket = session.begin_load();
		assert!(!session.finish_load(ticket, None));
		assert_eq!(session.text_layers(), vec![(vec![0], "kept")]);
	}

	#[test]
	fn edits_need_a_document() {
		let mut session = Session::new(Monospace, RenderParams::default());
		assert_eq!(session.edit_text(&[0], "Hi"), Err(SessionError::NoDocument));
		assert!(session.render().is_none());
	}

	#[test]
	fn edits_replace_the_tree() {
		let mut session = Session::new(Monospace, RenderParams::default());
		let ticket = session.begin_load();
		session.finish_load(ticket, Some(document("a")));
		let before = session.document().cloned().unwrap();

		session.edit_text(&[0], "Edited").unwrap();

		let after = session.document().unwrap();
		assert_eq!(after.layer(&[0]).unwrap().right, 36);
		assert_eq!(before.layer(&[0]).unwrap().text_data().unwrap().text, "a");
		assert!(matches!(session.edit_text(&[3], "Nope"), Err(SessionError::Document(_))));
	}
}
