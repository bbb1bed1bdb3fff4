use crate::layer::LayerIter;
use crate::{DocumentError, Layer, LayerContent};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Addresses a layer by the index of each ancestor within its parent's children, starting at the document root.
pub type LayerPath = Vec<usize>;

/// A decoded layered image: its pixel dimensions and the top level layers, drawn back to front.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
	pub width: u32,
	pub height: u32,
	#[serde(default)]
	pub children: Vec<Arc<Layer>>,
}

impl Document {
	pub fn new(width: u32, height: u32, children: impl IntoIterator<Item = Layer>) -> Self {
		Self {
			width,
			height,
			children: children.into_iter().map(Arc::new).collect(),
		}
	}

	/// Returns a reference to the layer at the path.
	pub fn layer(&self, path: &[usize]) -> Result<&Arc<Layer>, DocumentError> {
		let (&first, rest) = path.split_first().ok_or(DocumentError::InvalidPath)?;
		let mut layer = self.children.get(first).ok_or_else(|| DocumentError::LayerNotFound(path.to_vec()))?;
		for (depth, &index) in rest.iter().enumerate() {
			if !layer.is_group() {
				return Err(DocumentError::NotAGroup(path[..=depth].to_vec()));
			}
			layer = layer.children().get(index).ok_or_else(|| DocumentError::LayerNotFound(path.to_vec()))?;
		}
		Ok(layer)
	}

	/// Builds a new document where the layer at `path` is replaced by `layer`.
	///
	/// Only the target and its ancestors are rebuilt. Every other subtree is shared with `self`, which is left unchanged.
	pub fn with_replaced_layer(&self, path: &[usize], layer: Layer) -> Result<Document, DocumentError> {
		let (&first, rest) = path.split_first().ok_or(DocumentError::InvalidPath)?;
		let mut children = self.children.clone();
		let target = children.get_mut(first).ok_or_else(|| DocumentError::LayerNotFound(path.to_vec()))?;
		*target = Arc::new(replace_descendant(target, path, 1, layer)?);

		Ok(Document {
			width: self.width,
			height: self.height,
			children,
		})
	}

	/// Finds the path of a layer by reference identity within this tree snapshot.
	pub fn path_of(&self, layer: &Arc<Layer>) -> Option<LayerPath> {
		self.iter().find(|(_, candidate)| Arc::ptr_eq(candidate, layer)).map(|(path, _)| path)
	}

	/// Replaces a layer held by reference. Prefer [`Document::with_replaced_layer`] when the path is known.
	pub fn replace_layer(&self, old: &Arc<Layer>, new: Layer) -> Result<Document, DocumentError> {
		let path = self.path_of(old).ok_or_else(|| DocumentError::LayerNotFound(Vec::new()))?;
		self.with_replaced_layer(&path, new)
	}

	/// Iterate over every layer in document order, paired with its path.
	pub fn iter(&self) -> LayerIter<'_> {
		LayerIter {
			stack: self.children.iter().enumerate().rev().map(|(index, layer)| (vec![index], layer)).collect(),
		}
	}

	/// The text layers that are shown, with their current strings. Hidden layers and everything below them are skipped.
	pub fn text_layers(&self) -> Vec<(LayerPath, &str)> {
		fn visit<'a>(layers: &'a [Arc<Layer>], path: &mut LayerPath, found: &mut Vec<(LayerPath, &'a str)>) {
			for (index, layer) in layers.iter().enumerate() {
				if layer.hidden {
					continue;
				}
				path.push(index);
				match &layer.content {
					LayerContent::Group { children } => visit(children, path, found),
					LayerContent::Text { text, .. } => found.push((path.clone(), text.text.as_str())),
					LayerContent::Raster { .. } => {}
				}
				path.pop();
			}
		}

		let mut found = Vec::new();
		visit(&self.children, &mut Vec::new(), &mut found);
		found
	}
}

/// Rebuilds `node` with the descendant at `path[depth..]` replaced. Returns `layer` itself once the path is exhausted.
fn replace_descendant(node: &Layer, path: &[usize], depth: usize, layer: Layer) -> Result<Layer, DocumentError> {
	let Some(&index) = path.get(depth) else { return Ok(layer) };

	let LayerContent::Group { children } = &node.content else {
		return Err(DocumentError::NotAGroup(path[..depth].to_vec()));
	};
	let mut children = children.clone();
	let target = children.get_mut(index).ok_or_else(|| DocumentError::LayerNotFound(path.to_vec()))?;
	*target = Arc::new(replace_descendant(target, path, depth + 1, layer)?);

	Ok(Layer {
		content: LayerContent::Group { children },
		..node.clone()
	})
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{Raster, TextData, TextStyle};

	fn named(name: &str, layer: Layer) -> Layer {
		Layer { name: Some(name.into()), ..layer }
	}

	fn sample_document() -> Document {
		Document::new(
			100,
			100,
			[
				named("background", Layer::raster(0, 0, Raster::new(4, 4))),
				named(
					"group",
					Layer::group([
						named("title", Layer::text(10, 20, TextData::new("Title", TextStyle::default()), Some(Raster::new(5, 5)))),
						named("photo", Layer::raster(1, 1, Raster::new(2, 2))),
					]),
				),
				named("overlay", Layer::raster(0, 0, Raster::new(1, 1))),
			],
		)
	}

	#[test]
	fn layers_are_addressed_by_path() {
		let document = sample_document();
		assert_eq!(document.layer(&[1, 0]).unwrap().name.as_deref(), Some("title"));
		assert_eq!(document.layer(&[]), Err(DocumentError::InvalidPath));
		assert_eq!(document.layer(&[1, 5]), Err(DocumentError::LayerNotFound(vec![1, 5])));
		assert_eq!(document.layer(&[0, 0]), Err(DocumentError::NotAGroup(vec![0])));
	}

	#[test]
	fn replacement_shares_unrelated_subtrees() {
		let document = sample_document();
		let old_title = document.layer(&[1, 0]).unwrap().clone();
		let new_title = named("new title", (*old_title).clone());

		let edited = document.with_replaced_layer(&[1, 0], new_title.clone()).unwrap();

		// The original tree still resolves to the original content
		assert!(Arc::ptr_eq(document.layer(&[1, 0]).unwrap(), &old_title));
		assert_eq!(document.layer(&[1, 0]).unwrap().name.as_deref(), Some("title"));

		// The new tree holds the replacement, with fresh nodes along the path
		assert_eq!(**edited.layer(&[1, 0]).unwrap(), new_title);
		assert!(!Arc::ptr_eq(edited.layer(&[1]).unwrap(), document.layer(&[1]).unwrap()));
		assert!(!Arc::ptr_eq(edited.layer(&[1, 0]).unwrap(), &old_title));

		// Everything off the path is the very same node
		assert!(Arc::ptr_eq(edited.layer(&[0]).unwrap(), document.layer(&[0]).unwrap()));
		assert!(Arc::ptr_eq(edited.layer(&[1, 1]).unwrap(), document.layer(&[1, 1]).unwrap()));
		assert!(Arc::ptr_eq(edited.layer(&[2]).unwrap(), document.layer(&[2]).unwrap()));
	}

	#[test]
	fn replacement_rejects_bad_paths() {
		let document = sample_document();
		assert_eq!(document.with_replaced_layer(&[], Layer::default()), Err(DocumentError::InvalidPath));
		assert_eq!(document.with_replaced_layer(&[7], Layer::default()), Err(DocumentError::LayerNotFound(vec![7])));
		assert_eq!(document.with_replaced_layer(&[0, 1], Layer::default()), Err(DocumentError::NotAGroup(vec![0])));
	}

	#[test]
	fn replacement_by_reference_resolves_the_path() {
		let document = sample_document();
		let photo = document.layer(&[1, 1]).unwrap().clone();
		assert_eq!(document.path_of(&photo), Some(vec![1, 1]));

		let edited = document.replace_layer(&photo, named("retouched", (*photo).clone())).unwrap();
		assert_eq!(edited.layer(&[1, 1]).unwrap().name.as_deref(), Some("retouched"));

		// An equal but distinct node is not found
		let lookalike = Arc::new((*photo).clone());
		assert_eq!(document.path_of(&lookalike), None);
	}

	#[test]
	fn text_layers_skip_hidden_subtrees() {
		let mut document = sample_document();
		assert_eq!(document.text_layers(), vec![(vec![1, 0], "Title")]);

		let mut group = (**document.layer(&[1]).unwrap()).clone();
		group.hidden = true;
		document = document.with_replaced_layer(&[1], group).unwrap();
		assert!(document.text_layers().is_empty());
	}
}
