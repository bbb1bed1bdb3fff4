use crate::encoding::ImageSlot;
use crate::filter::FilterPipeline;
use crate::mask::MaskRegion;

/// The composited vector scene of a document, ready to be serialized with [`Render`](crate::renderer::Render).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
	/// The viewport is `(0, 0, width, height)`.
	pub width: u32,
	pub height: u32,
	/// Top level nodes, back to front.
	pub nodes: Vec<SceneNode>,
}

/// One rendered layer: a group carrying the layer's opacity, filter and mask around its content.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
	pub id: String,
	pub opacity: f64,
	pub filter: Option<FilterPipeline>,
	pub mask: Option<MaskRegion>,
	pub content: SceneContent,
}

impl SceneNode {
	pub fn filter_id(&self) -> String {
		format!("{}-filter", self.id)
	}

	pub fn mask_id(&self) -> String {
		format!("{}-mask", self.id)
	}

	pub fn content_id(&self) -> String {
		format!("{}-content", self.id)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneContent {
	/// Child nodes, back to front.
	Group(Vec<SceneNode>),
	Image(ImagePrimitive),
	Text(TextPrimitive),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePrimitive {
	pub x: i32,
	pub y: i32,
	pub width: i32,
	pub height: i32,
	/// The raster this image shows.
	pub slot: ImageSlot,
	/// Embeddable image data, absent until the raster's encoding has resolved.
	pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
	pub x: i32,
	pub y: i32,
	pub text: String,
	pub font_size: Option<f64>,
	pub font_family: Option<String>,
	pub fill: Option<String>,
}

/// Number of leaf primitives of each kind in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimitiveCount {
	pub images: usize,
	pub texts: usize,
}

impl Scene {
	/// Iterate over every node in the scene, parents before their children.
	pub fn iter(&self) -> SceneIter<'_> {
		SceneIter { stack: self.nodes.iter().rev().collect() }
	}

	pub fn count_primitives(&self) -> PrimitiveCount {
		self.iter().fold(PrimitiveCount::default(), |mut count, node| {
			match node.content {
				SceneContent::Image(_) => count.images += 1,
				SceneContent::Text(_) => count.texts += 1,
				SceneContent::Group(_) => {}
			}
			count
		})
	}

	/// The content slots of every image primitive in the scene.
	pub fn image_slots(&self) -> Vec<&ImageSlot> {
		self.iter()
			.filter_map(|node| match &node.content {
				SceneContent::Image(image) => Some(&image.slot),
				_ => None,
			})
			.collect()
	}

	/// Find a node by its id.
	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.iter().find(|node| node.id == id)
	}
}

/// Depth-first iterator over scene nodes in document order.
#[derive(Debug, Default)]
pub struct SceneIter<'a> {
	stack: Vec<&'a SceneNode>,
}

impl<'a> Iterator for SceneIter<'a> {
	type Item = &'a SceneNode;

	fn next(&mut self) -> Option<Self::Item> {
		self.stack.pop().inspect(|node| {
			if let SceneContent::Group(children) = &node.content {
				self.stack.extend(children.iter().rev());
			}
		})
	}
}
