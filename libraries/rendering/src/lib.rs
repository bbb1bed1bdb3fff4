pub mod color;
pub mod compositor;
pub mod encoding;
pub mod filter;
pub mod mask;
#[cfg(feature = "preview")]
pub mod preview;
pub mod renderer;
pub mod scene;

pub use color::color_to_string;
pub use compositor::{CompositeContext, RenderParams, TextRenderMode, composite_document, composite_layer, request_images};
pub use encoding::{EncodeRequest, EncodeResult, ImageSlot, ImageStore};
pub use filter::{FilterPipeline, stroke_kernel, synthesize_filter};
pub use mask::{MaskRegion, synthesize_mask};
pub use renderer::{Render, SvgRender};
pub use scene::{Scene, SceneContent, SceneNode};
