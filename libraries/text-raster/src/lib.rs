pub mod backend;
pub mod font_cache;
pub mod to_kurbo;
pub mod update;

pub use backend::{GlyphRasterizer, TextBackend, TextFont};
pub use font_cache::{DEFAULT_FONT_FAMILY, FontCache};
pub use update::update_text_layer;
