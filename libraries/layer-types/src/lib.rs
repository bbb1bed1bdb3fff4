pub mod color;
pub mod document;
pub mod error;
pub mod layer;
pub mod raster;

pub use color::{Color, UnknownColor};
pub use document::{Document, LayerPath};
pub use error::DocumentError;
pub use layer::{Effect, EffectKind, Layer, LayerContent, LayerMask, TextData, TextStyle};
pub use raster::Raster;
