use crate::LayerPath;

use thiserror::Error;

/// Structural errors raised when addressing into a layer tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DocumentError {
	#[error("No layer exists at path {0:?}")]
	LayerNotFound(LayerPath),

	#[error("An empty path does not address a layer")]
	InvalidPath,

	#[error("The layer at path {0:?} is not a group")]
	NotAGroup(LayerPath),

	#[error("Raster data has {actual} bytes but {expected} were expected")]
	InvalidRaster { expected: usize, actual: usize },
}
