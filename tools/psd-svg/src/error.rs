use layer_types::DocumentError;

use thiserror::Error;

/// The error type used by a [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
	#[error("No document has been loaded")]
	NoDocument,

	#[error("The operation caused a document error:\n{0}")]
	Document(#[from] DocumentError),
}
