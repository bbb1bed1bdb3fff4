pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::{Frame, LoadTicket, Session};

use layer_types::{Document, LayerPath};

/// Reads a document from the JSON a layered image decoder produces.
pub fn parse_document(json: &str) -> Result<Document, serde_json::Error> {
	serde_json::from_str(json)
}

/// Parses a layer path written as child indices separated by dots, such as `0.2.1`.
pub fn parse_layer_path(path: &str) -> Option<LayerPath> {
	path.split('.').map(|index| index.trim().parse().ok()).collect::<Option<LayerPath>>().filter(|path| !path.is_empty())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn layer_paths() {
		assert_eq!(parse_layer_path("0"), Some(vec![0]));
		assert_eq!(parse_layer_path("0.2.1"), Some(vec![0, 2, 1]));
		assert_eq!(parse_layer_path(""), None);
		assert_eq!(parse_layer_path("1.x"), None);
		assert_eq!(parse_layer_path("-1"), None);
	}
}
