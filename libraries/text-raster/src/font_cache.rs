use std::collections::HashMap;

/// Family used when a text style names none, and the fallback when a named family is not loaded.
pub const DEFAULT_FONT_FAMILY: &str = "serif";

/// A cache of loaded font file data, keyed by family name
#[derive(Clone, Default)]
pub struct FontCache {
	/// Actual font file data used for rendering a font
	font_file_data: HashMap<String, Vec<u8>>,
}

impl std::fmt::Debug for FontCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FontCache").field("font_file_data", &self.font_file_data.keys().collect::<Vec<_>>()).finish()
	}
}

impl FontCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the family name if the font is cached, otherwise returns the default family name if that is cached
	pub fn resolve_font<'a>(&'a self, family: &'a str) -> Option<&'a str> {
		if self.font_file_data.contains_key(family) {
			Some(family)
		} else {
			self.font_file_data.get_key_value(DEFAULT_FONT_FAMILY).map(|(family, _)| family.as_str())
		}
	}

	/// Try to get the bytes for a font, along with the family they were resolved to
	pub fn get<'a>(&'a self, family: &'a str) -> Option<(&'a [u8], &'a str)> {
		self.resolve_font(family).and_then(|family| self.font_file_data.get(family).map(|data| (data.as_slice(), family)))
	}

	/// Check if the font is already loaded
	pub fn loaded_font(&self, family: &str) -> bool {
		self.font_file_data.contains_key(family)
	}

	/// Insert a new font into the cache
	pub fn insert(&mut self, family: impl Into<String>, data: Vec<u8>) {
		self.font_file_data.insert(family.into(), data);
	}

	pub fn is_empty(&self) -> bool {
		self.font_file_data.is_empty()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn falls_back_to_the_default_family() {
		let mut cache = FontCache::new();
		assert_eq!(cache.resolve_font("Arial"), None);

		cache.insert(DEFAULT_FONT_FAMILY, vec![1]);
		cache.insert("Mono", vec![2]);

		assert_eq!(cache.get("Mono"), Some((&[2][..], "Mono")));
		assert_eq!(cache.get("Arial"), Some((&[1][..], DEFAULT_FONT_FAMILY)));
		assert!(cache.loaded_font("Mono"));
		assert!(!cache.loaded_font("Arial"));
	}

	#[test]
	fn debug_lists_families_only() {
		let mut cache = FontCache::new();
		cache.insert("Mono", vec![0; 64]);
		assert_eq!(format!("{cache:?}"), r#"FontCache { font_file_data: ["Mono"] }"#);
	}
}
