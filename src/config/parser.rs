use crate::config::types::Document;
use crate::error::{ResolveError, Result};
use std::path::Path;

/// Serialized form of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
	Toml,
	Yaml,
	Json,
}

impl DocumentFormat {
	/// Pick the format from a file extension.
	pub fn from_path(path: &Path) -> Option<Self> {
		let extension = path.extension()?.to_str()?.to_ascii_lowercase();
		match extension.as_str() {
			"toml" => Some(DocumentFormat::Toml),
			"yaml" | "yml" => Some(DocumentFormat::Yaml),
			"json" => Some(DocumentFormat::Json),
			_ => None,
		}
	}
}

/// Parse a document file from the given path.
pub fn parse_document_file(path: &Path) -> Result<Document> {
	if !path.exists() {
		return Err(ResolveError::DocumentNotFound {
			path: path.to_path_buf(),
		});
	}

	let format = DocumentFormat::from_path(path).ok_or_else(|| ResolveError::UnsupportedFormat {
		path: path.to_path_buf(),
	})?;

	let content = std::fs::read_to_string(path).map_err(|source| ResolveError::DocumentReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_document_str(&content, format, path)
}

/// Parse a document from a string (useful for testing).
pub fn parse_document_str(content: &str, format: DocumentFormat, path: &Path) -> Result<Document> {
	let document: Document = match format {
		DocumentFormat::Toml => {
			toml::from_str(content).map_err(|source| ResolveError::TomlParseError {
				path: path.to_path_buf(),
				source,
			})?
		}
		// An empty YAML file is a null document, not an empty mapping.
		DocumentFormat::Yaml if content.trim().is_empty() => Document::default(),
		DocumentFormat::Yaml => {
			serde_yaml::from_str(content).map_err(|source| ResolveError::YamlParseError {
				path: path.to_path_buf(),
				source,
			})?
		}
		DocumentFormat::Json => {
			serde_json::from_str(content).map_err(|source| ResolveError::JsonParseError {
				path: path.to_path_buf(),
				source,
			})?
		}
	};

	// Validate the parsed document
	document.validate()?;

	Ok(document)
}
