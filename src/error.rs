use std::path::PathBuf;

/// Library-level structured errors for sidebar resolution.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	#[error("Document not found: {path}")]
	DocumentNotFound { path: PathBuf },

	#[error("Failed to read document: {path}")]
	DocumentReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Unsupported document format: {path} (expected .toml, .yaml, .yml or .json)")]
	UnsupportedFormat { path: PathBuf },

	#[error("Failed to parse TOML document: {path}")]
	TomlParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to parse YAML document: {path}")]
	YamlParseError {
		path: PathBuf,
		#[source]
		source: serde_yaml::Error,
	},

	#[error("Failed to parse JSON document: {path}")]
	JsonParseError {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Circular extend_from reference: {}", .chain.join(" -> "))]
	CircularReference { chain: Vec<String> },
}

/// Result type alias using ResolveError.
pub type Result<T> = std::result::Result<T, ResolveError>;
