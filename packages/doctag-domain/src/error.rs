use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read taxonomy file at {path:?}.")]
	ReadTaxonomy { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse taxonomy file at {path:?}.")]
	ParseTaxonomy { path: PathBuf, source: serde_json::Error },
	#[error("Invalid taxonomy at {path:?}: {message}")]
	InvalidTaxonomy { path: PathBuf, message: String },
	#[error(transparent)]
	Pattern(#[from] regex::Error),
}
