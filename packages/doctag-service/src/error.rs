pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { field: String, message: String },
	#[error("Classifier authentication failed: {message}")]
	Authentication { message: String },
	#[error(transparent)]
	Taxonomy(#[from] doctag_domain::Error),
}
impl Error {
	pub(crate) fn invalid_field(field: &str, err: doctag_config::Error) -> Self {
		Self::InvalidRequest { field: field.to_string(), message: err.to_string() }
	}
}
