pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Classifier rejected the credentials: {message}")]
	Authentication { message: String },
	#[error("Classifier model {model} is not available.")]
	ModelNotFound { model: String },
	#[error("Classifier returned HTTP {status}: {message}")]
	Status { status: u16, message: String },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// Only rejected credentials abort a tagging request; everything else moves on to the next
	/// candidate model.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Authentication { .. })
	}
}
