use std::sync::Arc;

use doctag_service::TaggingService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TaggingService>,
}
impl AppState {
	/// Loads the taxonomy files up front; the server never starts with a partial vocabulary.
	pub fn new(config: doctag_config::Config) -> color_eyre::Result<Self> {
		let service = TaggingService::new(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: TaggingService) -> Self {
		Self { service: Arc::new(service) }
	}
}
