pub mod tag_chunk;
pub mod tag_document;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use tag_chunk::ChunkTagger;
pub use tag_document::{TaggingRequest, TaggingResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use doctag_config::{ClassifierProviderConfig, Config};
use doctag_domain::{Taxonomy, extractive::ExtractiveTagger, prompt};
use doctag_providers::classifier;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ClassifierProvider
where
	Self: Send + Sync,
{
	fn classify<'a>(
		&'a self,
		cfg: &'a ClassifierProviderConfig,
		model: &'a str,
		messages: &'a [Value],
	) -> BoxFuture<'a, doctag_providers::Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub classifier: Arc<dyn ClassifierProvider>,
}
impl Providers {
	pub fn new(classifier: Arc<dyn ClassifierProvider>) -> Self {
		Self { classifier }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { classifier: Arc::new(DefaultProviders) }
	}
}

/// Read-only tagging state built once at startup and shared across requests.
pub struct TaggingService {
	pub cfg: Config,
	pub taxonomy: Arc<Taxonomy>,
	pub extractive: Arc<ExtractiveTagger>,
	pub tagger: ChunkTagger,
}
impl TaggingService {
	/// Loads every taxonomy file named by `cfg`. Any unreadable or malformed file is fatal.
	pub fn new(cfg: Config) -> Result<Self> {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Result<Self> {
		let taxonomy = Taxonomy::load(&cfg.taxonomy.abstractive)?;
		let extractive = ExtractiveTagger::load(&cfg.taxonomy.products, &cfg.taxonomy.indications)?;

		tracing::info!(
			categories = taxonomy.categories().len(),
			models = cfg.providers.classifier.models.len(),
			"Tagging service initialized."
		);

		Ok(Self::from_parts(cfg, taxonomy, extractive, providers))
	}

	pub fn from_parts(
		cfg: Config,
		taxonomy: Taxonomy,
		extractive: ExtractiveTagger,
		providers: Providers,
	) -> Self {
		let taxonomy = Arc::new(taxonomy);
		let description: Arc<str> = prompt::describe_taxonomy(&taxonomy).into();
		let tagger = ChunkTagger::new(
			Arc::new(cfg.providers.classifier.clone()),
			taxonomy.clone(),
			description,
			providers.classifier,
		);

		Self { cfg, taxonomy, extractive: Arc::new(extractive), tagger }
	}
}

struct DefaultProviders;

impl ClassifierProvider for DefaultProviders {
	fn classify<'a>(
		&'a self,
		cfg: &'a ClassifierProviderConfig,
		model: &'a str,
		messages: &'a [Value],
	) -> BoxFuture<'a, doctag_providers::Result<Value>> {
		Box::pin(classifier::classify(cfg, model, messages))
	}
}
