//! Per-chunk abstractive tagging with an ordered model fallback.

use std::sync::Arc;

use serde_json::Value;

use doctag_config::ClassifierProviderConfig;
use doctag_domain::{
	ChunkTagResult, Taxonomy, prompt,
	validate::{self, RawChunkTags},
};

use crate::{ClassifierProvider, Error, Result};

/// Cheap to clone; every field is shared and read-only.
#[derive(Clone)]
pub struct ChunkTagger {
	cfg: Arc<ClassifierProviderConfig>,
	taxonomy: Arc<Taxonomy>,
	description: Arc<str>,
	classifier: Arc<dyn ClassifierProvider>,
}
impl ChunkTagger {
	pub fn new(
		cfg: Arc<ClassifierProviderConfig>,
		taxonomy: Arc<Taxonomy>,
		description: Arc<str>,
		classifier: Arc<dyn ClassifierProvider>,
	) -> Self {
		Self { cfg, taxonomy, description, classifier }
	}

	/// Tags one chunk, walking the configured models in order.
	///
	/// Returns the empty result when every model fails. The only error is
	/// [`Error::Authentication`], which must abort the whole document.
	pub async fn tag(&self, chunk_index: usize, chunk: &str) -> Result<ChunkTagResult> {
		let messages = prompt::build_messages(&self.description, chunk);
		let mut step = Step::TryModel(0);

		loop {
			step = match step {
				Step::TryModel(slot) => self.try_model(slot, &messages).await?,
				Step::Parse { slot, value } => match RawChunkTags::from_value(&value) {
					Some(raw) => Step::Validate { slot, raw },
					None => Step::NextModel {
						slot,
						reason: "response is not an abstractive tag object".to_string(),
					},
				},
				Step::Validate { slot, raw } => {
					let cleaned = validate::validate(&raw, &self.taxonomy);

					tracing::debug!(
						chunk_index,
						provider = %self.cfg.provider_id,
						model = %self.cfg.models[slot],
						empty = cleaned.is_empty(),
						"Chunk tagged."
					);

					return Ok(cleaned);
				},
				Step::NextModel { slot, reason } => {
					tracing::warn!(
						chunk_index,
						provider = %self.cfg.provider_id,
						model = %self.cfg.models[slot],
						reason = %reason,
						"Classifier model failed; trying the next candidate."
					);

					Step::TryModel(slot + 1)
				},
				Step::Exhausted => {
					tracing::warn!(
						chunk_index,
						provider = %self.cfg.provider_id,
						models = self.cfg.models.len(),
						"Every classifier model failed; chunk contributes no abstractive tags."
					);

					return Ok(ChunkTagResult::empty());
				},
			};
		}
	}

	async fn try_model(&self, slot: usize, messages: &[Value]) -> Result<Step> {
		let Some(model) = self.cfg.models.get(slot) else {
			return Ok(Step::Exhausted);
		};

		match self.classifier.classify(&self.cfg, model, messages).await {
			Ok(value) => Ok(Step::Parse { slot, value }),
			Err(err) if err.is_fatal() => {
				tracing::error!(
					provider = %self.cfg.provider_id,
					model = %model,
					error = %err,
					"Classifier rejected the credentials."
				);

				Err(Error::Authentication { message: err.to_string() })
			},
			Err(err) => Ok(Step::NextModel { slot, reason: err.to_string() }),
		}
	}
}

enum Step {
	TryModel(usize),
	Parse { slot: usize, value: Value },
	Validate { slot: usize, raw: RawChunkTags },
	NextModel { slot: usize, reason: String },
	Exhausted,
}
