//! Document-level orchestration: chunking, batched abstractive tagging, extractive scoring and
//! aggregation.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::task::JoinSet;
use uuid::Uuid;

use doctag_chunking::{ChunkingConfig, split_text};
use doctag_domain::{ChunkTagResult, TaggingResult, aggregate};

use crate::{Error, Result, TaggingService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaggingRequest {
	pub document_id: Option<String>,
	pub text: String,
	pub chunk_size: Option<u32>,
	pub min_extractive_threshold: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaggingResponse {
	pub document_id: String,
	pub tags: TaggingResult,
	/// Wall-clock seconds spent tagging.
	pub processing_time: f64,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
	pub min_extractive_threshold_used: f64,
}

impl TaggingService {
	pub async fn tag_document(&self, req: TaggingRequest) -> Result<TaggingResponse> {
		let chunk_size = req.chunk_size.unwrap_or(self.cfg.tagging.chunk_size);
		let threshold =
			req.min_extractive_threshold.unwrap_or(self.cfg.tagging.min_extractive_threshold);

		doctag_config::validate_chunk_size(chunk_size)
			.map_err(|err| Error::invalid_field("chunk_size", err))?;
		doctag_config::validate_extractive_threshold(threshold)
			.map_err(|err| Error::invalid_field("min_extractive_threshold", err))?;

		let document_id = match req.document_id {
			Some(id) if !id.trim().is_empty() => id.trim().to_string(),
			_ => Uuid::new_v4().to_string(),
		};
		let started = Instant::now();
		let tags = self.tag_text(&req.text, chunk_size as usize, threshold).await?;
		let processing_time = started.elapsed().as_secs_f64();

		tracing::info!(
			document_id = %document_id,
			processing_time,
			"Document tagged."
		);

		Ok(TaggingResponse {
			document_id,
			tags,
			processing_time,
			timestamp: OffsetDateTime::now_utc(),
			min_extractive_threshold_used: threshold,
		})
	}

	/// Runs both tagging branches over `text`.
	///
	/// Blank text yields the empty result without touching either scorer or the classifier.
	pub async fn tag_text(
		&self,
		text: &str,
		chunk_size: usize,
		min_extractive_threshold: f64,
	) -> Result<TaggingResult> {
		if text.trim().is_empty() {
			return Ok(TaggingResult::empty());
		}

		let chunks = self.tag_chunks(text, chunk_size).await?;
		let min_confidence = self.cfg.tagging.min_confidence;

		Ok(TaggingResult {
			extractive: self.extractive.tag(text, min_extractive_threshold),
			abstractive: aggregate::combine(&chunks, &self.taxonomy, min_confidence),
			content_distribution: aggregate::content_distribution(&chunks, min_confidence),
		})
	}

	/// Classifies chunks in batches of `tagging.batch_size`, pausing between batches.
	///
	/// The returned results follow chunk order regardless of completion order.
	pub async fn tag_chunks(&self, text: &str, chunk_size: usize) -> Result<Vec<ChunkTagResult>> {
		let chunks = split_text(text, &ChunkingConfig { max_chars: chunk_size });
		let batch_size = (self.cfg.tagging.batch_size as usize).max(1);
		let pause = Duration::from_millis(self.cfg.tagging.batch_pause_ms);
		let batches = chunks.len().div_ceil(batch_size);
		let mut slots: Vec<Option<ChunkTagResult>> = vec![None; chunks.len()];

		tracing::info!(chunks = chunks.len(), batches, batch_size, "Tagging document chunks.");

		for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
			let mut tasks = JoinSet::new();

			for chunk in batch {
				let tagger = self.tagger.clone();
				let chunk_index = chunk.chunk_index;
				let text = chunk.text.clone();

				tasks.spawn(async move { (chunk_index, tagger.tag(chunk_index, &text).await) });
			}

			while let Some(joined) = tasks.join_next().await {
				match joined {
					Ok((chunk_index, Ok(result))) => slots[chunk_index] = Some(result),
					// Returning drops the set, which aborts the rest of the batch.
					Ok((_, Err(err @ Error::Authentication { .. }))) => return Err(err),
					Ok((chunk_index, Err(err))) => {
						tracing::warn!(chunk_index, error = %err, "Chunk tagging failed.");
					},
					Err(err) => {
						tracing::error!(error = %err, "Chunk tagging task did not complete.");
					},
				}
			}

			if batch_index + 1 < batches && !pause.is_zero() {
				tokio::time::sleep(pause).await;
			}
		}

		Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
	}
}
