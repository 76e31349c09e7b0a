use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_CHUNK_SIZE: u32 = 5_000;
pub const MIN_CHUNK_SIZE: u32 = 100;
pub const MAX_CHUNK_SIZE: u32 = 10_000;
pub const DEFAULT_MIN_EXTRACTIVE_THRESHOLD: f64 = 1.0;
pub const MIN_EXTRACTIVE_THRESHOLD: f64 = 0.1;
pub const MAX_EXTRACTIVE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub taxonomy: TaxonomyPaths,
	pub providers: Providers,
	#[serde(default)]
	pub tagging: Tagging,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// Files holding the canonical vocabulary. Read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyPaths {
	pub abstractive: PathBuf,
	pub products: PathBuf,
	pub indications: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub classifier: ClassifierProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	/// Candidate models in priority order. The first one that yields a valid response wins.
	pub models: Vec<String>,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tagging {
	pub chunk_size: u32,
	/// Number of chunk classifications in flight at once.
	pub batch_size: u32,
	pub batch_pause_ms: u64,
	pub min_extractive_threshold: f64,
	/// Confidence floor for a chunk-level observation to count.
	pub min_confidence: f64,
}
impl Default for Tagging {
	fn default() -> Self {
		Self {
			chunk_size: DEFAULT_CHUNK_SIZE,
			batch_size: 2,
			batch_pause_ms: 2_000,
			min_extractive_threshold: DEFAULT_MIN_EXTRACTIVE_THRESHOLD,
			min_confidence: 0.3,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
