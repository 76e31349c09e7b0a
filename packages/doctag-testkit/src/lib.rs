mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use uuid::Uuid;

use doctag_config::{ClassifierProviderConfig, Config, Providers, Service, Tagging, TaxonomyPaths};

pub const MODELS: [&str; 2] = ["primary-model", "fallback-model"];

/// Taxonomy files written into a unique directory under the system temp dir.
///
/// The directory is removed on drop.
pub struct TaxonomyFixture {
	dir: PathBuf,
	paths: TaxonomyPaths,
}
impl TaxonomyFixture {
	pub fn new() -> Result<Self> {
		Self::with_files(&abstractive_taxonomy(), &product_dictionary(), &indication_dictionary())
	}

	pub fn with_files(abstractive: &Value, products: &Value, indications: &Value) -> Result<Self> {
		let dir = env::temp_dir().join(format!("doctag_test_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&dir)?;

		let paths = TaxonomyPaths {
			abstractive: write_json(&dir, "abs_tags.json", abstractive)?,
			products: write_json(&dir, "product_tags.json", products)?,
			indications: write_json(&dir, "indication_tags.json", indications)?,
		};

		Ok(Self { dir, paths })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// A valid config pointing at the fixture files, with no pause between batches.
	pub fn config(&self) -> Config {
		test_config(self.paths.clone())
	}
}

impl Drop for TaxonomyFixture {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.dir);
	}
}

pub fn test_config(taxonomy: TaxonomyPaths) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		taxonomy,
		providers: Providers {
			classifier: ClassifierProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				models: MODELS.iter().map(|model| model.to_string()).collect(),
				temperature: 0.1,
				max_tokens: 800,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		tagging: Tagging { batch_pause_ms: 0, ..Tagging::default() },
	}
}

pub fn abstractive_taxonomy() -> Value {
	serde_json::json!({
		"Content Taxonomy": {
			"Audience": {
				"definition": "Intended readers of the content.",
				"HCP": {
					"definition": "Healthcare professionals.",
					"synonyms": ["Physician", "Clinician", "Prescriber"]
				},
				"Patient": {
					"definition": "People receiving care.",
					"synonyms": ["Consumer"]
				}
			},
			"Content Purpose": {
				"definition": "Why the content exists.",
				"Education": { "definition": "Teaches a topic.", "synonyms": ["Training"] },
				"Promotion": { "definition": "Markets a product.", "synonyms": ["Advertising"] }
			},
			"Content Complexity": {
				"definition": "How demanding the content is.",
				"Basic": { "definition": "Plain language." },
				"Advanced": { "definition": "Specialist depth.", "synonyms": ["Expert"] }
			},
			"Non Clinical Topics": {
				"definition": "Business and operational matter.",
				"Market Access": {
					"definition": "Pricing and coverage.",
					"synonyms": ["Reimbursement"]
				},
				"Regulatory": { "definition": "Approvals and compliance." }
			},
			"Clinical Topic": {
				"definition": "Medical subject matter.",
				"Oncology": { "definition": "Cancer care." },
				"Treatment": {
					"definition": "Therapeutic interventions.",
					"synonyms": ["Therapy"],
					"Dosing": { "definition": "Dose selection.", "synonyms": ["Posology"] },
					"Adverse Events": {
						"definition": "Side effects.",
						"synonyms": ["Side Effects"]
					}
				},
				"Diagnosis": { "definition": "Identifying disease." }
			}
		}
	})
}

pub fn product_dictionary() -> Value {
	serde_json::json!({
		"Tylenol": ["acetaminophen", "paracetamol"],
		"Advil": ["ibuprofen"],
		"Zyrtec": ["cetirizine"]
	})
}

pub fn indication_dictionary() -> Value {
	serde_json::json!({
		"Oncology": { "Breast Cancer": { "Synonyms": ["mammary carcinoma"] } },
		"Cardiology": { "Heart Failure": { "Synonyms": ["cardiac insufficiency"] } },
		"Neurology": { "Migraine": { "Synonyms": ["cephalalgia"] } }
	})
}

fn write_json(dir: &Path, name: &str, value: &Value) -> Result<PathBuf> {
	let path = dir.join(name);

	fs::write(&path, serde_json::to_vec_pretty(value)?)?;

	Ok(path)
}
