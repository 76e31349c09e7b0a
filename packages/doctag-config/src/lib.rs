mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ClassifierProviderConfig, Config, DEFAULT_CHUNK_SIZE, DEFAULT_MIN_EXTRACTIVE_THRESHOLD,
	MAX_CHUNK_SIZE, MAX_EXTRACTIVE_THRESHOLD, MIN_CHUNK_SIZE, MIN_EXTRACTIVE_THRESHOLD, Providers,
	Service, Tagging, TaxonomyPaths,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	for (label, path) in [
		("taxonomy.abstractive", &cfg.taxonomy.abstractive),
		("taxonomy.products", &cfg.taxonomy.products),
		("taxonomy.indications", &cfg.taxonomy.indications),
	] {
		if path.as_os_str().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	let classifier = &cfg.providers.classifier;

	if classifier.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider classifier api_key must be non-empty.".to_string(),
		});
	}
	if classifier.models.is_empty() {
		return Err(Error::Validation {
			message: "providers.classifier.models must be non-empty.".to_string(),
		});
	}
	if classifier.models.iter().any(|model| model.trim().is_empty()) {
		return Err(Error::Validation {
			message: "providers.classifier.models entries must be non-empty.".to_string(),
		});
	}
	if !classifier.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.classifier.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&classifier.temperature) {
		return Err(Error::Validation {
			message: "providers.classifier.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if classifier.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.classifier.max_tokens must be greater than zero.".to_string(),
		});
	}
	if classifier.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.classifier.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_chunk_size(cfg.tagging.chunk_size)?;
	validate_extractive_threshold(cfg.tagging.min_extractive_threshold)?;

	if cfg.tagging.batch_size == 0 {
		return Err(Error::Validation {
			message: "tagging.batch_size must be greater than zero.".to_string(),
		});
	}
	if !cfg.tagging.min_confidence.is_finite()
		|| !(0.0..=1.0).contains(&cfg.tagging.min_confidence)
	{
		return Err(Error::Validation {
			message: "tagging.min_confidence must be in the range 0.0-1.0.".to_string(),
		});
	}

	Ok(())
}

/// Checks a chunk size against the accepted request range.
pub fn validate_chunk_size(chunk_size: u32) -> Result<()> {
	if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
		return Err(Error::Validation {
			message: format!(
				"chunk_size must be in the range {MIN_CHUNK_SIZE}-{MAX_CHUNK_SIZE}."
			),
		});
	}

	Ok(())
}

/// Checks a minimum extractive percentage against the accepted request range.
pub fn validate_extractive_threshold(threshold: f64) -> Result<()> {
	if !threshold.is_finite()
		|| !(MIN_EXTRACTIVE_THRESHOLD..=MAX_EXTRACTIVE_THRESHOLD).contains(&threshold)
	{
		return Err(Error::Validation {
			message: format!(
				"min_extractive_threshold must be in the range {MIN_EXTRACTIVE_THRESHOLD}-{MAX_EXTRACTIVE_THRESHOLD}."
			),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	cfg.providers.classifier.models =
		cfg.providers.classifier.models.iter().map(|model| model.trim().to_string()).collect();
}
