use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use doctag_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(edit: impl FnOnce(&mut toml::Table)) -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("doctag_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML.to_string());
	let result = doctag_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert_eq!(cfg.providers.classifier.models, vec!["gpt-4o", "gpt-4o-mini"]);
	assert_eq!(cfg.tagging.batch_size, 2);
	assert_eq!(cfg.tagging.chunk_size, 5_000);
}

#[test]
fn tagging_section_defaults_when_missing() {
	let payload = sample_toml_with(|root| {
		root.remove("tagging");
	});
	let path = write_temp_config(payload);
	let result = doctag_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected config without [tagging] to load.");

	assert_eq!(cfg.tagging.chunk_size, 5_000);
	assert_eq!(cfg.tagging.batch_size, 2);
	assert_eq!(cfg.tagging.batch_pause_ms, 2_000);
	assert_eq!(cfg.tagging.min_extractive_threshold, 1.0);
	assert_eq!(cfg.tagging.min_confidence, 0.3);
}

#[test]
fn missing_file_is_a_read_error() {
	let path = env::temp_dir().join("doctag_config_test_does_not_exist.toml");
	let err = doctag_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
	let path = write_temp_config("[service\nhttp_bind = ".to_string());
	let result = doctag_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn models_must_be_non_empty() {
	let payload = sample_toml_with(|root| {
		let classifier = root
			.get_mut("providers")
			.and_then(Value::as_table_mut)
			.and_then(|providers| providers.get_mut("classifier"))
			.and_then(Value::as_table_mut)
			.expect("Template config must include [providers.classifier].");

		classifier.insert("models".to_string(), Value::Array(Vec::new()));
	});
	let path = write_temp_config(payload);
	let result = doctag_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected models validation error.");

	assert!(
		err.to_string().contains("providers.classifier.models must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_model_entries_are_rejected() {
	let mut cfg = base_config();

	cfg.providers.classifier.models.push("  ".to_string());

	let err = doctag_config::validate(&cfg).expect_err("Expected blank model error.");

	assert!(
		err.to_string().contains("providers.classifier.models entries must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn api_key_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.providers.classifier.api_key = " ".to_string();

	let err = doctag_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider classifier api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn chunk_size_must_stay_in_range() {
	let mut cfg = base_config();

	cfg.tagging.chunk_size = 99;

	let err = doctag_config::validate(&cfg).expect_err("Expected chunk_size error.");

	assert!(err.to_string().contains("chunk_size must be in the range 100-10000."));

	cfg.tagging.chunk_size = 10_000;

	assert!(doctag_config::validate(&cfg).is_ok());

	cfg.tagging.chunk_size = 10_001;

	assert!(doctag_config::validate(&cfg).is_err());
}

#[test]
fn extractive_threshold_must_stay_in_range() {
	assert!(doctag_config::validate_extractive_threshold(0.1).is_ok());
	assert!(doctag_config::validate_extractive_threshold(50.0).is_ok());
	assert!(doctag_config::validate_extractive_threshold(0.05).is_err());
	assert!(doctag_config::validate_extractive_threshold(50.5).is_err());
	assert!(doctag_config::validate_extractive_threshold(f64::NAN).is_err());
}

#[test]
fn batch_size_must_be_positive() {
	let mut cfg = base_config();

	cfg.tagging.batch_size = 0;

	let err = doctag_config::validate(&cfg).expect_err("Expected batch_size error.");

	assert!(
		err.to_string().contains("tagging.batch_size must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn temperature_must_be_finite_and_bounded() {
	let mut cfg = base_config();

	cfg.providers.classifier.temperature = f32::INFINITY;

	assert!(doctag_config::validate(&cfg).is_err());

	cfg.providers.classifier.temperature = 2.5;

	let err = doctag_config::validate(&cfg).expect_err("Expected temperature range error.");

	assert!(err.to_string().contains("providers.classifier.temperature must be in the range"));
}

#[test]
fn min_confidence_must_be_a_probability() {
	let mut cfg = base_config();

	cfg.tagging.min_confidence = 1.5;

	let err = doctag_config::validate(&cfg).expect_err("Expected min_confidence error.");

	assert!(
		err.to_string().contains("tagging.min_confidence must be in the range 0.0-1.0."),
		"Unexpected error: {err}"
	);
}
