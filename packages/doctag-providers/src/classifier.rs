use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{Error, Result, auth_headers};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Sends one chat-completion request to `model` and returns the JSON object the model produced.
pub async fn classify(
	cfg: &doctag_config::ClassifierProviderConfig,
	model: &str,
	messages: &[Value],
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
		"response_format": { "type": "json_object" },
	});
	let res = client
		.post(&url)
		.headers(auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		let text = res.text().await.unwrap_or_default();

		return Err(failure_from_status(status, model, &text));
	}

	let json: Value = res.json().await?;

	parse_classifier_json(json)
}

fn failure_from_status(status: StatusCode, model: &str, body: &str) -> Error {
	let lower = body.to_lowercase();

	if status == StatusCode::UNAUTHORIZED
		|| status == StatusCode::FORBIDDEN
		|| lower.contains("invalid_api_key")
	{
		return Error::Authentication { message: truncate(body) };
	}
	if status == StatusCode::NOT_FOUND
		|| lower.contains("model_not_found")
		|| lower.contains("does not exist")
	{
		return Error::ModelNotFound { model: model.to_string() };
	}

	Error::Status { status: status.as_u16(), message: truncate(body) }
}

fn truncate(body: &str) -> String {
	body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

fn parse_classifier_json(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(content.trim()).map_err(|_| {
			Error::InvalidResponse { message: "Classifier content is not valid JSON.".to_string() }
		})?;

		return Ok(parsed);
	}

	if json.is_object() && json.get("choices").is_none() {
		return Ok(json);
	}

	Err(Error::InvalidResponse {
		message: "Classifier response is missing JSON content.".to_string(),
	})
}
