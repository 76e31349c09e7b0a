use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use doctag_service::{Error, TaggingRequest, TaggingResponse};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/v1/generate_tags", post(generate_tags))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn generate_tags(
	State(state): State<AppState>,
	Json(payload): Json<TaggingRequest>,
) -> Result<Json<TaggingResponse>, ApiError> {
	let response = state.service.tag_document(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message, field } => ApiError::new(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				Some(vec![field]),
			),
			Error::Authentication { message } => ApiError::new(
				StatusCode::BAD_GATEWAY,
				"classifier_auth_failed",
				format!("Classifier authentication failed: {message}"),
				None,
			),
			err => {
				tracing::error!(error = %err, "Tagging request failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal",
					"Internal error.",
					None,
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
