use std::time::Instant;

use axum::{
	Json, Router,
	body::Bytes,
	extract::State,
	http::{HeaderMap, HeaderValue, Method, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use quill_service::{ClientMeta, SearchResponse, ServiceError};

use crate::state::AppState;

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.layer(cors_layer(cors_origins))
		.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	let cors = CorsLayer::new()
		.allow_methods([Method::POST, Method::OPTIONS])
		.allow_headers([header::CONTENT_TYPE]);

	if origins.is_empty() {
		// The public blog frontend is embeddable anywhere; no credentialed
		// requests cross this endpoint.
		cors.allow_origin(Any)
	} else {
		let origins: Vec<HeaderValue> =
			origins.iter().filter_map(|origin| origin.parse().ok()).collect();

		cors.allow_origin(origins)
	}
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<SearchResponse>, ApiError> {
	// `took` counts from receipt, so the clock starts before parsing.
	let received = Instant::now();
	let payload: Value = serde_json::from_slice(&body).map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "Invalid JSON body", vec![err.to_string()])
	})?;
	let params = quill_domain::parse_request(&payload)
		.map_err(|errors| json_error(StatusCode::BAD_REQUEST, "Validation failed", errors))?;
	let response = state.service.search_from(received, params, client_meta(&headers)).await?;

	Ok(Json(response))
}

fn client_meta(headers: &HeaderMap) -> ClientMeta {
	let ip_address = headers
		.get("x-forwarded-for")
		.or_else(|| headers.get("x-real-ip"))
		.and_then(|value| value.to_str().ok())
		.unwrap_or("unknown")
		.to_string();
	let user_agent = headers
		.get(header::USER_AGENT)
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default()
		.to_string();

	ClientMeta { ip_address, user_agent }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
	details: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error: String,
	details: Vec<String>,
}

fn json_error(status: StatusCode, error: impl Into<String>, details: Vec<String>) -> ApiError {
	ApiError { status, error: error.into(), details }
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Storage { message } => {
				tracing::error!(%message, "Search query failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"Internal server error",
					Vec::new(),
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error: self.error, details: self.details };

		(self.status, Json(body)).into_response()
	}
}
