//! HTTP API serving the order form.
//!
//! The API exposes the rendered form, field edits and submission. Every
//! response body is JSON; failures carry an `error` code and a `message`
//! suitable for showing to the operator.

use axum::{
	extract::{Path, State},
	http::{HeaderValue, StatusCode},
	middleware,
	response::{IntoResponse, Json, Response},
	routing::{get, post, put},
	Router,
};
use registry_config::ApiConfig;
use registry_core::{FormError, OrderForm};
use registry_types::{FormView, LotField, SubmissionResult};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub form: Arc<OrderForm>,
}

/// Body of a field update.
#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
	pub value: String,
}

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	code: &'static str,
	message: String,
}

impl ApiError {
	fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
		Self {
			status: StatusCode::BAD_REQUEST,
			code,
			message: message.into(),
		}
	}
}

impl From<FormError> for ApiError {
	fn from(err: FormError) -> Self {
		let (status, code) = match &err {
			FormError::NotReady(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
			FormError::SubmissionInFlight => (StatusCode::CONFLICT, "submission_in_flight"),
			FormError::Wallet(_) | FormError::Ledger(_) | FormError::ChainMismatch { .. } => {
				(StatusCode::BAD_GATEWAY, "ledger_error")
			},
			FormError::SubmissionTask(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
		};
		Self {
			status,
			code,
			message: err.to_string(),
		}
	}
}

/// Gives the timeout layer's bare 408 the same JSON shape as other errors.
///
/// A submission that outlives the request keeps running; its result shows
/// up in the next `GET /api/form`.
async fn describe_timeout(response: Response) -> Response {
	if response.status() != StatusCode::REQUEST_TIMEOUT {
		return response;
	}
	ApiError {
		status: StatusCode::REQUEST_TIMEOUT,
		code: "timeout",
		message: "Request timed out; reload the form to see the outcome".to_string(),
	}
	.into_response()
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(
			self.status,
			Json(serde_json::json!({
				"error": self.code,
				"message": self.message,
			})),
		)
			.into_response()
	}
}

/// Builds the router for the given form.
///
/// Routes are nested under `/api`. Tracing, the request timeout and CORS
/// apply to every route; CORS is permissive when no origin is configured.
pub fn router(form: Arc<OrderForm>, api_config: &ApiConfig) -> Router {
	let cors = if api_config.allowed_origins.is_empty() {
		CorsLayer::permissive()
	} else {
		let origins = api_config
			.allowed_origins
			.iter()
			.filter_map(|origin| match origin.parse::<HeaderValue>() {
				Ok(value) => Some(value),
				Err(_) => {
					tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
					None
				},
			})
			.collect::<Vec<_>>();
		CorsLayer::new()
			.allow_origin(AllowOrigin::list(origins))
			.allow_methods(Any)
			.allow_headers(Any)
	};

	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/form", get(handle_get_form))
				.route("/form/fields/{field}", put(handle_update_field))
				.route("/form/submit", post(handle_submit)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(middleware::map_response(describe_timeout))
				.layer(TimeoutLayer::new(Duration::from_secs(
					api_config.timeout_seconds,
				)))
				.layer(cors),
		)
		.with_state(AppState { form })
}

/// Serves the API until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	form: Arc<OrderForm>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(form, &api_config);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("Grain registry API listening on {}", bind_address);

	axum::serve(listener, app).await?;
	Ok(())
}

/// Handles GET /api/form.
async fn handle_get_form(State(state): State<AppState>) -> Json<FormView> {
	Json(state.form.view().await)
}

/// Handles PUT /api/form/fields/{field}.
async fn handle_update_field(
	State(state): State<AppState>,
	Path(field): Path<String>,
	Json(update): Json<FieldUpdate>,
) -> Result<Json<FormView>, ApiError> {
	let field: LotField = field
		.parse()
		.map_err(|e: registry_types::UnknownFieldError| {
			ApiError::bad_request("unknown_field", e.to_string())
		})?;

	state.form.on_field_change(field, update.value).await;
	Ok(Json(state.form.view().await))
}

/// Handles POST /api/form/submit.
async fn handle_submit(
	State(state): State<AppState>,
) -> Result<Json<SubmissionResult>, ApiError> {
	match state.form.submit().await {
		Ok(result) => Ok(Json(result)),
		Err(e) => {
			tracing::warn!("Submission failed: {}", e);
			Err(ApiError::from(e))
		},
	}
}
