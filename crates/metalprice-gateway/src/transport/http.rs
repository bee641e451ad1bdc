//! HTTP handlers.
//!
//! Every failure leaves as a JSON body `{"error": ..., "code": ...}`; stale
//! prices leave as 200 with `warning` and `error` next to the usual fields.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use metalprice_core::error::{ClientCode, PriceProxyError};
use metalprice_core::PriceSnapshot;

use crate::app_state::AppState;
use crate::services::Served;

pub const BANNER: &str = "Metal Price API is live! Visit /prices to get metal rates.";
pub const STALE_WARNING: &str = "upstream unavailable; serving cached data";

/// `PriceProxyError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub PriceProxyError);

impl From<PriceProxyError> for ApiError {
    fn from(e: PriceProxyError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest => StatusCode::BAD_REQUEST,
            ClientCode::NotAllowed => StatusCode::FORBIDDEN,
            ClientCode::NotFound => StatusCode::NOT_FOUND,
            ClientCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ClientCode::UpstreamUnavailable
            | ClientCode::UpstreamContract
            | ClientCode::UpstreamRejected
            | ClientCode::Config
            | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut body = json!({
            "error": self.0.to_string(),
            "code": code.as_str(),
        });
        if let PriceProxyError::UpstreamContract { body: Some(snippet), .. } = &self.0 {
            body["body"] = json!(snippet);
        }
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct PricesBody<'a> {
    success: bool,
    #[serde(flatten)]
    snapshot: &'a PriceSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn prices_response(served: &Served) -> Response {
    let (warning, error) = match served {
        Served::Stale { error, .. } => (Some(STALE_WARNING), Some(error.to_string())),
        Served::Cached(_) | Served::Fetched(_) => (None, None),
    };
    let body = PricesBody {
        success: true,
        snapshot: served.snapshot(),
        warning,
        error,
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn serve_base(app: &AppState, raw_base: &str) -> Result<Response, ApiError> {
    let base = app.allowlist().resolve(raw_base)?;
    let served = app.prices().prices(&base).await?;
    Ok(prices_response(&served))
}

pub async fn index() -> &'static str {
    BANNER
}

pub async fn prices_default(State(app): State<AppState>) -> Result<Response, ApiError> {
    let base = app.cfg().prices.default_base.clone();
    serve_base(&app, &base).await
}

pub async fn prices_for_base(
    State(app): State<AppState>,
    base: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(base) = base.map_err(|e| PriceProxyError::BadRequest(e.body_text()))?;
    serve_base(&app, &base).await
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError(PriceProxyError::NotFound(uri.path().to_string()))
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError(PriceProxyError::MethodNotAllowed(format!("{method} {}", uri.path())))
}

pub async fn metrics(State(app): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        app.metrics().render(),
    )
}
