//! Request logging and API key authentication

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{warn, Level};

use crate::{error::ApiError, state::AppState};

/// Header carrying the shared secret on mutating requests
pub const API_KEY_HEADER: &str = "x-api-key";

/// Credential check applied to mutating routes
pub trait CredentialCheck: Send + Sync {
    /// `presented` is the raw header value, `None` when the header is absent
    fn validate(&self, presented: Option<&[u8]>) -> bool;
}

/// A single static shared secret compared byte for byte
#[derive(Debug, Clone)]
pub struct StaticApiKey {
    secret: String,
}

impl StaticApiKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl CredentialCheck for StaticApiKey {
    fn validate(&self, presented: Option<&[u8]>) -> bool {
        presented == Some(self.secret.as_bytes())
    }
}

/// Reject the request with 401 unless it carries a valid API key
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .map(HeaderValue::as_bytes);

    if !state.credentials().validate(presented) {
        warn!(
            method = %request.method(),
            uri = %request.uri(),
            "Unauthorized access attempt - invalid API key"
        );
        return Err(ApiError::Unauthorized(
            "Unauthorized - Invalid API Key".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Request logging layer
///
/// Opens an INFO span per request with method, URI and version, and logs
/// status and latency when the response is produced.
pub fn request_logging() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_key_matches_exact_bytes() {
        let check = StaticApiKey::new("my-secret-key");

        assert!(check.validate(Some(b"my-secret-key")));
        assert!(!check.validate(Some(b"my-secret-key ")));
        assert!(!check.validate(Some(b"MY-SECRET-KEY")));
        assert!(!check.validate(Some(b"")));
        assert!(!check.validate(None));
    }
}
