//! Shared error type across metalprice crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Not allowed by the base currency allowlist.
    NotAllowed,
    /// No such route.
    NotFound,
    /// Route exists but not for this method.
    MethodNotAllowed,
    /// Upstream unreachable or timed out.
    UpstreamUnavailable,
    /// Upstream answered with something that is not the expected JSON body.
    UpstreamContract,
    /// Upstream answered `success: false`.
    UpstreamRejected,
    /// Invalid startup configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ClientCode::UpstreamContract => "UPSTREAM_CONTRACT",
            ClientCode::UpstreamRejected => "UPSTREAM_REJECTED",
            ClientCode::Config => "CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PriceProxyError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Clone, Error)]
pub enum PriceProxyError {
    #[error("config: {0}")]
    Config(String),
    #[error("upstream unreachable: {0}")]
    Network(String),
    #[error("upstream contract violated: {reason}")]
    UpstreamContract {
        reason: String,
        /// Truncated response body, when one was received.
        body: Option<String>,
    },
    #[error("{0}")]
    UpstreamRejected(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PriceProxyError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            PriceProxyError::Config(_) => ClientCode::Config,
            PriceProxyError::Network(_) => ClientCode::UpstreamUnavailable,
            PriceProxyError::UpstreamContract { .. } => ClientCode::UpstreamContract,
            PriceProxyError::UpstreamRejected(_) => ClientCode::UpstreamRejected,
            PriceProxyError::BadRequest(_) => ClientCode::BadRequest,
            PriceProxyError::NotAllowed(_) => ClientCode::NotAllowed,
            PriceProxyError::NotFound(_) => ClientCode::NotFound,
            PriceProxyError::MethodNotAllowed(_) => ClientCode::MethodNotAllowed,
            PriceProxyError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Whether a previously cached result may be served in place of this failure.
    ///
    /// Only transport-level failures qualify; an upstream that answered (badly)
    /// is reported as-is.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PriceProxyError::Network(_))
    }
}
