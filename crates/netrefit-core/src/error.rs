// ── Core error types ──
//
// Domain-facing errors from netrefit-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<netrefit_api::Error>`
// impl translates transport-layer errors into domain variants.
//
// Most per-item failures inside a workflow never surface here at all --
// they are recorded as strings in the run's `WorkflowResult` and the run
// continues. The only error a running workflow returns is
// `ConnectivityFatal` (template unbind/bind failure).

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A template unbind or bind call failed. The run is aborted
    /// immediately; nothing further executes.
    #[error("Fatal {stage} failure on network {network_id}: {message}")]
    ConnectivityFatal {
        stage: &'static str,
        network_id: String,
        message: String,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach the dashboard: {reason}")]
    ConnectionFailed { reason: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// Dashboard rejected or failed an API call.
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netrefit_api::Error> for CoreError {
    fn from(err: netrefit_api::Error) -> Self {
        match err {
            netrefit_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            netrefit_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            netrefit_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netrefit_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            netrefit_api::Error::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            netrefit_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            netrefit_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
