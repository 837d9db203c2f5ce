//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netrefit_config::ConfigError;
use netrefit_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const FATAL_WORKFLOW: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Fatal workflow failure ───────────────────────────────────────
    #[error("Template {stage} failed for network {network_id}: {message}")]
    #[diagnostic(
        code(netrefit::connectivity_fatal),
        help(
            "The run was aborted; no further phases executed.\n\
             Check the network's binding state on the dashboard before retrying."
        )
    )]
    ConnectivityFatal {
        stage: &'static str,
        network_id: String,
        message: String,
    },

    // ── Connection / auth ────────────────────────────────────────────
    #[error("Could not reach the dashboard")]
    #[diagnostic(
        code(netrefit::connection_failed),
        help("Check network connectivity and the configured base URL.\nReason: {reason}")
    )]
    ConnectionFailed { reason: String },

    #[error("Authentication failed")]
    #[diagnostic(
        code(netrefit::auth_failed),
        help("Verify the API key for profile '{profile}'.")
    )]
    AuthFailed { profile: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(netrefit::no_credentials),
        help(
            "Add api_key or api_key_env to the profile,\n\
             or set the NETREFIT_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{entity} '{identifier}' not found")]
    #[diagnostic(code(netrefit::not_found))]
    NotFound { entity: String, identifier: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Dashboard API error: {message}")]
    #[diagnostic(code(netrefit::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netrefit::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(netrefit::config),
        help("Config file location: run with -vv to see the resolved path.")
    )]
    Config { message: String },

    // ── IO / serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(netrefit::json), help("Check the plan file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to a process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectivityFatal { .. } => exit_code::FATAL_WORKFLOW,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError ────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectivityFatal {
                stage,
                network_id,
                message,
            } => CliError::ConnectivityFatal {
                stage,
                network_id,
                message,
            },

            CoreError::AuthenticationFailed { .. } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::NotFound { entity, identifier } => {
                CliError::NotFound { entity, identifier }
            }

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError ──────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { profile } => CliError::NotFound {
                entity: "profile".into(),
                identifier: profile,
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
