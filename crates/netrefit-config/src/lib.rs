//! Shared configuration for the netrefit CLI.
//!
//! TOML profiles, API-key resolution (plaintext or env-var indirection),
//! staging bucket inventory, and optional overrides of the model
//! classification rules.

use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netrefit_core::{ModelRules, StagingBucket};

/// Default dashboard API root.
pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1/";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    ProfileNotFound { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Named dashboard profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// A named dashboard profile: one organization, one credential, and the
/// staging networks that belong to it.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Dashboard API root; defaults to the public endpoint.
    pub base_url: Option<String>,

    /// Organization id.
    pub org_id: Option<String>,

    /// API key (plaintext -- prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Staging networks used for firmware pre-sync, in enumeration order.
    #[serde(default)]
    pub staging: Vec<StagingNetwork>,

    /// Model-rule overrides; unset fields keep the built-in defaults.
    pub rules: Option<RuleOverrides>,
}

/// One staging network entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StagingNetwork {
    pub name: String,
    pub network_id: String,
}

impl From<StagingNetwork> for StagingBucket {
    fn from(s: StagingNetwork) -> Self {
        Self {
            name: s.name,
            network_id: s.network_id,
        }
    }
}

/// Optional overrides for the built-in classification rules.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RuleOverrides {
    pub preserved_models: Option<Vec<String>>,
    pub retireable_models: Option<Vec<String>>,
    pub preserve_assignment_names: Option<Vec<String>>,
    pub dual_wan_models: Option<Vec<String>>,
    pub reserved_range_tag: Option<String>,
    pub staging_model: Option<String>,
}

impl RuleOverrides {
    /// Apply these overrides on top of the default rules.
    pub fn apply(&self, mut rules: ModelRules) -> ModelRules {
        if let Some(v) = &self.preserved_models {
            rules.preserved_prefixes = v.clone();
        }
        if let Some(v) = &self.retireable_models {
            rules.retireable_prefixes = v.clone();
        }
        if let Some(v) = &self.preserve_assignment_names {
            rules.preserve_assignment_names = v.clone();
        }
        if let Some(v) = &self.dual_wan_models {
            rules.dual_wan_prefixes = v.clone();
        }
        if let Some(v) = &self.reserved_range_tag {
            rules.reserved_range_tag = v.clone();
        }
        if let Some(v) = &self.staging_model {
            rules.staging_model_prefix = v.clone();
        }
        rules
    }
}

impl Profile {
    /// Resolve the API key: explicit value first, then the configured
    /// environment variable, then the conventional `NETREFIT_API_KEY`.
    pub fn resolve_api_key(&self, profile_name: &str) -> Result<SecretString, ConfigError> {
        if let Some(key) = &self.api_key {
            return Ok(SecretString::from(key.clone()));
        }
        if let Some(var) = &self.api_key_env {
            if let Ok(key) = std::env::var(var) {
                return Ok(SecretString::from(key));
            }
        }
        if let Ok(key) = std::env::var("NETREFIT_API_KEY") {
            return Ok(SecretString::from(key));
        }
        Err(ConfigError::NoCredentials {
            profile: profile_name.to_owned(),
        })
    }

    /// Effective model rules for this profile.
    pub fn model_rules(&self) -> ModelRules {
        self.rules
            .as_ref()
            .map_or_else(ModelRules::default, |o| o.apply(ModelRules::default()))
    }

    /// Staging buckets in enumeration order.
    pub fn staging_buckets(&self) -> Vec<StagingBucket> {
        self.staging.iter().cloned().map(Into::into).collect()
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "hardline", "netrefit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netrefit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the default path plus `NETREFIT_*` env overlays.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from an explicit path plus env overlays.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETREFIT_").split("__"))
        .extract()?;
    Ok(config)
}

/// Load the config, falling back to an empty default when no file exists
/// or parsing fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// The active profile name: explicit choice, then the file's default,
/// then `"default"`.
pub fn active_profile_name(explicit: Option<&str>, config: &Config) -> String {
    explicit
        .map(ToOwned::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_profiles_and_staging_buckets() {
        let (_dir, path) = write_config(
            r#"
default_profile = "us"

[profiles.us]
org_id = "123456"
api_key = "secret"
timeout = 45

[[profiles.us.staging]]
name = "Staging 01"
network_id = "N_1"

[[profiles.us.staging]]
name = "Staging 02"
network_id = "N_2"
"#,
        );

        let config = load_config_from(&path).unwrap();
        assert_eq!(active_profile_name(None, &config), "us");

        let profile = &config.profiles["us"];
        assert_eq!(profile.org_id.as_deref(), Some("123456"));
        assert_eq!(profile.timeout, Some(45));

        let buckets = profile.staging_buckets();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].name, "Staging 01");
        assert_eq!(buckets[1].network_id, "N_2");
    }

    #[test]
    fn rule_overrides_replace_only_set_fields() {
        let (_dir, path) = write_config(
            r#"
[profiles.default]
api_key = "secret"

[profiles.default.rules]
retireable_models = ["MX64", "MX65"]
"#,
        );

        let config = load_config_from(&path).unwrap();
        let rules = config.profiles["default"].model_rules();

        assert_eq!(rules.retireable_prefixes, vec!["MX64", "MX65"]);
        // Unset fields keep defaults.
        assert_eq!(rules.preserved_prefixes, vec!["MS120", "MS130"]);
        assert_eq!(rules.reserved_range_tag, "iboot");
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let profile = Profile::default();
        // Ensure the conventional env var doesn't leak into the test.
        if std::env::var("NETREFIT_API_KEY").is_ok() {
            return;
        }
        assert!(matches!(
            profile.resolve_api_key("default"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn explicit_profile_choice_wins() {
        let config = Config {
            default_profile: Some("us".into()),
            profiles: HashMap::new(),
        };
        assert_eq!(active_profile_name(Some("emea"), &config), "emea");
    }
}
