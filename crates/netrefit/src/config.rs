//! Profile resolution: config file + CLI flag overrides into a ready
//! dashboard client, rule set, and staging inventory.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use netrefit_api::DashboardClient;
use netrefit_api::transport::TransportConfig;
use netrefit_config::{DEFAULT_BASE_URL, Profile, active_profile_name, load_config_or_default};
use netrefit_core::{ModelRules, StagingBucket};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a command needs, resolved once up front.
pub struct ResolvedProfile {
    pub client: DashboardClient,
    pub org_id: Option<String>,
    pub rules: ModelRules,
    pub staging: Vec<StagingBucket>,
    pub profile_name: String,
}

pub fn resolve(global: &GlobalOpts) -> Result<ResolvedProfile, CliError> {
    let config = load_config_or_default();
    let profile_name = active_profile_name(global.profile.as_deref(), &config);

    // A missing profile section is fine as long as flags/env carry the
    // essentials; an explicitly requested unknown profile is not.
    let fallback = Profile::default();
    let profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            return Err(CliError::NotFound {
                entity: "profile".into(),
                identifier: profile_name,
            });
        }
        None => &fallback,
    };

    let api_key: SecretString = match &global.api_key {
        Some(key) => SecretString::from(key.clone()),
        None => profile.resolve_api_key(&profile_name)?,
    };

    let base_url = global
        .base_url
        .clone()
        .or_else(|| profile.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
    // Trailing slash matters for URL joining.
    let base_url = if base_url.ends_with('/') {
        base_url
    } else {
        format!("{base_url}/")
    };
    let base_url: Url = base_url.parse().map_err(|_| CliError::Validation {
        field: "base-url".into(),
        reason: format!("invalid URL: {base_url}"),
    })?;

    let timeout = global.timeout.or(profile.timeout).unwrap_or(30);
    let transport = TransportConfig {
        timeout: Duration::from_secs(timeout),
        ..TransportConfig::default()
    };

    let client = DashboardClient::new(base_url, &api_key, &transport).map_err(|e| {
        CliError::Config {
            message: format!("failed to build dashboard client: {e}"),
        }
    })?;

    Ok(ResolvedProfile {
        client,
        org_id: global.org_id.clone().or_else(|| profile.org_id.clone()),
        rules: profile.model_rules(),
        staging: profile.staging_buckets(),
        profile_name,
    })
}
