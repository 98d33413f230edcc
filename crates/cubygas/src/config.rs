//! CLI configuration: thin wrapper around `cubygas_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--email, --device, --base-url, --timeout).

use cubygas_core::{ConnectionSettings, CoordinatorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use cubygas_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Active profile with CLI flag overrides applied.
///
/// Without a stored profile, `--email` alone is enough to start from an
/// empty one (password then comes from the environment or keyring).
fn effective_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profile(&profile_name) {
        Ok(profile) => profile.clone(),
        // An explicitly requested profile must exist.
        Err(e) if global.profile.is_some() => return Err(e.into()),
        Err(_) if global.email.is_some() => Profile::default(),
        Err(_) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref email) = global.email {
        profile.email.clone_from(email);
    }
    if !global.devices.is_empty() {
        profile.device_ids.clone_from(&global.devices);
    }
    if let Some(ref base_url) = global.base_url {
        profile.base_url = Some(base_url.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok((profile_name, profile))
}

/// Build the coordinator config for this invocation.
///
/// `interval` overrides the profile's poll interval (used by `watch`).
pub fn resolve_coordinator_config(
    global: &GlobalOpts,
    interval: Option<u64>,
) -> Result<CoordinatorConfig, CliError> {
    let cfg = load_config()?;
    let (profile_name, mut profile) = effective_profile(global, &cfg)?;
    if interval.is_some() {
        profile.interval = interval;
    }
    Ok(cubygas_config::profile_to_coordinator_config(
        &profile,
        &profile_name,
        &cfg.defaults,
    )?)
}

/// Connection settings for one-off requests (validation during `config init`).
pub fn resolve_connection(global: &GlobalOpts) -> Result<ConnectionSettings, CliError> {
    let mut connection = match global.base_url.as_deref() {
        Some(raw) => ConnectionSettings::with_base_url(cubygas_config::parse_base_url(raw)?),
        None => ConnectionSettings::default(),
    };
    if let Some(timeout) = global.timeout {
        connection.request_timeout = std::time::Duration::from_secs(timeout);
    }
    Ok(connection)
}
