//! Config subcommand handlers.

use dialoguer::{Input, Select};

use cubygas_core::SetupInput;
use cubygas_core::setup::{parse_device_ids, setup_entry};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of the config with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "interval = {}", cfg.defaults.interval);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "email = \"{}\"", p.email);
        let _ = writeln!(out, "device_ids = {:?}", p.device_ids);
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"{MASK}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref url) = p.base_url {
            let _ = writeln!(out, "base_url = \"{url}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.interval {
            let _ = writeln!(out, "interval = {interval}");
        }
        if let Some(expiration) = p.token_expiration {
            let _ = writeln!(out, "token_expiration = {expiration}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "email" => profile.email = value.trim().to_owned(),
        "device_ids" | "device-ids" | "devices" => {
            let ids = parse_device_ids(&value);
            if ids.is_empty() {
                return Err(CliError::Validation {
                    field: "device_ids".into(),
                    reason: "expected a comma-separated list of device ids".into(),
                });
            }
            profile.device_ids = ids;
        }
        "password" => profile.password = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "base_url" | "base-url" => {
            cubygas_config::parse_base_url(&value)?;
            profile.base_url = Some(value);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "timeout" => profile.timeout = Some(parse_secs("timeout", &value)?),
        "interval" => profile.interval = Some(parse_secs("interval", &value)?),
        "token_expiration" | "token-expiration" => {
            profile.token_expiration = Some(parse_secs("token_expiration", &value)?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: email, device_ids, password, \
                     password_env, base_url, ca_cert, timeout, interval, token_expiration"
                ),
            });
        }
    }
    Ok(())
}

// ── Init wizard ─────────────────────────────────────────────────────

async fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let config_path = config::config_path();
    // An unparsable file must not be overwritten.
    let mut cfg = config::load_config()?;
    eprintln!("cubygas configuration wizard");
    eprintln!(
        "{}\n",
        output::note_line(&format!("   Config path: {}", config_path.display()), color)
    );

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let email: String = Input::new()
        .with_prompt("Account email")
        .interact_text()
        .map_err(prompt_err)?;

    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;

    let device_ids: String = Input::new()
        .with_prompt("Device ids (comma-separated)")
        .interact_text()
        .map_err(prompt_err)?;

    let input = SetupInput {
        email,
        password,
        device_ids,
    };
    let connection = config::resolve_connection(global)?;
    let entry = setup_entry(&input, &connection).await?;
    eprintln!("{}", output::success_line(&format!("{} validated", entry.title), color));

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let trimmed_password = input.password.trim().to_owned();
    let password = if selection == 0 {
        cubygas_config::store_password(&profile_name, &trimmed_password)?;
        eprintln!("{}", output::success_line("Password stored in system keyring", color));
        None
    } else {
        Some(trimmed_password)
    };

    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            email: entry.credentials.email,
            password,
            device_ids: entry.device_ids,
            base_url: global.base_url.clone(),
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!(
        "\n{}",
        output::success_line(
            &format!("Configuration written to {}", config_path.display()),
            color
        )
    );
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Try it: cubygas poll");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    match args.command {
        ConfigCommand::Init => init(global).await,

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |c| {
                c.profile_names().join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!(
                "{}",
                output::success_line(&format!("Set {key} on profile '{profile_name}'"), color)
            );
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: cubygas config init");
            } else {
                let lines: Vec<String> = cfg
                    .profile_names()
                    .into_iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            cfg.profile(&name)?;

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!(
                "{}",
                output::success_line(&format!("Default profile set to '{name}'"), color)
            );
            Ok(())
        }

        ConfigCommand::SetPassword { name } => {
            let cfg = config::load_config()?;
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            cfg.profile(&profile_name)?;

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            cubygas_config::store_password(&profile_name, secret.trim())?;

            eprintln!(
                "{}",
                output::success_line(
                    &format!("Password stored in system keyring for profile '{profile_name}'"),
                    color
                )
            );
            Ok(())
        }
    }
}
