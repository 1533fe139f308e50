//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::{CliError, available_profiles};
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking passwords.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref cache) = p.token_cache {
            let _ = writeln!(out, "token_cache = \"{}\"", cache.display());
        }
        let _ = writeln!(out, "auth_retries = {}", p.auth_retries);

        let w = &p.workflow;
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}.workflow]");
        let _ = writeln!(out, "distribution_batch_size = {}", w.distribution_batch_size);
        let _ = writeln!(out, "template_batch_size = {}", w.template_batch_size);
        let _ = writeln!(out, "poll_interval_secs = {}", w.poll_interval_secs);
        let _ = writeln!(
            out,
            "activation_poll_interval_secs = {}",
            w.activation_poll_interval_secs
        );
        let _ = writeln!(out, "activation_pacing_ms = {}", w.activation_pacing_ms);
        let _ = writeln!(out, "max_polls = {}", w.max_polls);
        let _ = writeln!(out, "claim_config_id = \"{}\"", w.claim_config_id);
        let _ = writeln!(out, "reset_template_id = \"{}\"", w.reset_template_id);
        let _ = writeln!(out, "reset_wait_secs = {}", w.reset_wait_secs);
        let _ = writeln!(out, "swim_log_dir = \"{}\"", w.swim_log_dir.display());
        let _ = writeln!(out, "deploy_id_dir = \"{}\"", w.deploy_id_dir.display());
        let _ = writeln!(out, "job_id_file = \"{}\"", w.job_id_file.display());
    }

    out
}

fn redacted(cfg: &Config) -> serde_json::Value {
    let mut value = serde_json::to_value(cfg).unwrap_or_default();
    if let Some(profiles) = value.get_mut("profiles").and_then(|p| p.as_object_mut()) {
        for profile in profiles.values_mut() {
            if let Some(pw) = profile.get_mut("password").filter(|v| !v.is_null()) {
                *pw = "****".into();
            }
        }
    }
    value
}

fn read_password(label: &str) -> Result<String, CliError> {
    let pass = rpassword::prompt_password(label).map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(pass)
}

/// Offer keyring storage for a password.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored
/// in the keyring.
fn prompt_keyring_storage(password: String, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
        "Don't store, prompt each run",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match selection {
        0 => {
            dnacly_config::store_password(profile_name, &SecretString::from(password))?;
            eprintln!("   ✓ Password stored in system keyring");
            Ok(None)
        }
        1 => Ok(Some(password)),
        _ => Ok(None),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = match global.output {
                crate::cli::OutputFormat::Table | crate::cli::OutputFormat::Plain => {
                    format_config_redacted(&cfg)
                }
                ref other => output::render_single(other, &redacted(&cfg), |_| String::new(), |_| {
                    String::new()
                })?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: dnacly config init");
            } else {
                for (name, p) in &cfg.profiles {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", p.url);
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available_profiles(),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(),
                });
            }

            let secret = read_password("Password: ")?;
            dnacly_config::store_password(&profile_name, &SecretString::from(secret))?;

            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("dnacly configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("DNA Center URL")
        .default("https://10.8.6.56".into())
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|e| format!("not a URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .default("admin".into())
        .interact_text()
        .map_err(prompt_err)?;

    let password = read_password("Password: ")?;
    let plaintext = prompt_keyring_storage(password, &profile_name)?;

    let mut profile = Profile::new(url, username);
    profile.password = plaintext;

    // Keep other profiles when re-running the wizard.
    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    let path = config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: dnacly auth token");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        let mut lab = Profile::new("https://10.8.6.56", "admin");
        lab.password = Some("cisco123".into());
        cfg.profiles.insert("lab".into(), lab);
        cfg
    }

    #[test]
    fn table_view_masks_password() {
        let out = format_config_redacted(&sample());

        assert!(out.contains("[profiles.lab]"));
        assert!(out.contains("password = \"****\""));
        assert!(!out.contains("cisco123"));
        assert!(out.contains("reset_template_id"));
    }

    #[test]
    fn structured_view_masks_password() {
        let value = redacted(&sample());

        assert_eq!(value["profiles"]["lab"]["password"], "****");
        assert_eq!(value["profiles"]["lab"]["username"], "admin");
    }
}
