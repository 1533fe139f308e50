//! CLI configuration: a thin layer over `dnacly_config` that applies
//! `GlobalOpts` flag overrides (--url, --username, --insecure, ...).

use std::time::Duration;

use dnacly_core::{SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use dnacly_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the session for this invocation.
///
/// Flag > env > profile > defaults. Without a profile, `--url` and
/// `--username` are enough; the password is then prompted for.
pub fn resolve_session(global: &GlobalOpts) -> Result<(String, SessionConfig), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: crate::error::available_profiles(),
            });
        }
        None => {
            let url = global.url.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let username = global
                .username
                .clone()
                .ok_or_else(|| CliError::NoCredentials {
                    profile: profile_name.clone(),
                })?;
            Profile::new(url, username)
        }
    };

    apply_profile_overrides(&mut profile, global);
    let mut session =
        dnacly_config::profile_to_session_config(&profile, &profile_name, &cfg.defaults)?;
    apply_session_overrides(&mut session, global);
    Ok((profile_name, session))
}

fn apply_profile_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
}

fn apply_session_overrides(session: &mut SessionConfig, global: &GlobalOpts) {
    if global.insecure {
        session.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    if let Some(ref path) = global.token_cache {
        session.token_cache = Some(path.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use dnacly_core::SessionConfig;
    use url::Url;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["dnacly"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["auth", "test"]);
        Cli::try_parse_from(argv).expect("valid args").global
    }

    #[test]
    fn url_and_username_flags_override_profile() {
        let mut profile = Profile::new("https://old", "admin");
        apply_profile_overrides(
            &mut profile,
            &global(&["--url", "https://new", "--username", "ops"]),
        );

        assert_eq!(profile.url, "https://new");
        assert_eq!(profile.username.as_deref(), Some("ops"));
    }

    #[test]
    fn session_flags_override_profile_values() {
        let mut session = SessionConfig::new(Url::parse("https://dnac").expect("url"), "admin");
        session.tls = TlsVerification::SystemDefaults;

        apply_session_overrides(
            &mut session,
            &global(&["-k", "--timeout", "90", "--token-cache", "/tmp/t.tk"]),
        );

        assert_eq!(session.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(session.timeout, Duration::from_secs(90));
        assert_eq!(session.token_cache, Some(PathBuf::from("/tmp/t.tk")));
    }

    #[test]
    fn absent_flags_leave_session_alone() {
        let mut session = SessionConfig::new(Url::parse("https://dnac").expect("url"), "admin");
        session.tls = TlsVerification::SystemDefaults;

        apply_session_overrides(&mut session, &global(&[]));

        assert_eq!(session.tls, TlsVerification::SystemDefaults);
        assert_eq!(session.timeout, Duration::from_secs(30));
    }
}
