//! Token commands and the shared connect step.

use secrecy::ExposeSecret;
use serde::Serialize;

use dnacly_core::{Session, TokenSource};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::console::{password_prompt, reauth_prompt};
use crate::error::CliError;
use crate::output;

/// Make sure the session holds an accepted token, prompting for a
/// password when none is configured or the configured one is rejected,
/// and again if a cached token expires mid-run.
pub async fn connect(session: &Session, global: &GlobalOpts) -> Result<TokenSource, CliError> {
    session.set_reauth_prompt(reauth_prompt(session.config().username.clone()));
    let source = session
        .connect(password_prompt(&session.config().username))
        .await?;
    if source == TokenSource::Acquired && global.verbose > 0 {
        eprintln!("Token acquired for {}", session.config().username);
    }
    Ok(source)
}

#[derive(Debug, Serialize)]
struct TokenCheck {
    url: String,
    cache: Option<String>,
    valid: bool,
}

pub async fn handle(session: &Session, args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Token => {
            connect(session, global).await?;
            let token = session.client().token().ok_or_else(|| CliError::AuthFailed {
                message: "no token after authentication".into(),
                profile: String::new(),
            })?;
            output::print_output(token.expose_secret(), global.quiet);
            Ok(())
        }

        AuthCommand::Test => {
            let check = TokenCheck {
                url: session.config().url.to_string(),
                cache: session
                    .config()
                    .token_cache
                    .as_ref()
                    .map(|p| p.display().to_string()),
                valid: session.validate_cached().await?,
            };
            let out = output::render_single(
                &global.output,
                &check,
                |c| {
                    output::detail_lines(&[
                        ("URL", c.url.clone()),
                        ("Token cache", output::or_dash(c.cache.as_deref())),
                        (
                            "Cached token",
                            if c.valid { "valid" } else { "invalid or missing" }.into(),
                        ),
                    ])
                },
                |c| c.valid.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if check.valid {
                Ok(())
            } else {
                Err(CliError::AuthFailed {
                    message: "cached token is missing or rejected".into(),
                    profile: String::new(),
                })
            }
        }
    }
}
