mod cli;
mod commands;
mod config;
mod console;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dnacly_core::Session;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need an appliance
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "dnacly", &mut std::io::stdout());
            Ok(())
        }

        // Auth manages the token itself
        Command::Auth(args) => {
            let (profile_name, session) = open_session(&cli.global)?;
            commands::auth::handle(&session, args, &cli.global)
                .await
                .map_err(|e| e.for_profile(&profile_name))
        }

        cmd => {
            if let Command::Swim(ref args) = cmd {
                commands::swim::validate(args)?;
            }

            let (profile_name, session) = open_session(&cli.global)?;
            let result = async {
                commands::auth::connect(&session, &cli.global).await?;
                tracing::debug!(command = ?cmd, "dispatching command");
                commands::dispatch(cmd, &session, &cli.global).await
            }
            .await;
            result.map_err(|e| e.for_profile(&profile_name))
        }
    }
}

/// Resolve configuration and build the HTTP client. No network traffic.
fn open_session(global: &cli::GlobalOpts) -> Result<(String, Session), CliError> {
    let (profile_name, session_config) = config::resolve_session(global)?;
    tracing::debug!(profile = %profile_name, url = %session_config.url, "opening session");
    Ok((profile_name, Session::new(session_config)?))
}
