//! SoulTalk CLI and REST API entry point.
//!
//! Binary name: `soultalk`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, SessionCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn,soultalk_api=info",
        1 => "info,soultalk_core=debug,soultalk_infra=debug",
        _ => "trace",
    };
    let enable_otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    soultalk_observe::tracing_setup::init_tracing(filter, enable_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    soultalk_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "soultalk", &mut std::io::stdout());
        }

        Commands::Check => {
            cli::check::check(cli.json).await?;
        }

        Commands::Session { action } => {
            let service = state::open_chat_service().await?;
            match action {
                SessionCommand::New { email } => {
                    cli::session::new_session(&service, &email, cli.json).await?;
                }
                SessionCommand::List { email } => {
                    cli::session::list_sessions(&service, &email, cli.json).await?;
                }
                SessionCommand::Messages { session_id } => {
                    cli::session::show_messages(&service, &session_id, cli.json).await?;
                }
                SessionCommand::Rename {
                    session_id,
                    email,
                    title,
                } => {
                    cli::session::rename_session(&service, &session_id, &email, &title, cli.json)
                        .await?;
                }
                SessionCommand::Delete {
                    session_id,
                    email,
                    force,
                } => {
                    cli::session::delete_session(&service, &session_id, &email, force, cli.json)
                        .await?;
                }
            }
        }

        Commands::Send {
            session_id,
            email,
            text,
        } => {
            let state = AppState::init().await?;
            cli::send::send_message(&state, &session_id, &email, &text, cli.json).await?;
        }

        Commands::Serve { port, host, .. } => {
            let state = AppState::init().await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "SoulTalk API listening");

            if !cli.quiet {
                println!(
                    "  {} SoulTalk API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
