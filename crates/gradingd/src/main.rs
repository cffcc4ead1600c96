//! gradingd — the grading service daemon.
//!
//! Single binary that assembles the grading subsystems:
//! - Configuration (grading.toml + `GRADING_*` environment)
//! - PostgreSQL pool and schema migrations
//! - Grading engine
//! - REST API
//!
//! # Usage
//!
//! ```text
//! gradingd --config /etc/grading/grading.toml serve --port 8080
//! gradingd migrate
//! gradingd check-config
//! ```

mod server;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use grading_core::ServiceConfig;
use grading_core::config::LogConfig;

#[derive(Parser)]
#[command(name = "gradingd", about = "Grading service daemon", version)]
struct Cli {
    /// Path to grading.toml. Without it, defaults plus environment are used.
    #[arg(long, global = true, env = "GRADING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Address to bind, overriding the config file.
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, overriding the config file.
        #[arg(long)]
        port: Option<u16>,

        /// Do not apply schema migrations at startup.
        #[arg(long)]
        skip_migrations: bool,
    },
    /// Apply schema migrations and exit.
    Migrate,
    /// Print the effective configuration and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ServiceConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            telemetry::init(&LogConfig::default());
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    telemetry::init(&config.log);
    telemetry::install_panic_hook();

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "run error");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, mut config: ServiceConfig) -> anyhow::Result<()> {
    match command {
        Command::Serve {
            host,
            port,
            skip_migrations,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run_serve(config, skip_migrations).await
        }
        Command::Migrate => {
            let pool = grading_store::connect(&config.database).await?;
            grading_store::migrate(&pool).await?;
            pool.close().await;
            info!("migrations complete");
            Ok(())
        }
        Command::CheckConfig => {
            print!("{}", config.redacted().to_toml_string()?);
            Ok(())
        }
    }
}
