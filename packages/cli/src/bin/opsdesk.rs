// ABOUTME: Entry point for the opsdesk binary
// ABOUTME: Parses commands, loads configuration, and dispatches to serve, migrate, or reconcile

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use colored::*;
use opsdesk_cli::commands::{open_database, reconcile, render_report};
use opsdesk_cli::server::run_server;
use opsdesk_cli::{init_tracing, Config};

#[derive(Parser)]
#[command(name = "opsdesk")]
#[command(about = "OpsDesk - agency operations API server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DatabaseArgs {
    /// Path to the SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Apply pending schema migrations and exit
    Migrate {
        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Repair tasks whose status disagrees with their latest reviewed submission
    Reconcile {
        #[command(flatten)]
        db: DatabaseArgs,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    match command {
        Commands::Serve { host, port, db } => {
            let config = config.with_overrides(host, port, db.database)?;
            let pool = open_database(&config).await?;
            run_server(pool, &config).await
        }
        Commands::Migrate { db } => {
            let config = config.with_overrides(None, None, db.database)?;
            open_database(&config).await?;
            println!(
                "{} Database ready at {}",
                "✓".green(),
                config.database_path.display()
            );
            Ok(())
        }
        Commands::Reconcile { db } => {
            let config = config.with_overrides(None, None, db.database)?;
            let pool = open_database(&config).await?;
            let report = reconcile(pool).await?;

            println!(
                "Examined {} reviewed submissions, repaired {} tasks",
                report.examined.to_string().bold(),
                report.repaired.len().to_string().bold()
            );
            if !report.repaired.is_empty() {
                println!("{}", render_report(&report));
            }
            Ok(())
        }
    }
}
