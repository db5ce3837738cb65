//! oxide-upgrade CLI
//!
//! Command-line tool bringing a live database schema up to date with a
//! declared model.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use oxide_upgrade::prelude::*;

/// Additive schema upgrades for PostgreSQL, MySQL, Oracle, H2, Derby,
/// SQL Server and SQLite.
#[derive(Parser)]
#[command(name = "oxide-upgrade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upgrade the database to the model.
    Upgrade {
        /// Model file (JSON).
        #[arg(short, long)]
        model: PathBuf,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,

        /// Only create missing objects, never alter existing columns.
        #[arg(long)]
        no_alter_columns: bool,
    },

    /// Show the changes needed to upgrade the database to the model.
    Diff {
        /// Model file (JSON).
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Print the live schema as JSON.
    Inspect {
        /// Schema name pattern (default schema if not specified).
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// List the supported platforms.
    Platforms,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = PlatformRegistry::with_defaults()?;

    match cli.command {
        Commands::Platforms => {
            for platform in registry.platforms() {
                println!("{:<12} {}", platform.name(), platform.product_names().join(", "));
            }
        }

        Commands::Upgrade {
            model,
            dry_run,
            no_alter_columns,
        } => {
            let schemas = Model::load(&model)?.into_schemas();
            let (conn, platform) = connect(&cli.database, &registry).await?;
            let options = UpgradeOptions {
                dry_run,
                alter_columns: !no_alter_columns,
            };
            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
            }

            let report = UpgradeCommand::new(platform, options)
                .upgrade(&conn, &schemas)
                .await?;
            for warning in &report.warnings {
                warn!("{warning}");
            }
            if !dry_run {
                info!("Executed {} statements.", report.executed);
            }
        }

        Commands::Diff { model } => {
            let (conn, platform) = connect(&cli.database, &registry).await?;
            let command = UpgradeCommand::new(platform, UpgradeOptions::default());
            for schema in Model::load(&model)?.into_schemas() {
                let changes = command.diff(&conn, &schema).await?;
                let name = schema.name.as_deref().unwrap_or("<default>");
                if changes.is_empty() && changes.warnings.is_empty() {
                    println!("{name}: up to date");
                    continue;
                }

                println!("\n{name}:");
                println!("{:-<60}", "");
                for table in changes.by_table() {
                    println!(" {}", table.table);
                    for change in &table.changes {
                        println!("   + {change}");
                    }
                }
                for warning in &changes.warnings {
                    println!("   ! {warning}");
                }
                println!("\nSQL:");
                for sql in command.plan(&changes)? {
                    println!("{sql};");
                }
            }
        }

        Commands::Inspect { schema } => {
            let (conn, platform) = connect(&cli.database, &registry).await?;
            let live = platform.read_schema(&conn, None, schema.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&live)?);
        }
    }

    Ok(())
}

/// Connects and picks the platform from the reported product name.
async fn connect(
    database: &str,
    registry: &PlatformRegistry,
) -> anyhow::Result<(SqlxConnection, Platform)> {
    let conn = SqlxConnection::connect(database).await?;
    let platform = registry.detect(conn.product_name())?.clone();
    info!(platform = platform.name(), "Connected to {}", conn.product_name());
    Ok((conn, platform))
}
