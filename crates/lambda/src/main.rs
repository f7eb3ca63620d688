// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lambda - lunch ordering data access with an isolation showcase.
//!
//! This is the binary entry point and the composition root: it loads the
//! configuration, installs logging, and builds the entity [`Registry`].

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod list;
mod menu;
mod showcase;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lambda_config::LambdaConfig;
use lambda_core::{EntityKind, IsolationLevel, LambdaError};
use lambda_storage::{Database, Registry};
use tracing::info;

/// Lambda - lunch ordering data access with an isolation showcase.
#[derive(Parser, Debug)]
#[command(name = "lambda", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the non-repeatable read showcase against the configured database.
    Showcase {
        /// Isolation level of the reading transaction.
        #[arg(long)]
        isolation: Option<IsolationLevel>,
        /// Stall between the two reads, in milliseconds.
        #[arg(long)]
        stall_ms: Option<u64>,
    },
    /// List every stored entity of one kind.
    List {
        /// Entity kind (user, mealtype, meal, lunch, lunchorder).
        kind: EntityKind,
    },
    /// Show the lunches offered in one week.
    Week {
        /// Any day of the week to show; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print what a user ordered in one month.
    Report {
        username: String,
        year: i32,
        /// Month number, 1 to 12.
        month: u32,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => lambda_config::load_and_validate_path(path),
        None => lambda_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            lambda_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("lambda: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: &LambdaConfig) -> Result<(), LambdaError> {
    match command {
        Some(Commands::Showcase {
            isolation,
            stall_ms,
        }) => {
            let registry = open_registry(config).await?;
            let isolation = isolation.unwrap_or(config.transactions.isolation_level);
            let report =
                showcase::run_showcase_command(&registry, &config.showcase, isolation, stall_ms)
                    .await?;
            println!("{report}");
        }
        Some(Commands::List { kind }) => {
            let registry = open_registry(config).await?;
            for line in list::run_list(&registry, kind).await? {
                println!("{line}");
            }
        }
        Some(Commands::Week { date }) => {
            let registry = open_registry(config).await?;
            let day = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let blocks = menu::run_week(&registry, day).await?;
            if blocks.is_empty() {
                println!("no lunches in the week of {day}");
            } else {
                println!("{}", blocks.join("\n\n"));
            }
        }
        Some(Commands::Report {
            username,
            year,
            month,
        }) => {
            let registry = open_registry(config).await?;
            println!("{}", menu::run_report(&registry, &username, year, month).await?);
        }
        Some(Commands::Config) => {
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| LambdaError::Config(format!("cannot render configuration: {e}")))?;
            print!("{rendered}");
        }
        None => {
            println!("lambda: use --help for available commands");
        }
    }
    Ok(())
}

/// Open the configured database and build the registry over it.
async fn open_registry(config: &LambdaConfig) -> Result<Registry, LambdaError> {
    let db = Database::open_with_config(&config.storage).await?;
    info!(path = %db.path(), "database opened");
    Ok(Registry::new(db))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lambda={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc can advance the epoch; the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    #[serial_test::serial]
    fn binary_loads_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lambda.toml");
        std::fs::write(&path, "[logging]\nlog_level = \"debug\"\n").unwrap();

        let config = lambda_config::load_and_validate_path(&path).expect("config should be valid");
        assert_eq!(config.showcase.target_username, "admin");
        assert_eq!(config.storage.database_path, "lambda.db");
        assert_eq!(config.logging.log_level, "debug");
    }

    #[test]
    fn week_date_parses() {
        let cli = Cli::try_parse_from(["lambda", "week", "--date", "2026-03-04"]).unwrap();
        match cli.command {
            Some(Commands::Week { date }) => assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 4)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn report_takes_user_and_month() {
        let cli = Cli::try_parse_from(["lambda", "report", "alice", "2026", "3"]).unwrap();
        match cli.command {
            Some(Commands::Report {
                username,
                year,
                month,
            }) => assert_eq!((username.as_str(), year, month), ("alice", 2026, 3)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn showcase_flags_parse() {
        let cli = Cli::try_parse_from([
            "lambda",
            "showcase",
            "--isolation",
            "read_committed",
            "--stall-ms",
            "250",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Showcase {
                isolation,
                stall_ms,
            }) => {
                assert_eq!(isolation, Some(IsolationLevel::ReadCommitted));
                assert_eq!(stall_ms, Some(250));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_isolation_is_rejected() {
        assert!(Cli::try_parse_from(["lambda", "showcase", "--isolation", "snapshot"]).is_err());
    }

    #[test]
    fn list_kind_parses_case_insensitively() {
        let cli = Cli::try_parse_from(["lambda", "list", "lunchorder"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::List {
                kind: EntityKind::LunchOrder
            })
        ));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["lambda", "config", "--config", "/tmp/lambda.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/lambda.toml")));
        assert!(matches!(cli.command, Some(Commands::Config)));
    }

    #[tokio::test]
    async fn config_command_renders_toml() {
        let config = LambdaConfig::default();
        run(Some(Commands::Config), &config).await.unwrap();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("database_path = \"lambda.db\""));
        assert!(rendered.contains("isolation_level = \"repeatable_read\""));
    }
}
