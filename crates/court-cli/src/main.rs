use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use court_cli::commands::{payment, player, report, session, settings, status};
use court_cli::{Cli, Commands, Config, PaymentAction, PlayerAction, SessionAction, SettingsAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(court_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = court_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut out = io::stdout().lock();

    match &cli.command {
        Some(Commands::Player(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                PlayerAction::Add { name, drop_in } => {
                    player::add(&mut out, &mut db, name, *drop_in)?;
                }
                PlayerAction::Remove { player: key } => player::remove(&mut out, &mut db, key)?,
                PlayerAction::List { json } => player::list(&mut out, &db, *json)?,
            }
        }
        Some(Commands::Session(action)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            match action {
                SessionAction::Add { date } => {
                    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
                    session::add(&mut out, &mut db, date)?;
                }
                SessionAction::Remove { id } => session::remove(&mut out, &mut db, *id)?,
                SessionAction::List { json } => {
                    session::list(&mut out, &db, *json, &config.currency_label)?;
                }
                SessionAction::Attend { id, players } => {
                    session::attend(&mut out, &mut db, *id, players)?;
                }
                SessionAction::Fees {
                    id,
                    incidental,
                    consumable,
                } => session::fees(
                    &mut out,
                    &mut db,
                    *id,
                    *incidental,
                    *consumable,
                    &config.currency_label,
                )?,
            }
        }
        Some(Commands::Settings(action)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            match action {
                SettingsAction::Show => settings::show(&mut out, &db, &config.currency_label)?,
                SettingsAction::Set(args) => {
                    settings::set(&mut out, &mut db, args, &config.currency_label)?;
                }
            }
        }
        Some(Commands::Payment(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                PaymentAction::Show => payment::show(&mut out, &db)?,
                PaymentAction::Set(args) => payment::set(&mut out, &mut db, args)?,
            }
        }
        Some(Commands::Report { json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            report::run(&mut out, &db, *json, &config.currency_label)?;
        }
        Some(Commands::Status) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            if let Some(parent) = config.database_path.parent() {
                std::fs::create_dir_all(parent).context("failed to create database directory")?;
            }
            status::run(&mut out, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
