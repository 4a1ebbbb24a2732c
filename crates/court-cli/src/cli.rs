//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Badminton court cost splitter.
///
/// Tracks who played on which day and splits court, shuttlecock and
/// day-specific costs among the players.
#[derive(Debug, Parser)]
#[command(name = "court", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage the player roster.
    #[command(subcommand)]
    Player(PlayerAction),

    /// Manage sessions and their attendance.
    #[command(subcommand)]
    Session(SessionAction),

    /// Show or change the monthly cost settings.
    #[command(subcommand)]
    Settings(SettingsAction),

    /// Show or change payment details.
    #[command(subcommand)]
    Payment(PaymentAction),

    /// Show what everybody owes.
    Report {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show database location and record counts.
    Status,
}

/// Roster subcommands.
#[derive(Debug, Subcommand)]
pub enum PlayerAction {
    /// Add a player.
    Add {
        /// Player name (must be unique, case-insensitive).
        name: String,

        /// Register as a drop-in player who pays a per-session surcharge.
        #[arg(long)]
        drop_in: bool,
    },

    /// Remove a player by ID or name.
    Remove {
        /// Player ID or name. A number is matched as an ID first.
        player: String,
    },

    /// List players.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Session subcommands.
#[derive(Debug, Subcommand)]
pub enum SessionAction {
    /// Add a session.
    Add {
        /// Date played (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Remove a session.
    Remove {
        /// Session ID.
        id: i64,
    },

    /// List sessions with attendance and session costs.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set who attended a session, replacing the previous list.
    Attend {
        /// Session ID.
        id: i64,

        /// Player IDs or names. Numbers are matched as IDs first.
        /// Leave empty to clear attendance.
        players: Vec<String>,
    },

    /// Set a session's day-specific fees.
    Fees {
        /// Session ID.
        id: i64,

        /// Miscellaneous extra cost for the day.
        #[arg(long)]
        incidental: Option<i64>,

        /// Water and drinks cost for the day.
        #[arg(long)]
        consumable: Option<i64>,
    },
}

/// Monthly settings subcommands.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show current settings and the resulting per-session baseline.
    Show,

    /// Update settings. Omitted values keep their current value.
    Set(SettingsArgs),
}

/// Monthly settings values.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Court rental per session.
    #[arg(long)]
    pub base_fee: Option<i64>,

    /// Price of one shuttlecock.
    #[arg(long)]
    pub unit_price: Option<i64>,

    /// Shuttlecocks bought for the month.
    #[arg(long)]
    pub unit_count: Option<i64>,
}

/// Payment details subcommands.
#[derive(Debug, Subcommand)]
pub enum PaymentAction {
    /// Show payment details.
    Show,

    /// Update payment details. Omitted values keep their current value.
    Set(PaymentArgs),
}

/// Payment details values.
#[derive(Debug, Args)]
pub struct PaymentArgs {
    #[arg(long)]
    pub bank_name: Option<String>,

    #[arg(long)]
    pub account_number: Option<String>,

    #[arg(long)]
    pub account_holder: Option<String>,

    /// Mobile wallet phone number.
    #[arg(long)]
    pub wallet_number: Option<String>,

    /// Path or URL of the wallet's QR code image.
    #[arg(long)]
    pub wallet_qr: Option<String>,
}
