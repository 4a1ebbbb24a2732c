//! Court cost splitter CLI library.
//!
//! This crate provides the CLI interface for court cost splitting.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    Cli, Commands, PaymentAction, PaymentArgs, PlayerAction, SessionAction, SettingsAction,
    SettingsArgs,
};
pub use config::Config;
