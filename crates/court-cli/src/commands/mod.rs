//! CLI subcommand implementations.

pub mod payment;
pub mod player;
pub mod report;
pub mod session;
pub mod settings;
pub mod status;
pub mod util;
