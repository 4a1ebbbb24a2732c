//! Status command for showing where data lives and what it holds.

use std::io::Write;

use anyhow::{Context, Result};

use court_db::Database;

use super::util::format_amount_f64;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let counts = db.counts()?;
    let baseline = db.snapshot()?.baseline();

    writeln!(writer, "Court cost status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Players:  {}", counts.participants)?;
    writeln!(writer, "Sessions: {}", counts.sessions)?;

    if counts.sessions == 0 {
        writeln!(writer, "No sessions recorded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Baseline: {} per session",
        format_amount_f64(baseline.per_session_base_cost, &config.currency_label)
    )?;

    Ok(())
}
