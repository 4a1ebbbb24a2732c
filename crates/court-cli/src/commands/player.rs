//! Player commands for managing the roster.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use court_core::roster::find_participant;
use court_core::{Classification, Participant};
use court_db::Database;

/// Adds a player to the roster.
pub fn add<W: Write>(writer: &mut W, db: &mut Database, name: &str, drop_in: bool) -> Result<()> {
    let classification = if drop_in {
        Classification::DropIn
    } else {
        Classification::Regular
    };
    let player = db.add_participant(name, classification)?;
    writeln!(
        writer,
        "Added {} (#{}, {})",
        player.name, player.id, player.classification
    )?;
    Ok(())
}

/// Removes a player by ID or name.
///
/// Past attendance records keep pointing at the removed player; they are
/// ignored when costs are computed.
pub fn remove<W: Write>(writer: &mut W, db: &mut Database, key: &str) -> Result<()> {
    let roster = db.list_participants()?;
    let Some(player) = find_participant(&roster, key) else {
        bail!("no player matching '{key}'");
    };
    db.remove_participant(player.id)?;
    writeln!(writer, "Removed {} (#{})", player.name, player.id)?;
    Ok(())
}

/// Lists the roster.
pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let players = db.list_participants()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&players)?)?;
    } else {
        write!(writer, "{}", format_players(&players))?;
    }
    Ok(())
}

/// Formats the roster for human-readable output.
pub fn format_players(players: &[Participant]) -> String {
    let mut output = String::new();

    writeln!(output, "PLAYERS").unwrap();
    writeln!(output).unwrap();

    if players.is_empty() {
        writeln!(output, "No players yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'court player add <name>' to add one.").unwrap();
        return output;
    }

    let name_width = players
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    writeln!(output, "{:>4}  {:<name_width$}  Type", "ID", "Name").unwrap();
    writeln!(output, "────  {}  ───────", "─".repeat(name_width)).unwrap();
    for player in players {
        writeln!(
            output,
            "{:>4}  {:<name_width$}  {}",
            player.id, player.name, player.classification
        )
        .unwrap();
    }

    output
}
