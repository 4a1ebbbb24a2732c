//! Session commands for managing days played, attendance and day fees.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use court_core::{Participant, Session, SessionBaseline, SessionId, session_total_cost};
use court_db::Database;
use serde::Serialize;

use super::util::{format_amount, resolve_participants};

/// Adds a session held on `date`.
pub fn add<W: Write>(writer: &mut W, db: &mut Database, date: NaiveDate) -> Result<()> {
    let session = db.add_session(date)?;
    writeln!(
        writer,
        "Added session #{} ({}, {})",
        session.id, session.label, session.date
    )?;
    Ok(())
}

/// Removes a session.
pub fn remove<W: Write>(writer: &mut W, db: &mut Database, id: SessionId) -> Result<()> {
    let session = find_session(db, id)?;
    db.remove_session(id)?;
    writeln!(writer, "Removed session #{} ({})", session.id, session.label)?;
    Ok(())
}

/// Replaces a session's attendance with the given players.
pub fn attend<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: SessionId,
    players: &[String],
) -> Result<()> {
    let session = find_session(db, id)?;
    let roster = db.list_participants()?;
    let ids = resolve_participants(&roster, players)?;
    db.set_session_participants(id, &ids)?;

    if ids.is_empty() {
        writeln!(writer, "{}: attendance cleared", session.label)?;
        return Ok(());
    }

    let names = attending_names(&roster, &distinct_ids(&ids));
    writeln!(
        writer,
        "{}: {} {} ({})",
        session.label,
        names.len(),
        if names.len() == 1 { "player" } else { "players" },
        names.join(", ")
    )?;
    Ok(())
}

/// Updates a session's day fees.
pub fn fees<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: SessionId,
    incidental: Option<i64>,
    consumable: Option<i64>,
    currency_label: &str,
) -> Result<()> {
    if incidental.is_none() && consumable.is_none() {
        bail!("nothing to update: pass --incidental and/or --consumable");
    }
    db.set_session_fees(id, incidental, consumable)?;
    let session = find_session(db, id)?;
    writeln!(
        writer,
        "{}: incidental {}, consumable {}",
        session.label,
        format_amount(session.incidental_fee_or_zero(), currency_label),
        format_amount(session.consumable_fee_or_zero(), currency_label)
    )?;
    Ok(())
}

/// Lists sessions with attendance and session costs.
pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    json: bool,
    currency_label: &str,
) -> Result<()> {
    let snapshot = db.snapshot()?;
    let baseline = snapshot.baseline();
    let entries = session_entries(&snapshot.participants, &snapshot.sessions, &baseline);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(writer, "{}", format_sessions(&entries, currency_label))?;
    }
    Ok(())
}

// ========== Session Data ==========

/// Session data for display.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub id: SessionId,
    pub label: String,
    pub date: NaiveDate,
    /// Names of attending players still on the roster.
    pub players: Vec<String>,
    /// Attendance entries for players since removed from the roster.
    pub removed_players: usize,
    pub incidental_fee: i64,
    pub consumable_fee: i64,
    /// Baseline plus day fees, rounded.
    pub total_cost: i64,
}

/// Builds display entries for each session.
#[allow(clippy::cast_possible_truncation)]
pub fn session_entries(
    roster: &[Participant],
    sessions: &[Session],
    baseline: &SessionBaseline,
) -> Vec<SessionEntry> {
    sessions
        .iter()
        .map(|session| {
            let attendance = distinct_ids(&session.participants);
            let players = attending_names(roster, &attendance);
            SessionEntry {
                id: session.id,
                label: session.label.clone(),
                date: session.date,
                removed_players: attendance.len().saturating_sub(players.len()),
                players,
                incidental_fee: session.incidental_fee_or_zero(),
                consumable_fee: session.consumable_fee_or_zero(),
                total_cost: session_total_cost(baseline, session).round() as i64,
            }
        })
        .collect()
}

/// Attendance ids in first-seen order, each once.
fn distinct_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn attending_names(roster: &[Participant], ids: &[i64]) -> Vec<String> {
    let by_id: HashMap<i64, &str> = roster.iter().map(|p| (p.id, p.name.as_str())).collect();
    ids.iter()
        .filter_map(|id| by_id.get(id).map(|name| (*name).to_string()))
        .collect()
}

fn find_session(db: &Database, id: SessionId) -> Result<Session> {
    let Some(session) = db.list_sessions()?.into_iter().find(|s| s.id == id) else {
        bail!("session {id} not found");
    };
    Ok(session)
}

// ========== Human-Readable Output ==========

/// Formats sessions for human-readable output.
pub fn format_sessions(entries: &[SessionEntry], currency_label: &str) -> String {
    let mut output = String::new();

    writeln!(output, "SESSIONS").unwrap();
    writeln!(output).unwrap();

    if entries.is_empty() {
        writeln!(output, "No sessions yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'court session add --date <YYYY-MM-DD>' to add one.").unwrap();
        return output;
    }

    for entry in entries {
        writeln!(output, "#{}  {} ({})", entry.id, entry.label, entry.date).unwrap();
        if entry.players.is_empty() {
            writeln!(output, "    Players:   (none)").unwrap();
        } else {
            writeln!(
                output,
                "    Players:   {} ({})",
                entry.players.join(", "),
                entry.players.len()
            )
            .unwrap();
        }
        if entry.removed_players > 0 {
            writeln!(
                output,
                "    Removed:   {} no longer on the roster",
                entry.removed_players
            )
            .unwrap();
        }
        if entry.incidental_fee > 0 || entry.consumable_fee > 0 {
            writeln!(
                output,
                "    Fees:      incidental {}, consumable {}",
                format_amount(entry.incidental_fee, currency_label),
                format_amount(entry.consumable_fee, currency_label)
            )
            .unwrap();
        }
        writeln!(
            output,
            "    Cost:      {}",
            format_amount(entry.total_cost, currency_label)
        )
        .unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_core::{Classification, MonthlySettings};
    use insta::assert_snapshot;

    fn setup() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.add_participant("Linh", Classification::Regular).unwrap();
        db.add_participant("Tuan", Classification::DropIn).unwrap();
        db.add_participant("Mai", Classification::Regular).unwrap();
        db.save_settings(&MonthlySettings {
            base_fee: 100_000,
            consumable_unit_price: 25_000,
            consumable_unit_count: 4,
        })
        .unwrap();
        db
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn list_sessions_with_attendance_and_fees() {
        let mut db = setup();
        let mut output = Vec::new();
        add(&mut output, &mut db, date(7)).unwrap();
        add(&mut output, &mut db, date(14)).unwrap();
        attend(
            &mut output,
            &mut db,
            1,
            &["linh".to_string(), "2".to_string()],
        )
        .unwrap();
        fees(&mut output, &mut db, 1, Some(20_000), Some(12_000), "₫").unwrap();
        list(&mut output, &db, false, "₫").unwrap();

        // 100_000 court + 100_000 / 2 shuttlecocks = 150_000 baseline
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Added session #1 (Mar 7, 2025-03-07)
        Added session #2 (Mar 14, 2025-03-14)
        Mar 7: 2 players (Linh, Tuan)
        Mar 7: incidental 20.000 ₫, consumable 12.000 ₫
        SESSIONS

        #1  Mar 7 (2025-03-07)
            Players:   Linh, Tuan (2)
            Fees:      incidental 20.000 ₫, consumable 12.000 ₫
            Cost:      182.000 ₫
        #2  Mar 14 (2025-03-14)
            Players:   (none)
            Cost:      150.000 ₫
        ");
    }

    #[test]
    fn removed_players_are_counted_separately() {
        let mut db = setup();
        let session = db.add_session(date(7)).unwrap();
        db.set_session_participants(session.id, &[1, 3]).unwrap();
        db.remove_participant(3).unwrap();

        let snapshot = db.snapshot().unwrap();
        let entries =
            session_entries(&snapshot.participants, &snapshot.sessions, &snapshot.baseline());
        assert_eq!(entries[0].players, vec!["Linh".to_string()]);
        assert_eq!(entries[0].removed_players, 1);
    }

    #[test]
    fn repeated_attendance_is_not_counted_as_removed() {
        let mut db = setup();
        let mut session = db.add_session(date(7)).unwrap();
        session.participants = vec![1, 2, 1, 9, 9];

        let snapshot = db.snapshot().unwrap();
        let entries = session_entries(&snapshot.participants, &[session], &snapshot.baseline());
        assert_eq!(entries[0].players, vec!["Linh".to_string(), "Tuan".to_string()]);
        assert_eq!(entries[0].removed_players, 1);
    }

    #[test]
    fn attend_with_no_players_clears() {
        let mut db = setup();
        db.add_session(date(7)).unwrap();
        db.set_session_participants(1, &[1]).unwrap();

        let mut output = Vec::new();
        attend(&mut output, &mut db, 1, &[]).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Mar 7: attendance cleared\n");
        assert!(db.list_sessions().unwrap()[0].participants.is_empty());
    }

    #[test]
    fn attend_unknown_player_fails_without_changes() {
        let mut db = setup();
        db.add_session(date(7)).unwrap();
        db.set_session_participants(1, &[1]).unwrap();

        let err = attend(&mut Vec::new(), &mut db, 1, &["Nobody".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "no player matching 'Nobody'");
        assert_eq!(db.list_sessions().unwrap()[0].participants, vec![1]);
    }

    #[test]
    fn fees_require_a_value() {
        let mut db = setup();
        db.add_session(date(7)).unwrap();
        let err = fees(&mut Vec::new(), &mut db, 1, None, None, "₫").unwrap_err();
        assert!(err.to_string().starts_with("nothing to update"));
    }

    #[test]
    fn remove_missing_session_fails() {
        let mut db = setup();
        let err = remove(&mut Vec::new(), &mut db, 9).unwrap_err();
        assert_eq!(err.to_string(), "session 9 not found");
    }
}
