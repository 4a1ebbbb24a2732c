//! Report command for the per-player cost sheet.
//!
//! This module implements `court report`: one row per player, one column per
//! session, with totals and the payment details when money is owed.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use court_core::{
    CostBreakdown, DROP_IN_SURCHARGE, PaymentInfo, SessionBaseline, Snapshot, total_collected,
};
use court_db::Database;
use serde::Serialize;

use super::payment::format_payment;
use super::session::{SessionEntry, session_entries};
use super::util::format_amount;

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub baseline: SessionBaseline,
    pub sessions: Vec<SessionEntry>,
    pub players: Vec<CostBreakdown>,
    pub total_collected: i64,
    pub payment: PaymentInfo,
}

// ========== Report Generation ==========

/// Builds report data from a snapshot of the records.
pub fn build_report_data(
    snapshot: &Snapshot,
    payment: PaymentInfo,
    generated_at: DateTime<Utc>,
) -> ReportData {
    let baseline = snapshot.baseline();
    let players = snapshot.breakdown();
    let total_collected = total_collected(&players);
    tracing::debug!(
        players = players.len(),
        sessions = snapshot.sessions.len(),
        total_collected,
        "computed cost breakdown"
    );

    ReportData {
        generated_at,
        baseline,
        sessions: session_entries(&snapshot.participants, &snapshot.sessions, &baseline),
        players,
        total_collected,
        payment,
    }
}

/// Generates report data from the database.
pub fn generate_report_data(db: &Database, generated_at: DateTime<Utc>) -> Result<ReportData> {
    let snapshot = db.snapshot()?;
    let payment = db.load_payment_info()?;
    Ok(build_report_data(&snapshot, payment, generated_at))
}

// ========== Human-Readable Output ==========

const NOT_JOINED: &str = "-";
const DROP_IN_MARKER: &str = " *";

/// Formats the cost sheet.
pub fn format_report(data: &ReportData, currency_label: &str) -> String {
    let mut output = String::new();

    if data.players.is_empty() {
        writeln!(output, "COST REPORT").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Add players and sessions to see the cost sheet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'court player add <name>' and 'court session add'."
        )
        .unwrap();
        return output;
    }

    let session_word = if data.sessions.len() == 1 {
        "session"
    } else {
        "sessions"
    };
    let player_word = if data.players.len() == 1 {
        "player"
    } else {
        "players"
    };
    writeln!(
        output,
        "COST REPORT: {} {session_word}, {} {player_word}",
        data.sessions.len(),
        data.players.len()
    )
    .unwrap();
    writeln!(output).unwrap();

    // Build the sheet as cells first so column widths fit the content
    let mut header = vec!["Player".to_string()];
    header.extend(data.sessions.iter().map(|s| s.label.clone()));
    header.push("Total".to_string());

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(data.players.len() + 1);
    for breakdown in &data.players {
        let mut row = Vec::with_capacity(header.len());
        let marker = if breakdown.participant.is_drop_in() {
            DROP_IN_MARKER
        } else {
            ""
        };
        row.push(format!("{}{marker}", breakdown.participant.name));
        for share in &breakdown.sessions {
            if share.participated {
                row.push(format_amount(share.cost, ""));
            } else {
                row.push(NOT_JOINED.to_string());
            }
        }
        row.push(format_amount(breakdown.total_cost, ""));
        rows.push(row);
    }

    let mut footer = vec!["Collected".to_string()];
    footer.extend(
        collected_per_session(&data.players, data.sessions.len())
            .into_iter()
            .map(|amount| format_amount(amount, "")),
    );
    footer.push(format_amount(data.total_collected, ""));

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            std::iter::once(&header)
                .chain(&rows)
                .chain(std::iter::once(&footer))
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_row(&mut output, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    write_row(&mut output, &rule, &widths);
    for row in &rows {
        write_row(&mut output, row, &widths);
    }
    write_row(&mut output, &rule, &widths);
    write_row(&mut output, &footer, &widths);

    writeln!(output).unwrap();
    if data.players.iter().any(|b| b.participant.is_drop_in()) {
        writeln!(
            output,
            "* drop-in: pays {} extra per session, credited to the regulars who played",
            format_amount(DROP_IN_SURCHARGE, currency_label)
        )
        .unwrap();
    }
    if !currency_label.is_empty() {
        writeln!(output, "Amounts in {currency_label}.").unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(
        output,
        "Per session baseline: {}",
        format_amount(round(data.baseline.per_session_base_cost), currency_label)
    )
    .unwrap();
    writeln!(
        output,
        "Total to collect:     {}",
        format_amount(data.total_collected, currency_label)
    )
    .unwrap();

    if data.total_collected > 0 {
        writeln!(output).unwrap();
        output.push_str(&format_payment(&data.payment));
    }

    output
}

/// Writes one sheet row: first column left-aligned, the rest right-aligned.
fn write_row(output: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i == 0 {
            write!(line, "{cell:<width$}").unwrap();
        } else {
            write!(line, "  {cell:>width$}").unwrap();
        }
    }
    writeln!(output, "{}", line.trim_end()).unwrap();
}

/// Sums what the players were charged for each session column.
fn collected_per_session(players: &[CostBreakdown], session_count: usize) -> Vec<i64> {
    let mut collected = vec![0_i64; session_count];
    for breakdown in players {
        for (slot, share) in collected.iter_mut().zip(&breakdown.sessions) {
            *slot = slot.saturating_add(share.cost);
        }
    }
    collected
}

#[allow(clippy::cast_possible_truncation)]
fn round(amount: f64) -> i64 {
    amount.round() as i64
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: String,
    pub baseline: &'a SessionBaseline,
    pub sessions: &'a [SessionEntry],
    pub players: &'a [CostBreakdown],
    pub total_collected: i64,
    pub payment: Option<&'a PaymentInfo>,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        baseline: &data.baseline,
        sessions: &data.sessions,
        players: &data.players,
        total_collected: data.total_collected,
        payment: (!data.payment.is_empty()).then_some(&data.payment),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    json: bool,
    currency_label: &str,
) -> Result<()> {
    let data = generate_report_data(db, Utc::now())?;

    if json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data, currency_label))?;
    }

    Ok(())
}
