//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use court_core::roster::find_participant;
use court_core::{Participant, ParticipantId};

/// Formats a whole-unit amount with `.` thousands grouping, e.g. `43.333 ₫`.
pub fn format_amount(amount: i64, label: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };
    if label.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped} {label}")
    }
}

/// Formats a fractional amount rounded to whole units.
#[allow(clippy::cast_possible_truncation)]
pub fn format_amount_f64(amount: f64, label: &str) -> String {
    format_amount(amount.round() as i64, label)
}

/// Resolves player arguments (IDs or names) against the roster.
pub fn resolve_participants(roster: &[Participant], keys: &[String]) -> Result<Vec<ParticipantId>> {
    keys.iter()
        .map(|key| {
            find_participant(roster, key)
                .map(|p| p.id)
                .with_context(|| format!("no player matching '{key}'"))
        })
        .collect()
}
