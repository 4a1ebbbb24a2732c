//! Settings commands for the monthly court and shuttlecock costs.

use std::io::Write;

use anyhow::Result;
use court_core::{MonthlySettings, compute_baseline};
use court_db::Database;

use super::util::{format_amount, format_amount_f64};
use crate::SettingsArgs;

/// Shows the monthly settings and the per-session baseline they produce.
pub fn show<W: Write>(writer: &mut W, db: &Database, currency_label: &str) -> Result<()> {
    let settings = db.load_settings()?;
    let session_count = db.counts()?.sessions;
    write_settings(writer, &settings, session_count, currency_label)
}

/// Merges the given values onto the current settings and saves the result.
pub fn set<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &SettingsArgs,
    currency_label: &str,
) -> Result<()> {
    let current = db.load_settings()?;
    let updated = merge(current, args);
    db.save_settings(&updated)?;
    tracing::info!(?updated, "saved monthly settings");

    let session_count = db.counts()?.sessions;
    write_settings(writer, &updated, session_count, currency_label)
}

fn merge(current: MonthlySettings, args: &SettingsArgs) -> MonthlySettings {
    MonthlySettings {
        base_fee: args.base_fee.unwrap_or(current.base_fee),
        consumable_unit_price: args.unit_price.unwrap_or(current.consumable_unit_price),
        consumable_unit_count: args.unit_count.unwrap_or(current.consumable_unit_count),
    }
}

fn write_settings<W: Write>(
    writer: &mut W,
    settings: &MonthlySettings,
    session_count: usize,
    currency_label: &str,
) -> Result<()> {
    let baseline = compute_baseline(settings, session_count);

    writeln!(writer, "Court fee:        {}", format_amount(settings.base_fee, currency_label))?;
    writeln!(
        writer,
        "Shuttlecocks:     {} x {} = {}",
        settings.consumable_unit_count,
        format_amount(settings.consumable_unit_price, currency_label),
        format_amount(settings.consumable_total(), currency_label)
    )?;
    writeln!(writer, "Sessions:         {session_count}")?;
    writeln!(
        writer,
        "Per session:      {} (court {} + shuttlecocks {})",
        format_amount_f64(baseline.per_session_base_cost, currency_label),
        format_amount_f64(baseline.base_fee, currency_label),
        format_amount_f64(baseline.amortized_consumable_share, currency_label)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insta::assert_snapshot;

    #[test]
    fn set_merges_partial_update() {
        let mut db = Database::open_in_memory().unwrap();
        for day in [4, 11, 18, 25] {
            db.add_session(NaiveDate::from_ymd_opt(2025, 3, day).unwrap())
                .unwrap();
        }
        let mut output = Vec::new();
        let args = SettingsArgs {
            base_fee: Some(50_000),
            unit_price: Some(20_000),
            unit_count: Some(3),
        };
        set(&mut output, &mut db, &args, "₫").unwrap();
        output.clear();

        let args = SettingsArgs {
            base_fee: None,
            unit_price: None,
            unit_count: Some(4),
        };
        set(&mut output, &mut db, &args, "₫").unwrap();

        assert_eq!(
            db.load_settings().unwrap(),
            MonthlySettings {
                base_fee: 50_000,
                consumable_unit_price: 20_000,
                consumable_unit_count: 4,
            }
        );
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Court fee:        50.000 ₫
        Shuttlecocks:     4 x 20.000 ₫ = 80.000 ₫
        Sessions:         4
        Per session:      70.000 ₫ (court 50.000 ₫ + shuttlecocks 20.000 ₫)
        ");
    }

    #[test]
    fn show_defaults_with_no_sessions() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        show(&mut output, &db, "").unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Court fee:        0
        Shuttlecocks:     0 x 0 = 0
        Sessions:         0
        Per session:      0 (court 0 + shuttlecocks 0)
        ");
    }
}
