//! Payment commands for the bank and wallet details shown with the report.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use court_core::PaymentInfo;
use court_db::Database;

use crate::PaymentArgs;

/// Shows the stored payment details.
pub fn show<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let info = db.load_payment_info()?;
    write!(writer, "{}", format_payment(&info))?;
    Ok(())
}

/// Merges the given values onto the stored payment details and saves them.
pub fn set<W: Write>(writer: &mut W, db: &mut Database, args: &PaymentArgs) -> Result<()> {
    let current = db.load_payment_info()?;
    let updated = merge(current, args);
    db.save_payment_info(&updated)?;
    tracing::info!("saved payment details");
    write!(writer, "{}", format_payment(&updated))?;
    Ok(())
}

fn merge(current: PaymentInfo, args: &PaymentArgs) -> PaymentInfo {
    let pick = |new: &Option<String>, old: String| new.clone().unwrap_or(old);
    PaymentInfo {
        bank_name: pick(&args.bank_name, current.bank_name),
        account_number: pick(&args.account_number, current.account_number),
        account_holder: pick(&args.account_holder, current.account_holder),
        wallet_number: pick(&args.wallet_number, current.wallet_number),
        wallet_qr_image: pick(&args.wallet_qr, current.wallet_qr_image),
    }
}

/// Formats payment details, skipping fields that were never filled in.
pub fn format_payment(info: &PaymentInfo) -> String {
    let mut output = String::new();

    writeln!(output, "PAYMENT").unwrap();
    if info.is_empty() {
        writeln!(output, "No payment details set.").unwrap();
        writeln!(
            output,
            "Hint: Run 'court payment set --bank-name <bank> --account-number <number>'."
        )
        .unwrap();
        return output;
    }

    let rows = [
        ("Bank", &info.bank_name),
        ("Account", &info.account_number),
        ("Holder", &info.account_holder),
        ("Wallet", &info.wallet_number),
        ("QR code", &info.wallet_qr_image),
    ];
    for (label, value) in rows {
        if !value.is_empty() {
            writeln!(output, "{:<9}{value}", format!("{label}:")).unwrap();
        }
    }

    output
}
