//! Core type definitions with validation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a participant, assigned by the record store.
pub type ParticipantId = i64;

/// Identifier of a session, assigned by the record store.
pub type SessionId = i64;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A participant with a case-insensitively equal name is already on the roster.
    #[error("a participant named \"{name}\" already exists")]
    DuplicateName { name: String },

    /// Invalid classification value.
    #[error("invalid classification: {value} (expected \"regular\" or \"drop-in\")")]
    InvalidClassification { value: String },
}

/// How a participant is registered for the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Standing registration; subsidized when drop-ins attend.
    Regular,
    /// Occasional participant paying a fixed surcharge per attended session.
    DropIn,
}

impl Classification {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::DropIn => "drop-in",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" | "fixed" => Ok(Self::Regular),
            "drop-in" | "dropin" | "transient" => Ok(Self::DropIn),
            _ => Err(ValidationError::InvalidClassification {
                value: s.to_string(),
            }),
        }
    }
}

/// A member of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub classification: Classification,
}

impl Participant {
    #[must_use]
    pub const fn is_drop_in(&self) -> bool {
        matches!(self.classification, Classification::DropIn)
    }
}

/// A dated court session.
///
/// `participants` may contain identifiers of participants that have since been
/// removed from the roster. Allocation ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub label: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
    /// Miscellaneous extra cost for the day.
    #[serde(default)]
    pub incidental_fee: Option<i64>,
    /// Water/drinks cost for the day.
    #[serde(default)]
    pub consumable_fee: Option<i64>,
}

impl Session {
    /// Incidental fee with absent or negative values treated as zero.
    #[must_use]
    pub fn incidental_fee_or_zero(&self) -> i64 {
        self.incidental_fee.unwrap_or(0).max(0)
    }

    /// Consumable fee with absent or negative values treated as zero.
    #[must_use]
    pub fn consumable_fee_or_zero(&self) -> i64 {
        self.consumable_fee.unwrap_or(0).max(0)
    }
}

/// Derives the display label for a session held on `date`, e.g. `Mar 7`.
#[must_use]
pub fn session_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Period-level cost settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlySettings {
    /// Court rental, charged once per session.
    pub base_fee: i64,
    /// Price of a single shuttlecock.
    pub consumable_unit_price: i64,
    /// Shuttlecocks bought for the whole period.
    pub consumable_unit_count: i64,
}

impl MonthlySettings {
    /// Returns a copy with every negative value clamped to zero.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            base_fee: self.base_fee.max(0),
            consumable_unit_price: self.consumable_unit_price.max(0),
            consumable_unit_count: self.consumable_unit_count.max(0),
        }
    }

    /// Total equipment spend for the period.
    #[must_use]
    pub fn consumable_total(&self) -> i64 {
        let clamped = self.clamped();
        clamped
            .consumable_unit_price
            .saturating_mul(clamped.consumable_unit_count)
    }
}

/// Where participants send their money.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentInfo {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub wallet_number: String,
    /// Path or URL of a QR code image for the wallet.
    pub wallet_qr_image: String,
}

impl PaymentInfo {
    /// True when no payment detail has been filled in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bank_name.is_empty()
            && self.account_number.is_empty()
            && self.account_holder.is_empty()
            && self.wallet_number.is_empty()
            && self.wallet_qr_image.is_empty()
    }
}
