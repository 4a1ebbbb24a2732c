//! Per-session baseline cost.
//!
//! Shuttlecocks are bought for the whole period, so their cost is spread
//! evenly over however many sessions were held. The court fee is charged
//! once per session.

use serde::Serialize;

use crate::types::MonthlySettings;

/// Shared cost attributable to a single session before day-specific fees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionBaseline {
    /// Court rental for one session.
    pub base_fee: f64,

    /// This session's slice of the period's equipment spend.
    pub amortized_consumable_share: f64,

    /// `base_fee + amortized_consumable_share`.
    pub per_session_base_cost: f64,
}

/// Compute the baseline cost of one session.
///
/// Negative settings are clamped to zero. With no sessions the equipment
/// share is zero rather than undefined.
#[allow(clippy::cast_precision_loss)]
pub fn compute_baseline(settings: &MonthlySettings, session_count: usize) -> SessionBaseline {
    let settings = settings.clamped();
    let base_fee = settings.base_fee as f64;
    let amortized_consumable_share = if session_count > 0 {
        settings.consumable_total() as f64 / session_count as f64
    } else {
        0.0
    };

    SessionBaseline {
        base_fee,
        amortized_consumable_share,
        per_session_base_cost: base_fee + amortized_consumable_share,
    }
}
