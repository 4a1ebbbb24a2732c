//! Core domain logic for court session cost splitting.
//!
//! This crate contains the fundamental types and logic for:
//! - Baseline: amortizing period-level equipment cost across sessions
//! - Allocation: splitting each session's cost among its attendees
//! - Roster: validating participant additions

mod allocation;
mod baseline;
pub mod roster;
mod snapshot;
pub mod types;

pub use allocation::{
    CostBreakdown, DROP_IN_SURCHARGE, SessionShare, allocate, session_total_cost, total_collected,
};
pub use baseline::{SessionBaseline, compute_baseline};
pub use snapshot::Snapshot;
pub use types::{
    Classification, MonthlySettings, Participant, ParticipantId, PaymentInfo, Session, SessionId,
    ValidationError, session_label,
};
