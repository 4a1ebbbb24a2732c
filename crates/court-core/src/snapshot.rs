//! Point-in-time view of the persisted records.

use serde::{Deserialize, Serialize};

use crate::allocation::{CostBreakdown, allocate};
use crate::baseline::{SessionBaseline, compute_baseline};
use crate::types::{MonthlySettings, Participant, Session};

/// Everything the cost calculation reads, captured at one moment.
///
/// Callers rebuild a snapshot whenever the underlying records change and
/// recompute from it; nothing here is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub participants: Vec<Participant>,
    pub sessions: Vec<Session>,
    pub settings: MonthlySettings,
}

impl Snapshot {
    /// Baseline cost of each session in this snapshot's period.
    pub fn baseline(&self) -> SessionBaseline {
        compute_baseline(&self.settings, self.sessions.len())
    }

    /// Per-participant cost breakdown for the period.
    pub fn breakdown(&self) -> Vec<CostBreakdown> {
        allocate(&self.participants, &self.sessions, &self.baseline())
    }
}
