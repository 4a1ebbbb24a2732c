//! Cost allocation algorithm.
//!
//! Splits each session's cost among the participants who attended it.
//!
//! # Algorithm Summary
//!
//! 1. Resolve who attended each session against the current roster
//! 2. Split the session total (baseline + day fees) evenly among attendees
//! 3. Drop-ins pay a fixed surcharge on top of the even split; when regulars
//!    attended too, the surcharge revenue is credited back to them evenly
//! 4. Round each share to whole currency units and sum per participant
//!
//! Sessions are independent of each other. Attendance entries that point at
//! participants no longer on the roster are ignored.

use std::collections::HashSet;

use serde::Serialize;

use crate::baseline::SessionBaseline;
use crate::types::{Participant, ParticipantId, Session, SessionId};

/// Extra amount a drop-in pays for every session attended.
pub const DROP_IN_SURCHARGE: i64 = 10_000;

/// One participant's cost for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionShare {
    pub session_id: SessionId,
    pub session_label: String,
    /// Rounded cost; zero when the participant did not attend.
    pub cost: i64,
    pub participated: bool,
}

/// Everything one participant owes for the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub participant: Participant,

    /// Average over the sessions actually attended (0 if none).
    pub cost_per_session: i64,

    /// Sum of the rounded per-session costs.
    pub total_cost: i64,

    /// One entry per session, in input order, attended or not.
    pub sessions: Vec<SessionShare>,
}

impl CostBreakdown {
    /// Number of sessions this participant attended.
    pub fn attended_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.participated).count()
    }
}

/// Resolved attendance and raw shares for a session with at least one attendee.
#[derive(Debug)]
struct SessionCharge {
    attending: HashSet<ParticipantId>,
    regular_share: f64,
    drop_in_share: f64,
}

impl SessionCharge {
    fn share_for(&self, participant: &Participant) -> Option<f64> {
        if !self.attending.contains(&participant.id) {
            return None;
        }
        if participant.is_drop_in() {
            Some(self.drop_in_share)
        } else {
            Some(self.regular_share)
        }
    }
}

/// Total cost of a session: the shared baseline plus that day's fees.
#[allow(clippy::cast_precision_loss)]
pub fn session_total_cost(baseline: &SessionBaseline, session: &Session) -> f64 {
    baseline.per_session_base_cost
        + session.incidental_fee_or_zero() as f64
        + session.consumable_fee_or_zero() as f64
}

/// Sum of every participant's total cost.
pub fn total_collected(breakdowns: &[CostBreakdown]) -> i64 {
    breakdowns
        .iter()
        .map(|b| b.total_cost)
        .fold(0_i64, i64::saturating_add)
}

/// Calculate each participant's cost breakdown.
///
/// Returns one entry per participant, in roster order. An empty roster or an
/// empty session list yields an empty result. Never fails: sessions nobody
/// attended cost nothing.
pub fn allocate(
    participants: &[Participant],
    sessions: &[Session],
    baseline: &SessionBaseline,
) -> Vec<CostBreakdown> {
    if participants.is_empty() || sessions.is_empty() {
        return Vec::new();
    }

    let charges: Vec<Option<SessionCharge>> = sessions
        .iter()
        .map(|session| charge_session(participants, session, baseline))
        .collect();

    participants
        .iter()
        .map(|participant| {
            let shares: Vec<SessionShare> = sessions
                .iter()
                .zip(&charges)
                .map(|(session, charge)| {
                    let raw = charge.as_ref().and_then(|c| c.share_for(participant));
                    SessionShare {
                        session_id: session.id,
                        session_label: session.label.clone(),
                        cost: raw.map_or(0, round_to_unit),
                        participated: raw.is_some(),
                    }
                })
                .collect();
            summarize(participant.clone(), shares)
        })
        .collect()
}

/// Work out the raw shares for one session, or `None` if nobody on the
/// roster attended.
#[allow(clippy::cast_precision_loss)]
fn charge_session(
    participants: &[Participant],
    session: &Session,
    baseline: &SessionBaseline,
) -> Option<SessionCharge> {
    let listed: HashSet<ParticipantId> = session.participants.iter().copied().collect();
    let attendees: Vec<&Participant> = participants
        .iter()
        .filter(|p| listed.contains(&p.id))
        .collect();

    let stale = listed.len().saturating_sub(attendees.len());
    if stale > 0 {
        tracing::debug!(
            session_id = session.id,
            stale,
            "ignoring attendance of participants no longer on the roster"
        );
    }

    if attendees.is_empty() {
        tracing::debug!(session_id = session.id, "session has no attendees");
        return None;
    }

    let drop_ins = attendees.iter().filter(|p| p.is_drop_in()).count();
    let regulars = attendees.len() - drop_ins;
    let surcharge = DROP_IN_SURCHARGE as f64;

    let equal_share = session_total_cost(baseline, session) / attendees.len() as f64;
    let regular_share = if drop_ins > 0 && regulars > 0 {
        equal_share - (drop_ins as f64 * surcharge) / regulars as f64
    } else {
        equal_share
    };
    if regulars == 0 {
        // Nobody to credit the surcharge back to, so the session over-collects.
        tracing::debug!(
            session_id = session.id,
            drop_ins,
            "session attended by drop-ins only"
        );
    }

    Some(SessionCharge {
        attending: attendees.iter().map(|p| p.id).collect(),
        regular_share,
        drop_in_share: equal_share + surcharge,
    })
}

fn summarize(participant: Participant, sessions: Vec<SessionShare>) -> CostBreakdown {
    let total_cost = sessions
        .iter()
        .map(|s| s.cost)
        .fold(0_i64, i64::saturating_add);
    let attended = sessions.iter().filter(|s| s.participated).count();
    let cost_per_session = if attended > 0 {
        #[allow(clippy::cast_precision_loss)]
        let average = total_cost as f64 / attended as f64;
        round_to_unit(average)
    } else {
        0
    };

    CostBreakdown {
        participant,
        cost_per_session,
        total_cost,
        sessions,
    }
}

/// Round half away from zero to whole currency units.
#[allow(clippy::cast_possible_truncation)]
fn round_to_unit(amount: f64) -> i64 {
    amount.round() as i64
}
