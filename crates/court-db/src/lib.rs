//! Storage layer for court session splitting.
//!
//! Provides persistence for the roster, sessions and settings using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Writes are last-writer-wins.
//!
//! # Schema
//!
//! ## Attendance
//!
//! `session_participants` deliberately has no foreign key to `participants`.
//! Removing a participant leaves their attendance rows in place; allocation
//! ignores identifiers that are no longer on the roster.
//!
//! ## Settings
//!
//! The `settings` table is a key/value store of JSON documents. Each document
//! (`monthly`, `payment`) is replaced wholesale on save. Missing keys load as
//! defaults, and unknown fields in stored documents are ignored.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, SecondsFormat, Utc};
use court_core::roster::validate_new_participant;
use court_core::{
    Classification, MonthlySettings, Participant, ParticipantId, PaymentInfo, Session, SessionId,
    Snapshot, ValidationError, session_label,
};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

const MONTHLY_SETTINGS_KEY: &str = "monthly";
const PAYMENT_INFO_KEY: &str = "payment";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A roster mutation was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No session with the given id.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    /// An attendance list referenced someone not on the roster.
    #[error("participant {0} is not on the roster")]
    UnknownParticipant(ParticipantId),
    /// A stored value could not be decoded.
    #[error("invalid stored data for {key}: {message}")]
    InvalidData { key: String, message: String },
    /// A settings document could not be encoded or decoded.
    #[error("invalid settings document {key}")]
    SettingsJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Row counts for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub participants: usize,
    pub sessions: usize,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS participants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                classification TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_participants_name
                ON participants(name COLLATE NOCASE);

            -- date: ISO 8601 calendar date (e.g., '2025-03-07')
            -- fees: NULL when never set
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                date TEXT NOT NULL,
                incidental_fee INTEGER,
                consumable_fee INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);

            CREATE TABLE IF NOT EXISTS session_participants (
                session_id INTEGER NOT NULL,
                participant_id INTEGER NOT NULL,
                PRIMARY KEY (session_id, participant_id),
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // ========== Participants ==========

    /// Adds a participant to the roster.
    ///
    /// Rejects blank names and names matching an existing participant
    /// case-insensitively.
    pub fn add_participant(
        &mut self,
        name: &str,
        classification: Classification,
    ) -> Result<Participant, DbError> {
        let existing = self.list_participants()?;
        let name = validate_new_participant(&existing, name)?;

        self.conn.execute(
            "INSERT INTO participants (name, classification, created_at) VALUES (?, ?, ?)",
            params![name, classification.as_str(), now()],
        )?;
        let participant = Participant {
            id: self.conn.last_insert_rowid(),
            name,
            classification,
        };
        tracing::debug!(id = participant.id, name = %participant.name, "added participant");
        Ok(participant)
    }

    /// Removes a participant from the roster.
    ///
    /// Attendance rows that reference the participant are kept. Returns
    /// whether a participant was removed.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM participants WHERE id = ?", [id])?;
        tracing::debug!(id, removed, "remove participant");
        Ok(removed > 0)
    }

    /// Lists the roster ordered by ID.
    pub fn list_participants(&self) -> Result<Vec<Participant>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, classification FROM participants ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut participants = Vec::new();
        for row in rows {
            let (id, name, classification) = row?;
            let classification =
                classification
                    .parse::<Classification>()
                    .map_err(|err| DbError::InvalidData {
                        key: format!("participant {id}"),
                        message: err.to_string(),
                    })?;
            participants.push(Participant {
                id,
                name,
                classification,
            });
        }
        Ok(participants)
    }

    // ========== Sessions ==========

    /// Adds a session held on `date` with nobody attending yet.
    pub fn add_session(&mut self, date: NaiveDate) -> Result<Session, DbError> {
        let label = session_label(date);
        self.conn.execute(
            "INSERT INTO sessions (label, date, created_at) VALUES (?, ?, ?)",
            params![label, format_date(date), now()],
        )?;
        let session = Session {
            id: self.conn.last_insert_rowid(),
            label,
            date,
            participants: Vec::new(),
            incidental_fee: None,
            consumable_fee: None,
        };
        tracing::debug!(id = session.id, %date, "added session");
        Ok(session)
    }

    /// Removes a session and its attendance. Returns whether a session was removed.
    pub fn remove_session(&mut self, id: SessionId) -> Result<bool, DbError> {
        let removed = self.conn.execute("DELETE FROM sessions WHERE id = ?", [id])?;
        tracing::debug!(id, removed, "remove session");
        Ok(removed > 0)
    }

    /// Replaces the set of participants attending a session.
    ///
    /// Every identifier must be on the roster at the time of the call.
    pub fn set_session_participants(
        &mut self,
        id: SessionId,
        participants: &[ParticipantId],
    ) -> Result<(), DbError> {
        self.ensure_session(id)?;
        let roster = self.list_participants()?;
        if let Some(unknown) = participants
            .iter()
            .find(|pid| !roster.iter().any(|p| p.id == **pid))
        {
            return Err(DbError::UnknownParticipant(*unknown));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM session_participants WHERE session_id = ?",
            [id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO session_participants (session_id, participant_id) VALUES (?, ?)",
            )?;
            for pid in participants {
                stmt.execute(params![id, pid])?;
            }
        }
        tx.commit()?;
        tracing::debug!(id, count = participants.len(), "updated session participants");
        Ok(())
    }

    /// Updates a session's day fees. `None` leaves the stored value unchanged.
    pub fn set_session_fees(
        &mut self,
        id: SessionId,
        incidental_fee: Option<i64>,
        consumable_fee: Option<i64>,
    ) -> Result<(), DbError> {
        self.ensure_session(id)?;
        self.conn.execute(
            "
            UPDATE sessions
            SET incidental_fee = COALESCE(?, incidental_fee),
                consumable_fee = COALESCE(?, consumable_fee)
            WHERE id = ?
            ",
            params![incidental_fee, consumable_fee, id],
        )?;
        tracing::debug!(id, ?incidental_fee, ?consumable_fee, "updated session fees");
        Ok(())
    }

    /// Lists sessions ordered by ID, with their attendance.
    pub fn list_sessions(&self) -> Result<Vec<Session>, DbError> {
        let attendance = self.attendance()?;
        let mut stmt = self.conn.prepare(
            "
            SELECT id, label, date, incidental_fee, consumable_fee
            FROM sessions
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SessionRow {
                id: row.get(0)?,
                label: row.get(1)?,
                date: row.get(2)?,
                incidental_fee: row.get(3)?,
                consumable_fee: row.get(4)?,
            })
        })?;
        let mut sessions = Vec::new();
        for row in rows {
            let row = row?;
            let date = parse_date(&row.date, row.id)?;
            sessions.push(Session {
                id: row.id,
                label: row.label,
                date,
                participants: attendance.get(&row.id).cloned().unwrap_or_default(),
                incidental_fee: row.incidental_fee,
                consumable_fee: row.consumable_fee,
            });
        }
        Ok(sessions)
    }

    fn attendance(&self) -> Result<HashMap<SessionId, Vec<ParticipantId>>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT session_id, participant_id
            FROM session_participants
            ORDER BY session_id ASC, participant_id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let session_id: i64 = row.get(0)?;
            let participant_id: i64 = row.get(1)?;
            Ok((session_id, participant_id))
        })?;
        let mut attendance: HashMap<SessionId, Vec<ParticipantId>> = HashMap::new();
        for row in rows {
            let (session_id, participant_id) = row?;
            attendance.entry(session_id).or_default().push(participant_id);
        }
        Ok(attendance)
    }

    fn ensure_session(&self, id: SessionId) -> Result<(), DbError> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM sessions WHERE id = ?", [id], |row| row.get(0))
            .optional()?;
        found.map(|_| ()).ok_or(DbError::SessionNotFound(id))
    }

    // ========== Settings ==========

    /// Loads the monthly cost settings, or defaults if never saved.
    pub fn load_settings(&self) -> Result<MonthlySettings, DbError> {
        self.load_document(MONTHLY_SETTINGS_KEY)
    }

    /// Replaces the monthly cost settings.
    pub fn save_settings(&mut self, settings: &MonthlySettings) -> Result<(), DbError> {
        self.save_document(MONTHLY_SETTINGS_KEY, settings)
    }

    /// Loads the payment details, or empty details if never saved.
    pub fn load_payment_info(&self) -> Result<PaymentInfo, DbError> {
        self.load_document(PAYMENT_INFO_KEY)
    }

    /// Replaces the payment details.
    pub fn save_payment_info(&mut self, info: &PaymentInfo) -> Result<(), DbError> {
        self.save_document(PAYMENT_INFO_KEY, info)
    }

    fn load_document<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, DbError> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(value) = value else {
            return Ok(T::default());
        };
        serde_json::from_str(&value).map_err(|source| DbError::SettingsJson {
            key: key.to_string(),
            source,
        })
    }

    fn save_document<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value).map_err(|source| DbError::SettingsJson {
            key: key.to_string(),
            source,
        })?;
        self.conn.execute(
            "
            INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, json, now()],
        )?;
        tracing::debug!(key, "saved settings document");
        Ok(())
    }

    // ========== Queries ==========

    /// Captures the roster, sessions and monthly settings for cost calculation.
    pub fn snapshot(&self) -> Result<Snapshot, DbError> {
        Ok(Snapshot {
            participants: self.list_participants()?,
            sessions: self.list_sessions()?,
            settings: self.load_settings()?,
        })
    }

    /// Counts roster and session rows.
    pub fn counts(&self) -> Result<RecordCounts, DbError> {
        let participants: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM participants", [], |row| row.get(0))?;
        let sessions: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(RecordCounts {
            participants: usize::try_from(participants).unwrap_or_default(),
            sessions: usize::try_from(sessions).unwrap_or_default(),
        })
    }
}

#[derive(Debug)]
struct SessionRow {
    id: SessionId,
    label: String,
    date: String,
    incidental_fee: Option<i64>,
    consumable_fee: Option<i64>,
}

fn parse_date(date: &str, session_id: SessionId) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|err| DbError::InvalidData {
        key: format!("session {session_id}"),
        message: format!("invalid date {date}: {err}"),
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
