//! Time session model and its state machine

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::store::{Record, RecordKind};

/// Session status
///
/// ```text
/// Active -> Paused -> Active
/// Active | Paused -> Completed | Cancelled   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing SessionStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSessionStatusError(String);

impl std::fmt::Display for ParseSessionStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown session status: {}", self.0)
    }
}

impl std::error::Error for ParseSessionStatusError {}

impl FromStr for SessionStatus {
    type Err = ParseSessionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseSessionStatusError(s.to_string())),
        }
    }
}

/// One pause interval; `pause_end` is unset while the pause is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRecord {
    pub pause_start: DateTime<Utc>,
    #[serde(default)]
    pub pause_end: Option<DateTime<Utc>>,
}

/// A timed interval of work on one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSession {
    pub session_id: String,
    pub job_id: String,
    pub agent: String,
    #[serde(default)]
    pub description: String,
    pub status: SessionStatus,
    pub start_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub end_timestamp: Option<DateTime<Utc>>,
    /// Worked seconds, excluding pauses. Set on completion only.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    /// Cumulative paused seconds, updated when a pause closes
    #[serde(default)]
    pub paused_time: f64,
    #[serde(default)]
    pub pauses: Vec<PauseRecord>,
    #[serde(default)]
    pub notes: String,
}

impl TimeSession {
    pub fn new(
        session_id: impl Into<String>,
        job_id: impl Into<String>,
        agent: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            job_id: job_id.into(),
            agent: agent.into(),
            description: description.into(),
            status: SessionStatus::Active,
            start_timestamp: now,
            end_timestamp: None,
            duration_seconds: None,
            paused_time: 0.0,
            pauses: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        self.expect(SessionStatus::Active)?;
        self.pauses.push(PauseRecord {
            pause_start: now,
            pause_end: None,
        });
        self.status = SessionStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        self.expect(SessionStatus::Paused)?;
        if let Some(open) = self.pauses.iter_mut().rev().find(|p| p.pause_end.is_none()) {
            open.pause_end = Some(now);
            self.paused_time += seconds_between(open.pause_start, now);
        }
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Complete the session, closing an open pause first
    pub fn end(&mut self, now: DateTime<Utc>, notes: &str) -> Result<(), TrackerError> {
        if self.status == SessionStatus::Paused {
            self.resume(now)?;
        }
        self.expect(SessionStatus::Active)?;

        self.status = SessionStatus::Completed;
        self.end_timestamp = Some(now);
        self.duration_seconds =
            Some(seconds_between(self.start_timestamp, now) - self.paused_time);
        self.notes = notes.to_string();
        Ok(())
    }

    /// Abandon the session; no duration is recorded
    ///
    /// Cancelling a cancelled session succeeds and changes nothing.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        match self.status {
            SessionStatus::Cancelled => return Ok(()),
            SessionStatus::Completed => {
                return Err(TrackerError::InvalidState {
                    expected: "active or paused".to_string(),
                    actual: self.status.to_string(),
                });
            }
            SessionStatus::Active | SessionStatus::Paused => {}
        }
        self.status = SessionStatus::Cancelled;
        self.end_timestamp = Some(now);
        Ok(())
    }

    /// Seconds worked so far on an active session
    pub fn live_seconds(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(self.start_timestamp, now) - self.paused_time
    }

    fn expect(&self, expected: SessionStatus) -> Result<(), TrackerError> {
        if self.status != expected {
            return Err(TrackerError::InvalidState {
                expected: expected.to_string(),
                actual: self.status.to_string(),
            });
        }
        Ok(())
    }
}

impl Record for TimeSession {
    const KIND: RecordKind = RecordKind::Sessions;

    fn key(&self) -> &str {
        &self.session_id
    }
}

/// Cumulative time on one job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobTime {
    pub job_id: String,
    pub total_seconds: f64,
    pub total_hours: f64,
    pub completed_sessions: usize,
    pub active_sessions: usize,
    /// `H:MM:SS`
    pub formatted: String,
}

impl JobTime {
    /// Total completed time plus live time of active sessions for `job_id`
    ///
    /// Paused sessions add nothing until resumed and ended.
    pub fn compute<'a>(
        job_id: &str,
        sessions: impl IntoIterator<Item = &'a TimeSession>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut total_seconds = 0.0;
        let mut completed_sessions = 0;
        let mut active_sessions = 0;

        for session in sessions.into_iter().filter(|s| s.job_id == job_id) {
            match session.status {
                SessionStatus::Completed => {
                    if let Some(duration) = session.duration_seconds {
                        total_seconds += duration;
                        completed_sessions += 1;
                    }
                }
                SessionStatus::Active => {
                    total_seconds += session.live_seconds(now);
                    active_sessions += 1;
                }
                SessionStatus::Paused | SessionStatus::Cancelled => {}
            }
        }

        Self {
            job_id: job_id.to_string(),
            total_seconds,
            total_hours: total_seconds / 3600.0,
            completed_sessions,
            active_sessions,
            formatted: format_duration(total_seconds),
        }
    }
}

/// Render whole seconds as `H:MM:SS`; hours are not wrapped at 24
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}
