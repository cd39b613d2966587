//! TimeTracker: persisted work sessions

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::types::{JobTime, SessionStatus, TimeSession};
use crate::error::TrackerError;
use crate::store::JsonlStore;

/// Owns every time session
pub struct TimeTracker {
    store: Arc<JsonlStore>,
    sessions: Mutex<Vec<TimeSession>>,
}

impl TimeTracker {
    pub async fn open(store: Arc<JsonlStore>) -> Result<Self, TrackerError> {
        let sessions: Vec<TimeSession> = store.load_all().await?;
        debug!(count = sessions.len(), "Loaded time sessions");
        Ok(Self {
            store,
            sessions: Mutex::new(sessions),
        })
    }

    /// Start a session on `job_id` and return its id
    pub async fn start(
        &self,
        job_id: &str,
        agent: &str,
        description: &str,
    ) -> Result<String, TrackerError> {
        self.start_at(job_id, agent, description, Utc::now()).await
    }

    /// Start a session at `now`
    ///
    /// Other active sessions on the same job are allowed; they are only
    /// logged as a warning.
    pub async fn start_at(
        &self,
        job_id: &str,
        agent: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TrackerError> {
        let mut sessions = self.sessions.lock().await;

        let concurrent = sessions
            .iter()
            .filter(|s| s.job_id == job_id && s.status == SessionStatus::Active)
            .count();
        if concurrent > 0 {
            warn!(job_id = %job_id, active = concurrent, "Job already has active sessions");
        }

        let session_id = unique_session_id(&sessions, job_id, now);
        let session = TimeSession::new(session_id.clone(), job_id, agent, description, now);
        self.store.append(&session).await?;
        sessions.push(session);

        info!(session_id = %session_id, job_id = %job_id, agent = %agent, "Started session");
        Ok(session_id)
    }

    pub async fn pause(&self, session_id: &str) -> Result<(), TrackerError> {
        self.pause_at(session_id, Utc::now()).await
    }

    pub async fn pause_at(&self, session_id: &str, now: DateTime<Utc>) -> Result<(), TrackerError> {
        self.with_session(session_id, |s| s.pause(now)).await?;
        debug!(session_id = %session_id, "Paused session");
        Ok(())
    }

    pub async fn resume(&self, session_id: &str) -> Result<(), TrackerError> {
        self.resume_at(session_id, Utc::now()).await
    }

    pub async fn resume_at(&self, session_id: &str, now: DateTime<Utc>) -> Result<(), TrackerError> {
        self.with_session(session_id, |s| s.resume(now)).await?;
        debug!(session_id = %session_id, "Resumed session");
        Ok(())
    }

    /// Complete a session and return it
    pub async fn end(&self, session_id: &str, notes: &str) -> Result<TimeSession, TrackerError> {
        self.end_at(session_id, notes, Utc::now()).await
    }

    pub async fn end_at(
        &self,
        session_id: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<TimeSession, TrackerError> {
        let session = self
            .with_session(session_id, |s| {
                s.end(now, notes)?;
                Ok(s.clone())
            })
            .await?;

        info!(
            session_id = %session_id,
            duration_seconds = session.duration_seconds.unwrap_or_default(),
            "Ended session"
        );
        Ok(session)
    }

    pub async fn cancel(&self, session_id: &str) -> Result<(), TrackerError> {
        self.cancel_at(session_id, Utc::now()).await
    }

    pub async fn cancel_at(&self, session_id: &str, now: DateTime<Utc>) -> Result<(), TrackerError> {
        self.with_session(session_id, |s| s.cancel(now)).await?;
        info!(session_id = %session_id, "Cancelled session");
        Ok(())
    }

    /// Time spent on `job_id` so far
    pub async fn job_time(&self, job_id: &str) -> JobTime {
        self.job_time_at(job_id, Utc::now()).await
    }

    pub async fn job_time_at(&self, job_id: &str, now: DateTime<Utc>) -> JobTime {
        JobTime::compute(job_id, self.sessions.lock().await.iter(), now)
    }

    /// One entry per job id, in order of first appearance
    pub async fn all_job_times(&self) -> Vec<JobTime> {
        self.all_job_times_at(Utc::now()).await
    }

    pub async fn all_job_times_at(&self, now: DateTime<Utc>) -> Vec<JobTime> {
        let sessions = self.sessions.lock().await;
        let mut job_ids: Vec<&str> = Vec::new();
        for session in sessions.iter() {
            if !job_ids.contains(&session.job_id.as_str()) {
                job_ids.push(&session.job_id);
            }
        }

        job_ids
            .into_iter()
            .map(|job_id| JobTime::compute(job_id, sessions.iter(), now))
            .collect()
    }

    pub async fn active_sessions(&self) -> Vec<TimeSession> {
        self.sessions
            .lock()
            .await
            .iter()
            .filter(|s| s.status == SessionStatus::Active)
            .cloned()
            .collect()
    }

    pub async fn job_sessions(&self, job_id: &str) -> Vec<TimeSession> {
        self.sessions
            .lock()
            .await
            .iter()
            .filter(|s| s.job_id == job_id)
            .cloned()
            .collect()
    }

    pub async fn get(&self, session_id: &str) -> Option<TimeSession> {
        self.sessions
            .lock()
            .await
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned()
    }

    pub async fn list(&self) -> Vec<TimeSession> {
        self.sessions.lock().await.clone()
    }

    /// Apply `f` to one session and write the set back
    ///
    /// The session is left untouched when `f` or the write fails.
    async fn with_session<F, R>(&self, session_id: &str, f: F) -> Result<R, TrackerError>
    where
        F: FnOnce(&mut TimeSession) -> Result<R, TrackerError>,
    {
        let mut sessions = self.sessions.lock().await;
        let idx = sessions
            .iter()
            .position(|s| s.session_id == session_id)
            .ok_or_else(|| TrackerError::NotFound(session_id.to_string()))?;

        let before = sessions[idx].clone();
        let result = match f(&mut sessions[idx]) {
            Ok(result) => result,
            Err(e) => {
                sessions[idx] = before;
                return Err(e);
            }
        };

        if sessions[idx] == before {
            return Ok(result);
        }
        if let Err(e) = self.store.replace_all(sessions.as_slice()).await {
            sessions[idx] = before;
            return Err(e.into());
        }
        Ok(result)
    }
}

/// `{job_id}_{micros}`, suffixed `-{n}` if that id is taken
fn unique_session_id(sessions: &[TimeSession], job_id: &str, now: DateTime<Utc>) -> String {
    let base = format!("{}_{}", job_id, now.timestamp_micros());
    let taken = |id: &str| sessions.iter().any(|s| s.session_id == id);
    if !taken(&base) {
        return base;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
