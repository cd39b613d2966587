//! Agent activity log
//!
//! A side record of what agents were asked to do and how it went. Entries
//! are appended by the agent manager on assignment and completion and can
//! be updated afterwards by whoever reviews them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::personality::Personality;
use crate::error::StoreError;
use crate::jobs::Priority;
use crate::store::{JsonlStore, Record, RecordKind};

/// Event type tag carried by every entry the manager writes
pub const AGENT_ACTIVITY_EVENT: &str = "agent_activity";

/// Status of an activity entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One activity entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub agent_id: String,
    pub title: String,
    pub description: String,
    pub status: ActivityStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ActivityEntry {
    /// An entry describing something an agent did with a task
    pub fn agent_event(
        agent_id: &str,
        personality: Personality,
        task_id: &str,
        title: String,
        description: String,
        status: ActivityStatus,
        now: DateTime<Utc>,
    ) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "agent_personality".to_string(),
            personality.as_str().to_string(),
        );
        metadata.insert("event_type".to_string(), AGENT_ACTIVITY_EVENT.to_string());

        Self {
            id: Uuid::new_v4().to_string(),
            agent_id: agent_id.to_string(),
            title,
            description,
            status,
            priority: Priority::Medium,
            created_at: now,
            updated_at: now,
            task_id: Some(task_id.to_string()),
            tags: vec!["agent".to_string(), "auto-generated".to_string()],
            metadata,
        }
    }

    /// Entry written when an agent takes a task
    pub fn assigned(
        agent_id: &str,
        personality: Personality,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self::agent_event(
            agent_id,
            personality,
            task_id,
            format!("Task Assigned: {}", task_id),
            format!(
                "Agent {} ({}) started working on task: {}",
                agent_id, personality, task_id
            ),
            ActivityStatus::InProgress,
            now,
        )
    }

    /// Entry written when an agent finishes a task
    pub fn finished(
        agent_id: &str,
        personality: Personality,
        task_id: &str,
        success: bool,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let (title, verb, status) = if success {
            ("Task Completed", "completed", ActivityStatus::Completed)
        } else {
            ("Task Failed", "failed to complete", ActivityStatus::Cancelled)
        };
        Self::agent_event(
            agent_id,
            personality,
            task_id,
            format!("{}: {}", title, task_id),
            format!(
                "Agent {} ({}) {} task: {}. Notes: {}",
                agent_id, personality, verb, task_id, notes
            ),
            status,
            now,
        )
    }
}

impl Record for ActivityEntry {
    const KIND: RecordKind = RecordKind::Activity;

    fn key(&self) -> &str {
        &self.id
    }
}

/// Reader and writer for activity entries
///
/// The file is the source of truth; nothing is cached between calls.
pub struct ActivityLog {
    store: Arc<JsonlStore>,
    lock: Mutex<()>,
}

impl ActivityLog {
    pub fn new(store: Arc<JsonlStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub async fn record(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.store.append(entry).await?;
        debug!(entry_id = %entry.id, agent_id = %entry.agent_id, "Recorded activity");
        Ok(())
    }

    /// Entries newest first, optionally for one agent only
    pub async fn list(&self, agent_id: Option<&str>) -> Result<Vec<ActivityEntry>, StoreError> {
        let mut entries: Vec<ActivityEntry> = self.store.load_all().await?;
        if let Some(agent_id) = agent_id {
            entries.retain(|e| e.agent_id == agent_id);
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Set an entry's status, attaching completion notes when given
    ///
    /// Returns `false` when no entry has that id.
    pub async fn update_status(
        &self,
        entry_id: &str,
        status: ActivityStatus,
        notes: Option<&str>,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries: Vec<ActivityEntry> = self.store.load_all().await?;
        let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) else {
            return Ok(false);
        };

        entry.status = status;
        entry.updated_at = Utc::now();
        if let Some(notes) = notes {
            entry
                .metadata
                .insert("completion_notes".to_string(), notes.to_string());
        }

        self.store.replace_all(entries.as_slice()).await?;
        Ok(true)
    }
}
