//! Agent record and its parts

use std::collections::VecDeque;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::personality::Personality;
use crate::store::{Record, RecordKind};

/// Maximum number of thoughts kept per agent
pub const THOUGHT_LOG_CAPACITY: usize = 50;

/// Agent lifecycle status
///
/// ```text
/// Spawning -> Idle -> Working -> Idle
///                     Working <-> Paused
/// any -> Error   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Spawning,
    Idle,
    Working,
    Paused,
    Completed,
    Error,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spawning => "spawning",
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn all() -> &'static [AgentStatus] {
        &[
            Self::Spawning,
            Self::Idle,
            Self::Working,
            Self::Paused,
            Self::Completed,
            Self::Error,
        ]
    }

    /// Whether an agent in this status can take a new task
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Idle | Self::Completed)
    }

    /// Error has no way out; a new agent is spawned instead
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing AgentStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAgentStatusError(String);

impl std::fmt::Display for ParseAgentStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown agent status: {}", self.0)
    }
}

impl std::error::Error for ParseAgentStatusError {}

impl FromStr for AgentStatus {
    type Err = ParseAgentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spawning" => Ok(Self::Spawning),
            "idle" => Ok(Self::Idle),
            "working" => Ok(Self::Working),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            _ => Err(ParseAgentStatusError(s.to_string())),
        }
    }
}

/// One entry of an agent's thought log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
    pub timestamp: DateTime<Utc>,
    pub thought: String,
}

/// Bounded FIFO log of thoughts; the oldest entry is evicted past capacity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VecDeque<Thought>", into = "VecDeque<Thought>")]
pub struct ThoughtLog {
    entries: VecDeque<Thought>,
}

impl ThoughtLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, thought: impl Into<String>) {
        self.entries.push_back(Thought {
            timestamp,
            thought: thought.into(),
        });
        while self.entries.len() > THOUGHT_LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Thought> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Thought> {
        self.entries.back()
    }
}

impl From<VecDeque<Thought>> for ThoughtLog {
    fn from(mut entries: VecDeque<Thought>) -> Self {
        while entries.len() > THOUGHT_LOG_CAPACITY {
            entries.pop_front();
        }
        Self { entries }
    }
}

impl From<ThoughtLog> for VecDeque<Thought> {
    fn from(log: ThoughtLog) -> Self {
        log.entries
    }
}

/// A finished task in an agent's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub task_id: String,
    pub completed_at: DateTime<Utc>,
    pub success: bool,
    #[serde(default)]
    pub notes: String,
}

/// Running task metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub tasks_completed: u64,
    /// Percentage in [0, 100]
    pub success_rate: f64,
}

impl AgentMetrics {
    /// Count one more finished task and fold it into the running success rate
    pub fn record(&mut self, success: bool) {
        self.tasks_completed += 1;
        let n = self.tasks_completed as f64;
        let outcome = if success { 100.0 } else { 0.0 };
        self.success_rate = (self.success_rate * (n - 1.0) + outcome) / n;
    }
}

/// Persisted state of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub personality: Personality,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub current_task: Option<String>,
    #[serde(default)]
    pub completed_tasks: Vec<CompletedTask>,
    #[serde(default)]
    pub thoughts: ThoughtLog,
    #[serde(default)]
    pub metrics: AgentMetrics,
}

impl AgentRecord {
    /// A freshly spawned agent
    pub fn new(
        id: impl Into<String>,
        personality: Personality,
        current_task: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            personality,
            status: AgentStatus::Spawning,
            created_at: now,
            updated_at: now,
            current_task,
            completed_tasks: Vec::new(),
            thoughts: ThoughtLog::new(),
            metrics: AgentMetrics::default(),
        }
    }

    /// Set the status, logging a transition thought when it actually changes
    pub(crate) fn transition(&mut self, status: AgentStatus, now: DateTime<Utc>) {
        let old = self.status;
        self.status = status;
        self.updated_at = now;
        if old != status {
            self.thoughts
                .push(now, format!("Status changed: {} -> {}", old, status));
        }
    }
}

impl Record for AgentRecord {
    const KIND: RecordKind = RecordKind::Agents;

    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Thought Log Tests ====================

    #[test]
    fn thought_log_never_exceeds_capacity() {
        let mut log = ThoughtLog::new();
        let now = Utc::now();
        for i in 0..120 {
            log.push(now, format!("thought {}", i));
            assert!(log.len() <= THOUGHT_LOG_CAPACITY);
        }

        assert_eq!(log.len(), THOUGHT_LOG_CAPACITY);
        assert_eq!(log.iter().next().unwrap().thought, "thought 70");
        assert_eq!(log.latest().unwrap().thought, "thought 119");
    }

    #[test]
    fn thought_log_trims_oversized_input_on_load() {
        let now = Utc::now();
        let entries: Vec<Thought> = (0..60)
            .map(|i| Thought {
                timestamp: now,
                thought: i.to_string(),
            })
            .collect();
        let json = serde_json::to_string(&entries).unwrap();

        let log: ThoughtLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log.len(), THOUGHT_LOG_CAPACITY);
        assert_eq!(log.iter().next().unwrap().thought, "10");
    }

    // ==================== Metrics Tests ====================

    #[test]
    fn success_rate_is_running_mean() {
        let mut metrics = AgentMetrics::default();

        metrics.record(false);
        assert_eq!(metrics.tasks_completed, 1);
        assert_eq!(metrics.success_rate, 0.0);

        metrics.record(true);
        assert_eq!(metrics.tasks_completed, 2);
        assert_eq!(metrics.success_rate, 50.0);
    }

    #[test]
    fn failure_after_success_lowers_rate() {
        let mut metrics = AgentMetrics::default();
        metrics.record(true);
        metrics.record(false);
        assert_eq!(metrics.success_rate, 50.0);
    }

    // ==================== Status Tests ====================

    #[test]
    fn availability_and_terminal_states() {
        assert!(AgentStatus::Idle.is_available());
        assert!(AgentStatus::Completed.is_available());
        assert!(!AgentStatus::Working.is_available());
        assert!(!AgentStatus::Spawning.is_available());
        assert!(AgentStatus::Error.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AgentStatus::Spawning).unwrap(),
            "\"spawning\""
        );
        assert_eq!("error".parse::<AgentStatus>(), Ok(AgentStatus::Error));
        assert!("ERROR".parse::<AgentStatus>().is_err());
    }

    #[test]
    fn transition_logs_only_real_changes() {
        let now = Utc::now();
        let mut agent = AgentRecord::new("cadet_1", Personality::Cadet, None, now);

        agent.transition(AgentStatus::Idle, now);
        agent.transition(AgentStatus::Idle, now);

        assert_eq!(agent.thoughts.len(), 1);
        assert_eq!(
            agent.thoughts.latest().unwrap().thought,
            "Status changed: spawning -> idle"
        );
    }
}
