//! Job model

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Record, RecordKind};

/// Status of a backlog job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn all() -> &'static [JobStatus] {
        &[
            Self::Pending,
            Self::InProgress,
            Self::Completed,
            Self::Cancelled,
        ]
    }

    /// Whether a job may move from `self` to `to`
    ///
    /// Staying in the same state is always allowed. An in-progress job may be
    /// handed back to pending when its assignee drops it.
    pub fn can_transition_to(&self, to: JobStatus) -> bool {
        if *self == to {
            return true;
        }
        match self {
            Self::Pending => matches!(to, Self::InProgress | Self::Cancelled),
            Self::InProgress => matches!(to, Self::Completed | Self::Cancelled | Self::Pending),
            Self::Completed | Self::Cancelled => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing JobStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseJobStatusError(String);

impl std::fmt::Display for ParseJobStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown job status: {}", self.0)
    }
}

impl std::error::Error for ParseJobStatusError {}

impl FromStr for JobStatus {
    type Err = ParseJobStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseJobStatusError(s.to_string())),
        }
    }
}

/// Job priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[Self::High, Self::Medium, Self::Low]
    }

    /// Sort rank of an optional priority. Lower ranks are scheduled first;
    /// a job without a priority ranks as low.
    pub fn rank(priority: Option<Priority>) -> u8 {
        match priority.unwrap_or(Self::Low) {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing Priority from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError(String);

impl std::fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown priority: {}", self.0)
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// A unit of backlog work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: JobStatus,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Ids of jobs that must complete before this one can start
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub estimated_hours: f64,
}

impl Job {
    /// New pending job created now, with no dependencies
    pub fn new(id: impl Into<String>, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: JobStatus::Pending,
            priority: Some(priority),
            created_at: Some(Utc::now()),
            dependencies: Vec::new(),
            assignee: None,
            estimated_hours: 0.0,
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Assignee, treating an empty string as unassigned
    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref().filter(|a| !a.is_empty())
    }
}

impl Record for Job {
    const KIND: RecordKind = RecordKind::Jobs;

    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_parses_snake_case() {
        assert_eq!("in_progress".parse::<JobStatus>(), Ok(JobStatus::InProgress));
        assert!("running".parse::<JobStatus>().is_err());
    }

    #[test]
    fn job_status_transitions() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::InProgress));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Pending));
        assert!(JobStatus::Cancelled.can_transition_to(JobStatus::Cancelled));
    }

    #[test]
    fn priority_rank_treats_missing_as_low() {
        assert!(Priority::rank(Some(Priority::High)) < Priority::rank(Some(Priority::Medium)));
        assert!(Priority::rank(Some(Priority::Medium)) < Priority::rank(None));
        assert_eq!(Priority::rank(None), Priority::rank(Some(Priority::Low)));
    }

    #[test]
    fn job_deserializes_with_defaults() {
        let job: Job =
            serde_json::from_str(r#"{"id":"j1","title":"Write docs","status":"pending"}"#)
                .unwrap();
        assert!(job.dependencies.is_empty());
        assert!(job.priority.is_none());
        assert_eq!(job.estimated_hours, 0.0);
    }

    #[test]
    fn job_rejects_unknown_priority() {
        let result = serde_json::from_str::<Job>(
            r#"{"id":"j1","title":"t","status":"pending","priority":"urgent"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_assignee_counts_as_unassigned() {
        let job = Job::new("j1", "t", Priority::Low).with_assignee("");
        assert!(job.assignee().is_none());
    }
}
