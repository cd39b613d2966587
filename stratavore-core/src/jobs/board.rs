//! JobBoard: the persisted job backlog

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::{Job, JobStatus, Priority};
use crate::error::JobError;
use crate::store::JsonlStore;

/// The job backlog, loaded from and written back to the record store
///
/// The in-memory list is the source of truth while the board is open. Every
/// mutation runs load-mutate-store under one lock.
pub struct JobBoard {
    store: Arc<JsonlStore>,
    jobs: Mutex<Vec<Job>>,
}

impl JobBoard {
    /// Load the backlog from `store`
    pub async fn open(store: Arc<JsonlStore>) -> Result<Self, JobError> {
        let jobs: Vec<Job> = store.load_all().await?;
        debug!(count = jobs.len(), "Loaded jobs");
        Ok(Self {
            store,
            jobs: Mutex::new(jobs),
        })
    }

    /// Snapshot of every job, in file order
    pub async fn list(&self) -> Vec<Job> {
        self.jobs.lock().await.clone()
    }

    pub async fn get(&self, job_id: &str) -> Option<Job> {
        self.jobs
            .lock()
            .await
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
    }

    /// Add a new job to the backlog
    pub async fn add(&self, job: Job) -> Result<(), JobError> {
        if !job.estimated_hours.is_finite() || job.estimated_hours < 0.0 {
            return Err(JobError::InvalidEstimate {
                job_id: job.id,
                hours: job.estimated_hours,
            });
        }

        let mut jobs = self.jobs.lock().await;
        if jobs.iter().any(|j| j.id == job.id) {
            return Err(JobError::Duplicate(job.id));
        }

        self.store.append(&job).await?;
        info!(job_id = %job.id, "Added job");
        jobs.push(job);
        Ok(())
    }

    /// Move a job to `status`, rejecting transitions the lifecycle forbids
    pub async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<(), JobError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        if !job.status.can_transition_to(status) {
            return Err(JobError::InvalidTransition {
                from: job.status.to_string(),
                to: status.to_string(),
            });
        }

        let previous = job.status;
        job.status = status;
        if let Err(e) = self.store.replace_all(jobs.as_slice()).await {
            if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                job.status = previous;
            }
            return Err(e.into());
        }

        debug!(job_id = %job_id, from = %previous, to = %status, "Job status changed");
        Ok(())
    }

    /// Set or clear a job's assignee
    pub async fn assign(&self, job_id: &str, assignee: Option<String>) -> Result<(), JobError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        let previous = std::mem::replace(&mut job.assignee, assignee);
        if let Err(e) = self.store.replace_all(jobs.as_slice()).await {
            if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                job.assignee = previous;
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/// Per-assignee job counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentWorkload {
    pub agent: String,
    pub active: usize,
    pub completed: usize,
}

/// Backlog overview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub total: usize,
    pub by_status: BTreeMap<JobStatus, usize>,
    /// Non-completed jobs per priority
    pub active_by_priority: BTreeMap<Priority, usize>,
    /// Non-completed jobs without a priority
    pub active_unprioritized: usize,
    /// In first-seen order; jobs without assignee count under "unassigned"
    pub workloads: Vec<AgentWorkload>,
}

impl JobSummary {
    pub fn count(&self, status: JobStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Summarize a job set
pub fn summarize_jobs(jobs: &[Job]) -> JobSummary {
    let mut summary = JobSummary {
        total: jobs.len(),
        ..Default::default()
    };

    for job in jobs {
        *summary.by_status.entry(job.status).or_insert(0) += 1;

        if job.status != JobStatus::Completed {
            match job.priority {
                Some(p) => *summary.active_by_priority.entry(p).or_insert(0) += 1,
                None => summary.active_unprioritized += 1,
            }
        }

        let agent = job.assignee().unwrap_or("unassigned");
        let idx = match summary.workloads.iter().position(|w| w.agent == agent) {
            Some(idx) => idx,
            None => {
                summary.workloads.push(AgentWorkload {
                    agent: agent.to_string(),
                    active: 0,
                    completed: 0,
                });
                summary.workloads.len() - 1
            }
        };
        match job.status {
            JobStatus::Completed => summary.workloads[idx].completed += 1,
            JobStatus::InProgress => summary.workloads[idx].active += 1,
            _ => {}
        }
    }

    summary
}
