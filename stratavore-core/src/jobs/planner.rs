//! Advisory scheduling: assignment conflicts and workload-based suggestions
//!
//! Nothing here mutates jobs. Callers decide whether to act on the advice.

use serde::Serialize;

use super::types::{Job, JobStatus, Priority};

/// An agent holding more than one pending job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentConflict {
    pub agent: String,
    /// Every pending job assigned to the agent, in input order
    pub jobs: Vec<Job>,
    /// Highest-priority job, the one to keep
    pub keep: Job,
    /// The rest, flagged for reassignment
    pub reassign: Vec<Job>,
    pub suggestion: String,
}

/// Suggested agent(s) for an unassigned pending job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentSuggestion {
    pub job_id: String,
    pub job_title: String,
    pub priority: Option<Priority>,
    /// First of `candidates`, if any agent is known
    pub suggested_agent: Option<String>,
    /// All agents tied for the lowest workload, in first-seen order
    pub candidates: Vec<String>,
    /// Active-or-pending job count of each candidate
    pub workload: usize,
}

/// Group pending jobs by assignee and report agents holding more than one
pub fn detect_assignment_conflicts(jobs: &[Job]) -> Vec<AssignmentConflict> {
    let mut groups: Vec<(&str, Vec<&Job>)> = Vec::new();
    for job in jobs.iter().filter(|j| j.status == JobStatus::Pending) {
        let Some(agent) = job.assignee() else {
            continue;
        };
        match groups.iter_mut().find(|(a, _)| *a == agent) {
            Some((_, assigned)) => assigned.push(job),
            None => groups.push((agent, vec![job])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, assigned)| assigned.len() > 1)
        .map(|(agent, assigned)| {
            // Priority only: creation time does not matter when picking what to keep
            let mut ranked = assigned.clone();
            ranked.sort_by_key(|j| Priority::rank(j.priority));
            let keep = ranked[0].clone();
            let reassign = ranked[1..].iter().map(|j| (*j).clone()).collect();
            let suggestion = format!(
                "Focus on {} ({} priority) first",
                keep.title,
                keep.priority.map(|p| p.as_str()).unwrap_or("unspecified")
            );

            AssignmentConflict {
                agent: agent.to_string(),
                jobs: assigned.into_iter().cloned().collect(),
                keep,
                reassign,
                suggestion,
            }
        })
        .collect()
}

/// Recommend the least-loaded agents for each unassigned pending job
///
/// Workload counts pending and in-progress jobs per assignee. Only agents
/// that appear as an assignee somewhere in `jobs` are considered.
pub fn suggest_assignments(jobs: &[Job]) -> Vec<AssignmentSuggestion> {
    let mut workloads: Vec<(&str, usize)> = Vec::new();
    for job in jobs
        .iter()
        .filter(|j| matches!(j.status, JobStatus::Pending | JobStatus::InProgress))
    {
        let Some(agent) = job.assignee() else {
            continue;
        };
        match workloads.iter_mut().find(|(a, _)| *a == agent) {
            Some((_, count)) => *count += 1,
            None => workloads.push((agent, 1)),
        }
    }

    let min_load = workloads.iter().map(|(_, n)| *n).min().unwrap_or(0);
    let candidates: Vec<String> = workloads
        .iter()
        .filter(|(_, n)| *n == min_load)
        .map(|(a, _)| a.to_string())
        .collect();

    jobs.iter()
        .filter(|j| j.status == JobStatus::Pending && j.assignee().is_none())
        .map(|job| AssignmentSuggestion {
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            priority: job.priority,
            suggested_agent: candidates.first().cloned(),
            candidates: candidates.clone(),
            workload: min_load,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, priority: Priority) -> Job {
        Job::new(id, format!("Job {}", id), priority)
    }

    // ==================== Conflict Tests ====================

    #[test]
    fn no_conflicts_for_empty_set() {
        assert!(detect_assignment_conflicts(&[]).is_empty());
    }

    #[test]
    fn single_pending_job_per_agent_is_fine() {
        let jobs = vec![
            job("a", Priority::High).with_assignee("cadet_1"),
            job("b", Priority::High).with_assignee("senior_1"),
        ];
        assert!(detect_assignment_conflicts(&jobs).is_empty());
    }

    #[test]
    fn overloaded_agent_keeps_highest_priority_job() {
        let jobs = vec![
            job("low", Priority::Low).with_assignee("cadet_1"),
            job("high", Priority::High).with_assignee("cadet_1"),
            job("medium", Priority::Medium).with_assignee("cadet_1"),
        ];

        let conflicts = detect_assignment_conflicts(&jobs);
        assert_eq!(conflicts.len(), 1);

        let conflict = &conflicts[0];
        assert_eq!(conflict.agent, "cadet_1");
        assert_eq!(conflict.jobs.len(), 3);
        assert_eq!(conflict.jobs[0].id, "low");
        assert_eq!(conflict.keep.id, "high");
        let reassign: Vec<&str> = conflict.reassign.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(reassign, vec!["medium", "low"]);
        assert_eq!(conflict.suggestion, "Focus on Job high (high priority) first");
    }

    #[test]
    fn non_pending_jobs_do_not_conflict() {
        let jobs = vec![
            job("a", Priority::High)
                .with_assignee("cadet_1")
                .with_status(JobStatus::InProgress),
            job("b", Priority::High).with_assignee("cadet_1"),
        ];
        assert!(detect_assignment_conflicts(&jobs).is_empty());
    }

    // ==================== Suggestion Tests ====================

    #[test]
    fn suggests_least_loaded_agent() {
        let jobs = vec![
            job("a", Priority::High).with_assignee("busy"),
            job("b", Priority::High)
                .with_assignee("busy")
                .with_status(JobStatus::InProgress),
            job("c", Priority::High).with_assignee("light"),
            job("d", Priority::High).with_assignee("light2"),
            job("open", Priority::Medium),
        ];

        let suggestions = suggest_assignments(&jobs);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].job_id, "open");
        assert_eq!(suggestions[0].suggested_agent.as_deref(), Some("light"));
        assert_eq!(suggestions[0].candidates, vec!["light", "light2"]);
        assert_eq!(suggestions[0].workload, 1);
    }

    #[test]
    fn completed_jobs_do_not_count_toward_workload() {
        let jobs = vec![
            job("a", Priority::High)
                .with_assignee("veteran")
                .with_status(JobStatus::Completed),
            job("b", Priority::High).with_assignee("newbie"),
            job("open", Priority::Low),
        ];

        let suggestions = suggest_assignments(&jobs);
        assert_eq!(suggestions[0].suggested_agent.as_deref(), Some("newbie"));
    }

    #[test]
    fn suggestion_without_known_agents_has_no_candidate() {
        let jobs = vec![job("open", Priority::Low)];

        let suggestions = suggest_assignments(&jobs);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].suggested_agent.is_none());
        assert!(suggestions[0].candidates.is_empty());
    }

    #[test]
    fn suggestions_do_not_mutate_jobs() {
        let jobs = vec![job("x", Priority::High).with_assignee("a"), job("open", Priority::Low)];
        let before = jobs.clone();

        let _ = suggest_assignments(&jobs);
        assert_eq!(jobs, before);
    }
}
