//! Dependency graph checks and ready-job selection
//!
//! The resolver is a read-only consumer of a job set: it never changes a
//! job's status, it only reports on the graph formed by `dependencies`.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::types::{Job, JobStatus, Priority};

/// A dependency path that returns to a job already on it
///
/// `path` ends with the repeated id, e.g. `[A, B, C, A]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyCycle {
    pub path: Vec<String>,
}

impl std::fmt::Display for DependencyCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.join(" → "))
    }
}

/// A dependency id that names no job in the set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    pub job_id: String,
    pub missing_id: String,
}

/// Outcome of [`validate_dependencies`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub cycles: Vec<DependencyCycle>,
    pub missing: Vec<MissingDependency>,
}

impl DependencyReport {
    pub fn is_valid(&self) -> bool {
        self.cycles.is_empty() && self.missing.is_empty()
    }

    /// Human readable cycle descriptions
    pub fn cycle_reports(&self) -> Vec<String> {
        self.cycles.iter().map(|c| c.to_string()).collect()
    }
}

/// Check every job's dependency chain for cycles and dangling ids
///
/// Each job is used as a traversal root in turn, so a single cycle is
/// reported once per job that reaches it. An empty job set is valid.
pub fn validate_dependencies(jobs: &[Job]) -> DependencyReport {
    let mut graph: HashMap<&str, &[String]> = HashMap::new();
    let mut roots: Vec<&str> = Vec::new();
    for job in jobs {
        if graph.insert(job.id.as_str(), &job.dependencies).is_none() {
            roots.push(job.id.as_str());
        }
    }

    let mut report = DependencyReport::default();

    for root in roots {
        let mut path = Vec::new();
        if let Some(cycle) = find_cycle(root, &graph, &mut path) {
            report.cycles.push(cycle);
        }
    }

    for job in jobs {
        for dep in &job.dependencies {
            if !graph.contains_key(dep.as_str()) {
                report.missing.push(MissingDependency {
                    job_id: job.id.clone(),
                    missing_id: dep.clone(),
                });
            }
        }
    }

    report
}

fn find_cycle<'a>(
    id: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    path: &mut Vec<&'a str>,
) -> Option<DependencyCycle> {
    if path.contains(&id) {
        let mut cycle: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        cycle.push(id.to_string());
        return Some(DependencyCycle { path: cycle });
    }

    // Unknown ids are reported as missing, not traversed
    let Some(&deps) = graph.get(id) else {
        return None;
    };

    path.push(id);
    for dep in deps {
        if let Some(cycle) = find_cycle(dep.as_str(), graph, path) {
            return Some(cycle);
        }
    }
    path.pop();

    None
}

/// Pending jobs whose dependencies have all completed
///
/// Ordered by priority rank, then creation time, then input order.
pub fn ready_jobs(jobs: &[Job]) -> Vec<&Job> {
    let completed: HashSet<&str> = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Completed)
        .map(|j| j.id.as_str())
        .collect();

    let mut ready: Vec<&Job> = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Pending)
        .filter(|j| j.dependencies.iter().all(|d| completed.contains(d.as_str())))
        .collect();

    ready.sort_by_key(|j| (Priority::rank(j.priority), j.created_at));
    ready
}
