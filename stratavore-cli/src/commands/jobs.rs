//! Job backlog commands

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use stratavore_core::{
    Job, JobBoard, JobStatus, Priority, detect_assignment_conflicts, ready_jobs,
    suggest_assignments, summarize_jobs, validate_dependencies,
};

use super::{Context, table, truncate};

/// Job backlog arguments
#[derive(Args, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub command: JobsCommands,
}

#[derive(Subcommand, Debug)]
pub enum JobsCommands {
    /// Add a job to the backlog
    Add {
        id: String,
        title: String,
        /// high, medium or low
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Job this one depends on (repeatable)
        #[arg(long = "depends-on")]
        dependencies: Vec<String>,
        #[arg(short, long)]
        assignee: Option<String>,
        #[arg(short, long, default_value_t = 0.0)]
        estimate: f64,
    },
    /// Move a job to a new status
    SetStatus {
        job_id: String,
        /// pending, in_progress, completed or cancelled
        status: JobStatus,
    },
    /// Assign a job, or clear its assignee when none is given
    Assign {
        job_id: String,
        agent_id: Option<String>,
    },
    /// Check dependencies for cycles and missing jobs
    Validate,
    /// Backlog overview
    Summary,
    /// Pending jobs whose dependencies are complete
    Ready,
    /// Agents holding more than one pending job
    Conflicts,
    /// Suggest agents for unassigned jobs
    Suggest,
    /// Run every check
    All,
}

/// Run jobs command
pub async fn run(args: JobsArgs, ctx: Context) -> Result<()> {
    let board = JobBoard::open(Arc::clone(&ctx.store)).await?;

    match args.command {
        JobsCommands::Add {
            id,
            title,
            priority,
            description,
            dependencies,
            assignee,
            estimate,
        } => {
            let mut job = Job::new(id.clone(), title, priority).with_dependencies(dependencies);
            job.description = description;
            job.assignee = assignee;
            job.estimated_hours = estimate;
            board.add(job).await?;
            println!("Added job {}", id);
            Ok(())
        }
        JobsCommands::SetStatus { job_id, status } => {
            board.set_status(&job_id, status).await?;
            println!("{} is now {}", job_id, status);
            Ok(())
        }
        JobsCommands::Assign { job_id, agent_id } => {
            board.assign(&job_id, agent_id.clone()).await?;
            match agent_id {
                Some(agent) => println!("Assigned {} to {}", job_id, agent),
                None => println!("Cleared assignee of {}", job_id),
            }
            Ok(())
        }
        JobsCommands::Validate => {
            let jobs = board.list().await;
            if !print_validation(&jobs) {
                bail!("Dependency validation failed");
            }
            Ok(())
        }
        JobsCommands::Summary => {
            print_summary(&board.list().await);
            Ok(())
        }
        JobsCommands::Ready => {
            print_ready(&board.list().await);
            Ok(())
        }
        JobsCommands::Conflicts => {
            print_conflicts(&board.list().await);
            Ok(())
        }
        JobsCommands::Suggest => {
            print_suggestions(&board.list().await);
            Ok(())
        }
        JobsCommands::All => {
            let jobs = board.list().await;
            let valid = print_validation(&jobs);
            println!();
            print_summary(&jobs);
            println!();
            print_ready(&jobs);
            println!();
            print_conflicts(&jobs);
            println!();
            print_suggestions(&jobs);
            if !valid {
                bail!("Dependency validation failed");
            }
            Ok(())
        }
    }
}

/// Print the dependency report; returns whether it passed
fn print_validation(jobs: &[Job]) -> bool {
    let report = validate_dependencies(jobs);
    if report.is_valid() {
        println!("Dependencies valid ({} jobs)", jobs.len());
        return true;
    }

    for cycle in report.cycle_reports() {
        println!("Circular dependency: {}", cycle);
    }
    for missing in &report.missing {
        println!(
            "Missing dependency: {} depends on unknown job {}",
            missing.job_id, missing.missing_id
        );
    }
    false
}

fn print_summary(jobs: &[Job]) {
    let summary = summarize_jobs(jobs);
    println!("Jobs: {}", summary.total);
    for status in JobStatus::all() {
        println!("  {:<12} {}", status.as_str(), summary.count(*status));
    }

    println!("Open by priority:");
    for priority in Priority::all() {
        let count = summary
            .active_by_priority
            .get(priority)
            .copied()
            .unwrap_or(0);
        println!("  {:<12} {}", priority.as_str(), count);
    }
    if summary.active_unprioritized > 0 {
        println!("  {:<12} {}", "unspecified", summary.active_unprioritized);
    }

    if !summary.workloads.is_empty() {
        let mut t = table(&["Agent", "In progress", "Completed"]);
        for workload in &summary.workloads {
            t.add_row(vec![
                Cell::new(&workload.agent),
                Cell::new(workload.active),
                Cell::new(workload.completed),
            ]);
        }
        println!("{t}");
    }
}

fn print_ready(jobs: &[Job]) {
    let ready = ready_jobs(jobs);
    if ready.is_empty() {
        println!("No jobs ready to start");
        return;
    }

    let mut t = table(&["ID", "Title", "Priority", "Assignee", "Estimate"]);
    for job in ready {
        t.add_row(vec![
            Cell::new(&job.id),
            Cell::new(truncate(&job.title, 40)),
            Cell::new(job.priority.map(|p| p.as_str()).unwrap_or("-")),
            Cell::new(job.assignee().unwrap_or("-")),
            Cell::new(format!("{:.1}h", job.estimated_hours)),
        ]);
    }
    println!("{t}");
}

fn print_conflicts(jobs: &[Job]) {
    let conflicts = detect_assignment_conflicts(jobs);
    if conflicts.is_empty() {
        println!("No assignment conflicts");
        return;
    }

    for conflict in conflicts {
        println!(
            "{} has {} pending jobs: {}",
            conflict.agent,
            conflict.jobs.len(),
            conflict
                .jobs
                .iter()
                .map(|j| j.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  {}", conflict.suggestion);
        for job in &conflict.reassign {
            println!("  Reassign: {} ({})", job.id, job.title);
        }
    }
}

fn print_suggestions(jobs: &[Job]) {
    let suggestions = suggest_assignments(jobs);
    if suggestions.is_empty() {
        println!("No unassigned pending jobs");
        return;
    }

    let mut t = table(&["Job", "Title", "Priority", "Suggested", "Load"]);
    for s in suggestions {
        t.add_row(vec![
            Cell::new(&s.job_id),
            Cell::new(truncate(&s.job_title, 40)),
            Cell::new(s.priority.map(|p| p.as_str()).unwrap_or("-")),
            Cell::new(s.suggested_agent.as_deref().unwrap_or("-")),
            Cell::new(s.workload),
        ]);
    }
    println!("{t}");
}
