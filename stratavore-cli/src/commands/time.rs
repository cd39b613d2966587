//! Time tracking commands

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use comfy_table::Cell;
use stratavore_core::TimeTracker;
use stratavore_core::timetrack::format_duration;

use super::{Context, table, truncate};

/// Time tracking arguments
#[derive(Args, Debug)]
pub struct TimeArgs {
    #[command(subcommand)]
    pub command: TimeCommands,
}

#[derive(Subcommand, Debug)]
pub enum TimeCommands {
    /// Start a work session
    Start {
        job_id: String,
        agent: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Pause an active session
    Pause { session_id: String },
    /// Resume a paused session
    Resume { session_id: String },
    /// End a session
    End {
        session_id: String,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Cancel a session without recording time
    Cancel { session_id: String },
    /// Show active sessions
    Active,
    /// Show time spent on one job
    Job { job_id: String },
    /// Show time spent on every job
    All,
}

/// Run time command
pub async fn run(args: TimeArgs, ctx: Context) -> Result<()> {
    let tracker = TimeTracker::open(Arc::clone(&ctx.store)).await?;

    match args.command {
        TimeCommands::Start {
            job_id,
            agent,
            description,
        } => {
            let id = tracker.start(&job_id, &agent, &description).await?;
            println!("Started session {} for job {}", id, job_id);
        }
        TimeCommands::Pause { session_id } => {
            tracker.pause(&session_id).await?;
            println!("Paused session {}", session_id);
        }
        TimeCommands::Resume { session_id } => {
            tracker.resume(&session_id).await?;
            println!("Resumed session {}", session_id);
        }
        TimeCommands::End { session_id, notes } => {
            let session = tracker.end(&session_id, &notes).await?;
            println!("Ended session {}", session_id);
            println!(
                "  Duration: {}",
                format_duration(session.duration_seconds.unwrap_or_default())
            );
            if session.paused_time > 0.0 {
                println!("  Paused:   {}", format_duration(session.paused_time));
            }
        }
        TimeCommands::Cancel { session_id } => {
            tracker.cancel(&session_id).await?;
            println!("Cancelled session {}", session_id);
        }
        TimeCommands::Active => {
            let sessions = tracker.active_sessions().await;
            if sessions.is_empty() {
                println!("No active sessions");
                return Ok(());
            }

            let now = Utc::now();
            let mut t = table(&["Session", "Job", "Agent", "Started", "Elapsed", "Note"]);
            for s in &sessions {
                t.add_row(vec![
                    Cell::new(&s.session_id),
                    Cell::new(&s.job_id),
                    Cell::new(&s.agent),
                    Cell::new(s.start_timestamp.format("%H:%M:%S")),
                    Cell::new(format_duration(s.live_seconds(now))),
                    Cell::new(truncate(&s.description, 30)),
                ]);
            }
            println!("{t}");
        }
        TimeCommands::Job { job_id } => {
            let time = tracker.job_time(&job_id).await;
            println!("Time summary for {}", time.job_id);
            println!("  Total time:         {}", time.formatted);
            println!("  Hours:              {:.2}", time.total_hours);
            println!("  Completed sessions: {}", time.completed_sessions);
            println!("  Active sessions:    {}", time.active_sessions);
        }
        TimeCommands::All => {
            let times = tracker.all_job_times().await;
            if times.is_empty() {
                println!("No sessions recorded");
                return Ok(());
            }

            let mut t = table(&["Job", "Total", "Hours", "Completed", "Active"]);
            for time in &times {
                t.add_row(vec![
                    Cell::new(&time.job_id),
                    Cell::new(&time.formatted),
                    Cell::new(format!("{:.2}", time.total_hours)),
                    Cell::new(time.completed_sessions),
                    Cell::new(time.active_sessions),
                ]);
            }
            println!("{t}");
        }
    }

    Ok(())
}
