//! Agent management commands

use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};
use comfy_table::Cell;
use stratavore_core::agent::ActivityStatus;
use stratavore_core::{AgentManager, AgentRecord, AgentStatus, Personality};

use super::{Context, table, truncate};

/// Agent management arguments
#[derive(Args, Debug)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommands,
}

/// CLI-friendly personality that maps to Personality
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliPersonality {
    Cadet,
    Senior,
    Specialist,
    Researcher,
    Debugger,
    Optimizer,
}

impl From<CliPersonality> for Personality {
    fn from(cli: CliPersonality) -> Self {
        match cli {
            CliPersonality::Cadet => Personality::Cadet,
            CliPersonality::Senior => Personality::Senior,
            CliPersonality::Specialist => Personality::Specialist,
            CliPersonality::Researcher => Personality::Researcher,
            CliPersonality::Debugger => Personality::Debugger,
            CliPersonality::Optimizer => Personality::Optimizer,
        }
    }
}

/// CLI-friendly activity status
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliActivityStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl From<CliActivityStatus> for ActivityStatus {
    fn from(cli: CliActivityStatus) -> Self {
        match cli {
            CliActivityStatus::Pending => ActivityStatus::Pending,
            CliActivityStatus::InProgress => ActivityStatus::InProgress,
            CliActivityStatus::Completed => ActivityStatus::Completed,
            CliActivityStatus::Cancelled => ActivityStatus::Cancelled,
        }
    }
}

/// Agent subcommands
#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// Spawn a new agent
    Spawn {
        #[arg(value_enum)]
        personality: CliPersonality,
        /// Task to record on the new agent
        #[arg(short, long)]
        task: Option<String>,
        /// Stay until the agent has finished starting up
        #[arg(short, long)]
        wait: bool,
    },
    /// Assign a task to an available agent
    Assign { agent_id: String, task_id: String },
    /// Set an agent's status
    Status {
        agent_id: String,
        /// spawning, idle, working, paused, completed or error
        status: AgentStatus,
        /// Thought to log alongside the change
        #[arg(short, long)]
        thought: Option<String>,
    },
    /// Complete the agent's current task
    Complete {
        agent_id: String,
        /// Mark the task as failed
        #[arg(long)]
        failed: bool,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Put an agent into error
    Kill {
        agent_id: String,
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Pause a working agent
    Pause { agent_id: String },
    /// Resume a paused agent
    Resume { agent_id: String },
    /// Show one agent with its recent thoughts
    Show {
        agent_id: String,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List agents
    List {
        #[arg(short, long, value_enum)]
        personality: Option<CliPersonality>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// List agents that can take a task
    Available {
        #[arg(short, long, value_enum)]
        personality: Option<CliPersonality>,
    },
    /// Fleet overview
    Summary,
    /// Describe the available personalities
    Personalities,
    /// Move agents stuck in spawning to idle
    Recover,
    /// Show the activity log
    Activity {
        /// Only this agent's entries
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// Update an activity entry
    UpdateActivity {
        entry_id: String,
        #[arg(value_enum)]
        status: CliActivityStatus,
        #[arg(short, long)]
        notes: Option<String>,
    },
}

/// Run agent command
pub async fn run(args: AgentArgs, ctx: Context) -> Result<()> {
    if let AgentCommands::Personalities = args.command {
        print_personalities();
        return Ok(());
    }

    let manager = AgentManager::open(
        Arc::clone(&ctx.store),
        ctx.config.agents.to_manager_config(),
    )
    .await?;

    match args.command {
        AgentCommands::Spawn {
            personality,
            task,
            wait,
        } => spawn(&manager, personality.into(), task, wait).await,
        AgentCommands::Assign { agent_id, task_id } => {
            manager.assign_task(&agent_id, &task_id).await?;
            println!("Assigned {} to {}", task_id, agent_id);
            Ok(())
        }
        AgentCommands::Status {
            agent_id,
            status,
            thought,
        } => {
            if !manager
                .update_status(&agent_id, status, thought.as_deref())
                .await?
            {
                bail!("Agent not found: {}", agent_id);
            }
            println!("{} is now {}", agent_id, status);
            Ok(())
        }
        AgentCommands::Complete {
            agent_id,
            failed,
            notes,
        } => {
            match manager.complete_task(&agent_id, !failed, &notes).await? {
                Some(task) => println!(
                    "{} finished {} ({})",
                    agent_id,
                    task.task_id,
                    if task.success { "success" } else { "failed" }
                ),
                None => println!("{} had no current task; now idle", agent_id),
            }
            Ok(())
        }
        AgentCommands::Kill { agent_id, reason } => {
            manager.kill(&agent_id, reason.as_deref()).await?;
            println!("Killed {}", agent_id);
            Ok(())
        }
        AgentCommands::Pause { agent_id } => {
            manager.pause_agent(&agent_id).await?;
            println!("Paused {}", agent_id);
            Ok(())
        }
        AgentCommands::Resume { agent_id } => {
            manager.resume_agent(&agent_id).await?;
            println!("Resumed {}", agent_id);
            Ok(())
        }
        AgentCommands::Show { agent_id, json } => match manager.get(&agent_id).await {
            Some(agent) if json => {
                println!("{}", serde_json::to_string_pretty(&agent)?);
                Ok(())
            }
            Some(agent) => {
                print_agent(&agent);
                Ok(())
            }
            None => bail!("Agent not found: {}", agent_id),
        },
        AgentCommands::List { personality, json } => {
            let agents = manager.list(personality.map(Into::into)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&agents)?);
            } else if agents.is_empty() {
                println!("No agents");
            } else {
                print_agent_table(&agents);
            }
            Ok(())
        }
        AgentCommands::Available { personality } => {
            let ids = manager.available_agents(personality.map(Into::into)).await;
            if ids.is_empty() {
                println!("No available agents");
            }
            for id in ids {
                println!("{}", id);
            }
            Ok(())
        }
        AgentCommands::Summary => {
            let summary = manager.summary().await;
            println!("Total agents:    {}", summary.total_agents);
            println!("Working:         {}", summary.working_agents);
            println!("Idle:            {}", summary.idle_agents);
            println!("Tasks completed: {}", summary.total_tasks_completed);
            println!();
            for (status, count) in &summary.by_status {
                println!("  {:<10} {}", status.as_str(), count);
            }
            println!();
            for (personality, count) in &summary.by_personality {
                println!("  {:<10} {}", personality.as_str(), count);
            }
            Ok(())
        }
        AgentCommands::Recover => {
            let recovered = manager
                .recover_stuck_agents(Utc::now(), manager.config().stale_threshold)
                .await?;
            if recovered.is_empty() {
                println!("No stuck agents");
            } else {
                println!("Recovered {} agent(s):", recovered.len());
                for id in recovered {
                    println!("  {}", id);
                }
            }
            Ok(())
        }
        AgentCommands::Activity { agent } => {
            let entries = manager.activity().list(agent.as_deref()).await?;
            if entries.is_empty() {
                println!("No activity");
                return Ok(());
            }
            let mut t = table(&["ID", "Agent", "Title", "Status", "Created"]);
            for entry in entries {
                t.add_row(vec![
                    Cell::new(truncate(&entry.id, 8)),
                    Cell::new(&entry.agent_id),
                    Cell::new(truncate(&entry.title, 40)),
                    Cell::new(entry.status),
                    Cell::new(entry.created_at.format("%Y-%m-%d %H:%M:%S")),
                ]);
            }
            println!("{t}");
            Ok(())
        }
        AgentCommands::UpdateActivity {
            entry_id,
            status,
            notes,
        } => {
            let updated = manager
                .activity()
                .update_status(&entry_id, status.into(), notes.as_deref())
                .await?;
            if !updated {
                bail!("Activity entry not found: {}", entry_id);
            }
            println!("Updated {}", entry_id);
            Ok(())
        }
        AgentCommands::Personalities => Ok(()),
    }
}

async fn spawn(
    manager: &Arc<AgentManager>,
    personality: Personality,
    task: Option<String>,
    wait: bool,
) -> Result<()> {
    let profile = personality.profile();
    let spawned = manager.spawn(personality, task.clone()).await?;

    println!("Spawning {} agent: {}", personality, spawned.agent_id);
    println!("  Personality: {}", profile.name);
    println!("  Task: {}", task.as_deref().unwrap_or("No task assigned"));

    if wait {
        spawned.startup.wait().await;
        if let Some(agent) = manager.get(&spawned.agent_id).await {
            println!("  Status: {}", agent.status);
        }
    }
    Ok(())
}

fn print_agent_table(agents: &[AgentRecord]) {
    let mut t = table(&["ID", "Personality", "Status", "Task", "Done", "Success"]);
    for agent in agents {
        t.add_row(vec![
            Cell::new(&agent.id),
            Cell::new(agent.personality),
            Cell::new(agent.status),
            Cell::new(agent.current_task.as_deref().unwrap_or("-")),
            Cell::new(agent.metrics.tasks_completed),
            Cell::new(format!("{:.0}%", agent.metrics.success_rate)),
        ]);
    }
    println!("{t}");
}

fn print_agent(agent: &AgentRecord) {
    println!("{}", agent.id);
    println!("  Personality: {}", agent.personality.profile().name);
    println!("  Status:      {}", agent.status);
    println!(
        "  Task:        {}",
        agent.current_task.as_deref().unwrap_or("-")
    );
    println!("  Created:     {}", agent.created_at.to_rfc3339());
    println!("  Updated:     {}", agent.updated_at.to_rfc3339());
    println!(
        "  Metrics:     {} completed, {:.1}% success",
        agent.metrics.tasks_completed, agent.metrics.success_rate
    );

    if !agent.thoughts.is_empty() {
        println!();
        println!("Recent thoughts:");
        let skip = agent.thoughts.len().saturating_sub(10);
        for thought in agent.thoughts.iter().skip(skip) {
            println!(
                "  [{}] {}",
                thought.timestamp.format("%H:%M:%S"),
                thought.thought
            );
        }
    }
}

fn print_personalities() {
    for personality in Personality::all() {
        let profile = personality.profile();
        println!("{} ({})", profile.name, personality);
        println!("  {}", profile.description);
        println!("  Strengths:   {}", profile.strengths.join(", "));
        println!("  Specialties: {}", profile.specialties.join(", "));
        println!("  Work style:  {}", profile.work_style);
        println!("  Voice:       {}", profile.communication_style);
        println!();
    }
}
