//! AgentManager: lifecycle of the agent fleet

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::activity::{ActivityEntry, ActivityLog};
use super::personality::Personality;
use super::spawn::StartupHandle;
use super::types::{AgentRecord, AgentStatus, CompletedTask};
use crate::error::AgentError;
use crate::store::JsonlStore;

/// Default delay before a spawned agent becomes idle
pub const DEFAULT_SPAWN_GRACE: Duration = Duration::from_secs(2);

/// Default age after which a spawning agent counts as stuck
pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::from_secs(30);

/// Tunables for [`AgentManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentManagerConfig {
    pub spawn_grace: Duration,
    pub stale_threshold: Duration,
    /// Recover stuck agents as part of [`AgentManager::open`]
    pub recover_on_open: bool,
}

impl Default for AgentManagerConfig {
    fn default() -> Self {
        Self {
            spawn_grace: DEFAULT_SPAWN_GRACE,
            stale_threshold: DEFAULT_STALE_THRESHOLD,
            recover_on_open: true,
        }
    }
}

/// Result of [`AgentManager::spawn`]
pub struct SpawnedAgent {
    pub agent_id: String,
    pub startup: StartupHandle,
}

/// Fleet overview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub total_agents: usize,
    pub by_status: BTreeMap<AgentStatus, usize>,
    pub by_personality: BTreeMap<Personality, usize>,
    pub working_agents: usize,
    /// Idle plus completed
    pub idle_agents: usize,
    pub total_tasks_completed: u64,
}

/// Owns every agent record
///
/// State lives in memory behind one lock and is written back in full after
/// each change. Always handed out as `Arc` so startup timers can reach it.
pub struct AgentManager {
    store: Arc<JsonlStore>,
    activity: ActivityLog,
    config: AgentManagerConfig,
    agents: Mutex<Vec<AgentRecord>>,
}

impl AgentManager {
    /// Load the fleet from `store`
    pub async fn open(
        store: Arc<JsonlStore>,
        config: AgentManagerConfig,
    ) -> Result<Arc<Self>, AgentError> {
        let agents: Vec<AgentRecord> = store.load_all().await?;
        debug!(count = agents.len(), "Loaded agents");

        let manager = Arc::new(Self {
            activity: ActivityLog::new(Arc::clone(&store)),
            store,
            agents: Mutex::new(agents),
            config,
        });

        if manager.config.recover_on_open {
            let recovered = manager
                .recover_stuck_agents(Utc::now(), manager.config.stale_threshold)
                .await?;
            if !recovered.is_empty() {
                info!(count = recovered.len(), "Recovered stuck agents on open");
            }
        }

        Ok(manager)
    }

    pub fn config(&self) -> &AgentManagerConfig {
        &self.config
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Spawn a new agent and schedule its move to idle
    pub async fn spawn(
        self: &Arc<Self>,
        personality: Personality,
        task_id: Option<String>,
    ) -> Result<SpawnedAgent, AgentError> {
        self.spawn_at(personality, task_id, Utc::now()).await
    }

    /// Like [`spawn`](Self::spawn) with an explicit creation time
    pub async fn spawn_at(
        self: &Arc<Self>,
        personality: Personality,
        task_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SpawnedAgent, AgentError> {
        let agent_id = {
            let mut agents = self.agents.lock().await;
            let agent_id = unique_agent_id(&agents, personality, now);
            agents.push(AgentRecord::new(agent_id.clone(), personality, task_id, now));

            if let Err(e) = self.store.replace_all(agents.as_slice()).await {
                agents.pop();
                return Err(e.into());
            }
            agent_id
        };

        info!(agent_id = %agent_id, personality = %personality, "Spawning agent");
        let startup = StartupHandle::schedule(
            Arc::downgrade(self),
            agent_id.clone(),
            self.config.spawn_grace,
        );

        Ok(SpawnedAgent { agent_id, startup })
    }

    /// Move a spawning agent to idle
    ///
    /// Returns `false` without changes when the agent has already left
    /// spawning, so a late timer is harmless.
    pub async fn complete_startup(&self, agent_id: &str) -> Result<bool, AgentError> {
        self.with_agent(agent_id, |agent| {
            if agent.status != AgentStatus::Spawning {
                return Ok(false);
            }
            let now = Utc::now();
            agent.transition(AgentStatus::Idle, now);
            agent
                .thoughts
                .push(now, "Agent startup completed successfully");
            Ok(true)
        })
        .await
    }

    /// Give an available agent a task
    pub async fn assign_task(&self, agent_id: &str, task_id: &str) -> Result<(), AgentError> {
        let now = Utc::now();
        let personality = self
            .with_agent(agent_id, |agent| {
                if !agent.status.is_available() {
                    return Err(AgentError::Unavailable {
                        agent_id: agent.id.clone(),
                        status: agent.status.to_string(),
                    });
                }
                agent.current_task = Some(task_id.to_string());
                agent.transition(AgentStatus::Working, now);
                agent
                    .thoughts
                    .push(now, format!("Assigned new task: {}", task_id));
                Ok(agent.personality)
            })
            .await?;

        info!(agent_id = %agent_id, task_id = %task_id, "Assigned task");
        self.record_activity(ActivityEntry::assigned(agent_id, personality, task_id, now))
            .await;
        Ok(())
    }

    /// Set an agent's status, optionally noting a thought
    ///
    /// Returns `false` when the agent is unknown. An agent in error cannot
    /// be moved anywhere else.
    pub async fn update_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
        thought: Option<&str>,
    ) -> Result<bool, AgentError> {
        let result = self
            .with_agent(agent_id, |agent| {
                if agent.status.is_terminal() && status != agent.status {
                    return Err(invalid_transition(agent.status, status));
                }
                let now = Utc::now();
                agent.transition(status, now);
                if let Some(thought) = thought {
                    agent.thoughts.push(now, thought);
                }
                Ok(())
            })
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(AgentError::NotFound(_)) => {
                debug!(agent_id = %agent_id, "Status update for unknown agent ignored");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Append a free-form thought
    pub async fn add_thought(&self, agent_id: &str, thought: &str) -> Result<(), AgentError> {
        self.with_agent(agent_id, |agent| {
            let now = Utc::now();
            agent.thoughts.push(now, thought);
            agent.updated_at = now;
            Ok(())
        })
        .await
    }

    /// Finish the agent's current task and return it to idle
    ///
    /// With no current task only the status changes and `None` is returned.
    pub async fn complete_task(
        &self,
        agent_id: &str,
        success: bool,
        notes: &str,
    ) -> Result<Option<CompletedTask>, AgentError> {
        let now = Utc::now();
        let (personality, completed) = self
            .with_agent(agent_id, |agent| {
                if agent.status.is_terminal() {
                    return Err(invalid_transition(agent.status, AgentStatus::Idle));
                }

                let completed = agent.current_task.take().map(|task_id| {
                    let entry = CompletedTask {
                        task_id,
                        completed_at: now,
                        success,
                        notes: notes.to_string(),
                    };
                    agent.completed_tasks.push(entry.clone());
                    agent.metrics.record(success);
                    agent.thoughts.push(
                        now,
                        format!(
                            "Completed task {}: {}",
                            entry.task_id,
                            if success { "SUCCESS" } else { "FAILED" }
                        ),
                    );
                    entry
                });
                agent.transition(AgentStatus::Idle, now);
                Ok((agent.personality, completed))
            })
            .await?;

        match &completed {
            Some(task) => {
                info!(agent_id = %agent_id, task_id = %task.task_id, success, "Completed task");
                self.record_activity(ActivityEntry::finished(
                    agent_id,
                    personality,
                    &task.task_id,
                    success,
                    notes,
                    now,
                ))
                .await;
            }
            None => debug!(agent_id = %agent_id, "Completed with no current task"),
        }

        Ok(completed)
    }

    /// Force an agent into error
    pub async fn kill(&self, agent_id: &str, reason: Option<&str>) -> Result<(), AgentError> {
        self.with_agent(agent_id, |agent| {
            let now = Utc::now();
            agent.transition(AgentStatus::Error, now);
            if let Some(reason) = reason {
                agent.thoughts.push(now, reason);
            }
            Ok(())
        })
        .await?;

        warn!(agent_id = %agent_id, reason = reason.unwrap_or("unspecified"), "Agent killed");
        Ok(())
    }

    /// Working -> Paused
    pub async fn pause_agent(&self, agent_id: &str) -> Result<(), AgentError> {
        self.step(agent_id, AgentStatus::Working, AgentStatus::Paused)
            .await
    }

    /// Paused -> Working
    pub async fn resume_agent(&self, agent_id: &str) -> Result<(), AgentError> {
        self.step(agent_id, AgentStatus::Paused, AgentStatus::Working)
            .await
    }

    /// Move agents stuck in spawning for longer than `stale_threshold` to idle
    ///
    /// Returns the ids recovered, in fleet order. Running it again right
    /// away finds nothing.
    pub async fn recover_stuck_agents(
        &self,
        now: DateTime<Utc>,
        stale_threshold: Duration,
    ) -> Result<Vec<String>, AgentError> {
        let mut agents = self.agents.lock().await;
        let before = agents.clone();
        let mut recovered = Vec::new();

        for agent in agents.iter_mut() {
            if agent.status != AgentStatus::Spawning {
                continue;
            }
            // Negative ages (clock skew) are never stale
            let stale = now
                .signed_duration_since(agent.created_at)
                .to_std()
                .map(|age| age > stale_threshold)
                .unwrap_or(false);
            if !stale {
                continue;
            }

            agent.transition(AgentStatus::Idle, now);
            agent
                .thoughts
                .push(now, "Auto-recovered from stuck spawning state");
            recovered.push(agent.id.clone());
        }

        if recovered.is_empty() {
            return Ok(recovered);
        }

        if let Err(e) = self.store.replace_all(agents.as_slice()).await {
            *agents = before;
            return Err(e.into());
        }

        for agent_id in &recovered {
            info!(agent_id = %agent_id, "Recovered stuck agent");
        }
        Ok(recovered)
    }

    /// Ids of agents that can take a task, in fleet order
    pub async fn available_agents(&self, personality: Option<Personality>) -> Vec<String> {
        self.agents
            .lock()
            .await
            .iter()
            .filter(|a| a.status.is_available())
            .filter(|a| personality.is_none_or(|p| a.personality == p))
            .map(|a| a.id.clone())
            .collect()
    }

    pub async fn get(&self, agent_id: &str) -> Option<AgentRecord> {
        self.agents
            .lock()
            .await
            .iter()
            .find(|a| a.id == agent_id)
            .cloned()
    }

    /// Snapshot of the fleet, optionally one personality only
    pub async fn list(&self, personality: Option<Personality>) -> Vec<AgentRecord> {
        self.agents
            .lock()
            .await
            .iter()
            .filter(|a| personality.is_none_or(|p| a.personality == p))
            .cloned()
            .collect()
    }

    pub async fn summary(&self) -> AgentSummary {
        let agents = self.agents.lock().await;
        let mut summary = AgentSummary {
            total_agents: agents.len(),
            ..Default::default()
        };

        for agent in agents.iter() {
            *summary.by_status.entry(agent.status).or_insert(0) += 1;
            *summary.by_personality.entry(agent.personality).or_insert(0) += 1;
            match agent.status {
                AgentStatus::Working => summary.working_agents += 1,
                AgentStatus::Idle | AgentStatus::Completed => summary.idle_agents += 1,
                _ => {}
            }
            summary.total_tasks_completed += agent.metrics.tasks_completed;
        }

        summary
    }

    async fn step(
        &self,
        agent_id: &str,
        from: AgentStatus,
        to: AgentStatus,
    ) -> Result<(), AgentError> {
        self.with_agent(agent_id, |agent| {
            if agent.status != from {
                return Err(invalid_transition(agent.status, to));
            }
            agent.transition(to, Utc::now());
            Ok(())
        })
        .await
    }

    /// Run `f` against one agent and persist the fleet if it changed
    ///
    /// The record is restored when `f` fails or the write does.
    async fn with_agent<F, R>(&self, agent_id: &str, f: F) -> Result<R, AgentError>
    where
        F: FnOnce(&mut AgentRecord) -> Result<R, AgentError>,
    {
        let mut agents = self.agents.lock().await;
        let idx = agents
            .iter()
            .position(|a| a.id == agent_id)
            .ok_or_else(|| AgentError::NotFound(agent_id.to_string()))?;

        let before = agents[idx].clone();
        let result = match f(&mut agents[idx]) {
            Ok(result) => result,
            Err(e) => {
                agents[idx] = before;
                return Err(e);
            }
        };

        if agents[idx] != before {
            if let Err(e) = self.store.replace_all(agents.as_slice()).await {
                agents[idx] = before;
                return Err(e.into());
            }
        }

        Ok(result)
    }

    async fn record_activity(&self, entry: ActivityEntry) {
        if let Err(e) = self.activity.record(&entry).await {
            warn!(agent_id = %entry.agent_id, error = %e, "Failed to record agent activity");
        }
    }
}

fn invalid_transition(from: AgentStatus, to: AgentStatus) -> AgentError {
    AgentError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// `{personality}_{micros}`, suffixed `-{n}` if that id is taken
fn unique_agent_id(agents: &[AgentRecord], personality: Personality, now: DateTime<Utc>) -> String {
    let base = format!("{}_{}", personality, now.timestamp_micros());
    let taken = |id: &str| agents.iter().any(|a| a.id == id);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::activity::ActivityStatus;
    use chrono::Duration as ChronoDuration;
    use tempfile::tempdir;

    fn quiet_config() -> AgentManagerConfig {
        AgentManagerConfig {
            // Long enough that the timer never fires during a test
            spawn_grace: Duration::from_secs(3600),
            stale_threshold: DEFAULT_STALE_THRESHOLD,
            recover_on_open: false,
        }
    }

    async fn open_manager(dir: &std::path::Path, config: AgentManagerConfig) -> Arc<AgentManager> {
        AgentManager::open(Arc::new(JsonlStore::new(dir)), config)
            .await
            .unwrap()
    }

    async fn idle_agent(manager: &Arc<AgentManager>, personality: Personality) -> String {
        let spawned = manager.spawn(personality, None).await.unwrap();
        spawned.startup.cancel();
        assert!(manager.complete_startup(&spawned.agent_id).await.unwrap());
        spawned.agent_id
    }

    // ==================== Spawn Tests ====================

    #[tokio::test]
    async fn spawn_starts_in_spawning() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;

        let spawned = manager
            .spawn(Personality::Cadet, Some("job-1".to_string()))
            .await
            .unwrap();
        spawned.startup.cancel();

        let agent = manager.get(&spawned.agent_id).await.unwrap();
        assert!(spawned.agent_id.starts_with("cadet_"));
        assert_eq!(agent.status, AgentStatus::Spawning);
        assert_eq!(agent.current_task.as_deref(), Some("job-1"));
        assert_eq!(agent.metrics.tasks_completed, 0);
        assert!(agent.thoughts.is_empty());
    }

    #[tokio::test]
    async fn spawn_at_same_instant_disambiguates_ids() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let now = Utc::now();

        let a = manager.spawn_at(Personality::Senior, None, now).await.unwrap();
        let b = manager.spawn_at(Personality::Senior, None, now).await.unwrap();
        a.startup.cancel();
        b.startup.cancel();

        assert_ne!(a.agent_id, b.agent_id);
        assert_eq!(b.agent_id, format!("{}-1", a.agent_id));
    }

    #[tokio::test(start_paused = true)]
    async fn startup_timer_moves_agent_to_idle() {
        let dir = tempdir().unwrap();
        let config = AgentManagerConfig {
            spawn_grace: DEFAULT_SPAWN_GRACE,
            ..quiet_config()
        };
        let manager = open_manager(dir.path(), config).await;
        let start = tokio::time::Instant::now();

        let spawned = manager.spawn(Personality::Debugger, None).await.unwrap();
        let agent_id = spawned.agent_id.clone();
        assert_eq!(
            manager.get(&agent_id).await.unwrap().status,
            AgentStatus::Spawning
        );

        // The paused clock jumps straight to the timer deadline
        spawned.startup.wait().await;
        assert!(start.elapsed() >= DEFAULT_SPAWN_GRACE);

        let agent = manager.get(&agent_id).await.unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        let thoughts: Vec<&str> = agent.thoughts.iter().map(|t| t.thought.as_str()).collect();
        assert_eq!(
            thoughts,
            vec![
                "Status changed: spawning -> idle",
                "Agent startup completed successfully"
            ]
        );
    }

    #[tokio::test]
    async fn cancelled_startup_leaves_agent_spawning() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;

        let spawned = manager.spawn(Personality::Cadet, None).await.unwrap();
        let agent_id = spawned.agent_id.clone();
        spawned.startup.cancel();
        spawned.startup.wait().await;

        assert_eq!(
            manager.get(&agent_id).await.unwrap().status,
            AgentStatus::Spawning
        );
    }

    #[tokio::test]
    async fn complete_startup_is_noop_after_first_call() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Cadet).await;

        assert!(!manager.complete_startup(&agent_id).await.unwrap());
        assert_eq!(manager.get(&agent_id).await.unwrap().thoughts.len(), 2);
    }

    // ==================== Assignment Tests ====================

    #[tokio::test]
    async fn assign_task_to_idle_agent() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Senior).await;

        manager.assign_task(&agent_id, "job-1").await.unwrap();

        let agent = manager.get(&agent_id).await.unwrap();
        assert_eq!(agent.status, AgentStatus::Working);
        assert_eq!(agent.current_task.as_deref(), Some("job-1"));
        assert_eq!(
            agent.thoughts.latest().unwrap().thought,
            "Assigned new task: job-1"
        );

        let activity = manager.activity().list(Some(&agent_id)).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].status, ActivityStatus::InProgress);
    }

    #[tokio::test]
    async fn assign_task_to_working_agent_fails() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Senior).await;
        manager.assign_task(&agent_id, "job-1").await.unwrap();

        let result = manager.assign_task(&agent_id, "job-2").await;

        assert!(matches!(result, Err(AgentError::Unavailable { .. })));
        assert_eq!(
            manager.get(&agent_id).await.unwrap().current_task.as_deref(),
            Some("job-1")
        );
    }

    #[tokio::test]
    async fn assign_task_to_spawning_agent_fails() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let spawned = manager.spawn(Personality::Cadet, None).await.unwrap();
        spawned.startup.cancel();

        let result = manager.assign_task(&spawned.agent_id, "job-1").await;
        assert!(matches!(result, Err(AgentError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn assign_task_to_unknown_agent_fails() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;

        let result = manager.assign_task("ghost", "job-1").await;
        assert!(matches!(result, Err(AgentError::NotFound(_))));
    }

    // ==================== Completion Tests ====================

    #[tokio::test]
    async fn complete_task_updates_metrics_and_history() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Optimizer).await;

        manager.assign_task(&agent_id, "job-1").await.unwrap();
        manager
            .complete_task(&agent_id, false, "broke the build")
            .await
            .unwrap();
        assert_eq!(
            manager.get(&agent_id).await.unwrap().metrics.success_rate,
            0.0
        );

        manager.assign_task(&agent_id, "job-2").await.unwrap();
        let done = manager
            .complete_task(&agent_id, true, "fixed")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.task_id, "job-2");

        let agent = manager.get(&agent_id).await.unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.current_task, None);
        assert_eq!(agent.metrics.tasks_completed, 2);
        assert_eq!(agent.metrics.success_rate, 50.0);
        assert_eq!(agent.completed_tasks.len(), 2);
        assert!(!agent.completed_tasks[0].success);
        assert_eq!(
            agent.thoughts.latest().unwrap().thought,
            "Completed task job-2: SUCCESS"
        );

        let activity = manager.activity().list(Some(&agent_id)).await.unwrap();
        assert_eq!(activity.len(), 4);
    }

    #[tokio::test]
    async fn complete_without_task_only_resets_status() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Cadet).await;

        let done = manager.complete_task(&agent_id, true, "").await.unwrap();

        assert!(done.is_none());
        let agent = manager.get(&agent_id).await.unwrap();
        assert_eq!(agent.metrics.tasks_completed, 0);
        assert_eq!(agent.status, AgentStatus::Idle);
    }

    #[tokio::test]
    async fn complete_task_unknown_agent_fails() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;

        let result = manager.complete_task("ghost", true, "").await;
        assert!(matches!(result, Err(AgentError::NotFound(_))));
    }

    // ==================== Status Tests ====================

    #[tokio::test]
    async fn update_status_records_transition_and_thought() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Researcher).await;

        let updated = manager
            .update_status(&agent_id, AgentStatus::Completed, Some("wrapped up"))
            .await
            .unwrap();
        assert!(updated);

        let agent = manager.get(&agent_id).await.unwrap();
        let thoughts: Vec<&str> = agent.thoughts.iter().map(|t| t.thought.as_str()).collect();
        assert_eq!(
            &thoughts[thoughts.len() - 2..],
            &["Status changed: idle -> completed", "wrapped up"]
        );
    }

    #[tokio::test]
    async fn update_status_unknown_agent_is_noop() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;

        let updated = manager
            .update_status("ghost", AgentStatus::Idle, None)
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn killed_agent_cannot_be_revived() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Specialist).await;

        manager.kill(&agent_id, Some("runaway")).await.unwrap();
        let result = manager
            .update_status(&agent_id, AgentStatus::Idle, None)
            .await;

        assert!(matches!(result, Err(AgentError::InvalidTransition { .. })));
        assert_eq!(
            manager.get(&agent_id).await.unwrap().status,
            AgentStatus::Error
        );
    }

    #[tokio::test]
    async fn pause_and_resume_only_from_expected_states() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent_id = idle_agent(&manager, Personality::Cadet).await;

        let result = manager.pause_agent(&agent_id).await;
        assert!(matches!(result, Err(AgentError::InvalidTransition { .. })));

        manager.assign_task(&agent_id, "job-1").await.unwrap();
        manager.pause_agent(&agent_id).await.unwrap();
        assert_eq!(
            manager.get(&agent_id).await.unwrap().status,
            AgentStatus::Paused
        );

        manager.resume_agent(&agent_id).await.unwrap();
        assert_eq!(
            manager.get(&agent_id).await.unwrap().status,
            AgentStatus::Working
        );
    }

    // ==================== Recovery Tests ====================

    #[tokio::test]
    async fn recover_stuck_agents_is_idempotent() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let created = Utc::now() - ChronoDuration::seconds(60);
        let stuck = manager
            .spawn_at(Personality::Cadet, None, created)
            .await
            .unwrap();
        stuck.startup.cancel();
        let fresh = manager.spawn(Personality::Cadet, None).await.unwrap();
        fresh.startup.cancel();

        let now = Utc::now();
        let first = manager
            .recover_stuck_agents(now, DEFAULT_STALE_THRESHOLD)
            .await
            .unwrap();
        let second = manager
            .recover_stuck_agents(now, DEFAULT_STALE_THRESHOLD)
            .await
            .unwrap();

        assert_eq!(first, vec![stuck.agent_id.clone()]);
        assert!(second.is_empty());
        let agent = manager.get(&stuck.agent_id).await.unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(
            agent.thoughts.latest().unwrap().thought,
            "Auto-recovered from stuck spawning state"
        );
        assert_eq!(
            manager.get(&fresh.agent_id).await.unwrap().status,
            AgentStatus::Spawning
        );
    }

    // ==================== Query Tests ====================

    #[tokio::test]
    async fn available_agents_filters_by_status_and_personality() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let cadet = idle_agent(&manager, Personality::Cadet).await;
        let senior = idle_agent(&manager, Personality::Senior).await;
        let busy = idle_agent(&manager, Personality::Cadet).await;
        manager.assign_task(&busy, "job-1").await.unwrap();

        assert_eq!(
            manager.available_agents(None).await,
            vec![cadet.clone(), senior]
        );
        assert_eq!(
            manager.available_agents(Some(Personality::Cadet)).await,
            vec![cadet]
        );
    }

    #[tokio::test]
    async fn summary_counts_fleet() {
        let dir = tempdir().unwrap();
        let manager = open_manager(dir.path(), quiet_config()).await;
        let a = idle_agent(&manager, Personality::Cadet).await;
        let _b = idle_agent(&manager, Personality::Cadet).await;
        manager.assign_task(&a, "job-1").await.unwrap();
        manager.complete_task(&a, true, "").await.unwrap();
        manager.assign_task(&a, "job-2").await.unwrap();

        let summary = manager.summary().await;
        assert_eq!(summary.total_agents, 2);
        assert_eq!(summary.working_agents, 1);
        assert_eq!(summary.idle_agents, 1);
        assert_eq!(summary.total_tasks_completed, 1);
        assert_eq!(summary.by_personality.get(&Personality::Cadet), Some(&2));
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let agent_id = {
            let manager = open_manager(dir.path(), quiet_config()).await;
            let agent_id = idle_agent(&manager, Personality::Cadet).await;
            manager.assign_task(&agent_id, "job-1").await.unwrap();
            agent_id
        };

        let manager = open_manager(dir.path(), quiet_config()).await;
        let agent = manager.get(&agent_id).await.unwrap();
        assert_eq!(agent.status, AgentStatus::Working);
        assert_eq!(agent.current_task.as_deref(), Some("job-1"));
    }
}
