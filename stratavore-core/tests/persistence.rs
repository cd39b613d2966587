//! Persistence tests across manager restarts
//!
//! Record files are written by hand here to check how the managers cope
//! with data they did not produce themselves.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stratavore_core::{
    AgentManager, AgentManagerConfig, AgentRecord, AgentStatus, Job, JobBoard, JsonlStore,
    Personality, Priority, RecordKind, TimeTracker, ready_jobs,
};
use tempfile::tempdir;

fn config(recover_on_open: bool) -> AgentManagerConfig {
    AgentManagerConfig {
        spawn_grace: Duration::from_secs(3600),
        stale_threshold: Duration::from_secs(30),
        recover_on_open,
    }
}

fn agent_line(record: &AgentRecord) -> String {
    format!("{} {}\n", record.id, serde_json::to_string(record).unwrap())
}

#[tokio::test]
async fn malformed_agent_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::new(dir.path());
    let good = AgentRecord::new("cadet_1", Personality::Cadet, None, Utc::now());

    let mut content = agent_line(&good);
    content.push_str("no-payload-here\n");
    content.push_str("cadet_2 {not json}\n");
    content.push('\n');
    std::fs::write(store.path_for(RecordKind::Agents), content).unwrap();

    let manager = AgentManager::open(Arc::new(store), config(false))
        .await
        .unwrap();
    let agents = manager.list(None).await;
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].id, "cadet_1");
}

#[tokio::test]
async fn stale_spawning_agent_is_recovered_on_open() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::new(dir.path());
    let stale = AgentRecord::new(
        "senior_1",
        Personality::Senior,
        None,
        Utc::now() - chrono::Duration::minutes(5),
    );
    let fresh = AgentRecord::new("senior_2", Personality::Senior, None, Utc::now());
    let content = format!("{}{}", agent_line(&stale), agent_line(&fresh));
    std::fs::write(store.path_for(RecordKind::Agents), content).unwrap();

    let manager = AgentManager::open(Arc::new(store), config(true))
        .await
        .unwrap();

    assert_eq!(
        manager.get("senior_1").await.unwrap().status,
        AgentStatus::Idle
    );
    assert_eq!(
        manager.get("senior_2").await.unwrap().status,
        AgentStatus::Spawning
    );
}

#[tokio::test]
async fn recovery_can_be_disabled_on_open() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::new(dir.path());
    let stale = AgentRecord::new(
        "cadet_1",
        Personality::Cadet,
        None,
        Utc::now() - chrono::Duration::minutes(5),
    );
    std::fs::write(store.path_for(RecordKind::Agents), agent_line(&stale)).unwrap();

    let manager = AgentManager::open(Arc::new(store), config(false))
        .await
        .unwrap();
    assert_eq!(
        manager.get("cadet_1").await.unwrap().status,
        AgentStatus::Spawning
    );
}

#[tokio::test]
async fn jobs_with_unknown_priority_are_skipped() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::new(dir.path());
    let content = concat!(
        r#"{"id":"a","title":"A","status":"pending","priority":"high","dependencies":[],"estimated_hours":1.0}"#,
        "\n",
        r#"{"id":"b","title":"B","status":"pending","priority":"urgent","dependencies":[],"estimated_hours":1.0}"#,
        "\n",
        r#"{"id":"c","title":"C","status":"pending","dependencies":["a"],"estimated_hours":2.5}"#,
        "\n",
        r#"{"id":"d","title":"D","status":"pending","priority":"low","created_at":"2025-01-01T01:00:00Z"}"#,
        "\n",
        r#"{"id":"e","title":"E","status":"pending","created_at":"2025-01-01T00:00:00Z"}"#,
        "\n",
    );
    std::fs::write(store.path_for(RecordKind::Jobs), content).unwrap();

    let board = JobBoard::open(Arc::new(store)).await.unwrap();
    let jobs = board.list().await;
    let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "d", "e"]);
    assert_eq!(jobs[1].priority, None);

    // e has no priority, so it ranks with d as low and wins on creation time
    let ready: Vec<&str> = ready_jobs(&jobs).iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ready, vec!["a", "e", "d"]);
}

#[tokio::test]
async fn adding_a_job_after_an_unterminated_line_keeps_both() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonlStore::new(dir.path()));
    std::fs::write(
        store.path_for(RecordKind::Jobs),
        r#"{"id":"a","title":"A","status":"pending","priority":"high"}"#,
    )
    .unwrap();

    let board = JobBoard::open(Arc::clone(&store)).await.unwrap();
    board
        .add(Job::new("b", "B", Priority::Low))
        .await
        .unwrap();

    let reopened = JobBoard::open(store).await.unwrap();
    let ids: Vec<String> = reopened.list().await.into_iter().map(|j| j.id).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn all_kinds_share_one_directory() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonlStore::new(dir.path().join("data")));

    let agents = AgentManager::open(Arc::clone(&store), config(false))
        .await
        .unwrap();
    let tracker = TimeTracker::open(Arc::clone(&store)).await.unwrap();

    let spawned = agents.spawn(Personality::Debugger, None).await.unwrap();
    spawned.startup.cancel();
    agents.complete_startup(&spawned.agent_id).await.unwrap();
    agents
        .assign_task(&spawned.agent_id, "job-1")
        .await
        .unwrap();
    tracker
        .start("job-1", &spawned.agent_id, "investigating")
        .await
        .unwrap();

    for kind in [RecordKind::Agents, RecordKind::Sessions, RecordKind::Activity] {
        assert!(
            store.path_for(kind).exists(),
            "missing {}",
            kind.file_name()
        );
    }
}
