//! Integration tests for the callback engine
//!
//! These tests drive the engine the way the embedding application would:
//! manager events in, script commands against mock sessions, and scheduler
//! sweeps against a recording originator.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serial_test::serial;

use ringback_engine::prelude::*;
use ringback_engine::scheduler::CallbackScheduler;

/// Records every origination request instead of dialing anything.
#[derive(Default)]
struct RecordingOriginator {
    requests: Mutex<Vec<OriginateRequest>>,
}

impl RecordingOriginator {
    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> Option<OriginateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Originator for RecordingOriginator {
    async fn originate(&self, request: OriginateRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request);
        Ok(())
    }
}

/// A scripted call session that records what the engine tells it.
struct MockSession {
    unique_id: String,
    caller_id: String,
    variables: Vec<(String, String)>,
    played: Vec<String>,
    waits: u32,
    priorities: Vec<u32>,
    finishes: u32,
}

impl MockSession {
    fn new(unique_id: &str, caller_id: &str) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            caller_id: caller_id.to_string(),
            variables: Vec::new(),
            played: Vec::new(),
            waits: 0,
            priorities: Vec::new(),
            finishes: 0,
        }
    }
}

#[async_trait]
impl CallSession for MockSession {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn caller_id(&self) -> &str {
        &self.caller_id
    }

    async fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.variables.push((name.to_string(), value.to_string()));
        Ok(())
    }

    async fn stream_file(&mut self, file: &str) -> Result<()> {
        self.played.push(file.to_string());
        Ok(())
    }

    async fn wait(&mut self, _seconds: u32) -> Result<()> {
        self.waits += 1;
        Ok(())
    }

    async fn set_priority(&mut self, priority: u32) -> Result<()> {
        self.priorities.push(priority);
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.finishes += 1;
        Ok(())
    }
}

async fn create_test_engine(queues: &[&str], attempt_limit: u32) -> CallbackEngine {
    let mut config = CallbackConfig::default();
    config.queues.monitored = queues.iter().map(|q| q.to_string()).collect();
    config.scheduler.attempt_limit = attempt_limit;
    config.originate.trunk = "trunk.example.net".to_string();

    CallbackEngine::new(config, Some(":memory:".to_string()))
        .await
        .expect("engine creation failed")
}

fn test_scheduler(engine: &CallbackEngine, originator: Arc<RecordingOriginator>) -> CallbackScheduler {
    CallbackScheduler::new(
        engine.database().clone(),
        engine.config(),
        originator,
        engine.link(),
    )
}

fn join(queue: &str, uid: &str, caller: &str) -> ManagerEvent {
    ManagerEvent::Join {
        queue: queue.to_string(),
        unique_id: uid.to_string(),
        caller_id_num: caller.to_string(),
    }
}

fn leave(queue: &str, uid: &str) -> ManagerEvent {
    ManagerEvent::Leave {
        queue: queue.to_string(),
        unique_id: uid.to_string(),
    }
}

async fn blacklist(engine: &CallbackEngine, number: &str) {
    sqlx::query("INSERT INTO callback_blacklist (number) VALUES (?1)")
        .bind(number)
        .execute(engine.database().pool())
        .await
        .expect("blacklist seed failed");
}

#[tokio::test]
#[serial]
async fn test_join_then_leave_removes_entry() {
    let engine = create_test_engine(&["Dev"], 3).await;

    engine.handle_event(&join("Dev", "100", "5550001")).await;
    let entry = engine
        .database()
        .entry("100")
        .await
        .expect("query failed")
        .expect("entry tracked");
    assert!(!entry.callback);
    assert_eq!(entry.count, 0);

    engine.handle_event(&leave("Dev", "100")).await;
    assert!(engine.database().entry("100").await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_unmonitored_queue_events_are_ignored() {
    let engine = create_test_engine(&["Dev"], 3).await;

    engine.handle_event(&join("Sales", "200", "5550002")).await;
    assert!(engine.database().entry("200").await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_callback_entry_survives_leave() {
    let engine = create_test_engine(&["Dev"], 3).await;

    engine.handle_event(&join("Dev", "100", "5550001")).await;
    let mut session = MockSession::new("100", "5550001");
    engine
        .commands()
        .toggle_callback(&mut session, Some("5551234".to_string()), None)
        .await
        .expect("toggle failed");

    engine.handle_event(&leave("Dev", "100")).await;

    let entry = engine.database().entry("100").await.unwrap().expect("entry kept");
    assert!(entry.callback);
    assert_eq!(session.finishes, 1);
}

#[tokio::test]
#[serial]
async fn test_toggle_parity() {
    let engine = create_test_engine(&["Dev"], 3).await;
    engine.handle_event(&join("Dev", "101", "5550001")).await;

    for round in 0..4 {
        let mut session = MockSession::new("101", "5550001");
        engine
            .commands()
            .toggle_callback(&mut session, Some("5551234".to_string()), Some("A1".to_string()))
            .await
            .expect("toggle failed");
        assert_eq!(session.finishes, 1);

        let entry = engine.database().entry("101").await.unwrap().unwrap();
        // Odd number of toggles flips the flag on, even restores it
        assert_eq!(entry.callback, round % 2 == 0);
    }
}

#[tokio::test]
#[serial]
async fn test_toggle_without_entry_creates_nothing() {
    let engine = create_test_engine(&["Dev"], 3).await;

    let mut session = MockSession::new("404", "5550001");
    let result = engine
        .commands()
        .toggle_callback(&mut session, Some("5551234".to_string()), None)
        .await;

    assert!(matches!(result, Err(CallbackError::NotFound(_))));
    assert!(engine.database().entry("404").await.unwrap().is_none());
    assert_eq!(session.finishes, 1);
}

#[tokio::test]
#[serial]
async fn test_caller_id_is_fallback_number() {
    let engine = create_test_engine(&["Dev"], 3).await;
    engine.handle_event(&join("Dev", "103", "5550007")).await;

    let mut session = MockSession::new("103", "5550007");
    engine
        .commands()
        .toggle_callback(&mut session, None, None)
        .await
        .expect("toggle failed");

    let entry = engine.database().entry("103").await.unwrap().unwrap();
    assert!(entry.callback);
    assert_eq!(entry.number.as_deref(), Some("5550007"));
}

#[tokio::test]
#[serial]
async fn test_blacklisted_number_rejected() {
    let engine = create_test_engine(&["Dev"], 3).await;
    blacklist(&engine, "5559999").await;

    engine.handle_event(&join("Dev", "102", "5550001")).await;

    let mut session = MockSession::new("102", "5550001");
    engine
        .commands()
        .toggle_callback(&mut session, Some("5559999".to_string()), None)
        .await
        .expect("rejection is not an error");

    // The caller hears the rejection and the entry is untouched
    assert!(session.variables.contains(&("INVALID".to_string(), "1".to_string())));
    assert_eq!(session.played, vec!["privacy-incorrect".to_string()]);
    assert_eq!(session.finishes, 1);

    let entry = engine.database().entry("102").await.unwrap().unwrap();
    assert!(!entry.callback);
    assert_eq!(engine.database().pending_callbacks("Dev").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_number_absent_from_blacklist_allows_toggle() {
    let engine = create_test_engine(&["Dev"], 3).await;
    blacklist(&engine, "5559999").await;

    engine.handle_event(&join("Dev", "102", "5550001")).await;

    let mut session = MockSession::new("102", "5550001");
    engine
        .commands()
        .toggle_callback(&mut session, Some("5551234".to_string()), None)
        .await
        .expect("toggle failed");

    assert!(session.variables.is_empty());
    let entry = engine.database().entry("102").await.unwrap().unwrap();
    assert!(entry.callback);
}

#[tokio::test]
#[serial]
async fn test_remove_callback_is_forced_and_idempotent() {
    let engine = create_test_engine(&["Dev"], 3).await;

    engine.handle_event(&join("Dev", "100", "5550001")).await;
    let mut session = MockSession::new("100", "5550001");
    engine
        .commands()
        .toggle_callback(&mut session, Some("5551234".to_string()), None)
        .await
        .expect("toggle failed");

    // Force semantics: the flagged entry goes away
    let mut session = MockSession::new("100", "5550001");
    engine
        .commands()
        .remove_callback(&mut session, Some("100".to_string()))
        .await
        .expect("remove failed");
    assert!(engine.database().entry("100").await.unwrap().is_none());
    assert_eq!(session.finishes, 1);

    // Second removal of an absent uid is quietly fine
    let mut session = MockSession::new("100", "5550001");
    engine
        .commands()
        .remove_callback(&mut session, Some("100".to_string()))
        .await
        .expect("second remove failed");
    assert_eq!(session.finishes, 1);

    // Missing argument is rejected but still answered exactly once
    let mut session = MockSession::new("100", "5550001");
    let result = engine.commands().remove_callback(&mut session, None).await;
    assert!(matches!(result, Err(CallbackError::InvalidArgument(_))));
    assert_eq!(session.finishes, 1);
}

#[tokio::test]
#[serial]
async fn test_scheduler_attempt_limit() {
    let engine = create_test_engine(&["Dev"], 3).await;
    let originator = Arc::new(RecordingOriginator::default());
    let scheduler = test_scheduler(&engine, originator.clone());
    engine.link().set_up();

    engine.handle_event(&join("Dev", "101", "5550001")).await;
    let mut session = MockSession::new("101", "5550001");
    engine
        .commands()
        .toggle_callback(&mut session, Some("5551234".to_string()), Some("A1".to_string()))
        .await
        .expect("toggle failed");

    // Three sweeps originate and count up
    for expected in 1..=3 {
        scheduler.tick_queue("Dev").await;
        assert_eq!(originator.count(), expected as usize);
        let entry = engine.database().entry("101").await.unwrap().unwrap();
        assert_eq!(entry.count, expected);
    }

    let request = originator.last().expect("origination recorded");
    assert_eq!(request.channel, "SIP/5551234@trunk.example.net");
    assert_eq!(request.context, "queue-callback");
    assert_eq!(request.exten, "s");
    assert_eq!(request.variables.get("CALLBACK_UID"), Some(&"101".to_string()));
    assert_eq!(request.variables.get("CALLBACK_QUEUE"), Some(&"Dev".to_string()));
    assert_eq!(request.variables.get("CALLBACK_ROOM"), Some(&"A1".to_string()));

    // Fourth sweep hits the limit: no origination, the entry is given up on
    scheduler.tick_queue("Dev").await;
    assert_eq!(originator.count(), 3);
    assert!(engine.database().entry("101").await.unwrap().is_none());

    // And the queue stays quiet afterwards
    scheduler.tick_queue("Dev").await;
    assert_eq!(originator.count(), 3);
}

#[tokio::test]
#[serial]
async fn test_scheduler_takes_oldest_pending_first() {
    let engine = create_test_engine(&["Dev"], 3).await;
    let originator = Arc::new(RecordingOriginator::default());
    let scheduler = test_scheduler(&engine, originator.clone());
    engine.link().set_up();

    for (uid, number) in [("100", "5551111"), ("101", "5552222")] {
        engine.handle_event(&join("Dev", uid, "5550001")).await;
        let mut session = MockSession::new(uid, "5550001");
        engine
            .commands()
            .toggle_callback(&mut session, Some(number.to_string()), None)
            .await
            .expect("toggle failed");
    }

    scheduler.tick_queue("Dev").await;
    let request = originator.last().unwrap();
    assert_eq!(request.variables.get("CALLBACK_UID"), Some(&"100".to_string()));

    // The oldest entry stays first until it is removed
    scheduler.tick_queue("Dev").await;
    let request = originator.last().unwrap();
    assert_eq!(request.variables.get("CALLBACK_UID"), Some(&"100".to_string()));

    let mut session = MockSession::new("100", "5550001");
    engine
        .commands()
        .remove_callback(&mut session, Some("100".to_string()))
        .await
        .expect("remove failed");

    scheduler.tick_queue("Dev").await;
    let request = originator.last().unwrap();
    assert_eq!(request.variables.get("CALLBACK_UID"), Some(&"101".to_string()));
}

#[tokio::test]
#[serial]
async fn test_sweep_skips_while_link_down() {
    let engine = create_test_engine(&["Dev"], 3).await;
    let originator = Arc::new(RecordingOriginator::default());
    let scheduler = test_scheduler(&engine, originator.clone());

    engine.handle_event(&join("Dev", "100", "5550001")).await;
    let mut session = MockSession::new("100", "5550001");
    engine
        .commands()
        .toggle_callback(&mut session, Some("5551234".to_string()), None)
        .await
        .expect("toggle failed");

    // Link starts down: nothing is dialed, nothing is counted
    scheduler.sweep().await;
    assert_eq!(originator.count(), 0);
    assert_eq!(engine.database().entry("100").await.unwrap().unwrap().count, 0);

    engine.link().set_up();
    scheduler.sweep().await;
    assert_eq!(originator.count(), 1);

    engine.link().set_down();
    scheduler.sweep().await;
    assert_eq!(originator.count(), 1);
}

#[tokio::test]
#[serial]
async fn test_agent_lifecycle() {
    let engine = create_test_engine(&["Dev"], 3).await;

    engine
        .handle_event(&ManagerEvent::QueueMemberAdded {
            queue: "Dev".to_string(),
            location: "SIP/2001".to_string(),
            member_name: "Agent 2001".to_string(),
            penalty: 0,
            calls_taken: 0,
            last_call: 0,
            status: DeviceState::NotInUse,
            paused: false,
        })
        .await;

    let members = engine.database().members("Dev").await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].agent, "2001");
    assert_eq!(members[0].location, "SIP/2001");

    engine
        .handle_event(&ManagerEvent::QueueMemberStatus {
            queue: "Dev".to_string(),
            location: "SIP/2001".to_string(),
            penalty: 1,
            calls_taken: 4,
            last_call: 1_700_000_000,
            status: DeviceState::InUse,
            paused: false,
        })
        .await;

    let members = engine.database().members("Dev").await.unwrap();
    assert_eq!(members[0].calls_taken, 4);
    assert_eq!(members[0].status, DeviceState::InUse.code());

    engine
        .handle_event(&ManagerEvent::QueueMemberPaused {
            queue: "Dev".to_string(),
            location: "SIP/2001".to_string(),
            member_name: "Agent 2001".to_string(),
            paused: true,
        })
        .await;
    assert!(engine.database().members("Dev").await.unwrap()[0].paused);

    engine
        .handle_event(&ManagerEvent::QueueMemberRemoved {
            queue: "Dev".to_string(),
            location: "SIP/2001".to_string(),
            member_name: "Agent 2001".to_string(),
        })
        .await;
    assert!(engine.database().members("Dev").await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_malformed_member_location_is_dropped() {
    let engine = create_test_engine(&["Dev"], 3).await;

    engine
        .handle_event(&ManagerEvent::QueueMemberAdded {
            queue: "Dev".to_string(),
            location: "2001".to_string(),
            member_name: "Agent 2001".to_string(),
            penalty: 0,
            calls_taken: 0,
            last_call: 0,
            status: DeviceState::NotInUse,
            paused: false,
        })
        .await;

    assert!(engine.database().members("Dev").await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_reconcile_rebuilds_from_snapshot() {
    let engine = create_test_engine(&["Dev"], 3).await;

    // Stale pre-disconnect state: one plain caller, one flagged caller,
    // one member
    engine.handle_event(&join("Dev", "100", "5550001")).await;
    engine.handle_event(&join("Dev", "101", "5550002")).await;
    let mut session = MockSession::new("101", "5550002");
    engine
        .commands()
        .toggle_callback(&mut session, Some("5551234".to_string()), None)
        .await
        .expect("toggle failed");
    engine
        .handle_event(&ManagerEvent::QueueMemberAdded {
            queue: "Dev".to_string(),
            location: "SIP/2001".to_string(),
            member_name: "Agent 2001".to_string(),
            penalty: 0,
            calls_taken: 0,
            last_call: 0,
            status: DeviceState::NotInUse,
            paused: false,
        })
        .await;

    let snapshot = vec![
        QueueSnapshotRecord::Entry {
            queue: "Dev".to_string(),
            unique_id: "300".to_string(),
            caller_id_num: "5550003".to_string(),
        },
        QueueSnapshotRecord::Member {
            queue: "Dev".to_string(),
            location: "SIP/2002".to_string(),
            member_name: "Agent 2002".to_string(),
            penalty: 0,
            calls_taken: 2,
            last_call: 0,
            status: DeviceState::NotInUse,
            paused: false,
        },
        QueueSnapshotRecord::Entry {
            queue: "Sales".to_string(),
            unique_id: "400".to_string(),
            caller_id_num: "5550004".to_string(),
        },
    ];
    engine.reconcile(&snapshot).await;

    // Plain entries and members were replaced by the dump
    assert!(engine.database().entry("100").await.unwrap().is_none());
    assert!(engine.database().entry("300").await.unwrap().is_some());
    let members = engine.database().members("Dev").await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].agent, "2002");

    // The flagged caller is still owed a callback
    let kept = engine.database().entry("101").await.unwrap().expect("kept");
    assert!(kept.callback);

    // Unmonitored records in the dump are ignored
    assert!(engine.database().entry("400").await.unwrap().is_none());
}
