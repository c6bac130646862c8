use super::*;
use crate::event_bus::NotificationKind;
use inkwell_store::MemoryWorkflowStore;
use std::sync::Mutex;

fn tracker_with_log() -> (WorkflowTracker, Arc<Mutex<Vec<BusNotification>>>) {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in NotificationKind::ALL {
        let log = log.clone();
        let _ = bus.subscribe(kind, move |n| {
            log.lock().unwrap().push(n.clone());
            Ok(())
        });
    }
    let tracker = WorkflowTracker::new(Arc::new(MemoryWorkflowStore::new()), bus);
    (tracker, log)
}

#[tokio::test]
async fn test_create_records_and_publishes() {
    let (tracker, log) = tracker_with_log();
    let workflow = tracker
        .create(Workflow::with_id("w1", "draft_review"))
        .await
        .unwrap();
    assert_eq!(workflow.status, WorkflowStatus::Pending);

    let events = tracker.store().list_events("w1").await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EVENT_CREATED);
    assert_eq!(events[0].payload["kind"], "draft_review");

    let published = log.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].kind(), NotificationKind::WorkflowEvent);
}

#[tokio::test]
async fn test_transition_updates_store_and_publishes_status() {
    let (tracker, log) = tracker_with_log();
    tracker
        .create(Workflow::with_id("w1", "draft_review"))
        .await
        .unwrap();

    tracker.transition("w1", WorkflowStatus::Running).await.unwrap();
    let workflow = tracker
        .transition("w1", WorkflowStatus::Succeeded)
        .await
        .unwrap();
    assert_eq!(workflow.status, WorkflowStatus::Succeeded);
    assert_eq!(
        tracker.store().get_workflow("w1").await.unwrap().status,
        WorkflowStatus::Succeeded
    );

    let published = log.lock().unwrap();
    assert_eq!(
        published.last().unwrap(),
        &BusNotification::updated("w1", "succeeded")
    );

    let events = tracker.store().list_events("w1").await.unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["created", "status", "status"]);
}

#[tokio::test]
async fn test_invalid_transition_is_rejected_without_side_effects() {
    let (tracker, log) = tracker_with_log();
    tracker
        .create(Workflow::with_id("w1", "draft_review"))
        .await
        .unwrap();
    let before = log.lock().unwrap().len();

    let err = tokio_test::assert_err!(tracker.transition("w1", WorkflowStatus::Succeeded).await);
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: WorkflowStatus::Pending,
            to: WorkflowStatus::Succeeded
        }
    ));
    assert_eq!(log.lock().unwrap().len(), before);
    assert_eq!(tracker.store().list_events("w1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_workflow() {
    let (tracker, log) = tracker_with_log();

    assert!(matches!(
        tracker.transition("nope", WorkflowStatus::Running).await,
        Err(Error::WorkflowNotFound(_))
    ));
    assert!(matches!(
        tracker.record("nope", "research_done", serde_json::json!({})).await,
        Err(Error::WorkflowNotFound(_))
    ));
    assert!(log.lock().unwrap().is_empty());
}

/// Holds every `get_workflow` caller at a barrier so both racers read the
/// same status before either writes
struct LockstepStore {
    inner: MemoryWorkflowStore,
    barrier: tokio::sync::Barrier,
}

#[async_trait::async_trait]
impl WorkflowStore for LockstepStore {
    async fn create_workflow(&self, workflow: &Workflow) -> inkwell_store::Result<()> {
        self.inner.create_workflow(workflow).await
    }

    async fn update_status(
        &self,
        id: &str,
        from: WorkflowStatus,
        to: WorkflowStatus,
        event: &WorkflowEvent,
    ) -> inkwell_store::Result<()> {
        self.inner.update_status(id, from, to, event).await
    }

    async fn append_event(&self, event: &WorkflowEvent) -> inkwell_store::Result<()> {
        self.inner.append_event(event).await
    }

    async fn get_workflow(&self, id: &str) -> inkwell_store::Result<Workflow> {
        let workflow = self.inner.get_workflow(id).await;
        self.barrier.wait().await;
        workflow
    }

    async fn list_events(&self, workflow_id: &str) -> inkwell_store::Result<Vec<WorkflowEvent>> {
        self.inner.list_events(workflow_id).await
    }

    fn name(&self) -> &str {
        "lockstep"
    }
}

#[tokio::test]
async fn test_concurrent_transitions_never_leave_terminal_state() {
    let store = Arc::new(LockstepStore {
        inner: MemoryWorkflowStore::new(),
        barrier: tokio::sync::Barrier::new(2),
    });
    store
        .create_workflow(&Workflow::with_id("w1", "draft_review"))
        .await
        .unwrap();
    let tracker = WorkflowTracker::new(store.clone(), EventBus::new());

    let (cancel, run) = tokio::join!(
        tracker.transition("w1", WorkflowStatus::Cancelled),
        tracker.transition("w1", WorkflowStatus::Running),
    );
    assert!(cancel.is_ok() || run.is_ok());

    let statuses: Vec<WorkflowStatus> = store
        .inner
        .list_events("w1")
        .await
        .unwrap()
        .iter()
        .filter(|e| e.event_type == EVENT_STATUS)
        .map(|e| e.payload["status"].as_str().unwrap().parse().unwrap())
        .collect();

    // Every recorded step is legal when replayed from pending
    let mut current = WorkflowStatus::Pending;
    for status in &statuses {
        assert!(current.can_transition_to(*status), "{current} -> {status}");
        current = *status;
    }
    assert_eq!(store.inner.get_workflow("w1").await.unwrap().status, current);

    if let Err(err) = run {
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: WorkflowStatus::Cancelled,
                to: WorkflowStatus::Running
            }
        ));
        assert_eq!(statuses, vec![WorkflowStatus::Cancelled]);
    } else {
        // Running won, so cancelling from running is still a legal step
        assert!(cancel.is_ok());
        assert_eq!(
            statuses,
            vec![WorkflowStatus::Running, WorkflowStatus::Cancelled]
        );
    }
}

#[tokio::test]
async fn test_create_duplicate_is_rejected() {
    let (tracker, log) = tracker_with_log();
    tracker
        .create(Workflow::with_id("w1", "draft_review"))
        .await
        .unwrap();

    let err = tokio_test::assert_err!(tracker.create(Workflow::with_id("w1", "other")).await);
    assert!(matches!(err, Error::WorkflowExists(ref id) if id == "w1"));
    assert_eq!(log.lock().unwrap().len(), 1);
    assert_eq!(tracker.store().list_events("w1").await.unwrap().len(), 1);
}
