//! Event stream of one run/resume invocation.
//!
//! The controller task is the only producer. Items arrive in emission order
//! and the stream always ends with [`StreamItem::Done`]. A consumer that goes
//! away only stops receiving; the producer keeps driving the session.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

use autonom_protocols::error::WorkflowError;
use autonom_protocols::event::{AnnotatedEvent, WorkflowEvent};
use autonom_protocols::session::SessionStore;
use autonom_protocols::status::WorkflowStatus;

/// Why an invocation stopped early.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamFailure {
    pub error: String,
    pub kind: String,
}

impl From<&WorkflowError> for StreamFailure {
    fn from(err: &WorkflowError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    Event(AnnotatedEvent),
    Failed(StreamFailure),
    Done,
}

/// Receiving half handed to the caller.
pub struct WorkflowEventStream {
    receiver: mpsc::Receiver<StreamItem>,
}

impl WorkflowEventStream {
    /// Stream that yields only [`StreamItem::Done`].
    pub fn finished() -> Self {
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(StreamItem::Done);
        Self { receiver: rx }
    }
}

impl Stream for WorkflowEventStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

/// Sending half used by the controller task.
///
/// Every event is annotated with the `workflow_status` read back from the
/// store at emission time.
pub struct EventEmitter {
    tx: mpsc::Sender<StreamItem>,
    store: Arc<dyn SessionStore>,
    session_id: String,
}

impl EventEmitter {
    pub fn channel(
        store: Arc<dyn SessionStore>,
        session_id: impl Into<String>,
        buffer: usize,
    ) -> (Self, WorkflowEventStream) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let emitter = Self {
            tx,
            store,
            session_id: session_id.into(),
        };
        (emitter, WorkflowEventStream { receiver: rx })
    }

    async fn current_status(&self) -> Option<WorkflowStatus> {
        match self
            .store
            .get_state_value(&self.session_id, "workflow_status")
            .await
        {
            Ok(value) => value.and_then(|v| v.as_str().and_then(|s| s.parse().ok())),
            Err(e) => {
                tracing::debug!(session_id = %self.session_id, "Status read-back failed: {}", e);
                None
            }
        }
    }

    pub async fn emit(&self, author: &str, event: WorkflowEvent) {
        let annotated = AnnotatedEvent {
            event,
            author: author.to_string(),
            session_id: self.session_id.clone(),
            workflow_status: self.current_status().await,
        };
        // A closed channel means the consumer left; the run carries on.
        let _ = self.tx.send(StreamItem::Event(annotated)).await;
    }

    pub async fn fail(&self, err: &WorkflowError) {
        let _ = self.tx.send(StreamItem::Failed(err.into())).await;
    }

    pub async fn done(self) {
        let _ = self.tx.send(StreamItem::Done).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemorySessionStore;
    use autonom_protocols::session::{SessionKey, StateMap};
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_events_annotated_with_persisted_status() {
        let store = Arc::new(MemorySessionStore::new());
        let mut state = StateMap::new();
        state.insert("workflow_status".to_string(), json!("MEAL_PLANNING_STARTED"));
        store
            .create(&SessionKey::new("app", "u1", "s1"), state)
            .await
            .unwrap();

        let (emitter, stream) = EventEmitter::channel(store, "s1", 8);
        emitter.emit("MealPlanner", WorkflowEvent::text("thinking", false)).await;
        emitter.done().await;

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        match &items[0] {
            StreamItem::Event(event) => {
                assert_eq!(event.workflow_status, Some(WorkflowStatus::MealPlanningStarted));
                assert_eq!(event.author, "MealPlanner");
                assert_eq!(event.session_id, "s1");
            }
            other => panic!("unexpected item {:?}", other),
        }
        assert_eq!(items[1], StreamItem::Done);
    }

    #[tokio::test]
    async fn test_unknown_session_annotates_none() {
        let store = Arc::new(MemorySessionStore::new());
        let (emitter, mut stream) = EventEmitter::channel(store, "ghost", 8);
        emitter.emit("OrderAgent", WorkflowEvent::text("hi", true)).await;
        match stream.next().await {
            Some(StreamItem::Event(event)) => assert!(event.workflow_status.is_none()),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_item_carries_kind() {
        let store = Arc::new(MemorySessionStore::new());
        let (emitter, stream) = EventEmitter::channel(store, "s1", 8);
        emitter
            .fail(&WorkflowError::PlannerFailure("boom".to_string()))
            .await;
        emitter.done().await;

        let items: Vec<_> = stream.collect().await;
        match &items[0] {
            StreamItem::Failed(failure) => {
                assert_eq!(failure.kind, "planner_failure");
                assert!(failure.error.contains("boom"));
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emit_after_consumer_dropped_does_not_block() {
        let store = Arc::new(MemorySessionStore::new());
        let (emitter, stream) = EventEmitter::channel(store, "s1", 1);
        drop(stream);
        for _ in 0..5 {
            emitter.emit("MealPlanner", WorkflowEvent::text("x", false)).await;
        }
        emitter.done().await;
    }

    #[tokio::test]
    async fn test_finished_stream() {
        let items: Vec<_> = WorkflowEventStream::finished().collect().await;
        assert_eq!(items, vec![StreamItem::Done]);
    }
}
