//! Server-Sent Events framing of a workflow event stream.
//!
//! ```text
//! data: {"type":"ToolCall",...,"workflow_status":"MEAL_PLANNING_STARTED"}
//!
//! event: error
//! data: {"error":"...","kind":"planner_failure"}
//!
//! event: done
//! data: {}
//! ```

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

use autonom_runtime::{StreamItem, WorkflowEventStream};

/// One SSE frame per stream item.
pub fn frame(item: &StreamItem) -> Event {
    match item {
        StreamItem::Event(event) => {
            let payload = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
            Event::default().data(payload)
        }
        StreamItem::Failed(failure) => {
            let payload = serde_json::to_string(failure).unwrap_or_else(|_| "{}".to_string());
            Event::default().event("error").data(payload)
        }
        StreamItem::Done => Event::default().event("done").data("{}"),
    }
}

pub fn event_stream(
    mut events: WorkflowEventStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let frames = stream! {
        while let Some(item) = events.next().await {
            let done = matches!(item, StreamItem::Done);
            yield Ok(frame(&item));
            if done {
                break;
            }
        }
    };

    Sse::new(frames).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
