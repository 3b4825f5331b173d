//! Events emitted while a session is driven through its phases.

use serde::{Deserialize, Serialize};

use crate::status::WorkflowStatus;

/// A single tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// The result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub name: String,
    pub response: serde_json::Value,
}

/// Sub-step of a phase, in the wire shape consumers render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    ToolCall {
        calls: Vec<ToolCall>,
    },
    ToolResponse {
        responses: Vec<ToolResponse>,
    },
    TextResponse {
        #[serde(rename = "isFinalResponse")]
        is_final_response: bool,
        text: String,
    },
    StatusUpdate {
        from: WorkflowStatus,
        to: WorkflowStatus,
    },
}

impl WorkflowEvent {
    pub fn tool_call(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self::ToolCall {
            calls: vec![ToolCall {
                name: name.into(),
                arguments,
            }],
        }
    }

    pub fn tool_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self::ToolResponse {
            responses: vec![ToolResponse {
                name: name.into(),
                response,
            }],
        }
    }

    pub fn text(text: impl Into<String>, is_final_response: bool) -> Self {
        Self::TextResponse {
            is_final_response,
            text: text.into(),
        }
    }
}

/// An event as delivered to consumers, annotated with the session's
/// persisted status at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEvent {
    #[serde(flatten)]
    pub event: WorkflowEvent,
    pub author: String,
    pub session_id: String,
    pub workflow_status: Option<WorkflowStatus>,
}
