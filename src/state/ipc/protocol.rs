//! Wire format for the control socket.
//!
//! One JSON object per line in each direction. A client sends a single
//! request, reads a single response, and hangs up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::StatusSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    Status,
    /// Force the lights on. `seconds` defaults to the configured greet duration.
    Greet {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seconds: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum IpcResponse {
    Status(StatusSnapshot),
    Greeted { until: DateTime<Utc> },
    Error { message: String },
}

impl IpcResponse {
    pub fn error(message: impl Into<String>) -> Self {
        IpcResponse::Error {
            message: message.into(),
        }
    }
}
