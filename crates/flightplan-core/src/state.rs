//! UI-agnostic conversation state types
//!
//! These are shared by every front end and don't depend on any specific UI
//! framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single transcript entry. Never mutated after it is pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::now(Role::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::now(Role::Bot, text)
    }

    fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    /// Hour and minute, two digits each (e.g. "09:41")
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}
