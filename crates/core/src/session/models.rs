#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Distance shown on the completion screen. A presentation fiction, never computed.
pub const WALK_DISTANCE_LABEL: &str = "1.2 miles";
/// Duration shown on the completion screen. Also a fiction.
pub const WALK_DURATION_LABEL: &str = "30 mins";

/// Sender label attached to locally sent chat messages.
pub const LOCAL_SENDER: &str = "You";

/// Which side of the walk a session participates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Requests a walking companion.
    Wanderer,
    /// Provides companionship on a walk.
    Walker,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Wanderer => "Wanderer",
            Role::Walker => "Walker",
        }
    }
}

/// Lifecycle of a single walk. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WalkStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl WalkStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WalkStatus::NotStarted => "not started",
            WalkStatus::InProgress => "in progress",
            WalkStatus::Completed => "completed",
        }
    }
}

/// One chat entry. Append-only; cleared only by a full session reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            sender: LOCAL_SENDER.to_string(),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    /// Whether this message was sent from the local session.
    pub fn is_local(&self) -> bool {
        self.sender == LOCAL_SENDER
    }
}

/// All state for one interactive session. Constructed explicitly, mutated
/// only by the reducer, destroyed and rebuilt by reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub logged_in: bool,
    pub username: String,
    pub role: Option<Role>,
    pub matched: bool,
    /// Display name of the matched counterpart. Only populated on the
    /// wanderer side; the walker's counterpart stays anonymous.
    pub partner: Option<String>,
    pub messages: Vec<Message>,
    pub walk_status: WalkStatus,
    pub payment_done: bool,
    pub started_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            logged_in: false,
            username: String::new(),
            role: None,
            matched: false,
            partner: None,
            messages: Vec::new(),
            walk_status: WalkStatus::NotStarted,
            payment_done: false,
            started_at: Utc::now(),
        }
    }
}

impl Session {
    /// Fresh session with every field at its documented default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh session, discarding all current state.
    pub fn reset(&self) -> Self {
        Self::new()
    }

    /// Tail of the chat log shown while a walk is in progress. The full
    /// log is retained underneath regardless of the window size.
    pub fn visible_messages(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    pub fn is_wanderer(&self) -> bool {
        self.role == Some(Role::Wanderer)
    }

    pub fn is_walker(&self) -> bool {
        self.role == Some(Role::Walker)
    }

    /// Display name for the counterpart, falling back to a generic label
    /// when no name was recorded.
    pub fn partner_label(&self) -> &str {
        match (self.partner.as_deref(), self.role) {
            (Some(name), _) => name,
            (None, Some(Role::Walker)) => "your Wanderer",
            _ => "your walking partner",
        }
    }
}
