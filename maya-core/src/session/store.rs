//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn stamped with the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Where a session is in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Idle,
    AwaitingReply,
}

/// A user turn that has been recorded and now needs a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    /// Conversation identifier to send to the intent service
    pub session_id: String,
    /// The utterance exactly as submitted
    pub utterance: String,
}

/// A conversation: one identifier and one ordered, append-only transcript.
///
/// The identifier is generated lazily on first access and never changes
/// afterwards. The transcript always starts with the greeting.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Option<String>,
    transcript: Vec<Turn>,
    state: ConversationState,
    updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a session seeded with one assistant greeting turn
    pub fn new(greeting: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            transcript: vec![Turn::new(Role::Assistant, greeting)],
            state: ConversationState::Idle,
            updated_at: now,
        }
    }

    /// Return the conversation identifier, generating it on first call
    pub fn get_or_create_session_id(&mut self) -> &str {
        self.id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .as_str()
    }

    /// The identifier, if one has been generated yet
    pub fn session_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Append one turn at the end of the transcript
    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(Turn::new(role, content));
        self.updated_at = Utc::now();
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Time of the last appended turn
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record a user utterance and move to `AwaitingReply`.
    ///
    /// Fails on blank input or while a previous reply is still pending; the
    /// transcript is untouched in both cases.
    pub fn begin_turn(&mut self, text: &str) -> crate::Result<PendingTurn> {
        if text.trim().is_empty() {
            return Err(crate::Error::Validation(
                "utterance must not be empty".to_string(),
            ));
        }
        if self.state == ConversationState::AwaitingReply {
            return Err(crate::Error::Session(
                "a reply is already in flight for this session".to_string(),
            ));
        }

        let session_id = self.get_or_create_session_id().to_string();
        self.append_turn(Role::User, text);
        self.state = ConversationState::AwaitingReply;

        Ok(PendingTurn {
            session_id,
            utterance: text.to_string(),
        })
    }

    /// Record the reply to the pending utterance and return to `Idle`
    pub fn complete_turn(&mut self, reply: impl Into<String>) -> crate::Result<()> {
        if self.state != ConversationState::AwaitingReply {
            return Err(crate::Error::Session(
                "no pending utterance to reply to".to_string(),
            ));
        }
        self.append_turn(Role::Assistant, reply);
        self.state = ConversationState::Idle;
        Ok(())
    }
}
