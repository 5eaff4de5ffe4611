//! Session management for conversation transcripts
//!
//! A [`ChatSession`] owns one conversation identifier and one ordered
//! transcript; the [`SessionManager`] keeps one per browser session.

pub mod manager;
pub mod store;

pub use manager::SessionManager;
pub use store::{ChatSession, ConversationState, PendingTurn, Role, Turn};
