//! Web chat front-end: HTTP API, chat page and the conversation exchange

pub mod conversation;
pub mod handlers;
pub mod server;
pub mod state;
pub mod widget;

#[cfg(test)]
mod test_support;

pub use conversation::{exchange, ExchangeOutcome};
pub use server::{router, run_server};
pub use state::{intent_client, AppState};
