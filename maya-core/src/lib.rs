//! Core types and utilities for maya-chat
//!
//! This crate provides the error type, configuration, credential loading,
//! logging setup and the in-memory session store used by the other crates.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

#[cfg(test)]
mod test_util;

pub use bootstrap::{bootstrap, Bootstrap};
pub use error::{Error, Result};
