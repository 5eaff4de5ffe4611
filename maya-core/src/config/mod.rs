//! Configuration management
//!
//! Handles loading and validation of maya-chat configuration from files
//! and environment variables, and resolution of the Google credentials.

pub mod credentials;
pub mod loader;
pub mod schema;
pub mod validate;

pub use credentials::{load_credentials, CredentialSource, Credentials, Secret};
pub use loader::ConfigLoader;
pub use schema::*;
