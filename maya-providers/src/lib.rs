//! Intent-detection provider integrations for maya-chat
//!
//! [`IntentProvider`] is the seam to the remote service; [`DialogflowClient`]
//! implements it over the Dialogflow ES REST API. [`IntentClient`] wraps a
//! provider and turns every failure into the fallback reply.

pub mod auth;
pub mod base;
pub mod client;
pub mod dialogflow;

pub use auth::{token_source_for, AccessTokenSource, ServiceAccountTokenSource, StaticTokenSource};
pub use base::{
    DetectIntentRequest, DetectIntentResponse, IntentProvider, ProviderError, ProviderResult,
};
pub use client::{IntentClient, IntentReply};
pub use dialogflow::{session_path, DialogflowClient};
