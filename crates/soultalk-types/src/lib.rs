//! Shared domain types for SoulTalk.
//!
//! Sessions, messages, turn outcomes, LLM request shapes, configuration,
//! and the error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
