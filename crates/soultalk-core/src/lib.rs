//! Business logic and port definitions for SoulTalk.
//!
//! This crate defines the "ports" (repository and collaborator traits) that
//! the infrastructure layer implements. It depends only on `soultalk-types`
//! -- never on `soultalk-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod perception;
pub mod storage;
