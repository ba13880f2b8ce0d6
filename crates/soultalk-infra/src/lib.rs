//! Infrastructure layer for SoulTalk.
//!
//! Contains implementations of the ports defined in `soultalk-core`:
//! SQLite session and message storage, the local audio store, the
//! OpenAI-compatible chat provider, and HTTP clients for the emotion and
//! speech services. Also loads `config.toml`.

pub mod config;
pub mod llm;
pub mod perception;
pub mod sqlite;
pub mod storage;
