//! HTTP/REST API layer for SoulTalk.
//!
//! Axum-based JSON API under `/api/` with CORS support and static serving
//! of stored voice recordings.

pub mod error;
pub mod handlers;
pub mod router;
