//! Conversation logic for SoulTalk.
//!
//! Ports for the session registry and history store, plus the title
//! deriver, reply generator, turn orchestrator, and session service built
//! on top of them.

pub mod reply;
pub mod repository;
pub mod service;
pub mod title;
pub mod turn;

#[cfg(test)]
pub(crate) mod test_support;
