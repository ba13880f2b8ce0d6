//! Observability setup for SoulTalk: structured logging and optional
//! OpenTelemetry trace export.

pub mod tracing_setup;
