//! HTTP clients for the out-of-process emotion and speech models.
//!
//! Implements the perception ports from `soultalk-core`.

pub mod http;
