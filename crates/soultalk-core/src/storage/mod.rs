//! Blob storage abstractions for uploaded voice recordings.

pub mod audio_store;
