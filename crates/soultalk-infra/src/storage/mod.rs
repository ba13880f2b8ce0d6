//! Uploaded audio storage on the local filesystem.

pub mod audio;
