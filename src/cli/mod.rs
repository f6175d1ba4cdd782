//! CLI-specific utilities for stream-relay
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod items;
pub mod progress;

pub use progress::ProgressManager;
