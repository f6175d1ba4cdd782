//! Core library modules for stream-relay
//!
//! This module contains the internal implementation details of the stream-relay library.

pub mod client;
pub mod config;
pub mod download;
pub mod engine;
pub mod error;
pub mod headers;
pub mod node;
pub mod request;
pub mod result;
pub mod stream;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for internal use
pub use engine::TransferEngine;
