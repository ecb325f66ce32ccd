//! Shared types for the Insight Engine: conversation messages, the wire
//! event union, the config tree, and the common error type.

pub mod config;
pub mod error;
pub mod event;
pub mod message;

pub use error::{Error, Result};
