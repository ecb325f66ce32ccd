//! HTTP gateway for the research agent: routes, turn runtime, and shared state.

pub mod api;
pub mod runtime;
pub mod state;
