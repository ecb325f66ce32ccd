//! Turn runtime: the reasoning loop, context assembly, and per-session
//! concurrency primitives.

pub mod agent_loop;
pub mod cancel;
pub mod context;
pub mod session_lock;
pub mod turn;

pub use turn::{run_turn, TurnInput};
