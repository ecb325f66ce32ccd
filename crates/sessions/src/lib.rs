//! Durable session state: the session index plus append-only per-session
//! message logs, accessed through one narrow repository surface
//! ([`SessionStore`]).

mod log;
mod store;
mod title;

pub use log::{ChatRole, StoredMessage};
pub use store::{Session, SessionStore};
pub use title::derive_title;
