use std::sync::Arc;

use ie_domain::config::Config;
use ie_providers::LanguageModel;
use ie_search::ToolGateway;
use ie_sessions::SessionStore;

use crate::runtime::cancel::CancelMap;
use crate::runtime::session_lock::SessionLockMap;

/// Shared handles threaded through every request handler and turn task.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<dyn LanguageModel>,
    pub tools: Arc<ToolGateway>,
    pub sessions: Arc<SessionStore>,
    pub session_locks: Arc<SessionLockMap>,
    pub cancel_map: Arc<CancelMap>,
}
