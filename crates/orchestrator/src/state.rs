use std::sync::Arc;

use sa_commands::CommandBus;
use sa_domain::config::Config;
use sa_domain::ports::{Clock, LLMClient, ObjectStore, OrderStore, SessionStore, TTS};
use sa_llm::IntentClassifier;
use sa_menu::MenuReadModel;
use sa_sessions::SessionLockMap;

use crate::runtime::cancel::CancelMap;

/// Shared application state passed to every turn.
///
/// Fields are grouped by concern:
/// - **Core services** — config, clock
/// - **Session management** — sessions, orders, per-session turn lock
/// - **Menu & commands** — read model, command bus
/// - **LLM & audio** — classifier, LLM client, TTS, object store
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,

    // ── Session management ────────────────────────────────────────────
    pub sessions: Arc<dyn SessionStore>,
    pub orders: Arc<dyn OrderStore>,
    pub session_locks: Arc<SessionLockMap>,
    pub cancel_map: Arc<CancelMap>,

    // ── Menu & commands ────────────────────────────────────────────────
    pub menu: Arc<MenuReadModel>,
    pub commands: Arc<CommandBus>,

    // ── LLM & audio ────────────────────────────────────────────────────
    pub llm: Arc<dyn LLMClient>,
    pub classifier: Arc<IntentClassifier>,
    pub tts: Arc<dyn TTS>,
    pub object_store: Arc<dyn ObjectStore>,
}
