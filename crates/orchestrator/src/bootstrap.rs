//! AppState construction and background-task spawning, mirroring the
//! teacher's split between building the app once and letting `main.rs`
//! decide whether to run a REPL or a one-shot turn on top of it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use sa_commands::CommandBus;
use sa_domain::config::ConfigSeverity;
use sa_domain::ports::SystemClock;
use sa_llm::{HttpLlmClient, IntentClassifier};
use sa_menu::MenuReadModel;
use sa_sessions::{InMemoryOrderStore, InMemorySessionStore, SessionLockMap};

use crate::adapters::{LocalObjectStore, SilentTts, StaticMenuRepository};
use crate::config::AppConfig;
use crate::runtime::cancel::CancelMap;
use crate::state::AppState;

/// Validate config, wire every port adapter and return a fully-built
/// [`AppState`]. Shared by the `chat` and `run` CLI commands.
pub fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.pipeline.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if sa_domain::config::Config::has_errors(&issues) {
        anyhow::bail!("config validation failed with {} error(s)", issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count());
    }
    let config = Arc::new(config);

    // ── Clock ────────────────────────────────────────────────────────
    let clock: Arc<dyn sa_domain::ports::Clock> = Arc::new(SystemClock);

    // ── Menu read model ──────────────────────────────────────────────
    let menu_repo = Arc::new(StaticMenuRepository);
    let menu = Arc::new(MenuReadModel::new(menu_repo, clock.clone()));
    tracing::info!("menu read model ready (static demo catalog)");

    // ── Session + order stores, per-session lock ─────────────────────
    let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));
    let orders = Arc::new(InMemoryOrderStore::new(clock.clone()));
    let session_locks = Arc::new(SessionLockMap::new());
    tracing::info!("session store, order store and session lock map ready (in-memory)");

    // ── Command bus ────────────────────────────────────────────────────
    let order_ttl = Duration::from_secs(config.pipeline.session.session_ttl_secs);
    let commands = Arc::new(CommandBus::new(menu.clone(), orders.clone(), clock.clone(), config.pipeline.pipeline.clone(), order_ttl));
    tracing::info!("command bus ready");

    // ── LLM client + intent classifier ────────────────────────────────
    let llm_timeout = Duration::from_millis(config.pipeline.timeouts.llm_timeout_ms);
    let llm = Arc::new(HttpLlmClient::from_config(&config.provider, llm_timeout).context("initializing LLM client")?);
    let classifier = Arc::new(IntentClassifier::new(llm.clone(), config.pipeline.llm.model.clone()));
    tracing::info!(model = %config.pipeline.llm.model, "LLM client and intent classifier ready");

    // ── Audio: TTS + object store ─────────────────────────────────────
    let tts = Arc::new(SilentTts);
    let object_store = Arc::new(LocalObjectStore::new(config.storage.object_store_dir.clone()));
    tracing::info!(dir = %config.storage.object_store_dir.display(), "audio adapters ready (silent TTS, local object store)");

    // ── Cancellation ───────────────────────────────────────────────────
    let cancel_map = Arc::new(CancelMap::new());

    Ok(AppState {
        config: Arc::new(config.pipeline.clone()),
        clock,
        sessions,
        orders,
        session_locks,
        cancel_map,
        menu,
        commands,
        llm,
        classifier,
        tts,
        object_store,
    })
}

/// Spawn the periodic sweeps that keep in-memory state bounded: expired
/// sessions/orders and idle session locks, mirroring the session-flush /
/// process-cleanup cadence this codebase family always uses for
/// in-process caches.
pub fn spawn_background_tasks(state: &AppState) {
    {
        let sessions = state.sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                sessions.evict_expired();
            }
        });
    }
    {
        let orders = state.orders.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                orders.evict_expired();
            }
        });
    }
    {
        let session_locks = state.session_locks.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                session_locks.prune_idle();
            }
        });
    }
    tracing::info!("background tasks spawned");
}
