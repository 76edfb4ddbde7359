//! Port adapters owned by this binary. None of the core crates ship a real
//! `ObjectStore`, `TTS` or `MenuRepository` — those are deployment-specific,
//! so the demo/CLI binary provides its own: a filesystem object store, a
//! placeholder TTS, and a small fixed menu catalog.

pub mod local_object_store;
pub mod silent_tts;
pub mod static_menu;

pub use local_object_store::LocalObjectStore;
pub use silent_tts::SilentTts;
pub use static_menu::StaticMenuRepository;
