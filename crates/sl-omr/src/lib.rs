//! sl-omr: the optical-music-recognition backend.
//!
//! The rest of the application talks to recognition through the
//! [`OmrEngine`] trait: a file goes in, a MusicXML artifact comes out. Two
//! implementations exist:
//!
//! - [`AudiverisEngine`] shells out to an installed Audiveris binary
//! - [`StubEngine`] simulates recognition and produces a placeholder score
//!
//! Engine selection happens once at startup via [`select_engine`].

pub mod audiveris;
pub mod command;
pub mod engine;
pub mod musicxml;
pub mod stub;

pub use audiveris::AudiverisEngine;
pub use engine::{is_supported_extension, OmrEngine, SUPPORTED_EXTENSIONS};
pub use stub::StubEngine;

use std::sync::Arc;
use std::time::Duration;

use sl_core::config::EngineConfig;

/// Pick the engine to use for this process.
///
/// Prefers a discovered Audiveris installation; falls back to the stub so the
/// service always starts.
pub fn select_engine(config: &EngineConfig) -> Arc<dyn OmrEngine> {
    match AudiverisEngine::discover(config) {
        Some(engine) => {
            tracing::info!("Engine found: audiveris ({})", engine.path().display());
            Arc::new(engine)
        }
        None => {
            tracing::warn!("Audiveris not found; using the stub engine");
            Arc::new(StubEngine::new(Duration::from_millis(config.stub_delay_ms)))
        }
    }
}
