//! Service-oriented application context.
//!
//! [`AppContext`] is the central struct shared across all route handlers via
//! Axum state. Everything inside is `Arc`-wrapped, so cloning is cheap and
//! there is no hidden global state: the store, service, and event bus are
//! constructed once in [`crate::start`] (or by a test harness) and injected.

use std::sync::Arc;

use sl_core::config::Config;
use sl_core::events::EventBus;

use crate::service::ConversionService;
use crate::store::JobStore;

/// Application context shared by all request handlers (via Axum state).
#[derive(Clone)]
pub struct AppContext {
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Job registry (also reachable through the service; handlers that only
    /// read records use it directly).
    pub store: Arc<JobStore>,
    /// The job lifecycle manager.
    pub service: Arc<ConversionService>,
    /// Broadcast event bus for SSE.
    pub event_bus: Arc<EventBus>,
}
