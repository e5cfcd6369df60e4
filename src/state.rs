use crate::analytics::engine::{AnalyticsEngine, Clock};
use crate::store::memory::{FixedCapacityRegistry, InMemorySessionStore};
use std::sync::Arc;

pub type ParkingEngine = AnalyticsEngine<InMemorySessionStore, FixedCapacityRegistry>;

/// Shared, read-only state handed to the HTTP handlers. Every analytics
/// request builds its own values from it; nothing here is mutated per request.
pub struct AppState {
    engine: ParkingEngine,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(engine: ParkingEngine, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }

    pub fn engine(&self) -> &ParkingEngine {
        &self.engine
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
