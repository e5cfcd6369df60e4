use crate::error::StoreError;
use crate::store::{ParkingSession, SessionStore, SlotRegistry, TimeWindow};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MockStoreBehavior {
    pub fetch_ok: bool,
    pub cancelled: bool,
    pub delay: Option<Duration>,
}

impl MockStoreBehavior {
    pub fn ok() -> Self {
        Self {
            fetch_ok: true,
            cancelled: false,
            delay: None,
        }
    }

    pub fn fail_fetch() -> Self {
        Self {
            fetch_ok: false,
            cancelled: false,
            delay: None,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            fetch_ok: true,
            cancelled: true,
            delay: None,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            fetch_ok: true,
            cancelled: false,
            delay: Some(delay),
        }
    }
}

/// Scripted store: filters its sessions with the real overlap rule and
/// counts how many fetches were issued.
#[derive(Debug)]
pub struct MockSessionStore {
    sessions: Vec<ParkingSession>,
    behavior: MockStoreBehavior,
    fetches: AtomicUsize,
}

impl MockSessionStore {
    pub fn new(sessions: Vec<ParkingSession>) -> Self {
        Self::with_behavior(sessions, MockStoreBehavior::ok())
    }

    pub fn with_behavior(sessions: Vec<ParkingSession>, behavior: MockStoreBehavior) -> Self {
        Self {
            sessions,
            behavior,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl SessionStore for MockSessionStore {
    async fn fetch_sessions(&self, window: TimeWindow) -> Result<Vec<ParkingSession>, StoreError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.behavior.delay {
            tokio::time::sleep(delay).await;
        }
        if self.behavior.cancelled {
            return Err(StoreError::Cancelled);
        }
        if !self.behavior.fetch_ok {
            return Err(StoreError::Backend("mock fetch failed".to_string()));
        }
        Ok(self
            .sessions
            .iter()
            .filter(|session| session.overlaps(&window))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MockSlotRegistry {
    capacity: u32,
    fail: bool,
}

impl MockSlotRegistry {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            capacity,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            capacity: 0,
            fail: true,
        }
    }
}

impl SlotRegistry for MockSlotRegistry {
    async fn total_capacity(&self) -> Result<u32, StoreError> {
        if self.fail {
            Err(StoreError::Backend("mock registry failed".to_string()))
        } else {
            Ok(self.capacity)
        }
    }
}
