use crate::error::StoreError;
use std::future::Future;
use time::{Duration, OffsetDateTime};

pub mod memory;
pub mod mock;

pub type SlotId = u32;

/// One vehicle's stay in one slot. `exit_time == None` means still parked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSession {
    pub slot_id: SlotId,
    pub entry_time: OffsetDateTime,
    pub exit_time: Option<OffsetDateTime>,
}

impl ParkingSession {
    pub fn closed(slot_id: SlotId, entry_time: OffsetDateTime, exit_time: OffsetDateTime) -> Self {
        Self {
            slot_id,
            entry_time,
            exit_time: Some(exit_time),
        }
    }

    pub fn open(slot_id: SlotId, entry_time: OffsetDateTime) -> Self {
        Self {
            slot_id,
            entry_time,
            exit_time: None,
        }
    }

    /// Store-side overlap rule: `entry < window.end` and the (possibly still
    /// running) exit is not before `window.start`.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        self.entry_time < window.end()
            && self.exit_time.is_none_or(|exit| exit >= window.start())
    }
}

/// Half-open `[start, end)` range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl TimeWindow {
    /// An `end` earlier than `start` collapses the window to empty.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    pub fn end(&self) -> OffsetDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Source of raw parking sessions. Implementations return every session
/// overlapping `window` per [`ParkingSession::overlaps`]; order is irrelevant.
pub trait SessionStore: Send + Sync {
    fn fetch_sessions(
        &self,
        window: TimeWindow,
    ) -> impl Future<Output = Result<Vec<ParkingSession>, StoreError>> + Send;
}

/// Source of the physical slot count used as the occupancy denominator.
pub trait SlotRegistry: Send + Sync {
    fn total_capacity(&self) -> impl Future<Output = Result<u32, StoreError>> + Send;
}
