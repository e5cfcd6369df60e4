use crate::store::{ParkingSession, SlotId, TimeWindow};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::warn;

/// A session whose exit is not after its entry (once resolved against now).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed session on slot {slot_id}: exit {exit} is not after entry {entry}")]
pub struct MalformedSession {
    pub slot_id: SlotId,
    pub entry: OffsetDateTime,
    pub exit: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub slot_id: SlotId,
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    /// The vehicle had not left yet; `end` is the "now" it was resolved against.
    pub open: bool,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration().as_seconds_f64() / 60.0
    }

    /// Whether the slot was occupied at `instant`. An open interval covers
    /// its own end, since that end is "now" and the vehicle is still there.
    pub fn covers(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && (instant < self.end || (self.open && instant == self.end))
    }

    /// Intersection with `window`, or `None` when they do not overlap.
    pub fn clip(&self, window: &TimeWindow) -> Option<Interval> {
        if self.end <= window.start() || self.start >= window.end() {
            return None;
        }
        Some(Interval {
            slot_id: self.slot_id,
            start: self.start.max(window.start()),
            end: self.end.min(window.end()),
            open: self.open,
        })
    }
}

pub fn normalize(
    session: &ParkingSession,
    now: OffsetDateTime,
) -> Result<Interval, MalformedSession> {
    let (end, open) = match session.exit_time {
        Some(exit) => (exit, false),
        None => (now, true),
    };
    if end <= session.entry_time {
        return Err(MalformedSession {
            slot_id: session.slot_id,
            entry: session.entry_time,
            exit: end,
        });
    }
    Ok(Interval {
        slot_id: session.slot_id,
        start: session.entry_time,
        end,
        open,
    })
}

/// Normalize every session, dropping (and logging) malformed ones. The
/// result is sorted by start, then slot, so downstream output is stable
/// whatever order the store returned.
pub fn normalize_all(sessions: &[ParkingSession], now: OffsetDateTime) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = sessions
        .iter()
        .filter_map(|session| match normalize(session, now) {
            Ok(interval) => Some(interval),
            Err(err) => {
                warn!(
                    slot_id = err.slot_id,
                    entry = %err.entry,
                    exit = %err.exit,
                    "Skipping malformed parking session"
                );
                None
            }
        })
        .collect();
    intervals.sort_by_key(|interval| (interval.start, interval.slot_id, interval.end));
    intervals
}
