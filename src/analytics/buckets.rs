use crate::analytics::interval::Interval;
use crate::store::{SlotId, TimeWindow};
use std::collections::BTreeSet;
use time::{Duration, OffsetDateTime};

pub const BUCKETS_PER_DAY: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBucket {
    pub hour_index: usize,
    /// Start of the first slice folded into this bucket.
    pub start: OffsetDateTime,
    pub occupied_slot_ids: BTreeSet<SlotId>,
}

impl HourBucket {
    pub fn occupied(&self) -> usize {
        self.occupied_slot_ids.len()
    }
}

/// Number of one-hour slices needed to cover `window`, partial hours included.
pub fn slice_count(window: &TimeWindow) -> i64 {
    let length = window.duration();
    let whole = length.whole_hours();
    if length > Duration::hours(whole) {
        whole + 1
    } else {
        whole
    }
}

pub fn bucket_count(window: &TimeWindow) -> usize {
    let slices = usize::try_from(slice_count(window)).unwrap_or(0);
    slices.min(BUCKETS_PER_DAY)
}

/// Build the buckets for `window`, sliced hourly from its start. Windows longer
/// than a day fold onto hour-of-day buckets. A slot occupies a slice when any
/// of its intervals touches it: `start <= slice_end` and `end >= slice_start`.
/// Each bucket counts distinct slots, not sessions.
pub fn bucketize(window: &TimeWindow, intervals: &[Interval]) -> Vec<HourBucket> {
    let count = bucket_count(window);
    let mut buckets: Vec<HourBucket> = (0..count)
        .map(|index| HourBucket {
            hour_index: index,
            start: window.start() + Duration::hours(index as i64),
            occupied_slot_ids: BTreeSet::new(),
        })
        .collect();
    if count == 0 {
        return buckets;
    }

    let last_slice = slice_count(window) - 1;
    for interval in intervals {
        if interval.start > window.end() || interval.end < window.start() {
            continue;
        }
        let (first, last) = touched_slices(window, interval, last_slice);
        if last < first {
            continue;
        }
        if last - first + 1 >= count as i64 {
            for bucket in &mut buckets {
                bucket.occupied_slot_ids.insert(interval.slot_id);
            }
            continue;
        }
        for slice in first..=last {
            let index = (slice as usize) % BUCKETS_PER_DAY;
            buckets[index].occupied_slot_ids.insert(interval.slot_id);
        }
    }
    buckets
}

fn touched_slices(window: &TimeWindow, interval: &Interval, last_slice: i64) -> (i64, i64) {
    let from_start = interval.start - window.start();
    let to_end = interval.end - window.start();

    let mut first = from_start.whole_hours();
    // Starting exactly on a boundary also touches the end of the slice before.
    if first > 0 && from_start == Duration::hours(first) {
        first -= 1;
    }
    let first = first.clamp(0, last_slice);
    let last = to_end.whole_hours().clamp(0, last_slice);
    (first, last)
}
