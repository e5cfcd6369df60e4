use crate::analytics::buckets::HourBucket;
use crate::analytics::interval::Interval;
use crate::store::{SlotId, TimeWindow};
use std::collections::BTreeSet;
use std::num::NonZeroU32;
use time::OffsetDateTime;

pub const BUSIEST_HOURS_LIMIT: usize = 3;
pub const LONGEST_SESSIONS_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakHour {
    pub hour_index: usize,
    pub vehicles: u32,
}

/// KPIs of one window.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodAggregate {
    pub total_vehicles: u32,
    pub avg_duration_minutes: f64,
    pub occupancy_rate_percent: f64,
    pub peak: Option<PeakHour>,
}

impl PeriodAggregate {
    pub fn peak_hour_vehicles(&self) -> u32 {
        self.peak.map_or(0, |peak| peak.vehicles)
    }
}

/// `intervals` are the now-resolved, unclipped sessions of the window;
/// `buckets` its hourly occupancy; `at` the instant the occupancy rate is
/// sampled at.
pub fn aggregate(
    window: &TimeWindow,
    intervals: &[Interval],
    buckets: &[HourBucket],
    capacity: NonZeroU32,
    at: OffsetDateTime,
) -> PeriodAggregate {
    PeriodAggregate {
        total_vehicles: total_vehicles(window, intervals),
        avg_duration_minutes: average_duration_minutes(intervals),
        occupancy_rate_percent: occupancy_rate_at(intervals, at, capacity),
        peak: peak_hour(buckets, capacity),
    }
}

/// A vehicle is counted in the window its entry falls in.
pub fn total_vehicles(window: &TimeWindow, intervals: &[Interval]) -> u32 {
    let entries = intervals
        .iter()
        .filter(|interval| window.contains(interval.start))
        .count();
    u32::try_from(entries).unwrap_or(u32::MAX)
}

/// Mean duration of closed sessions; open ones are still growing and skipped.
pub fn average_duration_minutes(intervals: &[Interval]) -> f64 {
    let (count, total) = intervals
        .iter()
        .filter(|interval| !interval.open)
        .fold((0usize, 0.0f64), |(count, total), interval| {
            (count + 1, total + interval.duration_minutes())
        });
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

pub fn occupancy_percent(occupied: usize, capacity: NonZeroU32) -> f64 {
    let ratio = 100.0 * occupied as f64 / f64::from(capacity.get());
    ratio.min(100.0).round()
}

/// Share of capacity occupied at `at`, counting each slot once.
pub fn occupancy_rate_at(intervals: &[Interval], at: OffsetDateTime, capacity: NonZeroU32) -> f64 {
    let occupied: BTreeSet<SlotId> = intervals
        .iter()
        .filter(|interval| interval.covers(at))
        .map(|interval| interval.slot_id)
        .collect();
    occupancy_percent(occupied.len(), capacity)
}

fn capped_vehicles(occupied: usize, capacity: NonZeroU32) -> u32 {
    u32::try_from(occupied)
        .unwrap_or(u32::MAX)
        .min(capacity.get())
}

/// Busiest bucket, earliest on ties. `None` when every bucket is empty.
pub fn peak_hour(buckets: &[HourBucket], capacity: NonZeroU32) -> Option<PeakHour> {
    busiest_hours(buckets, capacity, 1).into_iter().next()
}

/// Non-empty buckets ranked by occupancy, earliest first on ties.
pub fn busiest_hours(buckets: &[HourBucket], capacity: NonZeroU32, limit: usize) -> Vec<PeakHour> {
    let mut ranked: Vec<&HourBucket> = buckets.iter().filter(|b| b.occupied() > 0).collect();
    ranked.sort_by(|a, b| {
        b.occupied()
            .cmp(&a.occupied())
            .then(a.hour_index.cmp(&b.hour_index))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|bucket| PeakHour {
            hour_index: bucket.hour_index,
            vehicles: capped_vehicles(bucket.occupied(), capacity),
        })
        .collect()
}

/// Longest closed sessions that entered during `window`, longest first.
pub fn longest_sessions(window: &TimeWindow, intervals: &[Interval], limit: usize) -> Vec<Interval> {
    let mut closed: Vec<Interval> = intervals
        .iter()
        .filter(|interval| !interval.open && window.contains(interval.start))
        .copied()
        .collect();
    closed.sort_by(|a, b| {
        b.duration()
            .cmp(&a.duration())
            .then(a.start.cmp(&b.start))
            .then(a.slot_id.cmp(&b.slot_id))
    });
    closed.truncate(limit);
    closed
}
