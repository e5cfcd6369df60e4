use crate::analytics::aggregate::{
    BUSIEST_HOURS_LIMIT, LONGEST_SESSIONS_LIMIT, PeriodAggregate, aggregate, busiest_hours,
    longest_sessions, occupancy_percent,
};
use crate::analytics::buckets::{HourBucket, bucketize};
use crate::analytics::interval::{Interval, normalize_all};
use crate::analytics::period::{Period, resolve};
use crate::analytics::trend::compute_trends;
use crate::error::{AnalyticsError, StoreError};
use crate::store::{ParkingSession, SessionStore, SlotId, SlotRegistry, TimeWindow};
use std::num::NonZeroU32;
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, error};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(2);
/// Label used when no bucket had any vehicle.
pub const NO_PEAK_LABEL: &str = "--:--";

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock expressed in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub label: String,
    pub occupancy_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRanking {
    pub label: String,
    pub vehicles: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub slot_id: SlotId,
    pub entry_time: OffsetDateTime,
    pub exit_time: OffsetDateTime,
    pub duration_minutes: f64,
}

impl From<&Interval> for SessionSummary {
    fn from(interval: &Interval) -> Self {
        Self {
            slot_id: interval.slot_id,
            entry_time: interval.start,
            exit_time: interval.end,
            duration_minutes: interval.duration_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsResult {
    pub period: Period,
    pub window: TimeWindow,
    pub generated_at: OffsetDateTime,
    pub total_vehicles: u32,
    pub avg_duration_minutes: f64,
    pub occupancy_rate_percent: f64,
    pub peak_hour_label: String,
    pub peak_hour_vehicles: u32,
    pub vehicles_trend_percent: i64,
    pub duration_trend_percent: i64,
    pub occupancy_trend_percent: i64,
    pub timeline: Vec<TimelinePoint>,
    pub busiest_hours: Vec<HourRanking>,
    pub longest_sessions: Vec<SessionSummary>,
}

/// 12-hour clock label of the hour `instant` falls in, e.g. "2:00 PM".
pub fn hour_label(instant: OffsetDateTime) -> String {
    let hour = instant.hour();
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:00 {suffix}")
}

fn bucket_label(buckets: &[HourBucket], hour_index: usize) -> String {
    buckets
        .get(hour_index)
        .map_or_else(|| NO_PEAK_LABEL.to_string(), |bucket| hour_label(bucket.start))
}

/// Normalized intervals plus hourly buckets for one window.
struct WindowSnapshot {
    intervals: Vec<Interval>,
    buckets: Vec<HourBucket>,
}

impl WindowSnapshot {
    fn build(window: &TimeWindow, sessions: &[ParkingSession], now: OffsetDateTime) -> Self {
        // Guard against stores returning more than asked for.
        let relevant: Vec<ParkingSession> = sessions
            .iter()
            .filter(|session| session.overlaps(window))
            .cloned()
            .collect();
        let intervals = normalize_all(&relevant, now);
        let buckets = bucketize(window, &intervals);
        Self { intervals, buckets }
    }

    fn aggregate(
        &self,
        window: &TimeWindow,
        capacity: NonZeroU32,
        at: OffsetDateTime,
    ) -> PeriodAggregate {
        aggregate(window, &self.intervals, &self.buckets, capacity, at)
    }
}

/// Turns raw sessions into period KPIs. Holds no state between calls.
#[derive(Debug)]
pub struct AnalyticsEngine<S, R> {
    store: S,
    registry: R,
    fetch_timeout: Duration,
}

impl<S, R> AnalyticsEngine<S, R>
where
    S: SessionStore,
    R: SlotRegistry,
{
    pub fn new(store: S, registry: R) -> Self {
        Self {
            store,
            registry,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn compute_analytics(
        &self,
        period: &str,
        now: OffsetDateTime,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        let period: Period = period.parse()?;
        self.compute_for(period, now).await
    }

    pub async fn compute_for(
        &self,
        period: Period,
        now: OffsetDateTime,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        let windows = resolve(period, now);
        debug!(
            period = %period,
            current_start = %windows.current.start(),
            current_end = %windows.current.end(),
            previous_start = %windows.previous.start(),
            previous_end = %windows.previous.end(),
            "Resolved analytics windows"
        );

        // The first failure drops the other in-flight lookups.
        let (current_sessions, previous_sessions, capacity) = tokio::try_join!(
            self.fetch(windows.current),
            self.fetch(windows.previous),
            self.capacity(),
        )?;
        debug!(
            current = current_sessions.len(),
            previous = previous_sessions.len(),
            capacity = capacity.get(),
            "Fetched sessions"
        );

        let current = WindowSnapshot::build(&windows.current, &current_sessions, now);
        let previous = WindowSnapshot::build(&windows.previous, &previous_sessions, now);

        let current_aggregate = current.aggregate(&windows.current, capacity, now);
        let previous_aggregate = previous.aggregate(
            &windows.previous,
            capacity,
            windows.previous_reference(now),
        );
        let trends = compute_trends(&current_aggregate, &previous_aggregate);

        let peak_hour_label = current_aggregate.peak.map_or_else(
            || NO_PEAK_LABEL.to_string(),
            |peak| bucket_label(&current.buckets, peak.hour_index),
        );
        let timeline = current
            .buckets
            .iter()
            .map(|bucket| TimelinePoint {
                label: hour_label(bucket.start),
                occupancy_percent: occupancy_percent(bucket.occupied(), capacity),
            })
            .collect();
        let busiest_hours = busiest_hours(&current.buckets, capacity, BUSIEST_HOURS_LIMIT)
            .into_iter()
            .map(|peak| HourRanking {
                label: bucket_label(&current.buckets, peak.hour_index),
                vehicles: peak.vehicles,
            })
            .collect();
        let longest_sessions =
            longest_sessions(&windows.current, &current.intervals, LONGEST_SESSIONS_LIMIT)
                .iter()
                .map(SessionSummary::from)
                .collect();

        Ok(AnalyticsResult {
            period,
            window: windows.current,
            generated_at: now,
            total_vehicles: current_aggregate.total_vehicles,
            avg_duration_minutes: current_aggregate.avg_duration_minutes,
            occupancy_rate_percent: current_aggregate.occupancy_rate_percent,
            peak_hour_label,
            peak_hour_vehicles: current_aggregate.peak_hour_vehicles(),
            vehicles_trend_percent: trends.vehicles_percent,
            duration_trend_percent: trends.duration_percent,
            occupancy_trend_percent: trends.occupancy_percent,
            timeline,
            busiest_hours,
            longest_sessions,
        })
    }

    async fn fetch(&self, window: TimeWindow) -> Result<Vec<ParkingSession>, StoreError> {
        let result = tokio::time::timeout(self.fetch_timeout, self.store.fetch_sessions(window))
            .await
            .map_err(|_| StoreError::Timeout(self.fetch_timeout))
            .and_then(|fetched| fetched);
        if let Err(err) = &result {
            error!(
                window_start = %window.start(),
                window_end = %window.end(),
                error = %err,
                "Session fetch failed"
            );
        }
        result
    }

    async fn capacity(&self) -> Result<NonZeroU32, StoreError> {
        let capacity = self.registry.total_capacity().await.inspect_err(|err| {
            error!(error = %err, "Slot registry lookup failed");
        })?;
        NonZeroU32::new(capacity).ok_or_else(|| {
            error!(capacity, "Slot registry reported no capacity");
            StoreError::InvalidCapacity(capacity)
        })
    }
}
