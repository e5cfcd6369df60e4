use parking_analytics::analytics::aggregate::total_vehicles;
use parking_analytics::analytics::engine::{AnalyticsEngine, NO_PEAK_LABEL};
use parking_analytics::analytics::interval::normalize_all;
use parking_analytics::error::{AnalyticsError, StoreError};
use parking_analytics::store::mock::{MockSessionStore, MockSlotRegistry, MockStoreBehavior};
use parking_analytics::store::{ParkingSession, TimeWindow};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::macros::datetime;

fn engine_with(
    sessions: Vec<ParkingSession>,
    capacity: u32,
) -> AnalyticsEngine<MockSessionStore, MockSlotRegistry> {
    AnalyticsEngine::new(
        MockSessionStore::new(sessions),
        MockSlotRegistry::with_capacity(capacity),
    )
}

fn morning_sessions() -> Vec<ParkingSession> {
    vec![
        ParkingSession::closed(
            1,
            datetime!(2026-03-10 08:00 UTC),
            datetime!(2026-03-10 09:30 UTC),
        ),
        ParkingSession::open(2, datetime!(2026-03-10 08:45 UTC)),
    ]
}

#[tokio::test]
async fn open_and_closed_sessions_scenario() -> Result<(), AnalyticsError> {
    let now = datetime!(2026-03-10 09:00 UTC);
    let engine = engine_with(morning_sessions(), 6);

    let result = engine.compute_analytics("day", now).await?;

    assert_eq!(result.occupancy_rate_percent, 33.0);
    assert_eq!(result.avg_duration_minutes, 90.0);
    assert_eq!(result.total_vehicles, 2);

    let hour_window = TimeWindow::new(datetime!(2026-03-10 08:00 UTC), now);
    let intervals = normalize_all(&morning_sessions(), now);
    assert_eq!(total_vehicles(&hour_window, &intervals), 2);
    Ok(())
}

#[tokio::test]
async fn malformed_session_is_excluded_without_failing() -> Result<(), AnalyticsError> {
    let now = datetime!(2026-03-10 09:00 UTC);
    let mut sessions = morning_sessions();
    sessions.push(ParkingSession::closed(
        3,
        datetime!(2026-03-10 10:00 UTC),
        datetime!(2026-03-10 09:00 UTC),
    ));
    sessions.push(ParkingSession::closed(
        4,
        datetime!(2026-03-10 06:00 UTC),
        datetime!(2026-03-10 06:00 UTC),
    ));
    let engine = engine_with(sessions, 6);

    let result = engine.compute_analytics("day", now).await?;

    assert_eq!(result.total_vehicles, 2);
    assert_eq!(result.avg_duration_minutes, 90.0);
    assert_eq!(result.occupancy_rate_percent, 33.0);
    Ok(())
}

#[tokio::test]
async fn repeated_calls_are_identical() -> Result<(), AnalyticsError> {
    let now = datetime!(2026-03-10 17:20 UTC);
    let mut sessions = morning_sessions();
    sessions.reverse();
    sessions.push(ParkingSession::closed(
        5,
        datetime!(2026-03-09 13:10 UTC),
        datetime!(2026-03-09 15:00 UTC),
    ));
    let engine = engine_with(sessions, 6);

    let first = engine.compute_analytics("week", now).await?;
    let second = engine.compute_analytics("week", now).await?;

    assert_eq!(first, second);
    assert_eq!(engine.store().fetch_count(), 4);
    Ok(())
}

#[tokio::test]
async fn trends_compare_against_yesterday() -> Result<(), AnalyticsError> {
    let now = datetime!(2026-03-10 12:00 UTC);
    let sessions = vec![
        ParkingSession::closed(
            1,
            datetime!(2026-03-09 08:00 UTC),
            datetime!(2026-03-09 09:00 UTC),
        ),
        ParkingSession::closed(
            2,
            datetime!(2026-03-09 10:00 UTC),
            datetime!(2026-03-09 11:00 UTC),
        ),
        ParkingSession::closed(
            3,
            datetime!(2026-03-09 11:30 UTC),
            datetime!(2026-03-09 12:30 UTC),
        ),
        ParkingSession::closed(
            4,
            datetime!(2026-03-09 11:45 UTC),
            datetime!(2026-03-09 12:45 UTC),
        ),
        ParkingSession::closed(
            1,
            datetime!(2026-03-10 08:00 UTC),
            datetime!(2026-03-10 08:30 UTC),
        ),
        ParkingSession::open(2, datetime!(2026-03-10 11:00 UTC)),
    ];
    let engine = engine_with(sessions, 4);

    let result = engine.compute_analytics("daily", now).await?;

    assert_eq!(result.total_vehicles, 2);
    assert_eq!(result.avg_duration_minutes, 30.0);
    assert_eq!(result.occupancy_rate_percent, 25.0);
    assert_eq!(result.vehicles_trend_percent, -50);
    assert_eq!(result.duration_trend_percent, -50);
    assert_eq!(result.occupancy_trend_percent, -50);
    Ok(())
}

#[tokio::test]
async fn empty_previous_period_reports_full_growth() -> Result<(), AnalyticsError> {
    let now = datetime!(2026-03-10 09:00 UTC);
    let engine = engine_with(morning_sessions(), 6);

    let result = engine.compute_analytics("day", now).await?;

    assert_eq!(result.vehicles_trend_percent, 100);
    assert_eq!(result.duration_trend_percent, 100);
    assert_eq!(result.occupancy_trend_percent, 100);
    Ok(())
}

#[tokio::test]
async fn peak_hour_and_timeline_use_distinct_slots() -> Result<(), AnalyticsError> {
    let now = datetime!(2026-03-10 18:00 UTC);
    let sessions = vec![
        ParkingSession::closed(
            3,
            datetime!(2026-03-10 09:10 UTC),
            datetime!(2026-03-10 09:20 UTC),
        ),
        ParkingSession::closed(
            1,
            datetime!(2026-03-10 14:10 UTC),
            datetime!(2026-03-10 14:40 UTC),
        ),
        ParkingSession::closed(
            2,
            datetime!(2026-03-10 14:20 UTC),
            datetime!(2026-03-10 15:20 UTC),
        ),
        ParkingSession::closed(
            1,
            datetime!(2026-03-10 14:45 UTC),
            datetime!(2026-03-10 14:55 UTC),
        ),
    ];
    let engine = engine_with(sessions, 4);

    let result = engine.compute_analytics("day", now).await?;

    assert_eq!(result.peak_hour_label, "2:00 PM");
    assert_eq!(result.peak_hour_vehicles, 2);
    assert_eq!(result.timeline.len(), 18);
    assert_eq!(result.timeline[0].label, "12:00 AM");
    assert_eq!(result.timeline[14].occupancy_percent, 50.0);
    assert_eq!(result.timeline[15].occupancy_percent, 25.0);
    assert_eq!(result.timeline[16].occupancy_percent, 0.0);

    let busiest: Vec<(&str, u32)> = result
        .busiest_hours
        .iter()
        .map(|hour| (hour.label.as_str(), hour.vehicles))
        .collect();
    assert_eq!(busiest, vec![("2:00 PM", 2), ("9:00 AM", 1), ("3:00 PM", 1)]);

    let longest: Vec<u32> = result.longest_sessions.iter().map(|s| s.slot_id).collect();
    assert_eq!(longest, vec![2, 1, 3, 1]);
    Ok(())
}

#[tokio::test]
async fn week_timeline_folds_to_hours_of_day() -> Result<(), AnalyticsError> {
    let now = datetime!(2026-03-10 06:00 UTC);
    let sessions = vec![
        ParkingSession::closed(
            1,
            datetime!(2026-03-05 14:10 UTC),
            datetime!(2026-03-05 14:40 UTC),
        ),
        ParkingSession::closed(
            2,
            datetime!(2026-03-07 14:15 UTC),
            datetime!(2026-03-07 14:35 UTC),
        ),
    ];
    let engine = engine_with(sessions, 4);

    let result = engine.compute_analytics("week", now).await?;

    assert_eq!(result.timeline.len(), 24);
    assert_eq!(result.peak_hour_label, "2:00 PM");
    assert_eq!(result.peak_hour_vehicles, 2);
    assert_eq!(result.total_vehicles, 2);
    Ok(())
}

#[tokio::test]
async fn midnight_request_has_no_buckets_and_no_peak() -> Result<(), AnalyticsError> {
    let engine = engine_with(morning_sessions(), 6);

    let result = engine
        .compute_analytics("day", datetime!(2026-03-10 00:00 UTC))
        .await?;

    assert!(result.timeline.is_empty());
    assert_eq!(result.peak_hour_label, NO_PEAK_LABEL);
    Ok(())
}

#[tokio::test]
async fn session_ending_at_midnight_occupies_first_hour() -> Result<(), AnalyticsError> {
    let sessions = vec![ParkingSession::closed(
        1,
        datetime!(2026-03-09 23:00 UTC),
        datetime!(2026-03-10 00:00 UTC),
    )];
    let engine = engine_with(sessions, 4);

    let result = engine
        .compute_analytics("day", datetime!(2026-03-10 03:00 UTC))
        .await?;

    let timeline: Vec<f64> = result
        .timeline
        .iter()
        .map(|point| point.occupancy_percent)
        .collect();
    assert_eq!(timeline, vec![25.0, 0.0, 0.0]);
    assert_eq!(result.peak_hour_label, "12:00 AM");
    assert_eq!(result.peak_hour_vehicles, 1);
    assert_eq!(result.total_vehicles, 0);
    Ok(())
}

#[tokio::test]
async fn store_failure_is_unavailable() {
    let engine = AnalyticsEngine::new(
        MockSessionStore::with_behavior(morning_sessions(), MockStoreBehavior::fail_fetch()),
        MockSlotRegistry::with_capacity(6),
    );

    let result = engine
        .compute_analytics("day", datetime!(2026-03-10 09:00 UTC))
        .await;

    assert!(matches!(
        result,
        Err(AnalyticsError::Unavailable(StoreError::Backend(_)))
    ));
}

#[tokio::test]
async fn cancelled_fetch_is_unavailable() {
    let engine = AnalyticsEngine::new(
        MockSessionStore::with_behavior(morning_sessions(), MockStoreBehavior::cancelled()),
        MockSlotRegistry::with_capacity(6),
    );

    let result = engine
        .compute_analytics("month", datetime!(2026-03-10 09:00 UTC))
        .await;

    assert!(matches!(
        result,
        Err(AnalyticsError::Unavailable(StoreError::Cancelled))
    ));
}

#[tokio::test]
async fn slow_store_times_out_as_unavailable() {
    let engine = AnalyticsEngine::new(
        MockSessionStore::with_behavior(
            morning_sessions(),
            MockStoreBehavior::slow(Duration::from_millis(500)),
        ),
        MockSlotRegistry::with_capacity(6),
    )
    .with_fetch_timeout(Duration::from_millis(20));

    let result = engine
        .compute_analytics("day", datetime!(2026-03-10 09:00 UTC))
        .await;

    assert!(matches!(
        result,
        Err(AnalyticsError::Unavailable(StoreError::Timeout(_)))
    ));
}

#[tokio::test]
async fn both_windows_are_fetched_concurrently() -> Result<(), AnalyticsError> {
    let delay = Duration::from_millis(200);
    let engine = AnalyticsEngine::new(
        MockSessionStore::with_behavior(morning_sessions(), MockStoreBehavior::slow(delay)),
        MockSlotRegistry::with_capacity(6),
    )
    .with_fetch_timeout(delay * 3 / 2);

    let started = Instant::now();
    let result = engine
        .compute_analytics("day", datetime!(2026-03-10 09:00 UTC))
        .await?;
    let elapsed = started.elapsed();

    assert_eq!(result.total_vehicles, 2);
    assert_eq!(engine.store().fetch_count(), 2);
    assert!(elapsed < delay * 2, "fetches ran back to back: {elapsed:?}");
    Ok(())
}

#[tokio::test]
async fn registry_failure_abandons_pending_fetches() {
    let delay = Duration::from_millis(500);
    let engine = AnalyticsEngine::new(
        MockSessionStore::with_behavior(morning_sessions(), MockStoreBehavior::slow(delay)),
        MockSlotRegistry::failing(),
    );

    let started = Instant::now();
    let result = engine
        .compute_analytics("day", datetime!(2026-03-10 09:00 UTC))
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(
        result,
        Err(AnalyticsError::Unavailable(StoreError::Backend(_)))
    ));
    assert!(elapsed < delay, "waited on slow fetches: {elapsed:?}");
}

#[tokio::test]
async fn registry_failure_is_unavailable() {
    let engine = AnalyticsEngine::new(
        MockSessionStore::new(morning_sessions()),
        MockSlotRegistry::failing(),
    );

    let result = engine
        .compute_analytics("day", datetime!(2026-03-10 09:00 UTC))
        .await;

    assert!(matches!(result, Err(AnalyticsError::Unavailable(_))));
}

#[tokio::test]
async fn concurrent_requests_share_one_engine() -> Result<(), Box<dyn std::error::Error>> {
    let now = datetime!(2026-03-10 09:00 UTC);
    let engine = Arc::new(engine_with(morning_sessions(), 6));

    let day = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.compute_analytics("day", now).await }
    });
    let month = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.compute_analytics("month", now).await }
    });

    let day = day.await??;
    let month = month.await??;

    assert_eq!(day.total_vehicles, 2);
    assert_eq!(month.total_vehicles, 2);
    assert_eq!(month.occupancy_rate_percent, day.occupancy_rate_percent);
    Ok(())
}
