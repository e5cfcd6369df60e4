use crate::analytics::aggregate::PeriodAggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trends {
    pub vehicles_percent: i64,
    pub duration_percent: i64,
    pub occupancy_percent: i64,
}

/// Percentage change from `previous` to `current`, rounded. A zero baseline
/// reports 100 for any growth and 0 otherwise. Not bounded: +400% is valid.
pub fn trend_percent(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return if current > 0.0 { 100 } else { 0 };
    }
    (100.0 * (current - previous) / previous).round() as i64
}

pub fn compute_trends(current: &PeriodAggregate, previous: &PeriodAggregate) -> Trends {
    Trends {
        vehicles_percent: trend_percent(
            f64::from(current.total_vehicles),
            f64::from(previous.total_vehicles),
        ),
        duration_percent: trend_percent(
            current.avg_duration_minutes,
            previous.avg_duration_minutes,
        ),
        occupancy_percent: trend_percent(
            current.occupancy_rate_percent,
            previous.occupancy_rate_percent,
        ),
    }
}
