use crate::error::AnalyticsError;
use crate::store::TimeWindow;
use std::fmt;
use std::str::FromStr;
use time::{Duration, OffsetDateTime, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Period::Day),
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            _ => Err(AnalyticsError::InvalidPeriod(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindows {
    pub current: TimeWindow,
    pub previous: TimeWindow,
}

impl PeriodWindows {
    /// The instant in the previous window that lines up with `now` in the
    /// current one (same offset from the window start).
    pub fn previous_reference(&self, now: OffsetDateTime) -> OffsetDateTime {
        let elapsed = now - self.current.start();
        (self.previous.start() + elapsed).min(self.previous.end())
    }
}

fn start_of_day(instant: OffsetDateTime) -> OffsetDateTime {
    instant.replace_time(Time::MIDNIGHT)
}

fn start_of_month(instant: OffsetDateTime) -> OffsetDateTime {
    start_of_day(instant) - Duration::days(i64::from(instant.day()) - 1)
}

/// Calendar boundaries are taken in the UTC offset carried by `now`. The
/// previous window has the current one's length and ends where it starts,
/// except for `day`, whose previous window is all of yesterday.
pub fn resolve(period: Period, now: OffsetDateTime) -> PeriodWindows {
    let today = start_of_day(now);
    match period {
        Period::Day => PeriodWindows {
            current: TimeWindow::new(today, now),
            previous: TimeWindow::new(today - Duration::DAY, today),
        },
        Period::Week => trailing(today - Duration::days(6), now),
        Period::Month => trailing(start_of_month(now), now),
    }
}

fn trailing(start: OffsetDateTime, now: OffsetDateTime) -> PeriodWindows {
    let current = TimeWindow::new(start, now);
    PeriodWindows {
        current,
        previous: TimeWindow::new(start - current.duration(), start),
    }
}
