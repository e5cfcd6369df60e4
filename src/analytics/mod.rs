pub mod aggregate;
pub mod buckets;
pub mod engine;
pub mod interval;
pub mod period;
pub mod trend;

pub use engine::{AnalyticsEngine, AnalyticsResult, Clock, FixedClock, SystemClock};
pub use period::Period;
