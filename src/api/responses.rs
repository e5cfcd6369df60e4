use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyticsSuccessResponse {
    pub period: String,
    pub window_start: String,
    pub window_end: String,
    pub generated_at: String,
    pub total_vehicles: u32,
    pub avg_duration_minutes: f64,
    pub occupancy_rate_percent: f64,
    pub peak_hour: String,
    pub peak_hour_vehicles: u32,
    pub vehicles_trend_percent: i64,
    pub duration_trend_percent: i64,
    pub occupancy_trend_percent: i64,
    pub timeline: Vec<TimelinePointResponse>,
    pub busiest_hours: Vec<BusiestHourResponse>,
    pub longest_sessions: Vec<LongestSessionResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelinePointResponse {
    pub label: String,
    pub occupancy_percent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BusiestHourResponse {
    pub label: String,
    pub vehicles: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LongestSessionResponse {
    pub slot_id: u32,
    pub entry_time: String,
    pub exit_time: String,
    pub duration_minutes: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyticsErrorResponse {
    pub error_code: AnalyticsErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticsErrorCode {
    InvalidPeriod,
    InvalidTimestamp,
    AnalyticsUnavailable,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthSuccessResponse {
    pub status: HealthStatus,
    pub timestamp: String,
}
