use crate::analytics::engine::AnalyticsResult;
use crate::api::responses::{
    AnalyticsErrorCode, AnalyticsErrorResponse, AnalyticsSuccessResponse, BusiestHourResponse,
    HealthStatus, HealthSuccessResponse, LongestSessionResponse, TimelinePointResponse,
};
use crate::error::AnalyticsError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, warn};

const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// RFC 3339 instant overriding the clock, for reproducible reports.
    pub now: Option<String>,
}

pub enum AnalyticsResponse {
    Success(Box<AnalyticsSuccessResponse>),
    Error {
        status: StatusCode,
        body: AnalyticsErrorResponse,
    },
}

impl IntoResponse for AnalyticsResponse {
    fn into_response(self) -> Response {
        match self {
            AnalyticsResponse::Success(body) => (StatusCode::OK, Json(*body)).into_response(),
            AnalyticsResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(period): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> impl IntoResponse {
    build_analytics_response(&state, &period, &query).await
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = format_timestamp(state.clock().now());
    (
        StatusCode::OK,
        Json(HealthSuccessResponse {
            status: HealthStatus::Ok,
            timestamp,
        }),
    )
}

async fn build_analytics_response(
    state: &AppState,
    period: &str,
    query: &AnalyticsQuery,
) -> AnalyticsResponse {
    let now = match query.now.as_deref() {
        Some(raw) => match OffsetDateTime::parse(raw, &Rfc3339) {
            Ok(now) => now,
            Err(err) => {
                warn!(now = raw, error = %err, "Rejected analytics request with bad timestamp");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    AnalyticsErrorCode::InvalidTimestamp,
                    format!("Invalid RFC 3339 timestamp: {raw}"),
                    state.clock().now(),
                );
            }
        },
        None => state.clock().now(),
    };

    match state.engine().compute_analytics(period, now).await {
        Ok(result) => AnalyticsResponse::Success(Box::new(success_body(&result))),
        Err(AnalyticsError::InvalidPeriod(value)) => {
            warn!(period = %value, "Rejected analytics request with unknown period");
            error_response(
                StatusCode::BAD_REQUEST,
                AnalyticsErrorCode::InvalidPeriod,
                format!("Unknown period {value:?}; expected day, week or month"),
                now,
            )
        }
        Err(AnalyticsError::Unavailable(err)) => {
            error!(error = %err, "Analytics unavailable");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                AnalyticsErrorCode::AnalyticsUnavailable,
                "Analytics are temporarily unavailable".to_string(),
                now,
            )
        }
    }
}

fn success_body(result: &AnalyticsResult) -> AnalyticsSuccessResponse {
    AnalyticsSuccessResponse {
        period: result.period.to_string(),
        window_start: format_timestamp(result.window.start()),
        window_end: format_timestamp(result.window.end()),
        generated_at: format_timestamp(result.generated_at),
        total_vehicles: result.total_vehicles,
        avg_duration_minutes: result.avg_duration_minutes,
        occupancy_rate_percent: result.occupancy_rate_percent,
        peak_hour: result.peak_hour_label.clone(),
        peak_hour_vehicles: result.peak_hour_vehicles,
        vehicles_trend_percent: result.vehicles_trend_percent,
        duration_trend_percent: result.duration_trend_percent,
        occupancy_trend_percent: result.occupancy_trend_percent,
        timeline: result
            .timeline
            .iter()
            .map(|point| TimelinePointResponse {
                label: point.label.clone(),
                occupancy_percent: point.occupancy_percent,
            })
            .collect(),
        busiest_hours: result
            .busiest_hours
            .iter()
            .map(|hour| BusiestHourResponse {
                label: hour.label.clone(),
                vehicles: hour.vehicles,
            })
            .collect(),
        longest_sessions: result
            .longest_sessions
            .iter()
            .map(|session| LongestSessionResponse {
                slot_id: session.slot_id,
                entry_time: format_timestamp(session.entry_time),
                exit_time: format_timestamp(session.exit_time),
                duration_minutes: session.duration_minutes,
            })
            .collect(),
    }
}

fn error_response(
    status: StatusCode,
    error_code: AnalyticsErrorCode,
    error_message: String,
    now: OffsetDateTime,
) -> AnalyticsResponse {
    AnalyticsResponse::Error {
        status,
        body: AnalyticsErrorResponse {
            error_code,
            error_message,
            timestamp: format_timestamp(now),
        },
    }
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp.format(&Rfc3339).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format timestamp");
        FALLBACK_TIMESTAMP.to_string()
    })
}
