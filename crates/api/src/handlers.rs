use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shelfcount_core::config::Settings;
use shelfcount_core::domain::analytics::{AnalyticsResponse, DailySummary};
use shelfcount_core::domain::contract::SeriesRequest;
use shelfcount_core::domain::recommendation::RecommendationsResponse;
use shelfcount_core::domain::series::{CountPoint, ProductSeries};
use shelfcount_core::engine::{report, EngineError};
use shelfcount_core::ingest::source::{analytics_from, recommendations_from};
use shelfcount_core::ingest::types::{CountBatch, CountBatchReceipt};
use shelfcount_core::storage::counts::PgSeriesSource;
use shelfcount_core::storage::products::{NewProduct, Product};
use shelfcount_core::time::window::{self, ReportWindow, MAX_WINDOW_DAYS};

#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: Option<PgPool>,
    pub settings: Settings,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    error: String,
}

type ApiFailure = (StatusCode, Json<ApiError>);
type ApiResult<T> = Result<Json<T>, ApiFailure>;

fn failure(status: StatusCode, error: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(ApiError {
            error: error.into(),
        }),
    )
}

fn internal(err: anyhow::Error) -> ApiFailure {
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "request failed");
    failure(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

fn engine_failure(err: EngineError) -> ApiFailure {
    failure(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
}

fn require_pool(state: &AppState) -> Result<&PgPool, ApiFailure> {
    state
        .pool
        .as_ref()
        .ok_or_else(|| failure(StatusCode::SERVICE_UNAVAILABLE, "database unavailable"))
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    days: Option<u32>,
    end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountsQuery {
    days: Option<u32>,
}

fn resolve_window(
    settings: &Settings,
    days: Option<u32>,
    end_date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ReportWindow, ApiFailure> {
    let end = window::resolve_end_date(end_date, now, settings.report_utc_offset_hours)
        .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("{e:#}")))?;
    ReportWindow::new(end, days.unwrap_or(settings.window_days))
        .map_err(|e| failure(StatusCode::BAD_REQUEST, e.to_string()))
}

pub async fn weekly_analytics(
    State(state): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> ApiResult<AnalyticsResponse> {
    let pool = require_pool(&state)?;
    let window = resolve_window(&state.settings, q.days, q.end_date.as_deref(), Utc::now())?;

    let source = PgSeriesSource::new(pool.clone());
    let resp = analytics_from(&source, window).await.map_err(internal)?;
    Ok(Json(resp))
}

pub async fn weekly_recommendations(
    State(state): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> ApiResult<RecommendationsResponse> {
    let pool = require_pool(&state)?;
    let now = Utc::now();
    let window = resolve_window(&state.settings, q.days, q.end_date.as_deref(), now)?;

    let source = PgSeriesSource::new(pool.clone());
    let resp = recommendations_from(&source, window, now)
        .await
        .map_err(internal)?;
    Ok(Json(resp))
}

pub async fn daily_analytics(
    State(state): State<AppState>,
    Query(q): Query<DailyQuery>,
) -> ApiResult<DailySummary> {
    let pool = require_pool(&state)?;
    let date = window::resolve_end_date(
        q.date.as_deref(),
        Utc::now(),
        state.settings.report_utc_offset_hours,
    )
    .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("{e:#}")))?;

    let counts = shelfcount_core::storage::counts::fetch_daily_counts(pool, date)
        .await
        .map_err(internal)?;
    let summary = report::daily_summary(date, counts).map_err(engine_failure)?;
    Ok(Json(summary))
}

pub async fn compute_analytics(
    State(state): State<AppState>,
    Json(req): Json<SeriesRequest>,
) -> ApiResult<AnalyticsResponse> {
    let (window, series) = validate_request(&state.settings, req, Utc::now())?;
    let resp = report::analytics_report(window, &series).map_err(engine_failure)?;
    Ok(Json(resp))
}

pub async fn compute_recommendations(
    State(state): State<AppState>,
    Json(req): Json<SeriesRequest>,
) -> ApiResult<RecommendationsResponse> {
    let now = Utc::now();
    let (window, series) = validate_request(&state.settings, req, now)?;
    let resp = report::recommendation_report(window, &series, now).map_err(engine_failure)?;
    Ok(Json(resp))
}

fn validate_request(
    settings: &Settings,
    req: SeriesRequest,
    now: DateTime<Utc>,
) -> Result<(ReportWindow, Vec<ProductSeries>), ApiFailure> {
    let validated = req.validate_and_into_series().map_err(engine_failure)?;
    let end = match validated.end_date {
        Some(d) => d,
        None => window::today(now, settings.report_utc_offset_hours).map_err(internal)?,
    };
    let window = ReportWindow::new(end, validated.window_days.unwrap_or(settings.window_days))
        .map_err(engine_failure)?;
    Ok((window, validated.series))
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let pool = require_pool(&state)?;
    let products = shelfcount_core::storage::products::list_products(pool)
        .await
        .map_err(internal)?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> ApiResult<Product> {
    let pool = require_pool(&state)?;
    let product = body
        .validate()
        .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("{e:#}")))?;

    let created = shelfcount_core::storage::products::create_product(pool, &product)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            failure(
                StatusCode::CONFLICT,
                format!("product already exists: {}", product.name),
            )
        })?;

    tracing::info!(product_id = created.id, name = %created.name, "product created");
    Ok(Json(created))
}

pub async fn product_counts(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(q): Query<CountsQuery>,
) -> ApiResult<Vec<CountPoint>> {
    let today = window::today(Utc::now(), state.settings.report_utc_offset_hours)
        .map_err(internal)?;
    let since = counts_since(today, q.days.unwrap_or(state.settings.window_days))?;
    let pool = require_pool(&state)?;

    let counts = shelfcount_core::storage::counts::fetch_product_counts(pool, product_id, since)
        .await
        .map_err(internal)?;
    if counts.is_empty() {
        return Err(failure(
            StatusCode::NOT_FOUND,
            "product not found or no counts available",
        ));
    }
    Ok(Json(counts))
}

fn counts_since(today: NaiveDate, days: u32) -> Result<NaiveDate, ApiFailure> {
    let bad_days = || {
        failure(
            StatusCode::BAD_REQUEST,
            format!("days must be 0..={MAX_WINDOW_DAYS} (got {days})"),
        )
    };
    if days > MAX_WINDOW_DAYS {
        return Err(bad_days());
    }
    today
        .checked_sub_signed(chrono::Duration::days(i64::from(days)))
        .ok_or_else(bad_days)
}

pub async fn record_counts(
    State(state): State<AppState>,
    Json(batch): Json<CountBatch>,
) -> ApiResult<CountBatchReceipt> {
    let pool = require_pool(&state)?;
    let today = window::today(Utc::now(), state.settings.report_utc_offset_hours)
        .map_err(internal)?;
    let validated = batch
        .validate(today)
        .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("{e:#}")))?;

    let affected = shelfcount_core::storage::counts::upsert_daily_counts_atomic(
        pool,
        &validated,
        state.settings.counts_upsert_batch,
    )
    .await
    .map_err(internal)?;

    tracing::info!(date = %validated.date, affected, "daily counts recorded");
    Ok(Json(validated.into_receipt()))
}

#[derive(Debug, Serialize)]
pub struct ApiSnapshot {
    snapshot_id: Uuid,
    report: RecommendationsResponse,
}

pub async fn latest_snapshot(State(state): State<AppState>) -> ApiResult<ApiSnapshot> {
    let pool = require_pool(&state)?;
    snapshot(pool, None).await
}

pub async fn snapshot_by_week_end(
    State(state): State<AppState>,
    Path(week_end): Path<String>,
) -> ApiResult<ApiSnapshot> {
    let pool = require_pool(&state)?;
    let week_end = NaiveDate::parse_from_str(&week_end, "%Y-%m-%d")
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "week_end must be YYYY-MM-DD"))?;
    snapshot(pool, Some(week_end)).await
}

async fn snapshot(pool: &PgPool, week_end: Option<NaiveDate>) -> ApiResult<ApiSnapshot> {
    let (snapshot_id, report) =
        shelfcount_core::storage::recommendations::fetch_snapshot(pool, week_end)
            .await
            .map_err(internal)?
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "snapshot not found"))?;

    Ok(Json(ApiSnapshot {
        snapshot_id,
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn settings() -> Settings {
        Settings {
            database_url: None,
            sentry_dsn: None,
            window_days: 7,
            report_utc_offset_hours: 0,
            counts_upsert_batch: 200,
        }
    }

    fn state() -> AppState {
        AppState {
            pool: None,
            settings: settings(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_defaults_to_configured_days_ending_today() {
        let w = resolve_window(&settings(), None, None, now()).unwrap();
        assert_eq!(w.end, NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn bad_window_queries_are_client_errors() {
        let (status, _) = resolve_window(&settings(), Some(0), None, now()).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = resolve_window(&settings(), None, Some("03/07/2026"), now()).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compute_recommendations_ranks_payload_without_db() {
        let req: SeriesRequest = serde_json::from_value(json!({
            "window_days": 7,
            "end_date": "2026-03-07",
            "series": [
                {"product_id": 1, "product_name": "A", "points": [
                    {"date": "2026-03-05", "count": 5},
                    {"date": "2026-03-06", "count": 5},
                    {"date": "2026-03-07", "count": 5}
                ]},
                {"product_id": 2, "product_name": "B", "points": [
                    {"date": "2026-03-05", "count": 5},
                    {"date": "2026-03-06", "count": 10},
                    {"date": "2026-03-07", "count": 15}
                ]},
                {"product_id": 3, "product_name": "C", "points": [
                    {"date": "2026-03-06", "count": 1},
                    {"date": "2026-03-07", "count": 1}
                ]}
            ]
        }))
        .unwrap();

        let Json(resp) = compute_recommendations(State(state()), Json(req.clone()))
            .await
            .unwrap();
        let ids: Vec<i64> = resp.recommendations.iter().map(|i| i.product_id).collect();
        assert_eq!(ids, vec![2, 1]);

        let Json(analytics) = compute_analytics(State(state()), Json(req)).await.unwrap();
        assert_eq!(analytics.products.len(), 3);
    }

    #[tokio::test]
    async fn compute_rejects_negative_counts() {
        let req: SeriesRequest = serde_json::from_value(json!({
            "series": [{"product_id": 1, "product_name": "A", "points": [
                {"date": "2026-03-06", "count": -1}
            ]}]
        }))
        .unwrap();

        let (status, _) = compute_analytics(State(state()), Json(req)).await.unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn counts_lookback_is_bounded() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            counts_since(today, 7).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );

        let (status, _) = counts_since(today, MAX_WINDOW_DAYS + 1).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = counts_since(NaiveDate::MIN, 1).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_counts_lookback_is_a_client_error() {
        let (status, _) = product_counts(
            State(state()),
            Path(1),
            Query(CountsQuery {
                days: Some(u32::MAX),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compute_rejects_end_date_at_calendar_floor() {
        let req: SeriesRequest = serde_json::from_value(json!({
            "end_date": "-262143-01-01",
            "series": []
        }))
        .unwrap();

        let (status, _) = compute_analytics(State(state()), Json(req)).await.unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn db_routes_are_unavailable_without_pool() {
        let (status, _) = list_products(State(state())).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
