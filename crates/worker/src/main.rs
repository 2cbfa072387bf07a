use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use shelfcount_core::domain::contract::SeriesRequest;
use shelfcount_core::engine::report;
use shelfcount_core::ingest::source::recommendations_from;
use shelfcount_core::storage::counts::PgSeriesSource;
use shelfcount_core::time::window::{self, ReportWindow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "shelfcount_worker")]
struct Args {
    /// Last day of the report window (YYYY-MM-DD). Defaults to today in the configured offset.
    #[arg(long)]
    week_end: Option<String>,

    /// Window length in days. Defaults to ANALYTICS_WINDOW_DAYS.
    #[arg(long)]
    days: Option<u32>,

    /// Do everything except writing to the database.
    #[arg(long)]
    dry_run: bool,

    /// Compute reports from a JSON payload file instead of the database and print them.
    #[arg(long)]
    input: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = shelfcount_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let now = Utc::now();

    if let Some(path) = args.input.as_deref() {
        return run_offline(path, &args, &settings, now).await;
    }

    let week_end =
        window::resolve_end_date(args.week_end.as_deref(), now, settings.report_utc_offset_hours)?;
    let report_window = ReportWindow::new(week_end, args.days.unwrap_or(settings.window_days))?;

    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    shelfcount_core::storage::migrate(&pool).await?;

    let source = PgSeriesSource::new(pool.clone());

    if args.dry_run {
        let report = recommendations_from(&source, report_window, now).await?;
        tracing::info!(
            %week_end,
            dry_run = true,
            recommendations_len = report.recommendations.len(),
            top_product = report.recommendations.first().map(|i| i.product_name.as_str()),
            "weekly recommendation run (dry-run)"
        );
        return Ok(());
    }

    let acquired =
        shelfcount_core::storage::lock::try_acquire_week_end_lock(&pool, week_end).await?;
    if !acquired {
        tracing::warn!(%week_end, "week_end lock not acquired; another run in progress");
        return Ok(());
    }

    match recommendations_from(&source, report_window, now).await {
        Ok(report) => {
            let snapshot_id =
                shelfcount_core::storage::recommendations::persist_success(&pool, &report).await?;

            tracing::info!(
                %week_end,
                %snapshot_id,
                recommendations_len = report.recommendations.len(),
                "persisted recommendation snapshot"
            );
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);

            let snapshot_id = shelfcount_core::storage::recommendations::persist_failure(
                &pool,
                report_window.start,
                report_window.end,
                now,
                &format!("{:#}", err),
            )
            .await?;

            tracing::error!(%week_end, %snapshot_id, error = %err, "recommendation run failed");
        }
    }

    let _ = shelfcount_core::storage::lock::release_week_end_lock(&pool, week_end).await;
    Ok(())
}

async fn run_offline(
    path: &std::path::Path,
    args: &Args,
    settings: &shelfcount_core::config::Settings,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let req: SeriesRequest = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid series payload", path.display()))?;
    let validated = req.validate_and_into_series()?;

    let week_end = match (args.week_end.as_deref(), validated.end_date) {
        (Some(s), _) => window::resolve_end_date(Some(s), now, settings.report_utc_offset_hours)?,
        (None, Some(d)) => d,
        (None, None) => window::today(now, settings.report_utc_offset_hours)?,
    };
    let days = args
        .days
        .or(validated.window_days)
        .unwrap_or(settings.window_days);
    let report_window = ReportWindow::new(week_end, days)?;

    let analytics = report::analytics_report(report_window, &validated.series)?;
    let recommendations = report::recommendation_report(report_window, &validated.series, now)?;

    tracing::info!(
        %week_end,
        days,
        products = validated.series.len(),
        analyzed = analytics.products.len(),
        recommended = recommendations.recommendations.len(),
        "offline report computed"
    );

    let out = serde_json::json!({
        "analytics": analytics,
        "recommendations": recommendations,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn init_sentry(settings: &shelfcount_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "shelfcount_worker",
            "--week-end",
            "2026-03-07",
            "--days",
            "14",
            "--dry-run",
        ]);
        assert_eq!(args.week_end.as_deref(), Some("2026-03-07"));
        assert_eq!(args.days, Some(14));
        assert!(args.dry_run);
        assert!(args.input.is_none());
    }
}
