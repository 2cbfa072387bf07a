pub mod domain;
pub mod engine;
pub mod ingest;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_WINDOW_DAYS: u32 = 7;
    pub const DEFAULT_UPSERT_BATCH: usize = 200;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        /// Window length used when a request does not name one.
        pub window_days: u32,
        /// Offset applied to "now" when resolving today's date for reports.
        pub report_utc_offset_hours: i32,
        pub counts_upsert_batch: usize,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let window_days = match std::env::var("ANALYTICS_WINDOW_DAYS") {
                Ok(s) => s
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("invalid ANALYTICS_WINDOW_DAYS: {s}"))?,
                Err(_) => DEFAULT_WINDOW_DAYS,
            };

            let report_utc_offset_hours = match std::env::var("REPORT_UTC_OFFSET_HOURS") {
                Ok(s) => s
                    .trim()
                    .parse::<i32>()
                    .with_context(|| format!("invalid REPORT_UTC_OFFSET_HOURS: {s}"))?,
                Err(_) => 0,
            };
            anyhow::ensure!(
                (-23..=23).contains(&report_utc_offset_hours),
                "REPORT_UTC_OFFSET_HOURS must be within -23..=23 (got {report_utc_offset_hours})"
            );

            let counts_upsert_batch = std::env::var("COUNTS_UPSERT_BATCH")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_UPSERT_BATCH);
            anyhow::ensure!(counts_upsert_batch >= 1, "COUNTS_UPSERT_BATCH must be >= 1");

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                window_days,
                report_utc_offset_hours,
                counts_upsert_batch,
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }
}
