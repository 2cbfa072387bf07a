use crate::domain::analytics::DailyProductCount;
use crate::domain::series::{CountPoint, ProductSeries};
use crate::ingest::source::SeriesSource;
use crate::ingest::types::ValidatedBatch;
use crate::time::window::ReportWindow;
use anyhow::Context;
use chrono::NaiveDate;

/// Creates unseen products and upserts one `(product, date)` count per product in the batch.
pub async fn upsert_daily_counts_atomic(
    pool: &sqlx::PgPool,
    batch: &ValidatedBatch,
    chunk_size: usize,
) -> anyhow::Result<u64> {
    anyhow::ensure!(!batch.counts.is_empty(), "batch must be non-empty");
    anyhow::ensure!(chunk_size >= 1, "chunk size must be >= 1");

    let date = batch.date;
    let entries: Vec<(&String, &i64)> = batch.counts.iter().collect();

    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let mut affected: u64 = 0;
    let mut batch_idx: usize = 0;
    for chunk in entries.chunks(chunk_size) {
        batch_idx += 1;
        let t0 = std::time::Instant::now();

        let mut products = sqlx::QueryBuilder::new("INSERT INTO products (name) ");
        products.push_values(chunk, |mut b, (name, _)| {
            b.push_bind(name.as_str());
        });
        products.push(" ON CONFLICT (name) DO NOTHING");
        products
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("insert missing products failed")?;

        let mut counts = sqlx::QueryBuilder::new(
            "INSERT INTO daily_counts (product_id, date, count) \
             SELECT p.id, v.date, v.count FROM (",
        );
        counts.push_values(chunk, |mut b, (name, count)| {
            b.push_bind(name.as_str()).push_bind(date).push_bind(**count);
        });
        counts.push(
            ") AS v (name, date, count) JOIN products p ON p.name = v.name \
             ON CONFLICT (product_id, date) DO UPDATE \
               SET count = EXCLUDED.count, updated_at = now()",
        );

        let res = counts
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("batch upsert daily_counts failed")?;
        affected += res.rows_affected();

        tracing::debug!(
            %date,
            batch_idx,
            batch_size = chunk.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "daily_counts batch upsert"
        );
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(affected)
}

pub async fn load_window_series(
    pool: &sqlx::PgPool,
    window: ReportWindow,
) -> anyhow::Result<Vec<ProductSeries>> {
    let rows = sqlx::query_as::<_, SeriesRow>(
        "SELECT p.id, p.name, p.category, c.date, c.count \
         FROM daily_counts c \
         JOIN products p ON p.id = c.product_id \
         WHERE c.date >= $1 AND c.date <= $2 \
         ORDER BY p.id ASC, c.date ASC",
    )
    .persistent(false)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await
    .context("select window daily_counts failed")?;

    group_rows(rows)
}

type SeriesRow = (i64, String, Option<String>, NaiveDate, i64);
type PendingSeries = (i64, String, Option<String>, Vec<CountPoint>);

fn group_rows(rows: Vec<SeriesRow>) -> anyhow::Result<Vec<ProductSeries>> {
    let mut out = Vec::new();
    let mut current: Option<PendingSeries> = None;

    for (id, name, category, date, count) in rows {
        let same_product = matches!(&current, Some((cur_id, ..)) if *cur_id == id);
        if !same_product {
            if let Some(done) = current.take() {
                out.push(into_series(done)?);
            }
            current = Some((id, name, category, Vec::new()));
        }
        if let Some((_, _, _, points)) = current.as_mut() {
            points.push(CountPoint::new(date, count));
        }
    }

    if let Some(done) = current {
        out.push(into_series(done)?);
    }

    Ok(out)
}

fn into_series((id, name, category, points): PendingSeries) -> anyhow::Result<ProductSeries> {
    ProductSeries::new(id, name, category, points)
        .with_context(|| format!("invalid stored series for product {id}"))
}

pub async fn fetch_product_counts(
    pool: &sqlx::PgPool,
    product_id: i64,
    since: NaiveDate,
) -> anyhow::Result<Vec<CountPoint>> {
    let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
        "SELECT date, count FROM daily_counts \
         WHERE product_id = $1 AND date >= $2 \
         ORDER BY date ASC",
    )
    .bind(product_id)
    .bind(since)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select daily_counts for product {product_id} failed"))?;

    Ok(rows
        .into_iter()
        .map(|(date, count)| CountPoint::new(date, count))
        .collect())
}

pub async fn fetch_daily_counts(
    pool: &sqlx::PgPool,
    date: NaiveDate,
) -> anyhow::Result<Vec<DailyProductCount>> {
    let rows = sqlx::query_as::<_, (i64, String, i64)>(
        "SELECT p.id, p.name, c.count \
         FROM daily_counts c \
         JOIN products p ON p.id = c.product_id \
         WHERE c.date = $1 \
         ORDER BY p.name ASC",
    )
    .bind(date)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select daily_counts for {date} failed"))?;

    Ok(rows
        .into_iter()
        .map(|(product_id, product_name, count)| DailyProductCount {
            product_id,
            product_name,
            count,
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct PgSeriesSource {
    pool: sqlx::PgPool,
}

impl PgSeriesSource {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SeriesSource for PgSeriesSource {
    fn source_name(&self) -> &'static str {
        "postgres"
    }

    async fn load_series(&self, window: ReportWindow) -> anyhow::Result<Vec<ProductSeries>> {
        load_window_series(&self.pool, window).await
    }
}
