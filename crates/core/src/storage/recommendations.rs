use crate::domain::recommendation::{
    RecommendationItem, RecommendationMetrics, RecommendationsResponse,
};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

type ItemRow = (
    i64,
    String,
    Option<String>,
    f64,
    String,
    f64,
    f64,
    f64,
    f64,
);

pub async fn persist_success(
    pool: &sqlx::PgPool,
    report: &RecommendationsResponse,
) -> anyhow::Result<Uuid> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let snapshot_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO recommendation_snapshots (id, week_start, week_end, generated_at, status, error) \
         VALUES ($1, $2, $3, $4, 'success', NULL)",
    )
    .bind(snapshot_id)
    .bind(report.week_start)
    .bind(report.week_end)
    .bind(report.generated_at)
    .execute(&mut *tx)
    .await
    .context("insert recommendation_snapshots failed")?;

    for (position, item) in report.recommendations.iter().enumerate() {
        insert_item(&mut tx, snapshot_id, position as i32, item).await?;
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(snapshot_id)
}

pub async fn persist_failure(
    pool: &sqlx::PgPool,
    week_start: NaiveDate,
    week_end: NaiveDate,
    generated_at: DateTime<Utc>,
    error: &str,
) -> anyhow::Result<Uuid> {
    let snapshot_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO recommendation_snapshots (id, week_start, week_end, generated_at, status, error) \
         VALUES ($1, $2, $3, $4, 'error', $5)",
    )
    .bind(snapshot_id)
    .bind(week_start)
    .bind(week_end)
    .bind(generated_at)
    .bind(error)
    .execute(pool)
    .await
    .context("insert error recommendation_snapshots failed")?;

    Ok(snapshot_id)
}

async fn insert_item(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    snapshot_id: Uuid,
    position: i32,
    item: &RecommendationItem,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO recommendation_items \
         (snapshot_id, position, product_id, product_name, category, score, explanation, \
          growth_rate, consistency, turnover_proxy, average_demand) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(snapshot_id)
    .bind(position)
    .bind(item.product_id)
    .bind(&item.product_name)
    .bind(&item.category)
    .bind(item.score)
    .bind(&item.explanation)
    .bind(item.metrics.growth_rate)
    .bind(item.metrics.consistency)
    .bind(item.metrics.turnover_proxy)
    .bind(item.metrics.average_demand)
    .execute(&mut **tx)
    .await
    .context("insert recommendation_items failed")?;

    Ok(())
}

/// Latest successful snapshot, optionally pinned to one `week_end`.
pub async fn fetch_snapshot(
    pool: &sqlx::PgPool,
    week_end: Option<NaiveDate>,
) -> anyhow::Result<Option<(Uuid, RecommendationsResponse)>> {
    let row = match week_end {
        Some(d) => {
            sqlx::query_as::<_, (Uuid, NaiveDate, NaiveDate, DateTime<Utc>)>(
                "SELECT id, week_start, week_end, generated_at \
                 FROM recommendation_snapshots \
                 WHERE status = 'success' AND week_end = $1 \
                 ORDER BY generated_at DESC \
                 LIMIT 1",
            )
            .bind(d)
            .fetch_optional(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, (Uuid, NaiveDate, NaiveDate, DateTime<Utc>)>(
                "SELECT id, week_start, week_end, generated_at \
                 FROM recommendation_snapshots \
                 WHERE status = 'success' \
                 ORDER BY week_end DESC, generated_at DESC \
                 LIMIT 1",
            )
            .fetch_optional(pool)
            .await?
        }
    };

    let Some((id, week_start, week_end, generated_at)) = row else {
        return Ok(None);
    };

    let recommendations = fetch_items(pool, id).await?;

    Ok(Some((
        id,
        RecommendationsResponse {
            week_start,
            week_end,
            recommendations,
            generated_at,
        },
    )))
}

async fn fetch_items(
    pool: &sqlx::PgPool,
    snapshot_id: Uuid,
) -> anyhow::Result<Vec<RecommendationItem>> {
    let rows = sqlx::query_as::<_, ItemRow>(
        "SELECT product_id, product_name, category, score, explanation, \
                growth_rate, consistency, turnover_proxy, average_demand \
         FROM recommendation_items \
         WHERE snapshot_id = $1 \
         ORDER BY position ASC",
    )
    .bind(snapshot_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select recommendation_items for snapshot_id={snapshot_id} failed"))?;

    Ok(rows.into_iter().map(item_from_row).collect())
}

fn item_from_row(row: ItemRow) -> RecommendationItem {
    let (
        product_id,
        product_name,
        category,
        score,
        explanation,
        growth_rate,
        consistency,
        turnover_proxy,
        average_demand,
    ) = row;

    RecommendationItem {
        product_id,
        product_name,
        category,
        score,
        explanation,
        metrics: RecommendationMetrics {
            growth_rate,
            consistency,
            turnover_proxy,
            average_demand,
        },
    }
}
