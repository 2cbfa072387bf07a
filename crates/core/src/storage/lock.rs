use anyhow::Context;
use chrono::{Datelike, NaiveDate};

/// High 32 bits of every snapshot lock key; the low 32 bits hold the week end's day number.
const SNAPSHOT_LOCK_CLASS: i64 = 0x5348_4C46;

/// Session-level `pg_advisory_lock` key for the snapshot run covering `week_end`.
fn lock_key_for_week_end(week_end: NaiveDate) -> i64 {
    let day = week_end.num_days_from_ce() as u32;
    (SNAPSHOT_LOCK_CLASS << 32) | i64::from(day)
}

pub async fn try_acquire_week_end_lock(
    pool: &sqlx::PgPool,
    week_end: NaiveDate,
) -> anyhow::Result<bool> {
    let key = lock_key_for_week_end(week_end);
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(key)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to acquire advisory lock (key={key})"))?;
    Ok(acquired.0)
}

pub async fn release_week_end_lock(pool: &sqlx::PgPool, week_end: NaiveDate) -> anyhow::Result<()> {
    let key = lock_key_for_week_end(week_end);
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("failed to release advisory lock (key={key})"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_week_ends_get_distinct_keys() {
        let a = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_ne!(lock_key_for_week_end(a), lock_key_for_week_end(b));
        assert_eq!(lock_key_for_week_end(a), lock_key_for_week_end(a));
    }

    #[test]
    fn key_carries_snapshot_class_in_high_bits() {
        let key = lock_key_for_week_end(NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert_eq!(key >> 32, SNAPSHOT_LOCK_CLASS);

        let early = lock_key_for_week_end(NaiveDate::MIN);
        assert_eq!(early >> 32, SNAPSHOT_LOCK_CLASS);
    }
}
