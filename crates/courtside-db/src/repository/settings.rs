//! # Settings Repository
//!
//! Small key/value store for register-local settings.
//!
//! ## Keys
//! | Key                      | Value                         |
//! |--------------------------|-------------------------------|
//! | `scheduled_date`         | `YYYY-MM-DD`                  |
//! | `scheduled_time`         | `HH:MM`                       |
//! | `loose_sale_total_cents` | integer cents, walk-in sales  |

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use courtside_core::{Money, ScheduledSlot};

pub const SCHEDULED_DATE: &str = "scheduled_date";
pub const SCHEDULED_TIME: &str = "scheduled_time";
pub const LOOSE_SALE_TOTAL: &str = "loose_sale_total_cents";

/// Repository for the `local_settings` table.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO local_settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(key, "Setting stored");
        Ok(())
    }

    /// The game slot, when both halves are set and still valid.
    pub async fn scheduled_slot(&self) -> DbResult<Option<ScheduledSlot>> {
        let date = self.get(SCHEDULED_DATE).await?;
        let time = self.get(SCHEDULED_TIME).await?;

        let (Some(date), Some(time)) = (date, time) else {
            return Ok(None);
        };

        match ScheduledSlot::new(&date, &time) {
            Ok(slot) => Ok(Some(slot)),
            Err(e) => {
                warn!(date = %date, time = %time, error = %e, "Stored game slot is invalid, ignoring it");
                Ok(None)
            }
        }
    }

    /// Stores both halves of the game slot in one transaction.
    pub async fn set_scheduled_slot(&self, slot: &ScheduledSlot) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (key, value) in [(SCHEDULED_DATE, slot.date()), (SCHEDULED_TIME, slot.time())] {
            sqlx::query(
                r#"
                INSERT INTO local_settings (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Running total of settled walk-in sales.
    pub async fn loose_sale_total(&self) -> DbResult<Money> {
        match self.get(LOOSE_SALE_TOTAL).await? {
            None => Ok(Money::zero()),
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map(Money::from_cents)
                .map_err(|_| DbError::invalid(LOOSE_SALE_TOTAL, value)),
        }
    }

    /// Adds `amount` to the running total and returns the new total.
    pub async fn add_loose_sale_total(&self, amount: Money) -> DbResult<Money> {
        let total = self.loose_sale_total().await? + amount;
        self.set(LOOSE_SALE_TOTAL, &total.cents().to_string()).await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> SettingsRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().settings()
    }

    #[tokio::test]
    async fn test_get_set_overwrites() {
        let repo = repo().await;
        assert_eq!(repo.get("k").await.unwrap(), None);
        repo.set("k", "a").await.unwrap();
        repo.set("k", "b").await.unwrap();
        assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_slot_needs_both_halves() {
        let repo = repo().await;
        repo.set(SCHEDULED_DATE, "2024-05-10").await.unwrap();
        assert_eq!(repo.scheduled_slot().await.unwrap(), None);

        let slot = ScheduledSlot::new("2024-05-10", "19:30").unwrap();
        repo.set_scheduled_slot(&slot).await.unwrap();
        assert_eq!(repo.scheduled_slot().await.unwrap(), Some(slot));
    }

    #[tokio::test]
    async fn test_invalid_stored_slot_is_ignored() {
        let repo = repo().await;
        repo.set(SCHEDULED_DATE, "tomorrow").await.unwrap();
        repo.set(SCHEDULED_TIME, "19:30").await.unwrap();
        assert_eq!(repo.scheduled_slot().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_loose_sale_total_accumulates() {
        let repo = repo().await;
        assert_eq!(repo.loose_sale_total().await.unwrap(), Money::zero());
        repo.add_loose_sale_total(Money::from_cents(765)).await.unwrap();
        let total = repo.add_loose_sale_total(Money::from_cents(235)).await.unwrap();
        assert_eq!(total, Money::from_cents(1000));
        assert_eq!(repo.loose_sale_total().await.unwrap(), total);
    }

    #[tokio::test]
    async fn test_corrupt_total_is_an_error() {
        let repo = repo().await;
        repo.set(LOOSE_SALE_TOTAL, "lots").await.unwrap();
        assert!(matches!(
            repo.loose_sale_total().await,
            Err(DbError::InvalidData { .. })
        ));
    }
}
