//! # Ledger Repository
//!
//! Persists one [`QuantityLedger`] per [`LedgerScope`].
//!
//! Saving replaces the whole scope in one transaction, so the stored rows
//! always mirror the in-memory ledger exactly (zero entries included: they
//! simply are not written).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use courtside_core::{LedgerScope, QuantityLedger};

/// Repository for the `quantity_ledger` table.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Loads a scope. A scope that was never saved is empty.
    pub async fn load(&self, scope: LedgerScope) -> DbResult<QuantityLedger> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT item_name, quantity
            FROM quantity_ledger
            WHERE scope = ?1
            ORDER BY item_name
            "#,
        )
        .bind(scope.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(QuantityLedger::from_entries(rows))
    }

    /// Replaces the stored scope with `ledger`.
    pub async fn save(&self, scope: LedgerScope, ledger: &QuantityLedger) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM quantity_ledger WHERE scope = ?1")
            .bind(scope.as_str())
            .execute(&mut *tx)
            .await?;

        for (name, quantity) in ledger.iter() {
            sqlx::query(
                r#"
                INSERT INTO quantity_ledger (scope, item_name, quantity, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(scope.as_str())
            .bind(name)
            .bind(quantity as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(scope = %scope, entries = ledger.len(), "Ledger saved");
        Ok(())
    }

    /// Adds one unit per name to a scope without loading it first.
    pub async fn add_all<'a, I>(&self, scope: LedgerScope, names: I) -> DbResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for name in names {
            sqlx::query(
                r#"
                INSERT INTO quantity_ledger (scope, item_name, quantity, updated_at)
                VALUES (?1, ?2, 1, ?3)
                ON CONFLICT (scope, item_name)
                DO UPDATE SET quantity = quantity + 1, updated_at = excluded.updated_at
                "#,
            )
            .bind(scope.as_str())
            .bind(name)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> LedgerRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().ledgers()
    }

    #[tokio::test]
    async fn test_unsaved_scope_is_empty() {
        let repo = repo().await;
        assert!(repo.load(LedgerScope::WalkInSold).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_scope() {
        let repo = repo().await;
        let mut ledger = QuantityLedger::new();
        ledger.increment("Coke");
        ledger.increment("Coke");
        ledger.increment("Chips");
        repo.save(LedgerScope::ExpensePending, &ledger).await.unwrap();

        ledger.decrement("Chips");
        repo.save(LedgerScope::ExpensePending, &ledger).await.unwrap();

        let loaded = repo.load(LedgerScope::ExpensePending).await.unwrap();
        assert_eq!(loaded, ledger);
        assert_eq!(loaded.get("Coke"), 2);
        assert!(!loaded.contains("Chips"));
    }

    #[tokio::test]
    async fn test_scopes_are_separate() {
        let repo = repo().await;
        let mut expense = QuantityLedger::new();
        expense.increment("Coke");
        repo.save(LedgerScope::ExpensePending, &expense).await.unwrap();

        assert!(repo.load(LedgerScope::WalkInPending).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_all_accumulates() {
        let repo = repo().await;
        repo.add_all(LedgerScope::WalkInSold, ["Coke", "Chips", "Coke"])
            .await
            .unwrap();
        repo.add_all(LedgerScope::WalkInSold, ["Coke"]).await.unwrap();

        let sold = repo.load(LedgerScope::WalkInSold).await.unwrap();
        assert_eq!(sold.get("Coke"), 3);
        assert_eq!(sold.get("Chips"), 1);
    }
}
