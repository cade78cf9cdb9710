//! # Payment Repository
//!
//! Append-only list of per-tender payment records.
//!
//! ```text
//! confirmed settlement ──► append(&records) ──► INSERT ... (one transaction)
//!                                                        │
//! payments / summary   ◄── list() ◄──────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use courtside_core::{Money, PaymentRecord, Tender, TicketKind};

/// Row shape of `payment_records`.
#[derive(Debug, FromRow)]
struct PaymentRow {
    id: String,
    ticket_id: String,
    ticket_kind: String,
    tender: String,
    amount_cents: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DbError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let ticket_kind: TicketKind = row
            .ticket_kind
            .parse()
            .map_err(|_| DbError::invalid("ticket kind", &row.ticket_kind))?;
        let tender: Tender = row
            .tender
            .parse()
            .map_err(|_| DbError::invalid("tender", &row.tender))?;

        Ok(PaymentRecord {
            id: row.id,
            ticket_id: row.ticket_id,
            ticket_kind,
            tender,
            amount: Money::from_cents(row.amount_cents),
            recorded_at: row.created_at,
        })
    }
}

/// Repository for the `payment_records` table.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Appends records in one transaction: all are stored or none.
    pub async fn append(&self, records: &[PaymentRecord]) -> DbResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO payment_records (
                    id, ticket_id, ticket_kind, tender, amount_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&record.id)
            .bind(&record.ticket_id)
            .bind(record.ticket_kind.as_str())
            .bind(record.tender.to_string())
            .bind(record.amount.cents())
            .bind(record.recorded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(count = records.len(), "Payment records appended");
        Ok(())
    }

    /// All records, oldest first.
    pub async fn list(&self) -> DbResult<Vec<PaymentRecord>> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, ticket_kind, tender, amount_cents, created_at
            FROM payment_records
            ORDER BY created_at, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }

    /// Records for one ticket, oldest first.
    pub async fn for_ticket(&self, ticket_id: &str) -> DbResult<Vec<PaymentRecord>> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, ticket_kind, tender, amount_cents, created_at
            FROM payment_records
            WHERE ticket_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn record(ticket_id: &str, tender: Tender, cents: i64) -> PaymentRecord {
        PaymentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id: ticket_id.to_string(),
            ticket_kind: TicketKind::WalkIn,
            tender,
            amount: Money::from_cents(cents),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_list_in_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payments();

        repo.append(&[record("t1", Tender::Cash, 500), record("t1", Tender::Credit, 350)])
            .await
            .unwrap();
        repo.append(&[record("t2", Tender::InstantTransfer, 765)])
            .await
            .unwrap();

        let all = repo.list().await.unwrap();
        let tenders: Vec<Tender> = all.iter().map(|r| r.tender).collect();
        assert_eq!(
            tenders,
            vec![Tender::Cash, Tender::Credit, Tender::InstantTransfer]
        );
        assert_eq!(all[2].amount, Money::from_cents(765));
        assert_eq!(all[0].ticket_kind, TicketKind::WalkIn);

        assert_eq!(repo.for_ticket("t1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_append_stores_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payments();
        let first = record("t1", Tender::Cash, 500);
        repo.append(&[first.clone()]).await.unwrap();

        // Second batch reuses an existing id, so the whole batch is rolled back.
        let result = repo
            .append(&[record("t2", Tender::Debit, 100), first])
            .await;
        assert!(result.is_err());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
