//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    NewTransaction, PaymentStatusCode, TransactionChange, TransactionRecord, TransactionState,
};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

/// Postgres-backed transaction record repository.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn missing_or_moved(&self, id: Uuid, expected: TransactionState) -> RepositoryError {
        match self.get_by_id(id).await {
            Ok(_) => RepositoryError::StateConflict { id, expected },
            Err(e) => e,
        }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert(&self, tx: NewTransaction) -> RepositoryResult<TransactionRecord> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO tingg_transactions (
                id, upstream_transaction_id, processing_item_id, state,
                reference, country_code, currency_code, amount, service_code, product_code,
                sender_name, sender_phone_number, recipient_phone_number
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(tx.id)
        .bind(tx.upstream_transaction_id)
        .bind(tx.processing_item_id)
        .bind(TransactionState::LocalUnprocessed.as_str())
        .bind(&tx.reference)
        .bind(&tx.country_code)
        .bind(&tx.currency_code)
        .bind(&tx.amount)
        .bind(&tx.service_code)
        .bind(&tx.product_code)
        .bind(&tx.sender_name)
        .bind(&tx.sender_phone_number)
        .bind(&tx.recipient_phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<TransactionRecord> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM tingg_transactions WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(|r| r.into_domain())
            .unwrap_or_else(|| Err(RepositoryError::NotFound(format!("TinggTransaction `{}`", id))))
    }

    async fn find_by_upstream_transaction_id(
        &self,
        upstream_transaction_id: Uuid,
    ) -> RepositoryResult<Option<TransactionRecord>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM tingg_transactions WHERE upstream_transaction_id = $1 AND deleted_at IS NULL",
        )
        .bind(upstream_transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(|r| r.into_domain()).transpose()
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: TransactionState,
        change: TransactionChange,
    ) -> RepositoryResult<TransactionRecord> {
        let query = match &change {
            TransactionChange::Submitted {
                state,
                error_code,
                error_description,
                remote_reference,
            } => sqlx::query_as::<_, TransactionRow>(
                r#"
                UPDATE tingg_transactions
                SET state = $3, error_code = $4, error_description = $5,
                    remote_reference = $6, updated_at = NOW()
                WHERE id = $1 AND state = $2 AND deleted_at IS NULL
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(expected.as_str())
            .bind(state.as_str())
            .bind(error_code.code())
            .bind(error_description.clone())
            .bind(remote_reference.clone()),
            TransactionChange::Polled { state } => sqlx::query_as::<_, TransactionRow>(
                r#"
                UPDATE tingg_transactions
                SET state = $3, updated_at = NOW()
                WHERE id = $1 AND state = $2 AND deleted_at IS NULL
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(expected.as_str())
            .bind(state.as_str()),
            TransactionChange::Failed { state, reason } => sqlx::query_as::<_, TransactionRow>(
                r#"
                UPDATE tingg_transactions
                SET state = $3, state_reason = $4, updated_at = NOW()
                WHERE id = $1 AND state = $2 AND deleted_at IS NULL
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(expected.as_str())
            .bind(state.as_str())
            .bind(reason.clone()),
        };

        match query.fetch_optional(&self.pool).await.map_err(RepositoryError::from)? {
            Some(row) => row.into_domain(),
            None => Err(self.missing_or_moved(id, expected).await),
        }
    }

    async fn count_in_state(&self, state: TransactionState) -> RepositoryResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tingg_transactions WHERE state = $1 AND deleted_at IS NULL",
        )
        .bind(state.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)
    }

    async fn list_ids_in_state(&self, state: TransactionState) -> RepositoryResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM tingg_transactions
            WHERE state = $1 AND deleted_at IS NULL
            ORDER BY updated_at ASC
            "#,
        )
        .bind(state.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)
    }

    async fn soft_delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE tingg_transactions SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("TinggTransaction `{}`", id)));
        }
        Ok(())
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    upstream_transaction_id: Uuid,
    processing_item_id: Uuid,
    state: String,
    state_reason: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    reference: String,
    remote_reference: Option<String>,
    country_code: String,
    currency_code: String,
    amount: bigdecimal::BigDecimal,
    service_code: String,
    product_code: Option<String>,
    sender_name: String,
    sender_phone_number: String,
    recipient_phone_number: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<TransactionRecord> {
        let state = self
            .state
            .parse::<TransactionState>()
            .map_err(|e| RepositoryError::Corrupt(format!("TinggTransaction `{}`: {}", self.id, e)))?;
        let error_code = match self.error_code.as_deref() {
            None => None,
            Some(code) => Some(PaymentStatusCode::from_code(code).ok_or_else(|| {
                RepositoryError::Corrupt(format!(
                    "TinggTransaction `{}`: unknown error code `{}`",
                    self.id, code
                ))
            })?),
        };

        Ok(TransactionRecord {
            id: self.id,
            upstream_transaction_id: self.upstream_transaction_id,
            processing_item_id: self.processing_item_id,
            state,
            state_reason: self.state_reason,
            error_code,
            error_description: self.error_description,
            reference: self.reference,
            remote_reference: self.remote_reference,
            country_code: self.country_code.trim().to_string(),
            currency_code: self.currency_code.trim().to_string(),
            amount: self.amount,
            service_code: self.service_code,
            product_code: self.product_code,
            sender_name: self.sender_name,
            sender_phone_number: self.sender_phone_number,
            recipient_phone_number: self.recipient_phone_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
