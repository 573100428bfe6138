use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::ProviderDirectoryEntry;
use crate::ports::{ProviderDirectory, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresProviderDirectory {
    pool: PgPool,
}

impl PostgresProviderDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderDirectory for PostgresProviderDirectory {
    async fn find_by_source_provider_id(
        &self,
        source_provider_id: Uuid,
    ) -> RepositoryResult<Option<ProviderDirectoryEntry>> {
        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id, mobile_money_provider_id, code, created_at, updated_at
            FROM tingg_mobile_money_providers
            WHERE mobile_money_provider_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(source_provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.map(ProviderRow::into_domain))
    }

    async fn insert(&self, entry: ProviderDirectoryEntry) -> RepositoryResult<ProviderDirectoryEntry> {
        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            INSERT INTO tingg_mobile_money_providers (id, mobile_money_provider_id, code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, mobile_money_provider_id, code, created_at, updated_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.source_provider_id)
        .bind(&entry.provider_code)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.into_domain())
    }

    async fn list(&self) -> RepositoryResult<Vec<ProviderDirectoryEntry>> {
        let rows = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id, mobile_money_provider_id, code, created_at, updated_at
            FROM tingg_mobile_money_providers
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(ProviderRow::into_domain).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProviderRow {
    id: Uuid,
    mobile_money_provider_id: Uuid,
    code: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProviderRow {
    fn into_domain(self) -> ProviderDirectoryEntry {
        ProviderDirectoryEntry {
            id: self.id,
            source_provider_id: self.mobile_money_provider_id,
            provider_code: self.code,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
