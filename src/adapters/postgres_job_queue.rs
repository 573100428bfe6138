//! Postgres-backed job queue.
//!
//! A partial unique index on `dedup_key` covers queued and running jobs, so a
//! duplicate dispatch is a no-op. Workers claim with `FOR UPDATE SKIP LOCKED`
//! and the claim time is kept in `claimed_at` for lease expiry.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Job, QueuedJob, DEFAULT_JOB_LEASE, LEASE_EXPIRED_ERROR};
use crate::ports::{JobQueue, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresJobQueue {
    pool: PgPool,
    lease: Duration,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self::with_lease(pool, DEFAULT_JOB_LEASE)
    }

    pub fn with_lease(pool: PgPool, lease: Duration) -> Self {
        Self { pool, lease }
    }

    async fn finish(&self, id: Uuid, status: &str, error: Option<&str>) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tingg_jobs
            SET status = $2, last_error = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'running'
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("running job `{}`", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl JobQueue for PostgresJobQueue {
    async fn dispatch(&self, job: Job) -> RepositoryResult<bool> {
        let payload = serde_json::to_value(&job)
            .map_err(|e| RepositoryError::Corrupt(format!("unserializable job: {e}")))?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO tingg_jobs (id, kind, dedup_key, payload, status)
            VALUES ($1, $2, $3, $4, 'queued')
            ON CONFLICT (dedup_key) WHERE status IN ('queued', 'running') DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.kind())
        .bind(job.dedup_key())
        .bind(payload)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(inserted.is_some())
    }

    async fn claim_next(&self) -> RepositoryResult<Option<QueuedJob>> {
        let claimed = sqlx::query_as::<_, (Uuid, serde_json::Value)>(
            r#"
            UPDATE tingg_jobs
            SET status = 'running', claimed_at = NOW(), updated_at = NOW()
            WHERE id = (
                SELECT id FROM tingg_jobs
                WHERE status = 'queued'
                ORDER BY created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, payload
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let Some((id, payload)) = claimed else {
            return Ok(None);
        };

        match serde_json::from_value::<Job>(payload) {
            Ok(job) => Ok(Some(QueuedJob { id, job })),
            Err(e) => {
                let message = format!("undecodable job payload: {e}");
                self.finish(id, "failed", Some(&message)).await?;
                Err(RepositoryError::Corrupt(format!("job `{}`: {}", id, message)))
            }
        }
    }

    async fn complete(&self, id: Uuid) -> RepositoryResult<()> {
        self.finish(id, "completed", None).await
    }

    async fn fail(&self, id: Uuid, error: &str) -> RepositoryResult<()> {
        self.finish(id, "failed", Some(error)).await
    }

    async fn release_expired(&self) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE tingg_jobs
            SET status = 'failed', last_error = $2, updated_at = NOW()
            WHERE status = 'running'
              AND claimed_at <= NOW() - make_interval(secs => $1)
            "#,
        )
        .bind(self.lease.as_secs_f64())
        .bind(LEASE_EXPIRED_ERROR)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected())
    }
}
