/// SQLite-backed verification store
use crate::{
    cpf::Cpf,
    store::{StoreError, VerificationRecord, VerificationStore},
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::{future::Future, time::Duration};

/// Verification store over a shared SQLite pool
#[derive(Clone)]
pub struct SqliteVerificationStore {
    db: SqlitePool,
    /// Upper bound on any single store operation
    max_wait: Duration,
}

impl SqliteVerificationStore {
    /// Create a new store
    pub fn new(db: SqlitePool, max_wait: Duration) -> Self {
        Self { db, max_wait }
    }

    /// Run a query, converting an elapsed wait into `Unavailable`
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.max_wait, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Unavailable(format!(
                "{} exceeded {} ms",
                operation,
                self.max_wait.as_millis()
            ))),
        }
    }

    /// Number of stored records
    #[cfg(test)]
    pub async fn count(&self) -> Result<i64, StoreError> {
        self.bounded(
            "count",
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cpf_verifications")
                .fetch_one(&self.db),
        )
        .await
    }
}

#[async_trait]
impl VerificationStore for SqliteVerificationStore {
    async fn find(&self, cpf: &Cpf) -> Result<Option<VerificationRecord>, StoreError> {
        self.bounded(
            "find",
            sqlx::query_as::<_, VerificationRecord>(
                r#"
                SELECT cpf, is_valid, verified_at
                FROM cpf_verifications
                WHERE cpf = ?1
                "#,
            )
            .bind(cpf.as_str())
            .fetch_optional(&self.db),
        )
        .await
    }

    async fn create(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        self.bounded(
            "create",
            sqlx::query(
                r#"
                INSERT INTO cpf_verifications (cpf, is_valid, verified_at)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(&record.cpf)
            .bind(record.is_valid)
            .bind(record.verified_at)
            .execute(&self.db),
        )
        .await?;

        Ok(())
    }
}
