/// Verification cache store
///
/// Persists the outcome of each remote CPF verification so repeated lookups
/// of the same identifier never reach the remote service again. Records are
/// written once and never updated.

pub mod health;
pub mod sqlite;

pub use health::StoreHealth;
pub use sqlite::SqliteVerificationStore;

use crate::cpf::Cpf;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Stored verification result, keyed by the raw 11-digit CPF
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub cpf: String,
    pub is_valid: bool,
    pub verified_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// New record stamped with the current time
    pub fn new(cpf: &Cpf, is_valid: bool) -> Self {
        Self {
            cpf: cpf.as_str().to_string(),
            is_valid,
            verified_at: Utc::now(),
        }
    }
}

/// Cache store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store not reachable, or the bounded wait elapsed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A record for this CPF already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Any other database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => StoreError::Unavailable(e.to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateKey(db_err.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Key-value persistence for verification records
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Exact-match lookup by CPF
    async fn find(&self, cpf: &Cpf) -> Result<Option<VerificationRecord>, StoreError>;

    /// Insert a new record; fails with `DuplicateKey` if the CPF is already stored
    async fn create(&self, record: &VerificationRecord) -> Result<(), StoreError>;
}
