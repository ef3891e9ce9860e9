/// Request coordinator: validate, look up, verify remotely, persist
///
/// Each request runs the steps strictly in order and stops at the first
/// terminal outcome:
/// 1. Validate the input shape
/// 2. Look the CPF up in the store (hit: done)
/// 3. Call the remote verifier
/// 4. Persist the normalized verdict, then answer
///
/// Persistence only happens after a successful remote call, so a failed
/// request never leaves a partial record behind.
use crate::{
    cpf::Cpf,
    metrics,
    store::{StoreError, VerificationRecord, VerificationStore},
    verification::{VerificationError, Verifier},
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, error, info, warn};

/// Terminal state of a verification request
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// Input is not exactly 11 digits
    BadInput,
    /// Served from an existing record
    Cached { cpf: Cpf, is_valid: bool },
    /// Verified remotely and stored
    Fresh { cpf: Cpf, is_valid: bool },
    /// Remote call exceeded its bound
    SlowService,
    /// Remote call failed for any other reason
    RemoteError,
    /// Store stopped answering mid-request
    ServiceUnavailable,
    /// Anything else
    InternalError,
}

impl VerificationOutcome {
    /// Metric and log label
    pub fn label(&self) -> &'static str {
        match self {
            VerificationOutcome::BadInput => "bad_input",
            VerificationOutcome::Cached { .. } => "cached",
            VerificationOutcome::Fresh { .. } => "fresh",
            VerificationOutcome::SlowService => "slow_service",
            VerificationOutcome::RemoteError => "remote_error",
            VerificationOutcome::ServiceUnavailable => "service_unavailable",
            VerificationOutcome::InternalError => "internal_error",
        }
    }
}

/// Orchestrates the store and the remote verifier
#[derive(Clone)]
pub struct VerificationCoordinator {
    store: Arc<dyn VerificationStore>,
    verifier: Arc<dyn Verifier>,
}

impl VerificationCoordinator {
    pub fn new(store: Arc<dyn VerificationStore>, verifier: Arc<dyn Verifier>) -> Self {
        Self { store, verifier }
    }

    /// Verify a raw form input. Never fails; every error maps to an outcome.
    pub async fn verify(&self, input: Option<&str>) -> VerificationOutcome {
        let outcome = self.run(input).await;

        metrics::record_verification(outcome.label());
        info!(outcome = outcome.label(), "cpf_verification_completed");

        outcome
    }

    async fn run(&self, input: Option<&str>) -> VerificationOutcome {
        let Some(cpf) = input.and_then(Cpf::parse) else {
            return VerificationOutcome::BadInput;
        };

        match self.store.find(&cpf).await {
            Ok(Some(record)) => {
                metrics::record_cache_access(true);
                debug!(cpf = %cpf, "cache_hit");
                return VerificationOutcome::Cached {
                    cpf,
                    is_valid: record.is_valid,
                };
            }
            Ok(None) => {
                metrics::record_cache_access(false);
                debug!(cpf = %cpf, "cache_miss");
            }
            Err(e) => return Self::store_failure(&cpf, "find", e),
        }

        let started = Instant::now();
        let result = self.verifier.verify(&cpf).await;
        metrics::record_remote_call(started.elapsed());

        let is_valid = match result {
            Ok(is_valid) => is_valid,
            Err(VerificationError::Timeout(bound)) => {
                warn!(cpf = %cpf, timeout = ?bound, "remote_verification_timeout");
                return VerificationOutcome::SlowService;
            }
            Err(e) => {
                error!(cpf = %cpf, error = %e, "remote_verification_failed");
                return VerificationOutcome::RemoteError;
            }
        };

        let record = VerificationRecord::new(&cpf, is_valid);
        if let Err(e) = self.store.create(&record).await {
            return Self::store_failure(&cpf, "create", e);
        }

        VerificationOutcome::Fresh { cpf, is_valid }
    }

    fn store_failure(cpf: &Cpf, operation: &str, e: StoreError) -> VerificationOutcome {
        match e {
            StoreError::Unavailable(reason) => {
                warn!(cpf = %cpf, operation, reason = %reason, "store_unavailable");
                VerificationOutcome::ServiceUnavailable
            }
            // Concurrent first verification of the same CPF; the other request's record stands
            StoreError::DuplicateKey(reason) => {
                warn!(cpf = %cpf, operation, reason = %reason, "store_duplicate_key");
                VerificationOutcome::InternalError
            }
            StoreError::Database(e) => {
                error!(cpf = %cpf, operation, error = %e, "store_error");
                VerificationOutcome::InternalError
            }
        }
    }
}
