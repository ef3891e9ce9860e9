/// Remote CPF verification
///
/// The remote service answers either with a bare scalar (`true`, `false`,
/// `"1"`...) or with an object carrying a `valido` field. Both shapes are
/// parsed into [`RemoteVerdict`] and normalized to a strict boolean.

pub mod client;

pub use client::HttpVerificationClient;

use crate::cpf::Cpf;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Field of a structured response that carries the verdict
pub const VALIDITY_FIELD: &str = "valido";

/// Remote verification failures
#[derive(Error, Debug)]
pub enum VerificationError {
    /// The call exceeded the configured bound
    #[error("Remote verification timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Any other transport or protocol failure
    #[error("Remote verification failed: {0}")]
    RemoteFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Shape of a remote verification response
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteVerdict {
    /// A scalar answer, coerced directly
    Bare(Value),
    /// An object; `valid` holds its validity field if present
    Structured { valid: Option<Value> },
}

impl RemoteVerdict {
    /// Classify a decoded JSON value
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => RemoteVerdict::Structured {
                valid: fields.remove(VALIDITY_FIELD),
            },
            // Arrays never carry the field
            Value::Array(_) => RemoteVerdict::Structured { valid: None },
            scalar => RemoteVerdict::Bare(scalar),
        }
    }

    /// Classify a raw response body; non-JSON text is a bare string
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_json(value),
            Err(_) => RemoteVerdict::Bare(Value::String(body.to_string())),
        }
    }

    /// Collapse the verdict to a two-valued boolean
    pub fn normalize(&self) -> bool {
        match self {
            RemoteVerdict::Bare(value) => is_truthy(value),
            RemoteVerdict::Structured { valid: Some(value) } => is_truthy(value),
            RemoteVerdict::Structured { valid: None } => false,
        }
    }
}

/// Loose truthiness: null, false, 0 and "" are false; everything else is true
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Something that can decide whether a CPF is valid
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Single attempt, no retry
    async fn verify(&self, cpf: &Cpf) -> Result<bool, VerificationError>;
}
