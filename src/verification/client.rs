/// HTTP client for the remote verification endpoint
use crate::{
    cpf::Cpf,
    error::{AppError, AppResult},
    verification::{RemoteVerdict, VerificationError, Verifier},
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Calls `GET <base>/verificar-cpf?cpf=<digits>` once per verification
#[derive(Clone)]
pub struct HttpVerificationClient {
    http_client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpVerificationClient {
    /// Create a client for `base_url`, bounding every call by `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("cpf-verifier/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/verificar-cpf", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, e: reqwest::Error) -> VerificationError {
        if e.is_timeout() {
            VerificationError::Timeout(self.timeout)
        } else {
            VerificationError::RemoteFailure(Box::new(e))
        }
    }
}

#[async_trait]
impl Verifier for HttpVerificationClient {
    async fn verify(&self, cpf: &Cpf) -> Result<bool, VerificationError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("cpf", cpf.as_str())])
            .send()
            .await
            .map_err(|e| self.classify(e))?
            .error_for_status()
            .map_err(|e| self.classify(e))?;

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let verdict = RemoteVerdict::from_body(&body);
        debug!(cpf = %cpf, verdict = ?verdict, "remote_verification_response");

        Ok(verdict.normalize())
    }
}
