/// HTML view models for the verification form
use crate::coordinator::VerificationOutcome;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// User-facing messages shown on the form page
pub mod messages {
    pub const BAD_INPUT: &str = "❌ CPF deve conter exatamente 11 dígitos numéricos.";
    pub const FROM_CACHE: &str = "✅ Resultado obtido do banco de dados";
    pub const FROM_REMOTE: &str = "✅ Resultado obtido da API externa";
    pub const SLOW_SERVICE: &str =
        "⌛ A validação está demorando mais que o normal. Por favor, tente novamente mais tarde.";
    pub const GENERIC_FAILURE: &str =
        "❌ Ocorreu um erro ao validar o CPF. Por favor, tente novamente.";
    pub const STORE_UNAVAILABLE: &str =
        "⚠️ Serviço temporariamente indisponível. Banco de dados não conectado.";
}

/// Result block of the form page
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub cpf: String,
    pub is_valid: bool,
    pub message: String,
    pub cached: bool,
}

/// The single form page, optionally showing a result or an error
#[derive(Template, Debug, Clone, Default)]
#[template(path = "index.html")]
pub struct IndexView {
    pub result: Option<ResultView>,
    pub error: Option<String>,
}

impl IndexView {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_error(message: &str) -> Self {
        Self {
            result: None,
            error: Some(message.to_string()),
        }
    }

    pub fn with_result(result: ResultView) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Render with the given status, falling back to plain text if the template fails
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        match self.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Template rendering failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, messages::GENERIC_FAILURE).into_response()
            }
        }
    }
}

impl From<&VerificationOutcome> for IndexView {
    fn from(outcome: &VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Cached { cpf, is_valid } => IndexView::with_result(ResultView {
                cpf: cpf.formatted(),
                is_valid: *is_valid,
                message: messages::FROM_CACHE.to_string(),
                cached: true,
            }),
            VerificationOutcome::Fresh { cpf, is_valid } => IndexView::with_result(ResultView {
                cpf: cpf.formatted(),
                is_valid: *is_valid,
                message: messages::FROM_REMOTE.to_string(),
                cached: false,
            }),
            VerificationOutcome::BadInput => IndexView::with_error(messages::BAD_INPUT),
            VerificationOutcome::SlowService => IndexView::with_error(messages::SLOW_SERVICE),
            VerificationOutcome::ServiceUnavailable => {
                IndexView::with_error(messages::STORE_UNAVAILABLE)
            }
            VerificationOutcome::RemoteError | VerificationOutcome::InternalError => {
                IndexView::with_error(messages::GENERIC_FAILURE)
            }
        }
    }
}
