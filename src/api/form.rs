/// Verification form endpoints
use crate::{
    context::AppContext,
    coordinator::VerificationOutcome,
    views::IndexView,
};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::debug;

/// Build form routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(index))
        .route("/verificar-cpf", post(verify_cpf))
}

/// Submitted form body; a missing field is treated as bad input
#[derive(Debug, Deserialize)]
pub struct VerifyCpfForm {
    pub cpf: Option<String>,
}

/// Empty form
async fn index() -> Response {
    IndexView::empty().into_response_with_status(StatusCode::OK)
}

/// Verify a CPF and re-render the form with the outcome
///
/// An unreadable body goes through the coordinator as a missing field so
/// the answer is still the form page.
async fn verify_cpf(
    State(ctx): State<AppContext>,
    form: Result<Form<VerifyCpfForm>, FormRejection>,
) -> Response {
    let cpf = match form {
        Ok(Form(form)) => form.cpf,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "form_rejected");
            None
        }
    };

    let outcome = ctx.coordinator.verify(cpf.as_deref()).await;

    let status = match outcome {
        VerificationOutcome::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    IndexView::from(&outcome).into_response_with_status(status)
}
