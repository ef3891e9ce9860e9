/// Request gating middleware
use crate::{context::AppContext, error::AppError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Refuse to run route logic while the store is disconnected
pub async fn require_store_connected(
    State(ctx): State<AppContext>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !ctx.store_health.is_connected() {
        return Err(AppError::ServiceUnavailable(format!(
            "store not connected, rejected {} {}",
            req.method(),
            req.uri().path()
        )));
    }

    Ok(next.run(req).await)
}
