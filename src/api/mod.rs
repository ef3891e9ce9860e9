/// API routes and handlers
pub mod form;
pub mod health;
pub mod middleware;

use crate::context::AppContext;
use axum::Router;

/// Routes that require a connected store
pub fn routes() -> Router<AppContext> {
    Router::new().merge(form::routes())
}
