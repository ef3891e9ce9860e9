/// HTTP server setup and routing
use crate::{
    api::middleware::require_store_connected,
    context::AppContext,
    error::{AppError, AppResult},
    views::{messages, IndexView},
};
use axum::{
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    middleware,
    response::Response,
    Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    let static_files = ServeDir::new(&ctx.config.service.public_directory)
        .not_found_service(not_found.into_service());

    Router::new()
        // Form routes, gated on store connectivity
        .merge(crate::api::routes())
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            require_store_connected,
        ))
        // Health and metrics stay reachable while the store is down
        .merge(crate::api::health::routes())
        // Provide state - converts Router<AppContext> to Router<()>
        .with_state(ctx)
        // Static assets for everything else
        .fallback_service(static_files)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}

/// 404 handler
async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Last-resort boundary: a panicking handler still answers with the form page
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!(panic = detail, "request_handler_panicked");

    IndexView::with_error(messages::GENERIC_FAILURE)
        .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> AppResult<()> {
    let addr = ctx.config.bind_address();

    info!("🚀 CPF verifier listening on http://{}", addr);
    info!("   Verification API: {}", ctx.config.verification.api_url);
    info!("   Timeout: {} ms", ctx.config.verification.timeout_ms);

    let app = build_router(ctx);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ServerConfig,
        coordinator::VerificationCoordinator,
        cpf::Cpf,
        db,
        store::{SqliteVerificationStore, StoreHealth},
        verification::{VerificationError, Verifier},
    };
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };
    use tower::ServiceExt;

    #[derive(Clone, Copy)]
    enum Remote {
        Answers(bool),
        TimesOut,
        Panics,
    }

    struct FakeRemote {
        behaviour: Remote,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Verifier for FakeRemote {
        async fn verify(&self, _cpf: &Cpf) -> Result<bool, VerificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Remote::Answers(valid) => Ok(valid),
                Remote::TimesOut => {
                    Err(VerificationError::Timeout(Duration::from_millis(300_000)))
                }
                Remote::Panics => panic!("remote verifier exploded"),
            }
        }
    }

    struct TestApp {
        router: Router,
        ctx: AppContext,
        store: Arc<SqliteVerificationStore>,
        remote: Arc<FakeRemote>,
        _public: tempfile::TempDir,
    }

    impl TestApp {
        async fn new(behaviour: Remote) -> Self {
            let public = tempfile::tempdir().unwrap();
            std::fs::write(public.path().join("style.css"), "body {}").unwrap();

            let mut config = ServerConfig::default();
            config.service.public_directory = public.path().to_path_buf();

            let pool = db::create_memory_pool().await.unwrap();
            db::run_migrations(&pool).await.unwrap();
            let store = Arc::new(SqliteVerificationStore::new(
                pool.clone(),
                Duration::from_secs(5),
            ));
            let remote = Arc::new(FakeRemote {
                behaviour,
                calls: AtomicUsize::new(0),
            });
            let coordinator =
                Arc::new(VerificationCoordinator::new(store.clone(), remote.clone()));

            let ctx = AppContext::from_parts(config, pool, StoreHealth::new(true), coordinator);

            Self {
                router: build_router(ctx.clone()),
                ctx,
                store,
                remote,
                _public: public,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, String::from_utf8(body.to_vec()).unwrap())
        }

        async fn get(&self, uri: &str) -> (StatusCode, String) {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        async fn post_form(&self, body: &str) -> (StatusCode, String) {
            self.send(
                Request::post("/verificar-cpf")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }

        fn remote_calls(&self) -> usize {
            self.remote.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_index_renders_empty_form() {
        let app = TestApp::new(Remote::Answers(true)).await;

        let (status, body) = app.get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<form action=\"/verificar-cpf\" method=\"POST\">"));
        assert!(!body.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn test_short_input_is_bad_input() {
        let app = TestApp::new(Remote::Answers(true)).await;

        let (status, body) = app.post_form("cpf=123").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(messages::BAD_INPUT));
        assert_eq!(app.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_input() {
        let app = TestApp::new(Remote::Answers(true)).await;

        let (status, body) = app.post_form("").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(messages::BAD_INPUT));
    }

    #[tokio::test]
    async fn test_unreadable_form_body_is_bad_input() {
        let app = TestApp::new(Remote::Answers(true)).await;

        let (status, body) = app
            .send(
                Request::post("/verificar-cpf")
                    .body(Body::from("cpf=12345678901"))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(messages::BAD_INPUT));

        let (status, body) = app.post_form("cpf=12345678901&cpf=1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(messages::BAD_INPUT));

        assert_eq!(app.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_fresh_then_cached() {
        let app = TestApp::new(Remote::Answers(true)).await;

        let (status, body) = app.post_form("cpf=12345678901").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("123.456.789-01"));
        assert!(body.contains(messages::FROM_REMOTE));
        assert!(!body.contains("Consulta em cache"));
        assert_eq!(app.store.count().await.unwrap(), 1);

        let (status, body) = app.post_form("cpf=12345678901").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("123.456.789-01"));
        assert!(body.contains(messages::FROM_CACHE));
        assert!(body.contains("Consulta em cache"));

        assert_eq!(app.remote_calls(), 1);
        assert_eq!(app.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_slow_remote_renders_distinct_message() {
        let app = TestApp::new(Remote::TimesOut).await;

        let (status, body) = app.post_form("cpf=12345678901").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(messages::SLOW_SERVICE));
        assert!(!body.contains(messages::GENERIC_FAILURE));
        assert_eq!(app.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_disconnected_store_short_circuits() {
        let app = TestApp::new(Remote::Answers(true)).await;
        app.ctx.store_health.set_connected(false);

        let (status, body) = app.post_form("cpf=12345678901").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains(messages::STORE_UNAVAILABLE));

        let (status, _) = app.get("/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(app.remote_calls(), 0);
        assert_eq!(app.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_health_follows_store_state() {
        let app = TestApp::new(Remote::Answers(true)).await;

        let (status, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"store\":\"connected\""));

        app.ctx.store_health.set_connected(false);
        let (status, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("\"store\":\"disconnected\""));
    }

    #[tokio::test]
    async fn test_static_files_served_while_disconnected() {
        let app = TestApp::new(Remote::Answers(true)).await;
        app.ctx.store_health.set_connected(false);

        let (status, body) = app.get("/style.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body {}");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let app = TestApp::new(Remote::Answers(true)).await;

        let (status, _) = app.get("/nope.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = TestApp::new(Remote::Answers(false)).await;
        app.post_form("cpf=11111111111").await;

        let (status, body) = app.get("/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("cpf_verifications_total"));
    }

    #[tokio::test]
    async fn test_panic_is_rendered_as_internal_error() {
        let app = TestApp::new(Remote::Panics).await;

        let (status, body) = app.post_form("cpf=12345678901").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains(messages::GENERIC_FAILURE));
        assert_eq!(app.store.count().await.unwrap(), 0);
    }
}
