use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use tapquest_core::config::{AppConfig, TelegramConfig};

use super::auth::{admin_auth_middleware, AdminAuth};
use super::{admin, license, tasks};
use crate::db::Database;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub telegram: TelegramConfig,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Gateway HTTP server.
pub struct GatewayServer {
    config: AppConfig,
    db: Database,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self { config, db }
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let state = AppState {
            db: self.db.clone(),
            telegram: self.config.telegram.clone(),
        };
        let admin_auth = Arc::new(AdminAuth::from_config(&self.config.admin));

        // Build CORS layer
        let cors = if self.config.server.cors_enabled {
            if self.config.server.cors_origins.contains(&"*".to_string()) {
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
            } else {
                let origins: Vec<_> = self
                    .config
                    .server
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse().ok())
                    .collect();
                CorsLayer::new()
                    .allow_origin(origins)
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        } else {
            CorsLayer::new()
        };

        let admin_routes = Router::new()
            .route(
                "/tasks",
                get(admin::list_tasks)
                    .post(admin::create_task)
                    .put(admin::update_task_by_body),
            )
            .route(
                "/tasks/{id}",
                get(admin::get_task).put(admin::update_task),
            )
            .route("/export", post(admin::export_users))
            .layer(middleware::from_fn_with_state(
                admin_auth,
                admin_auth_middleware,
            ));

        Router::new()
            .route("/health", get(health_handler))
            .route("/api/tasks", get(tasks::list_tasks_for_user))
            .route("/api/license", get(license::license_handler))
            .nest("/api/admin", admin_routes)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(cors)
                    .layer(middleware::from_fn(request_log_middleware)),
            )
    }

    /// Get the socket address to bind to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.config.server.port))
    }

    /// Run the server (blocking).
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = self.addr();
        let router = self.router();

        tracing::info!("Gateway server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    }
}

/// Health check handler.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Per-request structured log line.
async fn request_log_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Handled request"
    );

    response
}
