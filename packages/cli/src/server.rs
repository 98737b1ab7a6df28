// ABOUTME: HTTP server assembly for OpsDesk
// ABOUTME: Wraps the API router with CORS and request tracing, then serves it until shutdown

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use opsdesk_api::{create_router, DbState, USER_ID_HEADER, USER_ROLE_HEADER};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, ConfigError};

/// Build the full application router for a migrated pool
pub fn build_app(pool: SqlitePool, config: &Config) -> Result<Router, ConfigError> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|_| ConfigError::InvalidCorsOrigin(config.cors_origin.clone()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(USER_ID_HEADER),
            header::HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    Ok(create_router(DbState::new(pool))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// Serve the API until Ctrl-C
pub async fn run_server(pool: SqlitePool, config: &Config) -> anyhow::Result<()> {
    let app = build_app(pool, config)?;
    let addr = config.socket_addr();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("OpsDesk API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn test_config(cors_origin: &str) -> Config {
        Config {
            host: [127, 0, 0, 1].into(),
            port: 4001,
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            busy_timeout_secs: 5,
            cors_origin: cors_origin.to_string(),
            log_filter: "info".to_string(),
        }
    }

    #[tokio::test]
    async fn test_app_serves_health_with_cors() {
        let pool = opsdesk_storage::connect_in_memory().await.unwrap();
        let app = build_app(pool, &test_config("http://localhost:5173")).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_invalid_cors_origin_is_rejected() {
        let pool = opsdesk_storage::connect_in_memory().await.unwrap();
        let err = build_app(pool, &test_config("bad\norigin")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCorsOrigin(_)));
    }
}
