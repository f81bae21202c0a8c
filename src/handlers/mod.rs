pub mod products;
pub mod replication;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::{db, AppState};

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let database = match db::ping(&state.db).await {
        Ok(()) => "ok",
        Err(_) => "unavailable",
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": state.config.project_name,
            "database": database,
        })),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{body::Body, http::Request, response::Response, Router};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{build_router, config::Config, AppState};

    /// Router over a pool that never connects; unreachable on purpose.
    pub(crate) fn test_app() -> Router {
        let config = Config {
            database_url: "postgres://postgres@127.0.0.1:1/unused".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            max_connections: 1,
            sql_echo: false,
            debug: false,
            project_name: "Product API".to_string(),
            replication_timeout: Duration::from_secs(5),
        };
        let db = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy(&config.database_url)
            .unwrap();

        build_router(AppState {
            db,
            config: Arc::new(config),
        })
    }

    pub(crate) async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_unavailable_database() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "unavailable");
    }
}
