//! Test utilities for fintrack-core
//!
//! A mock recommendation webhook for integration tests and local development.

use axum::{extract::Json, http::StatusCode, routing::post, Router};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::webhook::{RecommendationRequest, Recommendations};

/// Mock recommendation webhook
pub struct MockWebhookServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockWebhookServer {
    /// Path served by default config
    pub const RECOMMENDATIONS_PATH: &'static str = "financial-recommendations";
    /// Path that always answers 500
    pub const FAILING_PATH: &'static str = "broken";

    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route(
                &format!("/{}", Self::RECOMMENDATIONS_PATH),
                post(handle_recommendations),
            )
            .route(&format!("/{}", Self::FAILING_PATH), post(handle_failure));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockWebhookServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_recommendations(
    Json(request): Json<RecommendationRequest>,
) -> Json<Recommendations> {
    Json(Recommendations {
        recommendations: Some(format!("Recommendations for {}", request.user_id)),
        alert_recommendations: Some("Review categories close to their budget".to_string()),
    })
}

async fn handle_failure() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}
