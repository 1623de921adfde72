//! Webhook HTTP server.
//!
//! Exposes a [`Router`] as an axum POST route. Each request body is verified
//! and decoded by the router's platform, then its events are dispatched
//! before the response is written:
//!
//! | Outcome                                   | Status |
//! |-------------------------------------------|--------|
//! | missing or invalid `X-Line-Signature`     | 400    |
//! | body is not a webhook payload             | 500    |
//! | events dispatched                         | 200    |

use std::io;
use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use lynx_core::WebhookError;
use lynx_framework::Router;

use crate::signature::SIGNATURE_HEADER;

pub const DEFAULT_WEBHOOK_PATH: &str = "/callback";

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Builds the axum app that serves `router` at `path`.
pub fn webhook_router(router: Router, path: &str) -> axum::Router {
    axum::Router::new()
        .route(&normalize_path(path), post(webhook_handler))
        .with_state(router)
}

async fn webhook_handler(
    State(router): State<Router>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("Webhook request without signature");
        return (StatusCode::BAD_REQUEST, "missing signature");
    };

    match router.handle_webhook(&body, signature).await {
        Ok(outcomes) => {
            debug!(events = outcomes.len(), "Webhook handled");
            (StatusCode::OK, "ok")
        }
        Err(WebhookError::InvalidSignature) => {
            warn!("Webhook signature mismatch");
            (StatusCode::BAD_REQUEST, "invalid signature")
        }
        Err(WebhookError::Parse(reason)) => {
            error!(reason = %reason, "Failed to decode webhook body");
            (StatusCode::INTERNAL_SERVER_ERROR, "malformed payload")
        }
    }
}

/// A bound webhook listener.
pub struct WebhookServer {
    listener: TcpListener,
    app: axum::Router,
    path: String,
}

impl WebhookServer {
    pub async fn bind(addr: &str, path: &str, router: Router) -> io::Result<Self> {
        let path = normalize_path(path);
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            app: webhook_router(router, &path),
            path,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> io::Result<()> {
        let addr = self.listener.local_addr()?;
        info!(addr = %addr, path = %self.path, "Webhook server listening");

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await?;

        info!("Webhook server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use lynx_core::Message;
    use lynx_core::testing::MockPlatform;
    use lynx_framework::Flow;
    use tower::ServiceExt;

    const BODY: &str = r#"{"events":[{"type":"message","replyToken":"r1","timestamp":1,
        "source":{"type":"user","userId":"U1"},
        "message":{"id":"1","type":"text","text":"ping"}}]}"#;

    fn app(platform: Arc<MockPlatform>) -> axum::Router {
        let router = Router::new(platform).on_text(|ctx, text| async move {
            ctx.add_text(format!("{text} pong"))?;
            Ok(Flow::Stop)
        });
        webhook_router(router, "callback")
    }

    fn request(body: &str, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/callback");
        if let Some(signature) = signature {
            builder = builder.header("X-Line-Signature", signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_request_dispatches() {
        let platform = Arc::new(MockPlatform::new().with_signature("good"));
        let response = app(platform.clone())
            .oneshot(request(BODY, Some("good")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            platform.replies(),
            vec![("r1".to_string(), vec![Message::text("ping pong")])]
        );
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected() {
        let platform = Arc::new(MockPlatform::new().with_signature("good"));
        let response = app(platform.clone())
            .oneshot(request(BODY, Some("bad")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(platform.replies().is_empty());
    }

    #[tokio::test]
    async fn test_missing_signature_is_rejected() {
        let platform = Arc::new(MockPlatform::new());
        let response = app(platform).oneshot(request(BODY, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_server_error() {
        let platform = Arc::new(MockPlatform::new());
        let response = app(platform)
            .oneshot(request("{not json", Some("any")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_other_paths_are_not_routed() {
        let platform = Arc::new(MockPlatform::new());
        let response = app(platform)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/elsewhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_stops_on_cancel() {
        let platform = Arc::new(MockPlatform::new());
        let server = WebhookServer::bind("127.0.0.1:0", "/callback", Router::new(platform))
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        server.run(shutdown).await.unwrap();
    }
}
