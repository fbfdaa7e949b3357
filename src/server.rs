//! HTTP surface: liveness, manual triggers and metrics.
//!
//! | Method | Path       | Response                                          |
//! |--------|------------|---------------------------------------------------|
//! | GET    | `/`        | `{"message": "Daily English bot is running"}`     |
//! | GET    | `/health`  | `{"status": "ok"}`                                |
//! | GET    | `/metrics` | Prometheus text format                            |
//! | POST   | `/word`    | `{"status": "Words sent manually"}`               |
//! | POST   | `/rule`    | `{"status": "Rule sent manually"}`                |
//! | POST   | `/idioms`  | `{"status": "Idioms sent manually"}`              |
//!
//! Manual triggers wait for the whole pipeline and always answer with the
//! fixed status; the delivery outcome is only visible in logs and metrics.
//! The pipeline runs in its own task, so a client that disconnects early
//! drops only the response.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::content::ContentType;
use crate::dispatcher::{Dispatcher, Messenger, Trigger};
use crate::generator::{ImageModel, LanguageModel};
use crate::metrics;
use crate::Result;

pub const RUNNING_MESSAGE: &str = "Daily English bot is running";

fn json_response(status: StatusCode, body: Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn metrics_response() -> Response<Full<Bytes>> {
    match metrics::render() {
        Ok((content_type, buffer)) => {
            let mut response = Response::new(Full::from(buffer));
            let header = HeaderValue::from_str(&content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("text/plain"));
            response.headers_mut().insert(CONTENT_TYPE, header);
            response
        }
        Err(err) => {
            error!("{}", err);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "metrics encode error" }),
            )
        }
    }
}

/// Path of the manual trigger for a content type.
pub fn trigger_path(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Words => "/word",
        ContentType::Rules => "/rule",
        ContentType::Idioms => "/idioms",
    }
}

fn trigger_for(path: &str) -> Option<ContentType> {
    ContentType::ALL
        .into_iter()
        .find(|content_type| trigger_path(*content_type) == path)
}

/// Route one request. The request body is never read.
pub async fn route<B, L, I, M>(
    req: Request<B>,
    dispatcher: &Arc<Dispatcher<L, I, M>>,
) -> Response<Full<Bytes>>
where
    L: LanguageModel + 'static,
    I: ImageModel + 'static,
    M: Messenger + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    drop(req);

    match (&method, path.as_str()) {
        (&Method::GET, "/") => json_response(StatusCode::OK, json!({ "message": RUNNING_MESSAGE })),
        (&Method::GET, "/health") => json_response(StatusCode::OK, json!({ "status": "ok" })),
        (&Method::GET, "/metrics") => metrics_response(),
        _ => match trigger_for(&path) {
            Some(content_type) if method == Method::POST => {
                info!(content_type = %content_type, "Manual trigger received");
                let dispatcher = Arc::clone(dispatcher);
                let pipeline = tokio::spawn(async move {
                    dispatcher.dispatch(content_type, Trigger::Manual).await
                });
                if let Err(err) = pipeline.await {
                    error!(content_type = %content_type, "Manual delivery task failed: {}", err);
                }
                json_response(
                    StatusCode::OK,
                    json!({ "status": content_type.manual_ack() }),
                )
            }
            Some(_) => json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "method not allowed" }),
            ),
            None if path == "/" || path == "/health" || path == "/metrics" => json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "method not allowed" }),
            ),
            None => json_response(StatusCode::NOT_FOUND, json!({ "error": "not found" })),
        },
    }
}

/// Accept connections until `shutdown` resolves. Each connection runs in its own task.
pub async fn serve<L, I, M, S>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<L, I, M>>,
    shutdown: S,
) -> Result<()>
where
    L: LanguageModel + 'static,
    I: ImageModel + 'static,
    M: Messenger + 'static,
    S: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP server started");

    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => {
                info!("HTTP server shutting down");
                return Ok(());
            }
        };

        let dispatcher = Arc::clone(&dispatcher);
        let service = service_fn(move |req: Request<Incoming>| {
            let dispatcher = Arc::clone(&dispatcher);
            async move { Ok::<_, Infallible>(route(req, &dispatcher).await) }
        });
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "HTTP connection error: {}", err);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeImageModel, FakeLanguageModel, RecordingMessenger};
    use http_body_util::{BodyExt, Empty};

    type TestDispatcher = Dispatcher<FakeLanguageModel, FakeImageModel, RecordingMessenger>;

    fn working() -> Arc<TestDispatcher> {
        Arc::new(Dispatcher::new(
            FakeLanguageModel::replying("Word: *ubiquitous* — existing everywhere. 🌍"),
            FakeImageModel::failing(),
            RecordingMessenger::default(),
        ))
    }

    fn request(method: Method, path: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Empty::new())
            .unwrap()
    }

    async fn body_json(response: Response<Full<Bytes>>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_reports_running_without_side_effects() {
        let dispatcher = working();
        let response = route(request(Method::GET, "/"), &dispatcher).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Daily English bot is running" })
        );
        assert_eq!(dispatcher.messenger().attempts(), 0);
    }

    #[tokio::test]
    async fn manual_triggers_run_pipeline_and_acknowledge() {
        for content_type in ContentType::ALL {
            let dispatcher = working();
            let response = route(
                request(Method::POST, trigger_path(content_type)),
                &dispatcher,
            )
            .await;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                body_json(response).await,
                json!({ "status": content_type.manual_ack() })
            );
            assert_eq!(dispatcher.messenger().texts().len(), 1);
        }
    }

    #[tokio::test]
    async fn manual_trigger_acknowledges_even_when_generation_fails() {
        let dispatcher = Arc::new(Dispatcher::new(
            FakeLanguageModel::failing(),
            FakeImageModel::failing(),
            RecordingMessenger::default(),
        ));
        let response = route(request(Method::POST, "/idioms"), &dispatcher).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "status": "Idioms sent manually" })
        );
        assert_eq!(dispatcher.messenger().attempts(), 0);
    }

    #[tokio::test]
    async fn wrong_method_is_rejected_without_dispatch() {
        let dispatcher = working();
        let response = route(request(Method::GET, "/word"), &dispatcher).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = route(request(Method::POST, "/"), &dispatcher).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        assert_eq!(dispatcher.messenger().attempts(), 0);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let dispatcher = working();
        let response = route(request(Method::POST, "/poems"), &dispatcher).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_and_metrics_endpoints() {
        let dispatcher = working();

        let response = route(request(Method::GET, "/health"), &dispatcher).await;
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));

        route(request(Method::POST, "/word"), &dispatcher).await;
        let response = route(request(Method::GET, "/metrics"), &dispatcher).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("daily_english_delivery_total"));
        assert!(text.contains("trigger=\"manual\""));
    }
}
