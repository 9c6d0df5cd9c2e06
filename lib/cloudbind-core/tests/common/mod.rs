#![allow(dead_code, missing_docs, clippy::expect_used)]

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::extract::{Multipart, Path, Query};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rstest::fixture;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use cloudbind_core::{Authentication, ServiceClient, ServiceClientBuilder};

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A local service answering like a small translation and discovery API.
#[derive(Debug)]
pub struct TestApp {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        info!(%addr, "launching server");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router())
                .await
                .expect("server running");
        });

        Ok(Self { addr, handle })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/instances/42", self.addr)
    }

    pub fn builder(&self) -> ServiceClientBuilder {
        ServiceClient::builder()
            .with_base_url(self.base_url())
            .with_authentication(Authentication::api_key("secret-key"))
            .with_version("2018-05-01")
    }

    pub fn client(&self) -> ServiceClient {
        self.builder().build().expect("valid client")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[fixture]
pub async fn app() -> TestApp {
    init_tracing();
    match TestApp::start().await {
        Ok(app) => app,
        Err(error) => {
            panic!("fail to start test app: {error:?}");
        }
    }
}

fn router() -> Router {
    Router::new()
        .route("/instances/42/v3/translate", post(echo))
        .route("/instances/42/v3/models/{model_id}", get(get_model))
        .route("/instances/42/v1/documents", post(upload))
        .route("/instances/42/v1/synthesize", get(synthesize))
}

async fn echo(
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "query": query,
        "authorization": header(AUTHORIZATION.as_str()),
        "content_type": header(CONTENT_TYPE.as_str()),
        "user_agent": header("user-agent"),
        "opt_out": header("x-watson-learning-opt-out"),
        "body": body,
    }))
}

async fn get_model(Path(model_id): Path<String>) -> impl IntoResponse {
    if model_id == "unknown" {
        let error = json!({"code": 404, "error": "Model not found"});
        return (StatusCode::NOT_FOUND, Json(error));
    }
    (StatusCode::OK, Json(json!({"model_id": model_id})))
}

async fn upload(mut multipart: Multipart) -> Result<Json<Value>, (StatusCode, String)> {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let text = field
            .text()
            .await
            .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
        parts.push(json!({
            "name": name,
            "filename": filename,
            "content_type": content_type,
            "text": text,
        }));
    }
    Ok(Json(Value::Array(parts)))
}

async fn synthesize(Query(query): Query<BTreeMap<String, String>>) -> impl IntoResponse {
    let text = query.get("text").cloned().unwrap_or_default();
    ([(CONTENT_TYPE, "audio/basic")], format!("audio:{text}"))
}
