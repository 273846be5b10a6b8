use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use watcher_core::{ElasticConfig, RecordSink, WatcherError};
use watcher_infrastructure::{build_sink, ElasticSink};

#[derive(Clone, Default)]
struct Captured {
    documents: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn index_document(
    State(captured): State<Captured>,
    Path(index): Path<String>,
    headers: HeaderMap,
    Json(document): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    captured.documents.lock().await.push((index, auth, document));
    (StatusCode::CREATED, Json(json!({"result": "created"})))
}

async fn serve(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn test_elastic_sink_posts_to_lowercase_index() -> Result<()> {
    let captured = Captured::default();
    let router = Router::new()
        .route("/{index}/_doc", post(index_document))
        .with_state(captured.clone());
    let base = serve(router).await?;

    let sink = ElasticSink::new(&ElasticConfig {
        addresses: vec![format!("{base}/")],
        username: "elastic".to_string(),
        password: "secret".to_string(),
        timeout_seconds: 5,
    });

    sink.log("Stock", json!({"Expire1Day": 3})).await?;

    let documents = captured.documents.lock().await;
    assert_eq!(documents.len(), 1);
    let (index, auth, document) = &documents[0];
    assert_eq!(index, "stock");
    assert!(auth.as_deref().is_some_and(|v| v.starts_with("Basic ")));
    assert_eq!(document["Expire1Day"], 3);
    Ok(())
}

#[tokio::test]
async fn test_elastic_sink_falls_back_to_next_address() -> Result<()> {
    let captured = Captured::default();
    let router = Router::new()
        .route("/{index}/_doc", post(index_document))
        .with_state(captured.clone());
    let base = serve(router).await?;

    // 第一个地址没有服务监听
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let dead = format!("http://{}", unused.local_addr()?);
    drop(unused);

    let sink = ElasticSink::new(&ElasticConfig {
        addresses: vec![dead, base],
        timeout_seconds: 5,
        ..Default::default()
    });

    sink.log("logs", json!({"Level": "error"})).await?;
    let documents = captured.documents.lock().await;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].1, None);
    Ok(())
}

#[tokio::test]
async fn test_elastic_sink_rejected_document() -> Result<()> {
    let router = Router::new().route(
        "/{index}/_doc",
        post(|| async { (StatusCode::BAD_REQUEST, "mapper_parsing_exception") }),
    );
    let base = serve(router).await?;

    let sink = ElasticSink::new(&ElasticConfig {
        addresses: vec![base],
        timeout_seconds: 5,
        ..Default::default()
    });

    let result = sink.log("stock", json!({})).await;
    match result {
        Err(WatcherError::Upstream(message)) => {
            assert!(message.contains("status=400"));
            assert!(message.contains("mapper_parsing_exception"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_build_sink_without_addresses_uses_tracing() -> Result<()> {
    let sink = build_sink(&ElasticConfig::default());
    sink.log("stock", json!({"Expire1Day": 1})).await?;
    Ok(())
}
