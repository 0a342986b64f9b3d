//! REST proxy transport tests.
//!
//! Starts an axum stub of the proxy's produce endpoint and publishes
//! through [`RestProxyBroker`].

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use stride_events::broker::{BrokerClient, RestProxyBroker};
use stride_events::{
    BrokerError, EventHeader, EventPublisher, PublishFailure, PublisherSettings, TeamEvent,
    TeamMemberAdded,
};

#[derive(Debug, Clone)]
struct Produced {
    topic: String,
    content_type: String,
    body: Value,
}

type Captured = Arc<Mutex<Vec<Produced>>>;

async fn produce(
    State(captured): State<Captured>,
    Path(topic): Path<String>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    captured.lock().unwrap().push(Produced {
        topic: topic.clone(),
        content_type,
        body,
    });

    match topic.as_str() {
        "unauthorized" => (StatusCode::UNAUTHORIZED, Json(json!({ "error_code": 40101 }))),
        "forbidden" => (StatusCode::FORBIDDEN, Json(json!({ "error_code": 40301 }))),
        "missing" => (StatusCode::NOT_FOUND, Json(json!({ "error_code": 40401, "message": "Topic not found" }))),
        "too-large" => (
            StatusCode::OK,
            Json(json!({
                "offsets": [{ "partition": null, "offset": null, "error_code": 10, "error": "record too large" }]
            })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({
                "offsets": [{ "partition": 2, "offset": 41, "error_code": null, "error": null }]
            })),
        ),
    }
}

/// Bind to port 0 and return the base URL plus the captured requests.
async fn start_proxy() -> (String, Captured) {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route("/topics/:topic", post(produce))
        .with_state(captured.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), captured)
}

fn broker(base: &str) -> RestProxyBroker {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    RestProxyBroker::with_client(client, base)
}

fn member_added() -> TeamEvent {
    TeamMemberAdded {
        header: EventHeader::new("req-9").unwrap(),
        team_id: "team1".into(),
        user_id: "u7".into(),
        role: "maintainer".into(),
        added_by: "u1".into(),
    }
    .into()
}

#[tokio::test]
async fn send_posts_binary_records_and_reads_offsets() {
    let (base, captured) = start_proxy().await;

    let receipt = broker(&base)
        .send("orders", "order-1", br#"{"id":1}"#.to_vec())
        .await
        .unwrap();

    assert_eq!((receipt.partition, receipt.offset), (2, 41));

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].topic, "orders");
    assert_eq!(requests[0].content_type, "application/vnd.kafka.binary.v2+json");

    let record = &requests[0].body["records"][0];
    let key = STANDARD.decode(record["key"].as_str().unwrap()).unwrap();
    let value = STANDARD.decode(record["value"].as_str().unwrap()).unwrap();
    assert_eq!(key, b"order-1");
    assert_eq!(value, br#"{"id":1}"#);
}

#[tokio::test]
async fn auth_failures_map_to_unauthorized() {
    let (base, _) = start_proxy().await;
    let broker = broker(&base);

    for topic in ["unauthorized", "forbidden"] {
        let err = broker.send(topic, "k", b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(err, BrokerError::Unauthorized(_)), "{topic}: {err:?}");
    }
}

#[tokio::test]
async fn other_statuses_map_to_rejected() {
    let (base, _) = start_proxy().await;

    let err = broker(&base).send("missing", "k", b"{}".to_vec()).await.unwrap_err();
    match err {
        BrokerError::Rejected(msg) => assert!(msg.contains("404"), "{msg}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn record_level_error_is_rejected() {
    let (base, _) = start_proxy().await;

    let err = broker(&base).send("too-large", "k", b"{}".to_vec()).await.unwrap_err();
    match err {
        BrokerError::Rejected(msg) => assert!(msg.contains("record too large"), "{msg}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn publisher_ships_the_event_json_through_the_proxy() {
    let (base, captured) = start_proxy().await;
    let publisher = EventPublisher::from_current(broker(&base), &PublisherSettings::default()).unwrap();
    let event = member_added();

    let receipt = publisher.publish(&event).await.unwrap();

    assert_eq!(receipt.topic, "stride.local.team-events");
    assert_eq!(receipt.offset, 41);

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests[0].topic, "stride.local.team-events");

    let record = &requests[0].body["records"][0];
    let key = STANDARD.decode(record["key"].as_str().unwrap()).unwrap();
    assert_eq!(String::from_utf8(key).unwrap(), receipt.key);

    let value = STANDARD.decode(record["value"].as_str().unwrap()).unwrap();
    let payload: Value = serde_json::from_slice(&value).unwrap();
    assert_eq!(payload["eventType"], "TEAM_MEMBER_ADDED");
    assert_eq!(payload["correlationId"], "req-9");
    assert_eq!(payload["userId"], "u7");
    assert_eq!(payload["role"], "maintainer");
}

#[tokio::test]
async fn proxy_rejection_reaches_the_caller_wrapped() {
    let (base, _) = start_proxy().await;
    let publisher = EventPublisher::from_current(broker(&base), &PublisherSettings::default()).unwrap();

    let err = publisher
        .publish_to("forbidden", &member_added())
        .await
        .unwrap_err();

    assert_eq!(err.topic(), "forbidden");
    assert_eq!(err.event_type(), "TeamMemberAddedEvent");
    assert!(matches!(err.cause(), PublishFailure::Broker(BrokerError::Unauthorized(_))));
}
