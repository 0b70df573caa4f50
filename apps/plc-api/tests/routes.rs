use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use bytes::Bytes;
use domain::AddressRegion;
use http_body_util::BodyExt;
use plc_api::{AppState, create_router};
use plc_polling::DataPointService;
use plc_protocol::{GateConfig, MemoryDevice, MemoryTransport, TransportGate};
use plc_storage::{InMemoryCacheStore, InMemoryRegistryStore};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(device: &MemoryDevice) -> Router {
    let gate = Arc::new(TransportGate::new(
        Box::new(MemoryTransport::new(device.clone())),
        GateConfig::default(),
    ));
    let service = DataPointService::new(
        Arc::new(InMemoryRegistryStore::new()),
        Arc::new(InMemoryCacheStore::new()),
        gate,
        100,
    );
    create_router(AppState::new(Arc::new(service)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes: Bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn temp_point() -> Value {
    json!({
        "key": "temp",
        "region": "D",
        "address": 100,
        "length": 2,
        "valueKind": "numberArray",
        "pollIntervalMs": 500,
        "description": "boiler temperature"
    })
}

#[tokio::test]
async fn health_reports_ok_with_trace_headers() {
    let app = app_with(&MemoryDevice::new());
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-trace-id"));
}

#[tokio::test]
async fn register_list_and_get() {
    let app = app_with(&MemoryDevice::new());
    let (status, body) = send(&app, Method::POST, "/data-points", Some(temp_point())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["valueKind"], "numberArray");

    let (status, body) = send(&app, Method::GET, "/data-points", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, Method::GET, "/data-points/temp", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["address"], 100);
    assert_eq!(body["data"]["description"], "boiler temperature");
}

#[tokio::test]
async fn invalid_registrations_are_bad_requests() {
    let app = app_with(&MemoryDevice::new());
    send(&app, Method::POST, "/data-points", Some(temp_point())).await;

    let (status, body) = send(&app, Method::POST, "/data-points", Some(temp_point())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID.REQUEST");

    let mut fast = temp_point();
    fast["key"] = json!("fast");
    fast["pollIntervalMs"] = json!(50);
    let (status, _) = send(&app, Method::POST, "/data-points", Some(fast)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown_region = temp_point();
    unknown_region["key"] = json!("other");
    unknown_region["region"] = json!("Q");
    let (status, _) = send(&app, Method::POST, "/data-points", Some(unknown_region)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_key_is_not_found() {
    let app = app_with(&MemoryDevice::new());
    for (method, uri) in [
        (Method::GET, "/data-points/ghost"),
        (Method::DELETE, "/data-points/ghost"),
        (Method::GET, "/data-points/ghost/value"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");
    }
}

#[tokio::test]
async fn write_then_read_value() {
    let device = MemoryDevice::new();
    let app = app_with(&device);
    send(&app, Method::POST, "/data-points", Some(temp_point())).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/data-points/temp/value",
        Some(json!({ "value": [215, 7] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], json!([215, 7]));
    assert_eq!(device.words(AddressRegion::D, 100, 2), vec![215, 7]);

    let (status, body) = send(&app, Method::GET, "/data-points/temp/value", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], json!([215, 7]));
    assert_eq!(body["data"]["error"], Value::Null);
}

#[tokio::test]
async fn kind_mismatch_and_transport_failure_map_to_distinct_codes() {
    let device = MemoryDevice::new();
    let app = app_with(&device);
    send(&app, Method::POST, "/data-points", Some(temp_point())).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/data-points/temp/value",
        Some(json!({ "value": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID.REQUEST");

    device.fail_next(1);
    let (status, body) = send(
        &app,
        Method::PUT,
        "/data-points/temp/value",
        Some(json!({ "value": [1, 2] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "DEVICE.TRANSPORT");

    // 失败的写入不产生缓存行
    let (status, _) = send(&app, Method::GET, "/data-points/temp/value", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tags_write_and_project() {
    let device = MemoryDevice::new();
    let app = app_with(&device);
    let mut block = temp_point();
    block["key"] = json!("block");
    block["address"] = json!(0);
    block["length"] = json!(4);
    send(&app, Method::POST, "/data-points", Some(block)).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/data-points/block/tags",
        Some(json!({ "tag": { "name": "total", "offset": 1, "kind": "int32" }, "value": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], json!([0, 65535, 65535, 0]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/data-points/block/tags",
        Some(json!({ "tags": [
            { "name": "total", "offset": 1, "kind": "int32" },
            { "name": "beyond", "offset": 3, "kind": "real32" }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["status"], "ok");
    assert_eq!(body["data"][0]["value"], -1);
    assert_eq!(body["data"][1]["status"], "notAvailable");
    assert_eq!(body["data"][1]["value"], Value::Null);
}

#[tokio::test]
async fn polling_lifecycle() {
    let app = app_with(&MemoryDevice::new());
    send(&app, Method::POST, "/data-points", Some(temp_point())).await;

    let (status, body) = send(&app, Method::GET, "/polling/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["running"], false);

    let (status, body) = send(&app, Method::POST, "/polling/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["running"], true);
    assert_eq!(body["data"]["activeTimers"], 1);

    let (status, body) = send(&app, Method::POST, "/polling/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["running"], false);
    assert_eq!(body["data"]["readCount"], 0);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let app = app_with(&MemoryDevice::new());
    send(&app, Method::POST, "/data-points", Some(temp_point())).await;

    let (status, _) = send(&app, Method::PUT, "/data-points/temp", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/data-points/temp",
        Some(json!({ "pollIntervalMs": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pollIntervalMs"], 1000);
}
