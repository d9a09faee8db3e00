use std::sync::Arc;

use application::{PrinterService, PrinterSettings};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use bridge_server::{api, setup_app_state};
use domain::settings::SdkTimings;
use infrastructure::{BridgeConfig, CallCorrelator, MockTransport};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(config: BridgeConfig) -> (Arc<MockTransport>, Router) {
    let (transport, inbound) = MockTransport::new();
    let correlator = Arc::new(CallCorrelator::new(transport.clone(), inbound));
    let settings = PrinterSettings {
        timings: SdkTimings::immediate(),
        ..PrinterSettings::from(&config)
    };
    let service = PrinterService::new(correlator, settings);
    (transport, api::create_router(setup_app_state(service, config)))
}

fn app() -> (Arc<MockTransport>, Router) {
    app_with(BridgeConfig::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn print_body(copies: u32) -> Value {
    json!({
        "printer": {"name": "B21-C2B1", "port": 1},
        "label": {"width": 40, "height": 30, "labelType": "GAP_PAPER"},
        "content": [
            {"type": "text", "x": 2, "y": 2, "width": 36, "height": 6, "value": "SKU-0042", "fontSize": 4},
            {"type": "border", "x": 0, "y": 0, "width": 40, "height": 30}
        ],
        "copies": copies
    })
}

#[tokio::test]
async fn test_health() {
    let (_transport, app) = app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["wsConnected"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_print_label_success() {
    let (transport, app) = app();

    let response = app
        .oneshot(post_json("/print-label", print_body(1)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["printer"], "B21-C2B1");
    assert_eq!(body["copies"], 1);
    assert_eq!(body["printedLabels"], 1);
    assert_eq!(body["cancelled"], false);
    assert!(body["jobId"].is_string());

    // placeholder job: device count is one more than requested
    assert_eq!(transport.sent_parameters("startJob")[0]["count"], 2);
    assert_eq!(transport.sent_parameters("DrawLableLine").len(), 4);
    assert!(transport.sent_parameters("DrawLableGraph").is_empty());
}

#[tokio::test]
async fn test_print_label_rejects_malformed_body() {
    let (transport, app) = app();

    let response = app
        .oneshot(post_json("/print-label", json!({"content": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["kind"], "invalid_request");
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_print_label_rejects_unknown_element_type() {
    let (_transport, app) = app();
    let mut body = print_body(2);
    body["content"] = json!([{"type": "hologram", "x": 0, "y": 0, "width": 1, "height": 1}]);

    let response = app.oneshot(post_json("/print-label", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_print_label_zero_copies_is_invalid() {
    let (transport, app) = app();

    let response = app
        .oneshot(post_json("/print-label", print_body(0)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_print_label_copy_overflow_is_invalid() {
    let (transport, app) = app();
    let mut body = print_body(u32::MAX);
    body["pages"] = json!([{"width": 40, "height": 30, "copies": 1}]);

    let response = app.oneshot(post_json("/print-label", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "invalid_request");
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_print_label_when_disconnected() {
    let (transport, app) = app();
    transport.drop_connection();

    let response = app
        .oneshot(post_json("/print-label", print_body(2)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["kind"], "transport");
    assert!(body["jobId"].is_string());
}

#[tokio::test]
async fn test_print_label_device_error_is_500() {
    let (transport, app) = app();
    transport.set_responder(|req| {
        if req.api_name == "commitJob" {
            return Some(MockTransport::error_reply("commitJob", 7, "cover open"));
        }
        Some(MockTransport::ok_reply(&req.api_name))
    });

    let response = app
        .oneshot(post_json("/print-label", print_body(2)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Print failed");
    assert_eq!(body["message"], "cover open");
    assert_eq!(body["code"], 7);
    assert_eq!(body["kind"], "protocol");
    assert_eq!(
        transport.sent_api_names().last().map(String::as_str),
        Some("endJob")
    );
}

#[tokio::test]
async fn test_scan_returns_printers() {
    let (transport, app) = app();
    transport.set_responder(|req| {
        if req.api_name == "getAllPrinters" {
            return Some(json!({
                "apiName": "getAllPrinters",
                "resultAck": {"errorCode": 0, "info": "{\"B21-C2B1\":1}"}
            }));
        }
        Some(MockTransport::ok_reply(&req.api_name))
    });

    let response = app.oneshot(get("/printer/scan")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["printers"][0]["printerName"], "B21-C2B1");
    assert_eq!(body["printers"][0]["port"], 1);
    assert_eq!(transport.sent_api_names(), vec!["initSdk", "getAllPrinters"]);
}

#[tokio::test]
async fn test_scan_no_device_is_empty_list() {
    let (transport, app) = app();
    transport.set_responder(|req| {
        if req.api_name == "getAllPrinters" {
            return Some(MockTransport::error_reply("getAllPrinters", 23, "no device"));
        }
        Some(MockTransport::ok_reply(&req.api_name))
    });

    let response = app.oneshot(get("/printer/scan?kind=usb")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"printers": []}));
}

#[tokio::test]
async fn test_scan_when_disconnected() {
    let (transport, app) = app();
    transport.drop_connection();

    let response = app.oneshot(get("/printer/scan")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_status_and_cancel_without_job() {
    let (_transport, app) = app();

    let response = app.clone().oneshot(get("/printer/status")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["wsConnected"], true);
    assert_eq!(body["connectionState"], "Connected");
    assert_eq!(body["jobActive"], false);

    let response = app
        .oneshot(post_json("/print-label/cancel", json!({})))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"cancelled": false}));
}

#[tokio::test]
async fn test_api_key_required_except_health() {
    let mut config = BridgeConfig::default();
    config.server.api_key = Some("s3cret".to_string());
    let (_transport, app) = app_with(config);

    let response = app.clone().oneshot(get("/printer/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/printer/status")
        .header("x-api-key", "s3cret")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ip_allow_list() {
    let mut config = BridgeConfig::default();
    config.server.allowed_ips = vec!["192.168.1.0/24".to_string(), "10.0.0.5".to_string()];
    let (_transport, app) = app_with(config);

    let from = |ip: &str| {
        Request::builder()
            .uri("/printer/status")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(from("192.168.1.77")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(from("10.0.0.5, 172.16.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(from("172.16.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "IP 172.16.0.1 not allowed"
    );

    // no forwarded header and no socket info
    let response = app.oneshot(get("/printer/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
