use std::sync::Arc;
use std::time::Duration;

use domain::error::SdkError;
use domain::transport::SdkTransport;
use futures::{SinkExt, StreamExt};
use infrastructure::sdk::{CallCorrelator, WebSocketTransport};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Accept one socket and answer every request with `{errorCode: 0, info: <apiName>}`
async fn serve_one(listener: &TcpListener, close_after: Option<usize>) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    let mut answered = 0;

    while let Some(Ok(msg)) = ws.next().await {
        if let Message::Text(text) = msg {
            let req: Value = serde_json::from_str(text.as_str()).unwrap();
            let api_name = req["apiName"].as_str().unwrap_or_default().to_string();
            let reply = json!({
                "apiName": api_name,
                "resultAck": {"errorCode": 0, "info": api_name}
            });
            ws.send(Message::Text(reply.to_string().into())).await.unwrap();
            answered += 1;
            if close_after == Some(answered) {
                let _ = ws.close(None).await;
                return;
            }
        }
    }
}

async fn wait_until<F: Fn() -> bool>(check: F) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_round_trip_through_real_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { serve_one(&listener, None).await });

    let (transport, inbound) = WebSocketTransport::new(url, Duration::from_millis(50));
    let correlator = CallCorrelator::new(transport.clone(), inbound);

    transport.connect().await.unwrap();
    wait_until(|| transport.is_connected()).await;

    let reply = correlator
        .invoke("initSdk", Some(json!({"fontDir": ""})), Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(reply.info_str(), Some("initSdk"));

    transport.disconnect().await;
    assert!(!transport.is_connected());
    assert_eq!(
        transport.send("{}".to_string()),
        Err(SdkError::NotConnected)
    );
}

#[tokio::test]
async fn test_reconnects_after_server_closes() {
    let listener = Arc::new(TcpListener::bind("127.0.0.1:0").await.unwrap());
    let url = format!("ws://{}", listener.local_addr().unwrap());
    {
        let listener = listener.clone();
        tokio::spawn(async move {
            serve_one(&listener, Some(1)).await;
            serve_one(&listener, None).await;
        });
    }

    let (transport, inbound) = WebSocketTransport::new(url, Duration::from_millis(50));
    let correlator = CallCorrelator::new(transport.clone(), inbound);
    let mut events = correlator.subscribe_events();

    transport.connect().await.unwrap();
    wait_until(|| transport.is_connected()).await;
    correlator
        .invoke("getAllPrinters", None, Duration::from_secs(2))
        .await
        .unwrap();

    // server hangs up after the first reply; the supervisor reconnects on its own
    let mut seen = Vec::new();
    while seen.len() < 3 {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        seen.push(event.event_type().to_string());
    }
    assert_eq!(
        seen,
        vec!["ServiceConnected", "ServiceDisconnected", "ServiceConnected"]
    );

    wait_until(|| transport.is_connected()).await;
    let reply = correlator
        .invoke("startJob", None, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(reply.info_str(), Some("startJob"));

    transport.disconnect().await;
}

#[tokio::test]
async fn test_connect_is_idempotent_while_running() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { serve_one(&listener, None).await });

    let (transport, _inbound) = WebSocketTransport::new(url, Duration::from_millis(50));
    transport.connect().await.unwrap();
    transport.connect().await.unwrap();
    wait_until(|| transport.is_connected()).await;
    transport.disconnect().await;
}

#[tokio::test]
async fn test_reconnect_right_after_disconnect_keeps_new_session() {
    let listener = Arc::new(TcpListener::bind("127.0.0.1:0").await.unwrap());
    let url = format!("ws://{}", listener.local_addr().unwrap());
    {
        let listener = listener.clone();
        tokio::spawn(async move {
            serve_one(&listener, None).await;
        });
    }
    {
        let listener = listener.clone();
        tokio::spawn(async move {
            // give the first accept a head start
            tokio::time::sleep(Duration::from_millis(20)).await;
            serve_one(&listener, None).await;
        });
    }

    let (transport, inbound) = WebSocketTransport::new(url, Duration::from_millis(50));
    let correlator = CallCorrelator::new(transport.clone(), inbound);

    transport.connect().await.unwrap();
    wait_until(|| transport.is_connected()).await;

    transport.disconnect().await;
    transport.connect().await.unwrap();
    wait_until(|| transport.is_connected()).await;

    // let the first session finish tearing down
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(transport.is_connected());

    let reply = correlator
        .invoke("initSdk", None, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(reply.info_str(), Some("initSdk"));

    transport.disconnect().await;
}
