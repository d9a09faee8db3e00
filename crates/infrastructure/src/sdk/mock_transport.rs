use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain::error::SdkError;
use domain::protocol::ApiRequest;
use domain::transport::{ConnectionState, SdkTransport, TransportEvent};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::lock;

/// Produces the reply for a request, or `None` to stay silent
pub type Responder = Box<dyn Fn(&ApiRequest) -> Option<Value> + Send + Sync>;

/// A request the mock received, with the (virtual) instant it was sent
#[derive(Debug, Clone)]
pub struct SentFrame {
    pub request: ApiRequest,
    pub at: Instant,
}

/// In-memory stand-in for the print service.
///
/// Every request is recorded, then answered through the responder. By default
/// each call succeeds with `errorCode: 0`.
pub struct MockTransport {
    connected: AtomicBool,
    sent: Arc<Mutex<Vec<SentFrame>>>,
    responder: Mutex<Responder>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl MockTransport {
    /// A transport that starts out connected
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<TransportEvent>) {
        Self::build(true)
    }

    pub fn disconnected() -> (Arc<Self>, mpsc::UnboundedReceiver<TransportEvent>) {
        Self::build(false)
    }

    fn build(connected: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, inbound) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            connected: AtomicBool::new(connected),
            sent: Arc::new(Mutex::new(Vec::new())),
            responder: Mutex::new(Box::new(|req: &ApiRequest| Some(Self::ok_reply(&req.api_name)))),
            events,
        });
        (transport, inbound)
    }

    pub fn ok_reply(api_name: &str) -> Value {
        json!({"apiName": api_name, "resultAck": {"errorCode": 0}})
    }

    pub fn error_reply(api_name: &str, code: i64, info: &str) -> Value {
        json!({"apiName": api_name, "resultAck": {"errorCode": code, "info": info}})
    }

    pub fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&ApiRequest) -> Option<Value> + Send + Sync + 'static,
    {
        *lock(&self.responder) = Box::new(responder);
    }

    /// Deliver an unsolicited frame
    pub fn push_frame(&self, frame: Value) {
        self.push_raw(&frame.to_string());
    }

    pub fn push_raw(&self, raw: &str) {
        let _ = self.events.send(TransportEvent::Frame(raw.to_string()));
    }

    /// Simulate the print service going away
    pub fn drop_connection(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            let _ = self.events.send(TransportEvent::Closed);
        }
    }

    pub fn restore_connection(&self) {
        if !self.connected.swap(true, Ordering::SeqCst) {
            let _ = self.events.send(TransportEvent::Opened);
        }
    }

    pub fn sent(&self) -> Vec<SentFrame> {
        lock(&self.sent).clone()
    }

    pub fn sent_api_names(&self) -> Vec<String> {
        lock(&self.sent)
            .iter()
            .map(|frame| frame.request.api_name.clone())
            .collect()
    }

    /// Parameters of every request sent under `api_name`, in order
    pub fn sent_parameters(&self, api_name: &str) -> Vec<Value> {
        lock(&self.sent)
            .iter()
            .filter(|frame| frame.request.api_name == api_name)
            .map(|frame| frame.request.parameter.clone().unwrap_or(Value::Null))
            .collect()
    }

    pub fn clear_sent(&self) {
        lock(&self.sent).clear();
    }
}

#[async_trait]
impl SdkTransport for MockTransport {
    async fn connect(&self) -> Result<(), SdkError> {
        self.restore_connection();
        Ok(())
    }

    async fn disconnect(&self) {
        self.drop_connection();
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn connection_state(&self) -> ConnectionState {
        if self.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    fn send(&self, frame: String) -> Result<(), SdkError> {
        if !self.is_connected() {
            return Err(SdkError::NotConnected);
        }
        let request: ApiRequest =
            serde_json::from_str(&frame).map_err(|e| SdkError::Protocol(e.to_string()))?;

        lock(&self.sent).push(SentFrame {
            request: request.clone(),
            at: Instant::now(),
        });

        let reply = {
            let responder = lock(&self.responder);
            (**responder)(&request)
        };
        if let Some(reply) = reply {
            let _ = self.events.send(TransportEvent::Frame(reply.to_string()));
        }
        Ok(())
    }
}
