use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use domain::error::SdkError;
use domain::event::DeviceEvent;
use domain::protocol::{ApiRequest, ApiResponse};
use domain::transport::{ConnectionState, SdkTransport, TransportEvent};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{lock, preview};

type Reply = Result<ApiResponse, SdkError>;

struct PendingCall {
    call_id: u64,
    tx: oneshot::Sender<Reply>,
}

type PendingMap = Mutex<HashMap<String, PendingCall>>;

/// Matches replies to calls by `apiName`, the only key the protocol offers.
///
/// At most one call per API name may be pending. An entry is removed exactly
/// once, under the map lock, by whichever of reply, timeout, connection loss
/// or caller drop gets there first.
pub struct CallCorrelator {
    transport: Arc<dyn SdkTransport>,
    pending: Arc<PendingMap>,
    next_call_id: AtomicU64,
    events: broadcast::Sender<DeviceEvent>,
}

impl CallCorrelator {
    /// Start dispatching `inbound` events from `transport`
    pub fn new(
        transport: Arc<dyn SdkTransport>,
        inbound: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        let pending: Arc<PendingMap> = Arc::new(Mutex::new(HashMap::new()));
        let (events, _) = broadcast::channel(64);

        tokio::spawn(dispatch(inbound, pending.clone(), events.clone()));

        Self {
            transport,
            pending,
            next_call_id: AtomicU64::new(1),
            events,
        }
    }

    /// Send one request and wait for the reply with the same `apiName`
    pub async fn invoke(
        &self,
        api_name: &str,
        parameter: Option<Value>,
        timeout: Duration,
    ) -> Result<ApiResponse, SdkError> {
        if !self.transport.is_connected() {
            return Err(SdkError::NotConnected);
        }
        let frame = ApiRequest::new(api_name, parameter).to_json()?;

        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let (tx, mut rx) = oneshot::channel();
        {
            let mut pending = lock(&self.pending);
            if pending.contains_key(api_name) {
                return Err(SdkError::CallInFlight(api_name.to_string()));
            }
            pending.insert(api_name.to_string(), PendingCall { call_id, tx });
        }
        let slot = PendingSlot {
            pending: &self.pending,
            api_name,
            call_id,
        };

        self.transport.send(frame)?;

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(reply)) => reply.and_then(|resp| resp.into_result(api_name)),
            Ok(Err(_)) => Err(SdkError::ConnectionDropped {
                api_name: api_name.to_string(),
            }),
            Err(_) => {
                if !slot.release() {
                    // A reply claimed the entry just before the deadline
                    if let Ok(reply) = rx.try_recv() {
                        return reply.and_then(|resp| resp.into_result(api_name));
                    }
                }
                warn!(api_name = %api_name, timeout_ms = timeout.as_millis() as u64, "⏱️ SDK call timed out");
                Err(SdkError::Timeout {
                    api_name: api_name.to_string(),
                })
            }
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport.connection_state()
    }

    pub fn transport(&self) -> &Arc<dyn SdkTransport> {
        &self.transport
    }

    /// Number of calls currently awaiting a reply
    pub fn pending_calls(&self) -> usize {
        lock(&self.pending).len()
    }
}

/// Removes this call's pending entry when the waiting future goes away
struct PendingSlot<'a> {
    pending: &'a PendingMap,
    api_name: &'a str,
    call_id: u64,
}

impl PendingSlot<'_> {
    /// Remove the entry if it still belongs to this call
    fn release(&self) -> bool {
        let mut pending = lock(self.pending);
        if pending
            .get(self.api_name)
            .is_some_and(|call| call.call_id == self.call_id)
        {
            pending.remove(self.api_name);
            true
        } else {
            false
        }
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

async fn dispatch(
    mut inbound: mpsc::UnboundedReceiver<TransportEvent>,
    pending: Arc<PendingMap>,
    events: broadcast::Sender<DeviceEvent>,
) {
    while let Some(event) = inbound.recv().await {
        match event {
            TransportEvent::Opened => {
                let _ = events.send(DeviceEvent::service_connected());
            }
            TransportEvent::Closed => {
                fail_all(&pending);
                let _ = events.send(DeviceEvent::service_disconnected());
            }
            TransportEvent::Frame(raw) => handle_frame(&raw, &pending, &events),
        }
    }
    fail_all(&pending);
    debug!("Correlator dispatch loop ended");
}

fn handle_frame(raw: &str, pending: &PendingMap, events: &broadcast::Sender<DeviceEvent>) {
    let frame = match ApiResponse::parse(raw) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(frame = %preview(raw), "Dropping malformed SDK frame: {}", e);
            return;
        }
    };
    debug!(frame = %preview(raw), "← SDK");

    if let Some(event) = DeviceEvent::from_frame(&frame) {
        info!(event = event.event_type(), "📟 Device notification");
        let _ = events.send(event);
        return;
    }
    if frame.callback().is_some() {
        debug!(callback = ?frame.callback_name(), "Ignoring unhandled device callback");
        return;
    }

    let Some(api_name) = frame.api_name.clone().filter(|name| !name.is_empty()) else {
        debug!("Ignoring frame without apiName");
        return;
    };

    let call = lock(pending).remove(&api_name);
    match call {
        // Receiver gone means the caller stopped waiting
        Some(call) => {
            let _ = call.tx.send(Ok(frame));
        }
        None => debug!(api_name = %api_name, "No pending call for reply"),
    }
}

fn fail_all(pending: &PendingMap) {
    let drained: Vec<(String, PendingCall)> = lock(pending).drain().collect();
    if !drained.is_empty() {
        warn!(count = drained.len(), "Connection lost with calls in flight");
    }
    for (api_name, call) in drained {
        let _ = call.tx.send(Err(SdkError::ConnectionDropped { api_name }));
    }
}
