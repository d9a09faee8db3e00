use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use domain::error::SdkError;
use domain::transport::{ConnectionState, SdkTransport, TransportEvent};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{lock, preview};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

type Transition = fn(&ConnectionState) -> Result<ConnectionState, &'static str>;

fn to_disconnected(state: &ConnectionState) -> Result<ConnectionState, &'static str> {
    Ok(state.to_disconnected())
}

/// Connection state and session writer, owned by one supervisor generation
struct Link {
    state: ConnectionState,
    owner: u64,
    /// Writer into the live session, present only while connected
    outbound: Option<mpsc::UnboundedSender<String>>,
}

/// State shared between the transport handle and its supervisor task
struct Shared {
    link: Mutex<Link>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl Shared {
    fn new(events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            link: Mutex::new(Link {
                state: ConnectionState::Disconnected,
                owner: 0,
                outbound: None,
            }),
            events,
        }
    }

    fn state(&self) -> ConnectionState {
        lock(&self.link).state
    }

    fn owns(&self, generation: u64) -> bool {
        lock(&self.link).owner == generation
    }

    /// Hand the link to a new supervisor; older ones lose write access
    fn claim(&self) -> u64 {
        let mut link = lock(&self.link);
        link.owner += 1;
        link.state = link.state.to_disconnected();
        link.outbound = None;
        link.owner
    }

    /// Revoke the current owner. Returns whether a session was live.
    fn release(&self) -> bool {
        let mut link = lock(&self.link);
        link.owner += 1;
        link.outbound = None;
        let was_connected = link.state.is_connected();
        link.state = link.state.to_disconnected();
        was_connected
    }

    /// Apply `transition` on behalf of `generation`; stale owners are ignored
    fn transition(&self, generation: u64, transition: Transition) -> bool {
        let mut link = lock(&self.link);
        if link.owner != generation {
            debug!(generation, owner = link.owner, "Ignoring state change from stale session");
            return false;
        }
        match transition(&link.state) {
            Ok(next) => {
                if !next.is_connected() {
                    link.outbound = None;
                }
                link.state = next;
                true
            }
            Err(reason) => {
                warn!(state = link.state.as_str(), "Illegal connection state change: {}", reason);
                false
            }
        }
    }

    /// Install the session writer and move to Connected in one step
    fn open_session(&self, generation: u64, tx: mpsc::UnboundedSender<String>) -> bool {
        let mut link = lock(&self.link);
        if link.owner != generation {
            return false;
        }
        match link.state.to_connected() {
            Ok(next) => {
                link.state = next;
                link.outbound = Some(tx);
                true
            }
            Err(reason) => {
                warn!(state = link.state.as_str(), "Illegal connection state change: {}", reason);
                false
            }
        }
    }

    fn send(&self, frame: String) -> Result<(), SdkError> {
        let link = lock(&self.link);
        match link.outbound.as_ref() {
            Some(tx) if link.state.is_connected() => {
                tx.send(frame).map_err(|_| SdkError::NotConnected)
            }
            _ => Err(SdkError::NotConnected),
        }
    }

    fn emit(&self, event: TransportEvent) {
        // Receiver gone means the correlator was dropped; nothing left to notify
        let _ = self.events.send(event);
    }
}

/// WebSocket link to the local print service with fixed-interval reconnect.
///
/// One supervisor task owns the socket. It is started by `connect()` and
/// stopped by `disconnect()`, so at most one reconnect loop ever runs. A
/// supervisor that was stopped can no longer touch the link, even while its
/// session is still winding down.
pub struct WebSocketTransport {
    url: String,
    reconnect_interval: Duration,
    shared: Arc<Shared>,
    supervisor: Mutex<Option<CancellationToken>>,
}

impl WebSocketTransport {
    /// Returns the transport and the channel its inbound events arrive on
    pub fn new(
        url: impl Into<String>,
        reconnect_interval: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, inbound) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            url: url.into(),
            reconnect_interval,
            shared: Arc::new(Shared::new(events)),
            supervisor: Mutex::new(None),
        });
        (transport, inbound)
    }
}

#[async_trait]
impl SdkTransport for WebSocketTransport {
    async fn connect(&self) -> Result<(), SdkError> {
        let mut supervisor = lock(&self.supervisor);
        if supervisor.as_ref().is_some_and(|token| !token.is_cancelled()) {
            return Ok(());
        }

        let shutdown = CancellationToken::new();
        *supervisor = Some(shutdown.clone());
        tokio::spawn(supervise(
            self.shared.clone(),
            self.shared.claim(),
            self.url.clone(),
            self.reconnect_interval,
            shutdown,
        ));
        Ok(())
    }

    async fn disconnect(&self) {
        if let Some(token) = lock(&self.supervisor).take() {
            info!(url = %self.url, "Disconnecting from Jingchen SDK");
            token.cancel();
        }
        if self.shared.release() {
            self.shared.emit(TransportEvent::Closed);
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.state().is_connected()
    }

    fn connection_state(&self) -> ConnectionState {
        self.shared.state()
    }

    fn send(&self, frame: String) -> Result<(), SdkError> {
        self.shared.send(frame)
    }
}

/// Connect, run a session until it ends, wait, repeat; until cancelled
async fn supervise(
    shared: Arc<Shared>,
    generation: u64,
    url: String,
    reconnect_interval: Duration,
    shutdown: CancellationToken,
) {
    info!(url = %url, generation, "🔌 Jingchen SDK transport started");

    loop {
        if shutdown.is_cancelled() || !shared.transition(generation, ConnectionState::to_connecting) {
            break;
        }

        let attempt = tokio::select! {
            _ = shutdown.cancelled() => break,
            res = connect_async(url.as_str()) => res,
        };

        match attempt {
            Ok((ws, _response)) => {
                info!(url = %url, "✅ Connected to Jingchen SDK");
                run_session(&shared, generation, ws, &shutdown).await;
            }
            Err(e) => {
                warn!(url = %url, "Jingchen SDK connection failed: {}", e);
                shared.transition(generation, to_disconnected);
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(reconnect_interval) => {
                debug!("Reconnecting to Jingchen SDK...");
            }
        }
    }

    if shared.owns(generation) {
        shared.transition(generation, to_disconnected);
    }
    info!(generation, "Jingchen SDK transport stopped");
}

/// Pump frames both ways until the socket closes or shutdown is requested
async fn run_session(
    shared: &Shared,
    generation: u64,
    ws: WsStream,
    shutdown: &CancellationToken,
) {
    let (mut sink, mut stream) = ws.split();
    let (tx, mut outbound) = mpsc::unbounded_channel::<String>();

    if !shared.open_session(generation, tx) {
        let _ = sink.close().await;
        return;
    }
    shared.emit(TransportEvent::Opened);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.close().await;
                break;
            }

            Some(frame) = outbound.recv() => {
                debug!(frame = %preview(&frame), "→ SDK");
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    error!("❌ WebSocket write failed: {}", e);
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        shared.emit(TransportEvent::Frame(text.to_string()));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        warn!("WebSocket closed by Jingchen SDK");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        warn!("WebSocket stream ended");
                        break;
                    }
                    _ => {} // Binary, Pong
                }
            }
        }
    }

    // after disconnect() the link already belongs to someone else
    if shared.transition(generation, to_disconnected) {
        shared.emit(TransportEvent::Closed);
    }
}
