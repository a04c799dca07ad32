//! Session channel: the real-time broadcast link between the two devices.
//!
//! The channel is a pure relay keyed by the session id. Sends are
//! best-effort with no retry or buffering; when the transport is down they
//! are no-ops and the surrounding UI is responsible for showing
//! "not connected".

use crate::protocol::{ChannelEvent, ClientMessage, ServerMessage};
use crate::session::Session;
use crate::stroke::Stroke;

/// Connection state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// A topic-scoped, at-most-once, in-order message transport.
///
/// Implementations: [`WebSocketTransport`] against the relay server, and
/// [`MemoryTransport`] for same-process loopback (tests, demos).
pub trait Transport {
    /// Best-effort send. Dropped silently when not connected.
    fn send(&mut self, msg: &ClientMessage);

    /// Drain pending incoming events (non-blocking).
    fn poll_events(&mut self) -> Vec<ChannelEvent>;

    /// Current connection state.
    fn state(&self) -> ConnectionState;
}

/// The session-scoped channel a surface sends and receives strokes through.
pub struct SessionChannel<T: Transport> {
    session: Session,
    transport: T,
}

impl<T: Transport> SessionChannel<T> {
    pub fn new(session: Session, transport: T) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.transport.state() == ConnectionState::Connected
    }

    /// Join the broadcast channel keyed by this device's session id.
    pub fn join(&mut self) {
        let session = self.session.id.to_string();
        self.transport.send(&ClientMessage::Join { session });
    }

    /// Broadcast a completed stroke.
    pub fn send_stroke(&mut self, stroke: &Stroke, color: &str, width: f64) {
        self.transport.send(&ClientMessage::Stroke {
            points: stroke.points.clone(),
            color: color.to_string(),
            width,
        });
    }

    /// Broadcast a clear: receivers wipe their surface and counters.
    pub fn send_clear(&mut self) {
        self.transport.send(&ClientMessage::Clear);
    }

    /// Broadcast that the sender considers the drawing finished.
    pub fn send_complete(&mut self) {
        self.transport.send(&ClientMessage::Complete);
    }

    /// Drain incoming events in broadcast order.
    pub fn poll_events(&mut self) -> Vec<ChannelEvent> {
        self.transport.poll_events()
    }
}

// ============================================================================
// In-memory loopback transport
// ============================================================================

mod memory {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender, channel};

    /// In-process transport: two paired ends relay messages to each other
    /// directly, in send order. Always "connected".
    pub struct MemoryTransport {
        to_peer: Sender<ChannelEvent>,
        from_peer: Receiver<ChannelEvent>,
    }

    impl MemoryTransport {
        /// Create a connected pair of transport ends.
        pub fn pair() -> (Self, Self) {
            let (a_tx, a_rx) = channel();
            let (b_tx, b_rx) = channel();
            (
                Self {
                    to_peer: b_tx,
                    from_peer: a_rx,
                },
                Self {
                    to_peer: a_tx,
                    from_peer: b_rx,
                },
            )
        }
    }

    impl Transport for MemoryTransport {
        fn send(&mut self, msg: &ClientMessage) {
            let event = match msg {
                ClientMessage::Join { session } => ChannelEvent::Joined {
                    session: session.clone(),
                    peer_count: 2,
                },
                ClientMessage::Stroke {
                    points,
                    color,
                    width,
                } => ChannelEvent::StrokeReceived {
                    points: points.clone(),
                    color: color.clone(),
                    width: *width,
                },
                ClientMessage::Clear => ChannelEvent::ClearReceived,
                ClientMessage::Complete => ChannelEvent::CompleteReceived,
            };
            // Peer gone means the session ended; sends become no-ops.
            let _ = self.to_peer.send(event);
        }

        fn poll_events(&mut self) -> Vec<ChannelEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.from_peer.try_recv() {
                events.push(event);
            }
            events
        }

        fn state(&self) -> ConnectionState {
            ConnectionState::Connected
        }
    }
}

pub use memory::MemoryTransport;

// ============================================================================
// Native WebSocket transport
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod websocket {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use thiserror::Error;
    use tungstenite::{Message, connect};
    use url::Url;

    #[derive(Debug, Error)]
    pub enum ConnectError {
        #[error("Already connected")]
        AlreadyConnected,
        #[error("Invalid URL: {0}")]
        InvalidUrl(String),
    }

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket transport for native platforms.
    ///
    /// Uses a background thread for non-blocking operation; incoming
    /// messages are queued and drained via `poll_events()`.
    pub struct WebSocketTransport {
        state: ConnectionState,
        events: Vec<ChannelEvent>,
        /// Channel to send commands to the WebSocket thread.
        cmd_tx: Option<Sender<WsCommand>>,
        /// Channel to receive events from the WebSocket thread.
        event_rx: Option<Receiver<ChannelEvent>>,
        /// Handle to the WebSocket thread.
        _thread: Option<JoinHandle<()>>,
    }

    impl WebSocketTransport {
        /// Create a new disconnected transport.
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                events: Vec::new(),
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        /// Connect to the relay server.
        pub fn connect(&mut self, url: &str) -> Result<(), ConnectError> {
            if self.cmd_tx.is_some() {
                return Err(ConnectError::AlreadyConnected);
            }

            let parsed = Url::parse(url).map_err(|e| ConnectError::InvalidUrl(e.to_string()))?;
            if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                return Err(ConnectError::InvalidUrl(format!(
                    "unsupported scheme: {}",
                    parsed.scheme()
                )));
            }

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<ChannelEvent>();
            let url = url.to_string();

            let handle = thread::spawn(move || {
                log::info!("Channel thread: connecting to {}", url);

                match connect(&url) {
                    Ok((mut socket, response)) => {
                        log::info!("Channel connected, status: {}", response.status());
                        let _ = event_tx.send(ChannelEvent::Connected);

                        // Short read timeout so the loop can interleave
                        // outgoing commands with incoming frames.
                        match socket.get_mut() {
                            tungstenite::stream::MaybeTlsStream::Plain(tcp) => {
                                let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                                let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                            }
                            #[allow(unreachable_patterns)]
                            _ => {}
                        }

                        loop {
                            match cmd_rx.try_recv() {
                                Ok(WsCommand::Send(msg)) => {
                                    if let Err(e) = socket.send(Message::Text(msg)) {
                                        log::error!("Channel send error: {}", e);
                                        break;
                                    }
                                }
                                Ok(WsCommand::Close) => {
                                    let _ = socket.close(None);
                                    break;
                                }
                                Err(TryRecvError::Disconnected) => break,
                                Err(TryRecvError::Empty) => {}
                            }

                            match socket.read() {
                                Ok(Message::Text(txt)) => {
                                    match serde_json::from_str::<ServerMessage>(&txt) {
                                        Ok(msg) => {
                                            let _ = event_tx.send(msg.into());
                                        }
                                        Err(e) => {
                                            log::warn!("Unparsable relay message: {}", e);
                                        }
                                    }
                                }
                                Ok(Message::Ping(data)) => {
                                    let _ = socket.send(Message::Pong(data));
                                }
                                Ok(Message::Close(_)) => break,
                                Ok(_) => {} // Ignore binary, pong
                                Err(tungstenite::Error::Io(ref e))
                                    if e.kind() == std::io::ErrorKind::WouldBlock
                                        || e.kind() == std::io::ErrorKind::TimedOut =>
                                {
                                    continue;
                                }
                                Err(e) => {
                                    log::error!("Channel read error: {}", e);
                                    break;
                                }
                            }
                        }

                        let _ = event_tx.send(ChannelEvent::Disconnected);
                    }
                    Err(e) => {
                        log::error!("Channel connection failed: {}", e);
                        let _ = event_tx.send(ChannelEvent::Error {
                            message: format!("Connection failed: {}", e),
                        });
                    }
                }
            });

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);

            Ok(())
        }

        /// Disconnect from the relay.
        pub fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }
    }

    impl Transport for WebSocketTransport {
        fn send(&mut self, msg: &ClientMessage) {
            let Some(ref tx) = self.cmd_tx else {
                log::debug!("Channel send dropped: not connected");
                return;
            };
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if tx.send(WsCommand::Send(json)).is_err() {
                        log::debug!("Channel send dropped: thread gone");
                    }
                }
                Err(e) => log::warn!("Channel message encode failed: {}", e),
            }
        }

        fn poll_events(&mut self) -> Vec<ChannelEvent> {
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    match &event {
                        ChannelEvent::Connected => self.state = ConnectionState::Connected,
                        ChannelEvent::Disconnected => self.state = ConnectionState::Disconnected,
                        ChannelEvent::Error { .. } => self.state = ConnectionState::Error,
                        _ => {}
                    }
                    self.events.push(event);
                }
            }
            std::mem::take(&mut self.events)
        }

        fn state(&self) -> ConnectionState {
            self.state
        }
    }

    impl Default for WebSocketTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for WebSocketTransport {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use websocket::{ConnectError, WebSocketTransport};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, Session};
    use kurbo::Point;

    fn channels() -> (SessionChannel<MemoryTransport>, SessionChannel<MemoryTransport>) {
        let session = Session::ensure(&MemorySessionStore::new()).unwrap();
        let (a, b) = MemoryTransport::pair();
        (
            SessionChannel::new(session.clone(), a),
            SessionChannel::new(session, b),
        )
    }

    #[test]
    fn test_stroke_relayed_in_order() {
        let (mut sender, mut receiver) = channels();
        let first = Stroke::finish(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).unwrap();
        let second = Stroke::finish(vec![Point::new(0.0, 5.0), Point::new(0.0, 15.0)]).unwrap();

        sender.send_stroke(&first, "#000", 4.0);
        sender.send_stroke(&second, "#000", 4.0);
        sender.send_complete();

        let events = receiver.poll_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ChannelEvent::StrokeReceived { .. }));
        assert!(matches!(events[1], ChannelEvent::StrokeReceived { .. }));
        assert!(matches!(events[2], ChannelEvent::CompleteReceived));

        if let ChannelEvent::StrokeReceived { points, .. } = &events[0] {
            assert_eq!(points, &first.points);
        }
    }

    #[test]
    fn test_clear_relayed() {
        let (mut sender, mut receiver) = channels();
        sender.send_clear();
        let events = receiver.poll_events();
        assert!(matches!(events.as_slice(), [ChannelEvent::ClearReceived]));
    }

    #[test]
    fn test_send_after_peer_gone_is_noop() {
        let (mut sender, receiver) = channels();
        drop(receiver);
        // Must not panic or error.
        sender.send_clear();
        sender.send_complete();
    }

    #[test]
    fn test_websocket_send_while_disconnected_is_noop() {
        let session = Session::ensure(&MemorySessionStore::new()).unwrap();
        let mut channel = SessionChannel::new(session, WebSocketTransport::new());
        assert!(!channel.is_connected());
        let stroke = Stroke::finish(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).unwrap();
        channel.send_stroke(&stroke, "#000", 4.0);
        assert!(channel.poll_events().is_empty());
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let mut transport = WebSocketTransport::new();
        assert!(matches!(
            transport.connect("http://example.com"),
            Err(ConnectError::InvalidUrl(_))
        ));
        assert!(matches!(
            transport.connect("not a url"),
            Err(ConnectError::InvalidUrl(_))
        ));
    }
}
