//! InkPair WebSocket Relay Server
//!
//! A stateless relay that broadcasts stroke events between the two devices
//! sharing a session id. No history is retained: the channel only carries
//! live `stroke`, `clear`, and `complete` messages, in send order.
//!
//! ## Protocol
//!
//! Messages are JSON with the following format:
//! ```json
//! { "type": "join", "session": "session-id" }
//! { "type": "stroke", "points": [{"x": 1.0, "y": 2.0}], "color": "#1a1a2e", "width": 4.0 }
//! { "type": "clear" }
//! { "type": "complete" }
//! ```

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use inkpair_core::protocol::{ClientMessage, ServerMessage};
use std::{collections::HashSet, net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// One active session channel.
struct SessionRoom {
    /// Broadcast channel for this session.
    tx: broadcast::Sender<(String, ServerMessage)>,
    /// Connected peer IDs.
    peers: HashSet<String>,
}

impl SessionRoom {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            peers: HashSet::new(),
        }
    }
}

/// Shared application state.
struct AppState {
    /// Active sessions, keyed by session id.
    sessions: DashMap<String, SessionRoom>,
}

impl AppState {
    fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Add a peer to a session, creating the channel on first join.
    fn join_session(
        &self,
        session_id: &str,
        peer_id: &str,
    ) -> (broadcast::Receiver<(String, ServerMessage)>, usize) {
        let mut room = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionRoom::new);
        room.peers.insert(peer_id.to_string());
        (room.tx.subscribe(), room.peers.len())
    }

    /// Remove a peer from a session, dropping empty sessions.
    fn leave_session(&self, session_id: &str, peer_id: &str) {
        if let Some(mut room) = self.sessions.get_mut(session_id) {
            room.peers.remove(peer_id);
            if room.peers.is_empty() {
                drop(room);
                self.sessions.remove(session_id);
            }
        }
    }

    /// Broadcast a message to everyone in a session.
    fn broadcast(&self, session_id: &str, from: &str, msg: ServerMessage) {
        if let Some(room) = self.sessions.get(session_id) {
            let _ = room.tx.send((from.to_string(), msg));
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpair_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3030));
    info!("InkPair relay server listening on {}", addr);
    info!("WebSocket endpoint: ws://localhost:3030/ws");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Index page
async fn index() -> &'static str {
    "InkPair Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let mut current_session: Option<String> = None;
    let mut session_rx: Option<broadcast::Receiver<(String, ServerMessage)>> = None;

    loop {
        tokio::select! {
            // Handle incoming messages from the client.
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                match client_msg {
                                    ClientMessage::Join { session } => {
                                        // Leave the current session if any.
                                        if let Some(ref old) = current_session {
                                            state.leave_session(old, &peer_id);
                                            state.broadcast(old, &peer_id, ServerMessage::PeerLeft {
                                                peer_id: peer_id.clone(),
                                            });
                                        }

                                        let (rx, peer_count) = state.join_session(&session, &peer_id);
                                        session_rx = Some(rx);
                                        current_session = Some(session.clone());

                                        let joined = ServerMessage::Joined {
                                            session: session.clone(),
                                            peer_count,
                                        };
                                        if send_json(&mut sender, &joined).await.is_err() {
                                            break;
                                        }

                                        state.broadcast(&session, &peer_id, ServerMessage::PeerJoined {
                                            peer_id: peer_id.clone(),
                                        });

                                        info!("Peer {} joined session {}", peer_id, session);
                                    }
                                    ClientMessage::Stroke { points, color, width } => {
                                        if let Some(ref session) = current_session {
                                            state.broadcast(session, &peer_id, ServerMessage::Stroke {
                                                points,
                                                color,
                                                width,
                                            });
                                        }
                                    }
                                    ClientMessage::Clear => {
                                        if let Some(ref session) = current_session {
                                            state.broadcast(session, &peer_id, ServerMessage::Clear);
                                        }
                                    }
                                    ClientMessage::Complete => {
                                        if let Some(ref session) = current_session {
                                            state.broadcast(session, &peer_id, ServerMessage::Complete);
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                warn!("Invalid message from {}: {}", peer_id, e);
                                let err = ServerMessage::Error {
                                    message: format!("Invalid message: {}", e),
                                };
                                let _ = send_json(&mut sender, &err).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore binary, ping/pong
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer_id, e);
                        break;
                    }
                }
            }

            // Relay broadcast messages from the session.
            msg = async {
                match &mut session_rx {
                    Some(rx) => rx.recv().await.ok(),
                    None => {
                        // Not in a session yet, just wait forever.
                        std::future::pending::<Option<(String, ServerMessage)>>().await
                    }
                }
            } => {
                if let Some((from, server_msg)) = msg {
                    // Don't echo back to the sender.
                    if from != peer_id && send_json(&mut sender, &server_msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    // Cleanup on disconnect.
    if let Some(ref session) = current_session {
        state.leave_session(session, &peer_id);
        state.broadcast(session, &peer_id, ServerMessage::PeerLeft {
            peer_id: peer_id.clone(),
        });
    }
    info!("Connection closed: {}", peer_id);
}

async fn send_json(
    sender: &mut (impl SinkExt<Message> + Unpin),
    msg: &ServerMessage,
) -> Result<(), ()> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to encode message: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
