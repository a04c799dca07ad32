//! Wire protocol for the session channel.
//!
//! Messages are JSON with a `type` tag:
//! ```json
//! { "type": "join", "session": "session-id" }
//! { "type": "stroke", "points": [{"x": 1.0, "y": 2.0}, ...], "color": "#1a1a2e", "width": 4.0 }
//! { "type": "clear" }
//! { "type": "complete" }
//! ```

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default ink color sent with stroke messages.
pub const DEFAULT_COLOR: &str = "#1a1a2e";
/// Default stroke width in canvas pixels.
pub const DEFAULT_WIDTH: f64 = 4.0;

/// Messages a client sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the channel keyed by a session id.
    Join { session: String },
    /// One completed stroke from the capture surface.
    Stroke {
        points: Vec<Point>,
        color: String,
        width: f64,
    },
    /// Wipe the drawing and all accumulated validation state.
    Clear,
    /// The sender considers the drawing finished.
    Complete,
}

/// Messages the relay sends to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirm channel join.
    Joined { session: String, peer_count: usize },
    /// Another peer joined the session.
    PeerJoined { peer_id: String },
    /// A peer left the session.
    PeerLeft { peer_id: String },
    /// A stroke relayed from another peer.
    Stroke {
        points: Vec<Point>,
        color: String,
        width: f64,
    },
    /// Clear relayed from another peer.
    Clear,
    /// Complete relayed from another peer.
    Complete,
    /// Error message.
    Error { message: String },
}

/// Events surfaced to the client-side subscription.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Connected to the relay.
    Connected,
    /// Disconnected from the relay.
    Disconnected,
    /// Joined the session channel.
    Joined { session: String, peer_count: usize },
    /// A peer joined the session.
    PeerJoined { peer_id: String },
    /// A peer left the session.
    PeerLeft { peer_id: String },
    /// A stroke arrived from the partner device.
    StrokeReceived {
        points: Vec<Point>,
        color: String,
        width: f64,
    },
    /// The partner wiped the drawing.
    ClearReceived,
    /// The partner considers the drawing finished.
    CompleteReceived,
    /// Error occurred.
    Error { message: String },
}

impl From<ServerMessage> for ChannelEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::Joined {
                session,
                peer_count,
            } => ChannelEvent::Joined {
                session,
                peer_count,
            },
            ServerMessage::PeerJoined { peer_id } => ChannelEvent::PeerJoined { peer_id },
            ServerMessage::PeerLeft { peer_id } => ChannelEvent::PeerLeft { peer_id },
            ServerMessage::Stroke {
                points,
                color,
                width,
            } => ChannelEvent::StrokeReceived {
                points,
                color,
                width,
            },
            ServerMessage::Clear => ChannelEvent::ClearReceived,
            ServerMessage::Complete => ChannelEvent::CompleteReceived,
            ServerMessage::Error { message } => ChannelEvent::Error { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_serializes_with_tag() {
        let msg = ClientMessage::Join {
            session: "abc".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"join""#));
        assert!(json.contains("abc"));
    }

    #[test]
    fn test_stroke_payload_shape() {
        let msg = ClientMessage::Stroke {
            points: vec![Point::new(1.0, 2.0)],
            color: DEFAULT_COLOR.to_string(),
            width: DEFAULT_WIDTH,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "stroke");
        assert_eq!(json["points"][0]["x"], 1.0);
        assert_eq!(json["points"][0]["y"], 2.0);
        assert_eq!(json["color"], DEFAULT_COLOR);
        assert_eq!(json["width"], DEFAULT_WIDTH);
    }

    #[test]
    fn test_clear_and_complete_have_no_payload() {
        assert_eq!(
            serde_json::to_string(&ClientMessage::Clear).unwrap(),
            r#"{"type":"clear"}"#
        );
        assert_eq!(
            serde_json::to_string(&ClientMessage::Complete).unwrap(),
            r#"{"type":"complete"}"#
        );
    }

    #[test]
    fn test_server_message_deserialize() {
        let json = r#"{"type":"joined","session":"test","peer_count":2}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        match msg {
            ServerMessage::Joined {
                session,
                peer_count,
            } => {
                assert_eq!(session, "test");
                assert_eq!(peer_count, 2);
            }
            _ => panic!("Wrong message type"),
        }
    }
}
