//! InkPair Core Library
//!
//! Cross-device writing practice: one device captures strokes, a paired
//! device renders them live and judges whether they match an expected
//! character. This crate holds the stroke transport protocol and the
//! recognition engine; the surrounding lesson UI is a consumer.

pub mod capture;
pub mod channel;
pub mod geometry;
pub mod glyph;
pub mod patterns;
pub mod protocol;
pub mod recognizer;
pub mod render;
pub mod session;
pub mod stroke;
pub mod validator;

pub use capture::StrokeCapture;
pub use channel::{ConnectionState, MemoryTransport, SessionChannel, Transport};
pub use geometry::{Direction, classify_direction, distance};
pub use glyph::{ApproxEndpoints, GlyphSource, PathEndpoints, ReferenceGlyph, ReferenceStroke};
pub use patterns::{CharacterPattern, Complexity, PATTERNS};
pub use protocol::{ChannelEvent, ClientMessage, ServerMessage};
pub use recognizer::{ACCEPT_THRESHOLD, CONFIDENT_THRESHOLD, RecognitionResult, recognize};
pub use render::{Feedback, RenderMode, RenderSurface};
pub use session::{MemorySessionStore, Session, SessionStore};
pub use stroke::Stroke;
pub use validator::{StrokeValidator, Verdict};

#[cfg(not(target_arch = "wasm32"))]
pub use channel::WebSocketTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use glyph::HttpGlyphSource;
#[cfg(not(target_arch = "wasm32"))]
pub use session::FileSessionStore;
