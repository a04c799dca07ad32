//! Render surface: receives strokes from the session channel and judges them.
//!
//! Two strategies:
//! - **Guided**: a target character's reference glyph is known; each incoming
//!   stroke is validated against the next expected reference stroke.
//! - **Freeform**: no reference paths; completed stroke sets are ranked
//!   against the pattern database.
//!
//! All state here is owned by the surface and mutated only from
//! `handle_event`, which the host is expected to call from a single event
//! loop.

use crate::glyph::{ApproxEndpoints, PathEndpoints, ReferenceGlyph};
use crate::protocol::ChannelEvent;
use crate::recognizer::{ACCEPT_THRESHOLD, RecognitionResult, recognize};
use crate::stroke::Stroke;
use crate::validator::{StrokeValidator, Verdict};

/// Recognition strategy currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Guided,
    Freeform,
}

/// Feedback the surrounding UI consumes to draw and award progress.
#[derive(Debug, Clone)]
pub enum Feedback {
    /// Draw this stroke.
    StrokeDrawn { stroke: Stroke },
    /// Guided mode: the stroke matched reference stroke `index`.
    StrokeAccepted { index: usize },
    /// Guided mode: the stroke missed; the same index is retried next.
    StrokeRejected,
    /// Freeform mode: current ranked guesses.
    Recognized { results: Vec<RecognitionResult> },
    /// The drawing was judged correct. Fires at most once per attempt.
    Completed { glyph: char },
    /// Wipe the drawing surface.
    Cleared,
}

/// Receiver-side drawing state and judgment.
pub struct RenderSurface<E: PathEndpoints = ApproxEndpoints> {
    mode: RenderMode,
    validator: StrokeValidator<E>,
    /// Guided target, or the freeform recognizer hint.
    target: Option<char>,
    glyph: Option<ReferenceGlyph>,
    /// Strokes that arrived while the glyph fetch was still pending
    /// (guided mode); replayed once the glyph resolves.
    pending: Vec<Stroke>,
    /// Strokes drawn so far.
    strokes: Vec<Stroke>,
    /// Guided mode: count of accepted strokes, i.e. the next expected index.
    accepted: usize,
    completed: bool,
}

impl RenderSurface<ApproxEndpoints> {
    /// Freeform surface, optionally hinted with the prompted character.
    pub fn freeform(hint: Option<char>) -> Self {
        Self::with_validator(RenderMode::Freeform, hint, StrokeValidator::default())
    }

    /// Guided surface for `target`. Validation waits for `set_glyph`;
    /// strokes arriving before then are queued and replayed.
    pub fn guided(target: char) -> Self {
        Self::with_validator(RenderMode::Guided, Some(target), StrokeValidator::default())
    }
}

impl<E: PathEndpoints> RenderSurface<E> {
    pub fn with_validator(
        mode: RenderMode,
        target: Option<char>,
        validator: StrokeValidator<E>,
    ) -> Self {
        Self {
            mode,
            validator,
            target,
            glyph: None,
            pending: Vec::new(),
            strokes: Vec::new(),
            accepted: 0,
            completed: false,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Guided mode progress: index of the next expected reference stroke.
    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Switch to a new guided target, discarding all attempt state.
    ///
    /// Also invalidates any in-flight glyph fetch for the previous target:
    /// a later `set_glyph` for a different character is dropped.
    pub fn set_target(&mut self, target: char) {
        self.mode = RenderMode::Guided;
        self.target = Some(target);
        self.glyph = None;
        self.reset();
    }

    /// Deliver the fetched reference glyph, replaying any queued strokes.
    ///
    /// Glyphs for a character other than the current target are stale
    /// fetch results and are ignored.
    pub fn set_glyph(&mut self, glyph: ReferenceGlyph) -> Vec<Feedback> {
        if self.target != Some(glyph.glyph) {
            log::debug!("Dropping stale glyph for '{}'", glyph.glyph);
            return Vec::new();
        }
        self.glyph = Some(glyph);
        let queued = std::mem::take(&mut self.pending);
        let mut feedback = Vec::new();
        for stroke in queued {
            feedback.extend(self.incoming_stroke(stroke));
        }
        feedback
    }

    /// The glyph fetch failed: degrade to freeform recognition, replaying
    /// any queued strokes through the recognizer.
    pub fn glyph_unavailable(&mut self) -> Vec<Feedback> {
        self.mode = RenderMode::Freeform;
        let queued = std::mem::take(&mut self.pending);
        let mut feedback = Vec::new();
        for stroke in queued {
            feedback.extend(self.incoming_stroke(stroke));
        }
        feedback
    }

    /// Process one incoming channel event into UI feedback.
    pub fn handle_event(&mut self, event: ChannelEvent) -> Vec<Feedback> {
        match event {
            ChannelEvent::StrokeReceived { points, .. } => {
                // A tap that slipped through on the wire is malformed
                // input: dropped, not an error.
                match Stroke::finish(points) {
                    Some(stroke) => self.incoming_stroke(stroke),
                    None => Vec::new(),
                }
            }
            ChannelEvent::ClearReceived => {
                self.reset();
                vec![Feedback::Cleared]
            }
            ChannelEvent::CompleteReceived => self.incoming_complete(),
            ChannelEvent::Connected
            | ChannelEvent::Disconnected
            | ChannelEvent::Joined { .. }
            | ChannelEvent::PeerJoined { .. }
            | ChannelEvent::PeerLeft { .. } => Vec::new(),
            ChannelEvent::Error { message } => {
                log::warn!("Channel error: {}", message);
                Vec::new()
            }
        }
    }

    fn incoming_stroke(&mut self, stroke: Stroke) -> Vec<Feedback> {
        match self.mode {
            RenderMode::Guided => self.guided_stroke(stroke),
            RenderMode::Freeform => self.freeform_stroke(stroke),
        }
    }

    fn guided_stroke(&mut self, stroke: Stroke) -> Vec<Feedback> {
        let Some(glyph) = self.glyph.as_ref() else {
            // Fetch still pending: queue and replay on resolution.
            self.pending.push(stroke);
            return Vec::new();
        };

        match self.validator.check(&stroke, glyph, self.accepted) {
            Verdict::Accepted => {
                let index = self.accepted;
                let total = glyph.stroke_count();
                self.accepted += 1;
                self.strokes.push(stroke.clone());

                let mut feedback = vec![
                    Feedback::StrokeDrawn { stroke },
                    Feedback::StrokeAccepted { index },
                ];
                if self.accepted == total && !self.completed {
                    self.completed = true;
                    // Guided surfaces always have a target.
                    if let Some(glyph) = self.target {
                        feedback.push(Feedback::Completed { glyph });
                    }
                }
                feedback
            }
            Verdict::Rejected => vec![Feedback::StrokeRejected],
            // More strokes than the reference expects: ignored.
            Verdict::ExtraStroke => Vec::new(),
        }
    }

    fn freeform_stroke(&mut self, stroke: Stroke) -> Vec<Feedback> {
        self.strokes.push(stroke.clone());
        let mut feedback = vec![Feedback::StrokeDrawn { stroke }];
        feedback.extend(self.rerank());
        feedback
    }

    fn incoming_complete(&mut self) -> Vec<Feedback> {
        match self.mode {
            // Guided completion is driven by per-stroke validation alone.
            RenderMode::Guided => Vec::new(),
            RenderMode::Freeform => self.rerank(),
        }
    }

    /// Re-rank the freeform guesses and latch completion at the threshold.
    fn rerank(&mut self) -> Vec<Feedback> {
        let results = recognize(&self.strokes, self.target);
        let mut feedback = Vec::new();
        if !self.completed {
            if let Some(top) = results.first() {
                if top.confidence >= ACCEPT_THRESHOLD {
                    self.completed = true;
                    feedback.push(Feedback::Completed { glyph: top.glyph });
                }
            }
        }
        feedback.insert(0, Feedback::Recognized { results });
        feedback
    }

    fn reset(&mut self) {
        self.strokes.clear();
        self.pending.clear();
        self.accepted = 0;
        self.completed = false;
    }
}
