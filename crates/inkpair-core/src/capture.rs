//! Capture surface: samples pointer input into strokes and transmits them.

use kurbo::Point;

use crate::channel::{SessionChannel, Transport};
use crate::protocol::{DEFAULT_COLOR, DEFAULT_WIDTH};
use crate::stroke::Stroke;

/// Collects press-move-release gestures on the drawing device.
///
/// Owns the in-progress point list; completed strokes are pushed through
/// the session channel. Taps (fewer than 2 samples) are dropped, never
/// transmitted.
pub struct StrokeCapture {
    /// Points of the gesture currently in progress, if any.
    in_progress: Option<Vec<Point>>,
    pub color: String,
    pub width: f64,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self {
            in_progress: None,
            color: DEFAULT_COLOR.to_string(),
            width: DEFAULT_WIDTH,
        }
    }

    /// Whether a gesture is currently in progress.
    pub fn is_drawing(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Points sampled so far for the in-progress gesture.
    pub fn current_points(&self) -> &[Point] {
        self.in_progress.as_deref().unwrap_or(&[])
    }

    /// Pointer pressed: start a new gesture. An unfinished previous gesture
    /// is discarded (the pointer was lost without a release).
    pub fn begin(&mut self, point: Point) {
        self.in_progress = Some(vec![point]);
    }

    /// Pointer moved while pressed: append a sample.
    pub fn extend(&mut self, point: Point) {
        if let Some(points) = self.in_progress.as_mut() {
            points.push(point);
        }
    }

    /// Pointer released: finalize and transmit the stroke.
    ///
    /// Returns the completed stroke, or `None` for a tap (which is not
    /// transmitted).
    pub fn finish<T: Transport>(&mut self, channel: &mut SessionChannel<T>) -> Option<Stroke> {
        let points = self.in_progress.take()?;
        let stroke = Stroke::finish(points)?;
        channel.send_stroke(&stroke, &self.color, self.width);
        Some(stroke)
    }

    /// Discard the in-progress gesture and broadcast a clear.
    pub fn clear<T: Transport>(&mut self, channel: &mut SessionChannel<T>) {
        self.in_progress = None;
        channel.send_clear();
    }

    /// Signal that the drawing is finished.
    pub fn complete<T: Transport>(&mut self, channel: &mut SessionChannel<T>) {
        self.in_progress = None;
        channel.send_complete();
    }
}

impl Default for StrokeCapture {
    fn default() -> Self {
        Self::new()
    }
}
