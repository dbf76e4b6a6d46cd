//! Shared whiteboard.
//!
//! The server keeps only the last `whiteboard-draw` payload, so each draw
//! sends the whole stroke list as a JSON array. Browser peers send one
//! segment object per pointer move instead; those are added to the board.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_LINE_WIDTH: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Pen,
    Eraser,
}

/// A line segment in coordinates normalised to `0.0..=1.0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
    pub line_width: f64,
    pub tool: Tool,
}

#[derive(Debug, Default)]
pub struct Whiteboard {
    strokes: Vec<Stroke>,
}

impl Whiteboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stroke and return the snapshot to send.
    pub fn draw(&mut self, stroke: Stroke) -> Value {
        self.strokes.push(stroke);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Value {
        serde_json::to_value(&self.strokes).unwrap_or(Value::Array(Vec::new()))
    }

    /// Replace the board with the snapshot carried by `room-state`.
    /// `null` clears it; a lone segment becomes a one-stroke board.
    pub fn apply_snapshot(&mut self, data: Value) -> Result<usize, serde_json::Error> {
        self.strokes = if data.is_null() {
            Vec::new()
        } else if data.is_array() {
            serde_json::from_value(data)?
        } else {
            vec![serde_json::from_value(data)?]
        };
        Ok(self.strokes.len())
    }

    /// Apply a live `whiteboard-draw` from a peer.
    ///
    /// Arrays replace the board and `null` clears it. A single segment is
    /// appended. Returns the stroke count afterwards.
    pub fn apply_update(&mut self, data: Value) -> Result<usize, serde_json::Error> {
        if data.is_object() {
            let stroke: Stroke = serde_json::from_value(data)?;
            self.strokes.push(stroke);
            return Ok(self.strokes.len());
        }
        self.apply_snapshot(data)
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }
}
