//! Popup position model.

use serde::{Deserialize, Serialize};

/// Top-left corner of the popup, in pixels relative to the document.
///
/// No range validation is applied: negative offsets and offsets past the
/// viewport are kept as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset in pixels
    pub x: f64,
    /// Vertical offset in pixels
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// CSS `left` value, e.g. `50px`.
    pub fn left_css(&self) -> String {
        px(self.x)
    }

    /// CSS `top` value, e.g. `80px`.
    pub fn top_css(&self) -> String {
        px(self.y)
    }
}

/// Format a pixel length the way the browser would serialize it.
///
/// `Display` for `f64` already drops the fraction of integral values.
fn px(value: f64) -> String {
    // -0 serializes as 0
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}px")
}
