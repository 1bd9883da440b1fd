//! Shared identifiers and caret types used across the frame tree, emitter and navigation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a frame in the tree.
///
/// `0` is the implicit root. The three top-level containers use negative ids so they never
/// collide with ids handed out for user frames, which start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub i64);

impl FrameId {
    pub const ROOT: FrameId = FrameId(0);
    pub const IMPORTS_CONTAINER: FrameId = FrameId(-1);
    pub const FUNC_DEFS_CONTAINER: FrameId = FrameId(-2);
    pub const MAIN_CONTAINER: FrameId = FrameId(-3);

    pub fn is_root(self) -> bool {
        self.0 == 0
    }

    /// Raw value, mostly for logging
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FrameId {
    fn from(value: i64) -> Self {
        FrameId(value)
    }
}

/// Where the caret sits relative to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaretPosition {
    /// At the top of the frame's body, before its first child
    InsideBody,
    /// Immediately after the frame (and after its body, if any)
    BelowFrame,
}

/// The edit position: a frame plus a caret position relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub frame_id: FrameId,
    pub position: CaretPosition,
}

impl Cursor {
    pub fn new(frame_id: FrameId, position: CaretPosition) -> Self {
        Self { frame_id, position }
    }

    pub fn inside(frame_id: FrameId) -> Self {
        Self::new(frame_id, CaretPosition::InsideBody)
    }

    pub fn below(frame_id: FrameId) -> Self {
        Self::new(frame_id, CaretPosition::BelowFrame)
    }

    pub fn is_inside_body(&self) -> bool {
        self.position == CaretPosition::InsideBody
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            CaretPosition::InsideBody => write!(f, "{}:body", self.frame_id),
            CaretPosition::BelowFrame => write!(f, "{}:below", self.frame_id),
        }
    }
}
