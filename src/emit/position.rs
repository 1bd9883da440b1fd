//! Line/slot position map
//!
//! Records, for each emitted statement line, which frame produced it and where each of its
//! editable slots sits. Lint and runtime errors are routed back to frames through it.

use crate::types::FrameId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column range of one editable slot on an emitted line (character columns, 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpan {
    pub label_index: usize,
    pub start: usize,
    /// Width of the slot's rendered code, excluding the separating space after it
    pub length: usize,
}

/// The frame behind one emitted line and the spans of its slots, in label order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePosition {
    pub frame_id: FrameId,
    pub slots: Vec<SlotSpan>,
}

/// Where an error reported against the program text belongs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTarget {
    Slot { frame: FrameId, label_index: usize },
    Frame { frame: FrameId },
}

impl ErrorTarget {
    pub fn frame_id(&self) -> FrameId {
        match self {
            ErrorTarget::Slot { frame, .. } | ErrorTarget::Frame { frame } => *frame,
        }
    }
}

/// Map from 0-based output line to the frame and slot spans on that line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePositionMap {
    lines: BTreeMap<usize, LinePosition>,
}

impl LinePositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, line: usize, position: LinePosition) {
        self.lines.insert(line, position);
    }

    pub fn get(&self, line: usize) -> Option<&LinePosition> {
        self.lines.get(&line)
    }

    pub fn frame_at(&self, line: usize) -> Option<FrameId> {
        self.get(line).map(|position| position.frame_id)
    }

    /// Output line of the first statement emitted for `frame_id`.
    pub fn line_of(&self, frame_id: FrameId) -> Option<usize> {
        self.lines
            .iter()
            .find(|(_, position)| position.frame_id == frame_id)
            .map(|(line, _)| *line)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &LinePosition)> {
        self.lines.iter().map(|(line, position)| (*line, position))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Resolve a (line, column) location to a slot, or to the whole frame when the column
    /// lies before the first slot. Lines without a statement resolve to nothing.
    pub fn locate(&self, line: usize, column: usize) -> Option<ErrorTarget> {
        let position = self.lines.get(&line)?;
        let frame = position.frame_id;
        let hit = position.slots.iter().enumerate().find(|(index, span)| {
            span.start <= column
                && position
                    .slots
                    .get(index + 1)
                    .map_or(true, |next| next.start > column)
        });
        Some(match hit {
            Some((_, span)) => ErrorTarget::Slot {
                frame,
                label_index: span.label_index,
            },
            None => ErrorTarget::Frame { frame },
        })
    }
}
