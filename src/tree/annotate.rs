//! Error annotations on frames and slots
//!
//! Lint diagnostics and runtime failures are reported against program text; the position
//! map built during emission routes them back to the frame (and slot) that produced the line.

use crate::collab::{Diagnostic, RuntimeFailure};
use crate::emit::{ErrorTarget, LinePositionMap};
use crate::error::TreeError;
use crate::tree::FrameTree;
use crate::types::FrameId;
use tracing::{debug, info};

impl FrameTree {
    /// Drop every error annotation, runtime errors included.
    pub fn clear_errors(&mut self) {
        for frame in self.frames_mut() {
            frame.error = None;
            frame.last_runtime_error = None;
            for slot in frame.label_slots.values_mut() {
                slot.error = None;
            }
        }
    }

    /// Attach an error to one slot, appending to any error already there.
    pub fn set_slot_error(
        &mut self,
        id: FrameId,
        label_index: usize,
        message: &str,
    ) -> Result<(), TreeError> {
        let slot = self
            .frame_mut(id)?
            .label_slots
            .get_mut(&label_index)
            .ok_or(TreeError::SlotNotFound {
                frame: id,
                label_index,
            })?;
        append_message(&mut slot.error, message);
        Ok(())
    }

    /// Attach an error to the frame as a whole.
    pub fn set_frame_error(&mut self, id: FrameId, message: &str) -> Result<(), TreeError> {
        append_message(&mut self.frame_mut(id)?.error, message);
        Ok(())
    }

    /// Replace all annotations with the given lint diagnostics.
    ///
    /// Diagnostics on lines without a statement are skipped. Returns how many were applied.
    pub fn apply_diagnostics(
        &mut self,
        diagnostics: &[Diagnostic],
        positions: &LinePositionMap,
    ) -> Result<usize, TreeError> {
        self.clear_errors();
        let mut applied = 0;
        for diagnostic in diagnostics {
            match positions.locate(diagnostic.line, diagnostic.column) {
                Some(ErrorTarget::Slot { frame, label_index }) => {
                    self.set_slot_error(frame, label_index, &diagnostic.message)?;
                    applied += 1;
                }
                Some(ErrorTarget::Frame { frame }) => {
                    self.set_frame_error(frame, &diagnostic.message)?;
                    applied += 1;
                }
                None => {
                    debug!(line = diagnostic.line, "Diagnostic on a line without a frame");
                }
            }
        }
        info!(total = diagnostics.len(), applied, "Applied lint diagnostics");
        Ok(applied)
    }

    /// Record a runtime failure on the frame whose line raised it.
    ///
    /// Every slot of the frame is flagged with the message. Returns the frame, or `None`
    /// when the reported line does not map to one.
    pub fn apply_runtime_failure(
        &mut self,
        failure: &RuntimeFailure,
        positions: &LinePositionMap,
    ) -> Result<Option<FrameId>, TreeError> {
        let Some(frame_id) = failure
            .line
            .checked_sub(1)
            .and_then(|line| positions.frame_at(line))
        else {
            debug!(line = failure.line, "Runtime failure outside any frame");
            return Ok(None);
        };
        let frame = self.frame_mut(frame_id)?;
        frame.last_runtime_error = Some(failure.message.clone());
        for slot in frame.label_slots.values_mut() {
            slot.error = Some(failure.message.clone());
        }
        info!(frame = %frame_id, line = failure.line, "Runtime failure mapped to frame");
        Ok(Some(frame_id))
    }

    fn frames_mut(&mut self) -> impl Iterator<Item = &mut crate::frame::Frame> {
        self.frames.values_mut()
    }
}

fn append_message(target: &mut Option<String>, message: &str) {
    match target {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(message);
        }
        None => *target = Some(message.to_string()),
    }
}
