//! Text Emitter
//!
//! Linearizes the frame tree into program text. Containers contribute only their bodies;
//! compound frames emit a header line, their indented body, then their joint frames at the
//! header's indent. Disabled frames are wrapped in triple-quote delimiter lines so they
//! survive as inert string literals.

pub mod position;

pub use position::{ErrorTarget, LinePosition, LinePositionMap, SlotSpan};

use crate::error::TreeError;
use crate::frame::Frame;
use crate::tree::FrameTree;
use crate::types::FrameId;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Default indentation unit for bodies
pub const DEFAULT_INDENT: &str = "    ";

/// Delimiter opening and closing a disabled block
pub const DISABLED_DELIMITER: &str = "\"\"\"";

/// Program text plus the position map built while producing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedProgram {
    pub text: String,
    pub positions: LinePositionMap,
}

/// Emits program text from a frame tree
pub struct Emitter<'a> {
    tree: &'a FrameTree,
    indent_unit: String,
}

/// Accumulator for a single emission pass
#[derive(Default)]
struct EmitState {
    text: String,
    positions: LinePositionMap,
    line: usize,
    in_disabled: bool,
    disabled_indent: String,
}

impl EmitState {
    fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
        self.line += 1;
    }
}

impl<'a> Emitter<'a> {
    pub fn new(tree: &'a FrameTree) -> Self {
        Self::with_indent(tree, DEFAULT_INDENT)
    }

    pub fn with_indent(tree: &'a FrameTree, indent_unit: &str) -> Self {
        Self {
            tree,
            indent_unit: indent_unit.to_string(),
        }
    }

    /// Emit the whole program.
    #[instrument(skip(self), fields(frames = self.tree.len()))]
    pub fn emit(&self) -> Result<EmittedProgram, TreeError> {
        let start = Instant::now();
        let mut state = EmitState::default();

        for container_id in self.tree.children(FrameId::ROOT)? {
            self.emit_body(*container_id, "", &mut state)?;
        }
        if state.in_disabled {
            state.text.push_str(&state.disabled_indent);
            state.text.push_str(DISABLED_DELIMITER);
        }

        info!(
            lines = state.positions.len(),
            bytes = state.text.len(),
            duration_ms = start.elapsed().as_millis(),
            "Program emitted"
        );
        Ok(EmittedProgram {
            text: state.text,
            positions: state.positions,
        })
    }

    fn emit_body(
        &self,
        parent_id: FrameId,
        indent: &str,
        state: &mut EmitState,
    ) -> Result<(), TreeError> {
        for child_id in self.tree.children(parent_id)? {
            self.emit_frame(*child_id, indent, state)?;
        }
        Ok(())
    }

    fn emit_frame(&self, id: FrameId, indent: &str, state: &mut EmitState) -> Result<(), TreeError> {
        let frame = self.tree.frame(id)?;

        if frame.is_disabled != state.in_disabled {
            if frame.is_disabled {
                state.disabled_indent = indent.to_string();
            }
            let delimiter = format!("{}{}", state.disabled_indent, DISABLED_DELIMITER);
            state.push_line(&delimiter);
            state.in_disabled = frame.is_disabled;
            debug!(frame = %id, disabled = frame.is_disabled, "Disabled block boundary");
        }

        let (header, slots) = render_header(frame, indent);
        state.positions.record(state.line, LinePosition { frame_id: id, slots });
        state.push_line(&header);

        if frame.allows_children() {
            let body_indent = format!("{}{}", indent, self.indent_unit);
            self.emit_body(id, &body_indent, state)?;
        }
        for joint_id in &frame.joint_frame_ids {
            self.emit_frame(*joint_id, indent, state)?;
        }
        Ok(())
    }
}

/// Build one header line and the spans of its slots.
///
/// Each label contributes its text, then (when it owns a slot) the slot's code and a space.
pub fn render_header(frame: &Frame, indent: &str) -> (String, Vec<SlotSpan>) {
    let mut line = String::from(indent);
    let mut column = indent.chars().count();
    let mut spans = Vec::new();

    for (index, label) in frame.definition().labels.iter().enumerate() {
        let slot = frame.label_slots.get(&index);
        if label.hidable && slot.is_some_and(|slot| !slot.shown) {
            continue;
        }
        if label.show_label {
            line.push_str(label.text);
            column += label.text.chars().count();
        }
        if label.has_slot {
            let code = slot.map(|slot| slot.render()).unwrap_or_default();
            let length = code.chars().count();
            spans.push(SlotSpan {
                label_index: index,
                start: column,
                length,
            });
            line.push_str(&code);
            line.push(' ');
            column += length + 1;
        }
    }
    (line, spans)
}
