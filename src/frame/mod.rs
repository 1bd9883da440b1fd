//! Program Frames
//!
//! A frame is one statement or compound-statement header of the edited program. Frames are
//! stored in an arena keyed by [`FrameId`]; the adjacency lists (`children_ids` for bodies,
//! `joint_frame_ids` on the head of a joint group) describe the tree shape.

pub mod definition;
pub mod slot;

pub use definition::{FrameDefinition, FrameKind, FrameLabel};
pub use slot::{FieldSlot, LabelSlot, SlotsStructure};

use crate::types::FrameId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of the frame tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub kind: FrameKind,
    /// Owning body; `ROOT` for joint frames, which hang off their head instead
    pub parent_id: FrameId,
    #[serde(default)]
    pub children_ids: Vec<FrameId>,
    /// Head of the joint group, `ROOT` when this frame is not a joint continuation
    #[serde(default = "root_id")]
    pub joint_parent_id: FrameId,
    /// Joint continuations, only ever populated on a head frame
    #[serde(default)]
    pub joint_frame_ids: Vec<FrameId>,
    /// Slot contents keyed by label index
    #[serde(default)]
    pub label_slots: BTreeMap<usize, LabelSlot>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_runtime_error: Option<String>,
}

fn root_id() -> FrameId {
    FrameId::ROOT
}

fn default_visible() -> bool {
    true
}

impl Frame {
    /// Create a frame with an empty slot for every label that carries one.
    pub fn new(id: FrameId, kind: FrameKind) -> Self {
        let label_slots = kind
            .definition()
            .slot_label_indices()
            .into_iter()
            .map(|index| (index, LabelSlot::default()))
            .collect();
        Frame {
            id,
            kind,
            parent_id: FrameId::ROOT,
            children_ids: Vec::new(),
            joint_parent_id: FrameId::ROOT,
            joint_frame_ids: Vec::new(),
            label_slots,
            is_disabled: false,
            is_selected: false,
            is_visible: true,
            is_collapsed: false,
            error: None,
            last_runtime_error: None,
        }
    }

    /// Create a frame whose slots, in slot order, hold the given structures.
    ///
    /// Missing structures leave the remaining slots empty; extra ones are ignored.
    pub fn with_slots(id: FrameId, kind: FrameKind, slots: Vec<SlotsStructure>) -> Self {
        let mut frame = Frame::new(id, kind);
        for (index, structure) in kind.definition().slot_label_indices().into_iter().zip(slots) {
            frame.label_slots.insert(index, LabelSlot::new(structure));
        }
        frame
    }

    pub fn definition(&self) -> &'static FrameDefinition {
        self.kind.definition()
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn allows_children(&self) -> bool {
        self.kind.allows_children()
    }

    /// True when this frame is a continuation hanging off a joint head.
    pub fn is_joint(&self) -> bool {
        !self.joint_parent_id.is_root()
    }

    /// Label indices of the editable slots, in order.
    pub fn editable_slots(&self) -> Vec<usize> {
        self.label_slots.keys().copied().collect()
    }

    /// Rendered code of the slot at `label_index`, empty when absent.
    pub fn slot_code(&self, label_index: usize) -> String {
        self.label_slots
            .get(&label_index)
            .map(LabelSlot::render)
            .unwrap_or_default()
    }
}
