//! Frame Tree Store
//!
//! Owns every frame of the edited program plus the current cursor. Frames live in an arena
//! keyed by id; the shape is described by the adjacency lists on each frame. All mutation
//! entry points leave the tree fully consistent before returning.

pub mod annotate;
pub mod mutation;
pub mod walker;

pub use mutation::RemoveMode;
pub use walker::{Entry, EntryRole, Walker, WalkerConfig};

use crate::error::TreeError;
use crate::frame::{Frame, FrameKind};
use crate::types::{CaretPosition, Cursor, FrameId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// First id handed out to user frames.
const FIRST_USER_ID: i64 = 1;

/// The canonical frame tree plus the cursor
#[derive(Debug, Clone)]
pub struct FrameTree {
    frames: HashMap<FrameId, Frame>,
    cursor: Cursor,
    next_id: i64,
}

/// A disjoint set of frames built outside the live tree, ready to be spliced in.
#[derive(Debug, Clone, Default)]
pub struct FrameBatch {
    pub frames: BTreeMap<FrameId, Frame>,
    /// Frames to place at the insertion point, in order
    pub top_level: Vec<FrameId>,
    /// Next id free once the batch is committed
    pub next_id: i64,
}

/// Serializable form of a tree, used by the command line and by hosts that persist state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub frames: Vec<Frame>,
    pub cursor: Cursor,
    pub next_id: i64,
}

impl Default for FrameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTree {
    /// An empty program: the root with its three containers, cursor in the main body.
    pub fn new() -> Self {
        let mut root = Frame::new(FrameId::ROOT, FrameKind::Root);
        let containers = [
            (FrameId::IMPORTS_CONTAINER, FrameKind::ImportsContainer),
            (FrameId::FUNC_DEFS_CONTAINER, FrameKind::FuncDefsContainer),
            (FrameId::MAIN_CONTAINER, FrameKind::MainContainer),
        ];
        let mut frames = HashMap::new();
        for (id, kind) in containers {
            let mut container = Frame::new(id, kind);
            container.parent_id = FrameId::ROOT;
            root.children_ids.push(id);
            frames.insert(id, container);
        }
        frames.insert(FrameId::ROOT, root);

        FrameTree {
            frames,
            cursor: Cursor::inside(FrameId::MAIN_CONTAINER),
            next_id: FIRST_USER_ID,
        }
    }

    /// Rebuild a tree from a snapshot, checking every invariant.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Self, TreeError> {
        let frames = snapshot
            .frames
            .into_iter()
            .map(|frame| (frame.id, frame))
            .collect();
        let tree = FrameTree {
            frames,
            cursor: snapshot.cursor,
            next_id: snapshot.next_id,
        };
        tree.validate()?;
        Ok(tree)
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        let mut frames: Vec<Frame> = self.frames.values().cloned().collect();
        frames.sort_by_key(|frame| frame.id);
        TreeSnapshot {
            frames,
            cursor: self.cursor,
            next_id: self.next_id,
        }
    }

    pub fn frame(&self, id: FrameId) -> Result<&Frame, TreeError> {
        self.frames.get(&id).ok_or(TreeError::FrameNotFound(id))
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Result<&mut Frame, TreeError> {
        self.frames.get_mut(&id).ok_or(TreeError::FrameNotFound(id))
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.frames.contains_key(&id)
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.values()
    }

    /// Number of frames, root and containers included.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Move the cursor; the target frame must exist.
    pub fn set_cursor(&mut self, cursor: Cursor) -> Result<(), TreeError> {
        self.frame(cursor.frame_id)?;
        debug!(cursor = %cursor, "Cursor moved");
        self.cursor = cursor;
        Ok(())
    }

    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub(crate) fn allocate_id(&mut self) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn children(&self, id: FrameId) -> Result<&[FrameId], TreeError> {
        Ok(&self.frame(id)?.children_ids)
    }

    /// Head of the joint group `id` belongs to, or `id` itself when it is not a joint frame.
    pub fn joint_head(&self, id: FrameId) -> Result<FrameId, TreeError> {
        let frame = self.frame(id)?;
        Ok(if frame.is_joint() {
            frame.joint_parent_id
        } else {
            id
        })
    }

    /// Owning body of a frame, looking through joint frames to their head's parent.
    pub fn logical_parent(&self, id: FrameId) -> Result<FrameId, TreeError> {
        if id.is_root() {
            return Ok(FrameId::ROOT);
        }
        let frame = self.frame(id)?;
        if frame.is_joint() {
            Ok(self.frame(frame.joint_parent_id)?.parent_id)
        } else {
            Ok(frame.parent_id)
        }
    }

    /// Whether a frame of `kind` may be placed in the body of `parent_id`.
    ///
    /// Walks the whole chain to the root: every block ancestor's forbidden set must exclude
    /// `kind`. A container's forbidden set only governs its direct children.
    pub fn is_allowed_in(&self, kind: FrameKind, parent_id: FrameId) -> Result<bool, TreeError> {
        if !self.frame(parent_id)?.allows_children() {
            return Ok(false);
        }
        self.ancestors_allow(kind, parent_id, true)
    }

    /// Forbidden-set walk from `start` to the root. `direct` marks `start` as the frame's
    /// own parent rather than a more distant ancestor.
    pub(crate) fn ancestors_allow(
        &self,
        kind: FrameKind,
        start: FrameId,
        direct: bool,
    ) -> Result<bool, TreeError> {
        let mut current = start;
        let mut governs_containers = direct;
        loop {
            let frame = self.frame(current)?;
            if (governs_containers || !frame.is_container()) && frame.kind.forbids(kind) {
                return Ok(false);
            }
            if current.is_root() {
                return Ok(true);
            }
            governs_containers = false;
            current = if frame.is_joint() {
                frame.joint_parent_id
            } else {
                frame.parent_id
            };
        }
    }

    /// The frame, its body descendants and (for a joint head) its continuations with theirs.
    pub fn subtree_ids(&self, id: FrameId) -> Result<Vec<FrameId>, TreeError> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let frame = self.frame(current)?;
            ids.push(current);
            stack.extend(frame.joint_frame_ids.iter().rev());
            stack.extend(frame.children_ids.iter().rev());
        }
        Ok(ids)
    }

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), TreeError> {
        let root = self.frame(FrameId::ROOT)?;
        if root.kind != FrameKind::Root {
            return Err(violation(format!("frame 0 is a {:?}, not the root", root.kind)));
        }
        for (id, frame) in &self.frames {
            if frame.is_container() && frame.parent_id != FrameId::ROOT {
                return Err(violation(format!("container {} is nested under {}", id, frame.parent_id)));
            }
            for slot in frame.label_slots.values() {
                if !slot.slots.is_consistent() {
                    return Err(violation(format!("frame {} holds an inconsistent slot", id)));
                }
            }
        }
        for child in &root.children_ids {
            if !self.frame(*child)?.is_container() {
                return Err(violation(format!("root holds non-container frame {}", child)));
            }
        }

        for frame in self.frames.values() {
            for child_id in &frame.children_ids {
                let child = self.frame(*child_id)?;
                if child.parent_id != frame.id || child.is_joint() {
                    return Err(violation(format!(
                        "child {} does not point back to parent {}",
                        child_id, frame.id
                    )));
                }
                if !child.is_container() && !self.is_allowed_in(child.kind, frame.id)? {
                    return Err(violation(format!(
                        "{:?} frame {} is forbidden under {}",
                        child.kind, child_id, frame.id
                    )));
                }
            }
            if !frame.joint_frame_ids.is_empty() && frame.is_joint() {
                return Err(violation(format!("joint frame {} owns joint frames", frame.id)));
            }
            for joint_id in &frame.joint_frame_ids {
                let joint = self.frame(*joint_id)?;
                if joint.joint_parent_id != frame.id || !joint.kind.is_joint_frame() {
                    return Err(violation(format!(
                        "joint frame {} does not point back to head {}",
                        joint_id, frame.id
                    )));
                }
            }
            let members = self.joint_kinds(frame.id)?;
            if !frame.kind.accepts_joint_sequence(&members) {
                return Err(violation(format!(
                    "joint group {} is out of order: {:?} after {:?}",
                    frame.id, members, frame.kind
                )));
            }
        }

        let entries = Walker::with_config(
            self,
            WalkerConfig {
                include_containers: true,
                ..WalkerConfig::default()
            },
        )
        .walk()?;
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.frame_id) {
                return Err(violation(format!("frame {} is reachable twice", entry.frame_id)));
            }
        }
        if seen.len() + 1 != self.frames.len() {
            return Err(violation(format!(
                "{} frames stored but only {} reachable from the root",
                self.frames.len(),
                seen.len() + 1
            )));
        }

        self.frame(self.cursor.frame_id)?;
        if self.cursor.position == CaretPosition::InsideBody
            && !self.frame(self.cursor.frame_id)?.allows_children()
        {
            return Err(violation(format!(
                "cursor inside the body of frame {} which has none",
                self.cursor.frame_id
            )));
        }
        Ok(())
    }

    pub(crate) fn insert_raw(&mut self, frame: Frame) {
        self.frames.insert(frame.id, frame);
    }

    pub(crate) fn remove_raw(&mut self, id: FrameId) -> Option<Frame> {
        self.frames.remove(&id)
    }
}

fn violation(message: String) -> TreeError {
    TreeError::InvariantViolation(message)
}
