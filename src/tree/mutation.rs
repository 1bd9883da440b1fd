//! Structural mutations of the frame tree
//!
//! Every function here either fails before touching the arena or leaves the tree consistent.

use crate::error::TreeError;
use crate::frame::{Frame, FrameKind, LabelSlot};
use crate::tree::{FrameBatch, FrameTree};
use crate::types::{Cursor, FrameId};
use tracing::debug;

/// How `remove` treats the body of the removed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMode {
    /// Drop the frame with its whole body (and joint group, for a head)
    Hard,
    /// Drop the frame but splice its body into the enclosing list
    Merge,
}

impl FrameTree {
    /// Insert a new frame of `kind` at the cursor.
    ///
    /// Returns `Ok(None)` without touching the tree when the variant may not go there.
    pub fn insert(&mut self, kind: FrameKind) -> Result<Option<FrameId>, TreeError> {
        if kind.is_container() || kind == FrameKind::Root {
            return Ok(None);
        }
        let anchor_id = self.cursor().frame_id;
        let anchor = self.frame(anchor_id)?;

        if kind.is_joint_frame() {
            if anchor.is_container() {
                return Ok(None);
            }
            let head_id = self.joint_head(anchor_id)?;
            let index = if anchor.is_joint() {
                self.joint_index(head_id, anchor_id)? + 1
            } else {
                self.frame(head_id)?.joint_frame_ids.len()
            };
            let mut members = self.joint_kinds(head_id)?;
            members.insert(index, kind);
            if !self.frame(head_id)?.kind.accepts_joint_sequence(&members) {
                debug!(kind = ?kind, head = %head_id, index, "Joint insert rejected by group order");
                return Ok(None);
            }
            let id = self.allocate_id();
            let mut frame = Frame::new(id, kind);
            frame.joint_parent_id = head_id;
            self.insert_raw(frame);
            self.frame_mut(head_id)?.joint_frame_ids.insert(index, id);
            self.set_cursor(Cursor::inside(id))?;
            debug!(frame = %id, head = %head_id, kind = ?kind, "Inserted joint frame");
            return Ok(Some(id));
        }

        let (parent_id, index) = self.insertion_point()?;
        if !self.is_allowed_in(kind, parent_id)? {
            debug!(kind = ?kind, parent = %parent_id, "Insert rejected by forbidden descendants");
            return Ok(None);
        }
        let id = self.allocate_id();
        let mut frame = Frame::new(id, kind);
        frame.parent_id = parent_id;
        self.insert_raw(frame);
        self.frame_mut(parent_id)?.children_ids.insert(index, id);
        let cursor = if kind.allows_children() {
            Cursor::inside(id)
        } else {
            Cursor::below(id)
        };
        self.set_cursor(cursor)?;
        debug!(frame = %id, parent = %parent_id, index, kind = ?kind, "Inserted frame");
        Ok(Some(id))
    }

    /// Body list and index where a new non-joint frame goes for the current cursor.
    pub fn insertion_point(&self) -> Result<(FrameId, usize), TreeError> {
        let cursor = self.cursor();
        let anchor = self.frame(cursor.frame_id)?;
        if anchor.kind == FrameKind::Root {
            return Err(TreeError::InvariantViolation(
                "cursor rests on the root frame".to_string(),
            ));
        }
        if anchor.is_container() || (cursor.is_inside_body() && anchor.allows_children()) {
            return Ok((anchor.id, 0));
        }
        let head_id = self.joint_head(anchor.id)?;
        let parent_id = self.frame(head_id)?.parent_id;
        let index = self.child_index(parent_id, head_id)? + 1;
        Ok((parent_id, index))
    }

    /// Remove a frame. Containers and the root cannot be removed.
    pub fn remove(&mut self, id: FrameId, mode: RemoveMode) -> Result<(), TreeError> {
        let frame = self.frame(id)?;
        if frame.is_container() || id.is_root() {
            return Err(TreeError::ContainerNotRemovable(id));
        }
        let fallback = self.fallback_cursor(id)?;
        let mode = if mode == RemoveMode::Merge && !self.merge_is_legal(id)? {
            debug!(frame = %id, "Body cannot move up, removing it with the frame");
            RemoveMode::Hard
        } else {
            mode
        };
        match mode {
            RemoveMode::Hard => self.remove_hard(id)?,
            RemoveMode::Merge => self.remove_merge(id)?,
        }
        if !self.contains(self.cursor().frame_id) {
            self.set_cursor(fallback)?;
        }
        debug!(frame = %id, mode = ?mode, "Removed frame");
        Ok(())
    }

    fn remove_hard(&mut self, id: FrameId) -> Result<(), TreeError> {
        let doomed = self.subtree_ids(id)?;
        self.unlink(id)?;
        for frame_id in doomed {
            self.remove_raw(frame_id);
        }
        Ok(())
    }

    /// Whether every frame a merge would relocate is allowed in the body receiving it.
    fn merge_is_legal(&self, id: FrameId) -> Result<bool, TreeError> {
        let frame = self.frame(id)?;
        let (receiver, mut moved) = if frame.is_joint() {
            let head_id = frame.joint_parent_id;
            let position = self.joint_index(head_id, id)?;
            let receiver = match position {
                0 => head_id,
                _ => self.frame(head_id)?.joint_frame_ids[position - 1],
            };
            (receiver, frame.children_ids.clone())
        } else {
            (frame.parent_id, frame.children_ids.clone())
        };
        if !frame.is_joint() {
            for joint_id in &frame.joint_frame_ids {
                moved.extend(self.frame(*joint_id)?.children_ids.iter().copied());
            }
        }
        for child_id in moved {
            if !self.is_allowed_in(self.frame(child_id)?.kind, receiver)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn remove_merge(&mut self, id: FrameId) -> Result<(), TreeError> {
        let frame = self.frame(id)?.clone();
        if frame.is_joint() {
            let head_id = frame.joint_parent_id;
            let position = self.joint_index(head_id, id)?;
            let receiver = if position > 0 {
                self.frame(head_id)?.joint_frame_ids[position - 1]
            } else {
                head_id
            };
            self.adopt(&frame.children_ids, receiver)?;
            self.frame_mut(receiver)?
                .children_ids
                .extend(frame.children_ids.iter().copied());
            self.frame_mut(head_id)?.joint_frame_ids.remove(position);
            self.remove_raw(id);
            return Ok(());
        }

        let parent_id = frame.parent_id;
        let position = self.child_index(parent_id, id)?;
        let mut spliced = frame.children_ids.clone();
        for joint_id in &frame.joint_frame_ids {
            spliced.extend(self.frame(*joint_id)?.children_ids.iter().copied());
        }
        self.adopt(&spliced, parent_id)?;
        self.frame_mut(parent_id)?
            .children_ids
            .splice(position..=position, spliced);
        for joint_id in &frame.joint_frame_ids {
            self.remove_raw(*joint_id);
        }
        self.remove_raw(id);
        Ok(())
    }

    /// Move a frame to `new_index` in the body of `new_parent_id`, or a joint frame to
    /// `new_index` in the joint list of head `new_parent_id`.
    pub fn reorder(
        &mut self,
        id: FrameId,
        new_parent_id: FrameId,
        new_index: usize,
    ) -> Result<(), TreeError> {
        let frame = self.frame(id)?;
        if frame.is_container() || id.is_root() {
            return Err(TreeError::ContainerNotRemovable(id));
        }
        let is_joint = frame.is_joint();
        let kind = frame.kind;
        let target = self.frame(new_parent_id)?;
        let invalid = TreeError::InvalidMove {
            frame: id,
            target: new_parent_id,
        };
        if self.subtree_ids(id)?.contains(&new_parent_id) {
            return Err(invalid);
        }
        if is_joint {
            if target.is_joint() {
                return Err(invalid);
            }
            let target_kind = target.kind;
            let mut members: Vec<FrameKind> = Vec::new();
            for member in &target.joint_frame_ids {
                if *member != id {
                    members.push(self.frame(*member)?.kind);
                }
            }
            members.insert(new_index.min(members.len()), kind);
            if !target_kind.accepts_joint_sequence(&members) {
                return Err(invalid);
            }
        } else if !self.is_allowed_in(kind, new_parent_id)? {
            return Err(invalid);
        }

        self.unlink(id)?;
        if is_joint {
            let list = &mut self.frame_mut(new_parent_id)?.joint_frame_ids;
            list.insert(new_index.min(list.len()), id);
            self.frame_mut(id)?.joint_parent_id = new_parent_id;
        } else {
            let list = &mut self.frame_mut(new_parent_id)?.children_ids;
            list.insert(new_index.min(list.len()), id);
            self.frame_mut(id)?.parent_id = new_parent_id;
        }
        debug!(frame = %id, parent = %new_parent_id, index = new_index, "Reordered frame");
        Ok(())
    }

    /// Count body and joint-group descendants of a frame.
    ///
    /// With a `limit`, descent stops once the running count reaches it; branches already
    /// entered are still counted in full, so the result may exceed the limit.
    pub fn count_descendants(&self, id: FrameId, limit: Option<usize>) -> Result<usize, TreeError> {
        let frame = self.frame(id)?;
        let below_limit = |count: usize| limit.map_or(true, |limit| count < limit);

        let mut count = frame.children_ids.len();
        if below_limit(count) {
            for child_id in &frame.children_ids {
                count += self.count_descendants(*child_id, limit)?;
            }
            if below_limit(count) {
                for joint_id in &frame.joint_frame_ids {
                    if !self.frame(*joint_id)?.children_ids.is_empty() {
                        count += 1;
                    }
                    count += self.count_descendants(*joint_id, limit)?;
                }
            }
        }
        Ok(count)
    }

    /// Commit a batch of frames built outside the tree at the cursor.
    ///
    /// The insertion point is resolved before anything is written, so a failure leaves the
    /// tree untouched. Returns the ids of the placed top-level frames.
    pub fn splice_imported(&mut self, batch: FrameBatch) -> Result<Vec<FrameId>, TreeError> {
        let (parent_id, index) = self.insertion_point()?;
        for top in &batch.top_level {
            let frame = batch
                .frames
                .get(top)
                .ok_or(TreeError::FrameNotFound(*top))?;
            if !self.is_allowed_in(frame.kind, parent_id)? {
                return Err(TreeError::InvalidMove {
                    frame: *top,
                    target: parent_id,
                });
            }
        }
        for frame in batch.frames.values() {
            if !batch.top_level.contains(&frame.id) && !self.batch_allows(&batch, frame, parent_id)? {
                return Err(TreeError::InvalidMove {
                    frame: frame.id,
                    target: parent_id,
                });
            }
            if !batch_joint_order(&batch, frame)? {
                return Err(TreeError::InvalidMove {
                    frame: frame.id,
                    target: parent_id,
                });
            }
        }
        if let Some(clash) = batch.frames.keys().find(|id| self.contains(**id)) {
            return Err(TreeError::InvariantViolation(format!(
                "imported frame {} collides with an existing frame",
                clash
            )));
        }

        let count = batch.frames.len();
        for (_, mut frame) in batch.frames {
            if batch.top_level.contains(&frame.id) {
                frame.parent_id = parent_id;
            }
            self.insert_raw(frame);
        }
        self.frame_mut(parent_id)?
            .children_ids
            .splice(index..index, batch.top_level.iter().copied());
        self.next_id = self.next_id.max(batch.next_id);
        if let Some(last) = batch.top_level.last() {
            self.set_cursor(Cursor::below(*last))?;
        }
        debug!(parent = %parent_id, index, frames = count, "Spliced imported frames");
        Ok(batch.top_level)
    }

    /// Whether a nested batch frame is legal under its batch ancestors and, past the
    /// batch's top level, under `parent_id` in this tree.
    ///
    /// Joint frames are placed by their group order instead, see `batch_joint_order`.
    /// Their bodies are governed through the head, as in `ancestors_allow`.
    fn batch_allows(
        &self,
        batch: &FrameBatch,
        frame: &Frame,
        parent_id: FrameId,
    ) -> Result<bool, TreeError> {
        if frame.is_joint() {
            return Ok(true);
        }
        let mut current = frame.parent_id;
        loop {
            let Some(owner) = batch.frames.get(&current) else {
                return Ok(true);
            };
            if owner.kind.forbids(frame.kind) {
                return Ok(false);
            }
            if batch.top_level.contains(&current) {
                return self.ancestors_allow(frame.kind, parent_id, false);
            }
            current = if owner.is_joint() {
                owner.joint_parent_id
            } else {
                owner.parent_id
            };
        }
    }

    /// Replace the content of one slot with flat code.
    pub fn set_slot_code(
        &mut self,
        id: FrameId,
        label_index: usize,
        code: &str,
    ) -> Result<(), TreeError> {
        let slot = self
            .frame_mut(id)?
            .label_slots
            .get_mut(&label_index)
            .ok_or(TreeError::SlotNotFound {
                frame: id,
                label_index,
            })?;
        *slot = LabelSlot {
            shown: slot.shown,
            ..LabelSlot::code(code)
        };
        debug!(frame = %id, label_index, "Slot code updated");
        Ok(())
    }

    /// Flip the disabled flag of a frame and apply the new value to its whole subtree.
    pub fn toggle_disabled(&mut self, id: FrameId) -> Result<bool, TreeError> {
        let frame = self.frame(id)?;
        if frame.is_container() || id.is_root() {
            return Err(TreeError::ContainerNotRemovable(id));
        }
        let disabled = !frame.is_disabled;
        for frame_id in self.subtree_ids(id)? {
            self.frame_mut(frame_id)?.is_disabled = disabled;
        }
        debug!(frame = %id, disabled, "Toggled disabled state");
        Ok(disabled)
    }

    /// Detach a frame from whichever adjacency list holds it.
    fn unlink(&mut self, id: FrameId) -> Result<(), TreeError> {
        let frame = self.frame(id)?;
        if frame.is_joint() {
            let head_id = frame.joint_parent_id;
            let position = self.joint_index(head_id, id)?;
            self.frame_mut(head_id)?.joint_frame_ids.remove(position);
        } else {
            let parent_id = frame.parent_id;
            let position = self.child_index(parent_id, id)?;
            self.frame_mut(parent_id)?.children_ids.remove(position);
        }
        Ok(())
    }

    fn adopt(&mut self, children: &[FrameId], parent_id: FrameId) -> Result<(), TreeError> {
        for child_id in children {
            self.frame_mut(*child_id)?.parent_id = parent_id;
        }
        Ok(())
    }

    /// Where the cursor goes when the frame it sits on disappears.
    fn fallback_cursor(&self, id: FrameId) -> Result<Cursor, TreeError> {
        let frame = self.frame(id)?;
        if frame.is_joint() {
            let head_id = frame.joint_parent_id;
            let position = self.joint_index(head_id, id)?;
            let previous = match position {
                0 => head_id,
                _ => self.frame(head_id)?.joint_frame_ids[position - 1],
            };
            return Ok(Cursor::below(previous));
        }
        let parent_id = frame.parent_id;
        let position = self.child_index(parent_id, id)?;
        Ok(match position {
            0 => Cursor::inside(parent_id),
            _ => Cursor::below(self.children(parent_id)?[position - 1]),
        })
    }

    pub(crate) fn child_index(&self, parent_id: FrameId, id: FrameId) -> Result<usize, TreeError> {
        self.children(parent_id)?
            .iter()
            .position(|child| *child == id)
            .ok_or_else(|| {
                TreeError::InvariantViolation(format!("{} is not a child of {}", id, parent_id))
            })
    }

    /// Kinds of a head's joint frames, in group order.
    pub(crate) fn joint_kinds(&self, head_id: FrameId) -> Result<Vec<FrameKind>, TreeError> {
        self.frame(head_id)?
            .joint_frame_ids
            .iter()
            .map(|id| self.frame(*id).map(|joint| joint.kind))
            .collect()
    }

    pub(crate) fn joint_index(&self, head_id: FrameId, id: FrameId) -> Result<usize, TreeError> {
        self.frame(head_id)?
            .joint_frame_ids
            .iter()
            .position(|joint| *joint == id)
            .ok_or_else(|| {
                TreeError::InvariantViolation(format!("{} is not a joint frame of {}", id, head_id))
            })
    }
}

/// Whether the joint group a batch frame heads is in a legal order.
fn batch_joint_order(batch: &FrameBatch, head: &Frame) -> Result<bool, TreeError> {
    let members = head
        .joint_frame_ids
        .iter()
        .map(|id| {
            batch
                .frames
                .get(id)
                .map(|joint| joint.kind)
                .ok_or(TreeError::FrameNotFound(*id))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(head.kind.accepts_joint_sequence(&members))
}
