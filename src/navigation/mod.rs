//! Caret navigation over the frame tree
//!
//! A read-only state machine: given the tree shape and a cursor, compute where a directional
//! key moves the caret. Joint groups (`if`/`elif`/`else`, ...) are traversed as one flat run
//! of siblings, and the three containers are chained top to bottom.

pub mod delete;
pub mod focus;

pub use delete::{DeleteKey, DeleteOutcome};
pub use focus::{FocusMove, SlotFocus};

use crate::error::TreeError;
use crate::tree::FrameTree;
use crate::types::{CaretPosition, Cursor, FrameId};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Directional key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Vertical counterpart used when a horizontal move leaves the current frame.
    pub fn vertical(self) -> Direction {
        match self {
            Direction::Left | Direction::Up => Direction::Up,
            Direction::Right | Direction::Down => Direction::Down,
        }
    }
}

/// Read-only navigator bound to one tree
pub struct Navigator<'a> {
    tree: &'a FrameTree,
}

impl<'a> Navigator<'a> {
    pub fn new(tree: &'a FrameTree) -> Self {
        Self { tree }
    }

    /// Sibling run the caret moves through from `cursor`.
    ///
    /// Starts from the owning body's children and splices the current joint group in after
    /// its head. Moving up additionally exposes what sits just above the current frame (the
    /// previous head's joint frames, or the previous container's content); moving down from
    /// inside a body exposes that body's children.
    pub fn acting_siblings(
        &self,
        cursor: Cursor,
        direction: Direction,
    ) -> Result<Vec<FrameId>, TreeError> {
        let current = self.tree.frame(cursor.frame_id)?;
        let parent_id = self.tree.logical_parent(current.id)?;
        let mut siblings = self.tree.children(parent_id)?.to_vec();

        if current.is_joint() || !current.joint_frame_ids.is_empty() {
            let head_id = self.tree.joint_head(current.id)?;
            if let Some(head_index) = siblings.iter().position(|id| *id == head_id) {
                let joints = self.tree.frame(head_id)?.joint_frame_ids.clone();
                splice_at(&mut siblings, head_index + 1, &joints);
            }
        }

        let Some(index) = siblings.iter().position(|id| *id == current.id) else {
            return Ok(siblings);
        };

        match direction.vertical() {
            Direction::Up => {
                if index > 0 {
                    let previous_id = siblings[index - 1];
                    let previous = self.tree.frame(previous_id)?;
                    let exposed = if current.is_container() {
                        previous.children_ids.clone()
                    } else if previous_id == self.tree.joint_head(current.id)? {
                        // Already spliced in above.
                        Vec::new()
                    } else {
                        previous.joint_frame_ids.clone()
                    };
                    splice_at(&mut siblings, index, &exposed);
                }
            }
            _ => {
                if cursor.is_inside_body() {
                    splice_at(&mut siblings, index + 1, &current.children_ids);
                }
            }
        }
        Ok(siblings)
    }

    /// Cursor after a vertical move. Horizontal directions are treated as their vertical
    /// counterpart; slot focus is handled by [`focus::move_horizontal`].
    pub fn step(&self, cursor: Cursor, direction: Direction) -> Result<Cursor, TreeError> {
        let next = match direction.vertical() {
            Direction::Up => self.up(cursor)?,
            _ => self.down(cursor)?,
        };
        trace!(from = %cursor, to = %next, direction = ?direction, "Caret step");
        Ok(next)
    }

    fn down(&self, cursor: Cursor) -> Result<Cursor, TreeError> {
        let current = self.tree.frame(cursor.frame_id)?;
        let siblings = self.acting_siblings(cursor, Direction::Down)?;

        if cursor.is_inside_body() {
            if let Some(first) = current.children_ids.first() {
                return self.landing(*first);
            }
            if current.is_container() {
                return Ok(self
                    .next_container(current.id)?
                    .map(Cursor::inside)
                    .unwrap_or(cursor));
            }
            return Ok(Cursor::below(current.id));
        }

        let index = siblings.iter().position(|id| *id == current.id);
        if let Some(next) = index.and_then(|i| siblings.get(i + 1)) {
            return self.landing(*next);
        }

        let parent_id = self.tree.logical_parent(current.id)?;
        if parent_id.is_root() {
            return Ok(cursor);
        }
        if self.tree.frame(parent_id)?.is_container() {
            return Ok(self
                .next_container(parent_id)?
                .map(Cursor::inside)
                .unwrap_or(cursor));
        }
        Ok(Cursor::below(parent_id))
    }

    fn up(&self, cursor: Cursor) -> Result<Cursor, TreeError> {
        let current = self.tree.frame(cursor.frame_id)?;

        if cursor.position == CaretPosition::BelowFrame && current.allows_children() {
            return Ok(match current.children_ids.last() {
                Some(last) => Cursor::below(*last),
                None => Cursor::inside(current.id),
            });
        }

        let siblings = self.acting_siblings(cursor, Direction::Up)?;
        let index = siblings.iter().position(|id| *id == current.id);
        if let Some(previous) = index.filter(|i| *i > 0).map(|i| siblings[i - 1]) {
            return Ok(if self.tree.frame(previous)?.is_container() {
                Cursor::inside(previous)
            } else {
                Cursor::below(previous)
            });
        }

        let parent_id = self.tree.logical_parent(current.id)?;
        Ok(if parent_id.is_root() {
            Cursor::inside(current.id)
        } else {
            Cursor::inside(parent_id)
        })
    }

    /// Caret placement when entering `id` from above: its body if it has one, else below it.
    fn landing(&self, id: FrameId) -> Result<Cursor, TreeError> {
        Ok(if self.tree.frame(id)?.allows_children() {
            Cursor::inside(id)
        } else {
            Cursor::below(id)
        })
    }

    fn next_container(&self, container_id: FrameId) -> Result<Option<FrameId>, TreeError> {
        let containers = self.tree.children(FrameId::ROOT)?;
        Ok(containers
            .iter()
            .position(|id| *id == container_id)
            .and_then(|i| containers.get(i + 1))
            .copied())
    }
}

fn splice_at(list: &mut Vec<FrameId>, index: usize, items: &[FrameId]) {
    let index = index.min(list.len());
    list.splice(index..index, items.iter().copied());
}
