//! Horizontal movement: slot focus within a frame, and leaving it for the neighbours.

use super::{Direction, Navigator};
use crate::error::TreeError;
use crate::tree::FrameTree;
use crate::types::{Cursor, FrameId};
use serde::{Deserialize, Serialize};

/// Editable slot holding keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotFocus {
    pub frame_id: FrameId,
    pub label_index: usize,
}

impl SlotFocus {
    pub fn new(frame_id: FrameId, label_index: usize) -> Self {
        Self {
            frame_id,
            label_index,
        }
    }
}

/// Result of a horizontal move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusMove {
    pub cursor: Cursor,
    /// `None` when the caret is left positional only
    pub focus: Option<SlotFocus>,
}

impl FocusMove {
    fn positional(cursor: Cursor) -> Self {
        Self {
            cursor,
            focus: None,
        }
    }
}

/// Apply a Left or Right key. Up and Down clear the focus and step vertically.
///
/// With focus on a slot, the focus moves to the adjacent slot of the same frame; at either
/// edge the caret steps vertically and, when it lands on a different frame with editable
/// slots, focuses the nearest one (first going right, last going left). Without focus, the
/// caret enters the slots of the frame it is about to pass, or steps when there are none.
pub fn move_horizontal(
    tree: &FrameTree,
    cursor: Cursor,
    focus: Option<SlotFocus>,
    direction: Direction,
) -> Result<FocusMove, TreeError> {
    let nav = Navigator::new(tree);
    if matches!(direction, Direction::Up | Direction::Down) {
        return Ok(FocusMove::positional(nav.step(cursor, direction)?));
    }
    let forward = direction == Direction::Right;

    if let Some(focus) = focus {
        let slots = tree.frame(focus.frame_id)?.editable_slots();
        let target = slots
            .iter()
            .position(|index| *index == focus.label_index)
            .and_then(|i| if forward { i.checked_add(1) } else { i.checked_sub(1) })
            .and_then(|i| slots.get(i));
        if let Some(label_index) = target {
            return Ok(FocusMove {
                cursor,
                focus: Some(SlotFocus::new(focus.frame_id, *label_index)),
            });
        }

        let landed = nav.step(cursor, direction)?;
        if landed.frame_id == focus.frame_id {
            return Ok(FocusMove::positional(landed));
        }
        return Ok(match edge_slot(tree, landed.frame_id, forward)? {
            Some(label_index) => FocusMove {
                cursor: landed,
                focus: Some(SlotFocus::new(landed.frame_id, label_index)),
            },
            None => FocusMove::positional(landed),
        });
    }

    let current = tree.frame(cursor.frame_id)?;
    let next_frame = if forward {
        if cursor.is_inside_body() && current.children_ids.is_empty() {
            return Ok(FocusMove::positional(nav.step(cursor, direction)?));
        }
        // Joint continuations are spliced in after their head.
        let siblings = nav.acting_siblings(cursor, Direction::Down)?;
        match siblings
            .iter()
            .position(|id| *id == current.id)
            .and_then(|i| siblings.get(i + 1))
        {
            Some(next) => *next,
            None => return Ok(FocusMove::positional(nav.step(cursor, direction)?)),
        }
    } else if cursor.is_inside_body() || !current.allows_children() {
        current.id
    } else {
        // Below a compound frame: Left goes back into its body.
        return Ok(FocusMove::positional(nav.step(cursor, direction)?));
    };

    match edge_slot(tree, next_frame, forward)? {
        Some(label_index) => {
            let frame = tree.frame(next_frame)?;
            let cursor = if frame.id == cursor.frame_id {
                cursor
            } else if frame.allows_children() {
                Cursor::inside(frame.id)
            } else {
                Cursor::below(frame.id)
            };
            Ok(FocusMove {
                cursor,
                focus: Some(SlotFocus::new(next_frame, label_index)),
            })
        }
        None => Ok(FocusMove::positional(nav.step(cursor, direction)?)),
    }
}

fn edge_slot(tree: &FrameTree, id: FrameId, first: bool) -> Result<Option<usize>, TreeError> {
    let slots = tree.frame(id)?.editable_slots();
    Ok(if first {
        slots.first().copied()
    } else {
        slots.last().copied()
    })
}
