//! Structural delete driven by the Delete and Backspace keys.

use super::{Direction, Navigator};
use crate::error::TreeError;
use crate::tree::{FrameTree, RemoveMode};
use crate::types::Cursor;
use crate::types::FrameId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which delete key was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteKey {
    /// "Delete": removes the frame after the caret, body included
    Forward,
    /// "Backspace": removes the frame the caret sits below, keeping its body
    Backward,
}

/// What a structural delete did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub removed: Option<FrameId>,
    /// The removed frame reached the large-deletion threshold
    pub large_deletion_warning: bool,
}

/// Resolve and perform a structural delete at the tree's cursor.
///
/// `threshold` is the descendant count at which the deletion is reported as large; the
/// deletion proceeds either way.
pub fn structural_delete(
    tree: &mut FrameTree,
    key: DeleteKey,
    threshold: usize,
) -> Result<DeleteOutcome, TreeError> {
    let cursor = tree.cursor();
    let (target, mode, landing) = match key {
        DeleteKey::Forward => (forward_target(tree, cursor)?, RemoveMode::Hard, None),
        DeleteKey::Backward => {
            if tree.frame(cursor.frame_id)?.is_container() {
                return Ok(DeleteOutcome::default());
            }
            if cursor.is_inside_body() {
                let up = Navigator::new(tree).step(cursor, Direction::Up)?;
                tree.set_cursor(up)?;
                return Ok(DeleteOutcome::default());
            }
            let landing = backward_landing(tree, cursor)?;
            (Some(cursor.frame_id), RemoveMode::Merge, Some(landing))
        }
    };

    let Some(target) = target else {
        return Ok(DeleteOutcome::default());
    };

    let large_deletion_warning = tree.count_descendants(target, Some(threshold))? >= threshold;
    if large_deletion_warning {
        warn!(frame = %target, threshold, "Large deletion");
    }
    tree.remove(target, mode)?;
    if let Some(landing) = landing {
        tree.set_cursor(landing)?;
    }
    debug!(frame = %target, key = ?key, "Structural delete");
    Ok(DeleteOutcome {
        removed: Some(target),
        large_deletion_warning,
    })
}

/// Frame right after the caret, never a container.
fn forward_target(tree: &FrameTree, cursor: Cursor) -> Result<Option<FrameId>, TreeError> {
    let siblings = Navigator::new(tree).acting_siblings(cursor, Direction::Down)?;
    let next = siblings
        .iter()
        .position(|id| *id == cursor.frame_id)
        .and_then(|i| siblings.get(i + 1))
        .copied();
    match next {
        Some(id) if !tree.frame(id)?.is_container() => Ok(Some(id)),
        _ => Ok(None),
    }
}

/// Caret position after a backspace below `cursor.frame_id`: below the previous sibling, or
/// at the top of the owning body when there is none.
fn backward_landing(tree: &FrameTree, cursor: Cursor) -> Result<Cursor, TreeError> {
    let siblings = Navigator::new(tree).acting_siblings(cursor, Direction::Down)?;
    let previous = siblings
        .iter()
        .position(|id| *id == cursor.frame_id)
        .filter(|i| *i > 0)
        .map(|i| siblings[i - 1]);
    Ok(match previous {
        Some(id) => Cursor::below(id),
        None => Cursor::inside(tree.logical_parent(cursor.frame_id)?),
    })
}
