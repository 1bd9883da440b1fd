//! Integration tests for tree snapshots and structural invariants

use frametree::tree::{RemoveMode, TreeSnapshot};
use frametree::{Cursor, FrameId, FrameKind, FrameTree, TreeError};
use std::fs;
use tempfile::TempDir;

fn sample_tree() -> FrameTree {
    let mut tree = FrameTree::new();
    let if_id = tree.insert(FrameKind::If).unwrap().unwrap();
    tree.set_slot_code(if_id, 0, "ready").unwrap();
    tree.insert(FrameKind::Break).unwrap().unwrap();
    tree.set_cursor(Cursor::inside(if_id)).unwrap();
    let else_id = tree.insert(FrameKind::Else).unwrap().unwrap();
    tree.insert(FrameKind::Continue).unwrap().unwrap();
    tree.set_cursor(Cursor::below(else_id)).unwrap();
    tree
}

/// A snapshot written to disk reloads into an identical tree
#[test]
fn test_snapshot_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    let tree = sample_tree();
    fs::write(&path, serde_json::to_string_pretty(&tree.snapshot()).unwrap()).unwrap();

    let snapshot: TreeSnapshot = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let reloaded = FrameTree::from_snapshot(snapshot).unwrap();
    assert_eq!(reloaded.snapshot(), tree.snapshot());
    assert_eq!(reloaded.cursor(), tree.cursor());
}

/// Ids handed out after a reload never collide with frames already in the tree
#[test]
fn test_reloaded_tree_keeps_id_counter() {
    let mut tree = sample_tree();
    let removed = tree.children(FrameId::MAIN_CONTAINER).unwrap()[0];
    tree.remove(removed, RemoveMode::Hard).unwrap();

    let mut reloaded = FrameTree::from_snapshot(tree.snapshot()).unwrap();
    let fresh = reloaded.insert(FrameKind::Break).unwrap().unwrap();
    assert!(fresh.get() > removed.get());
    assert!(fresh.get() >= tree.next_id());
}

/// Joint frames never appear in a body list; a snapshot that puts one there is rejected
#[test]
fn test_joint_frame_in_body_is_rejected() {
    let tree = sample_tree();
    let mut snapshot = tree.snapshot();
    let head = tree.children(FrameId::MAIN_CONTAINER).unwrap()[0];
    let else_id = tree.frame(head).unwrap().joint_frame_ids[0];
    for frame in &mut snapshot.frames {
        if frame.id == FrameId::MAIN_CONTAINER {
            frame.children_ids.push(else_id);
        }
    }
    assert!(matches!(
        FrameTree::from_snapshot(snapshot),
        Err(TreeError::InvariantViolation(_))
    ));
}

/// Containers cannot be removed or moved
#[test]
fn test_containers_are_fixed() {
    let mut tree = sample_tree();
    assert_eq!(
        tree.remove(FrameId::MAIN_CONTAINER, RemoveMode::Hard),
        Err(TreeError::ContainerNotRemovable(FrameId::MAIN_CONTAINER))
    );
    assert!(tree.reorder(FrameId::IMPORTS_CONTAINER, FrameId::ROOT, 2).is_err());
    assert_eq!(
        tree.children(FrameId::ROOT).unwrap(),
        &[
            FrameId::IMPORTS_CONTAINER,
            FrameId::FUNC_DEFS_CONTAINER,
            FrameId::MAIN_CONTAINER
        ]
    );
}

/// Removing a joint head takes its whole group and every body with it
#[test]
fn test_hard_remove_of_head_drops_group() {
    let mut tree = sample_tree();
    let head = tree.children(FrameId::MAIN_CONTAINER).unwrap()[0];
    assert_eq!(tree.count_descendants(head, None).unwrap(), 3);

    tree.remove(head, RemoveMode::Hard).unwrap();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.cursor(), Cursor::inside(FrameId::MAIN_CONTAINER));
    tree.validate().unwrap();
}

/// Reordering a frame into another body rewrites its parent link
#[test]
fn test_reorder_between_bodies() {
    let mut tree = FrameTree::new();
    let first = tree.insert(FrameKind::While).unwrap().unwrap();
    tree.set_cursor(Cursor::below(first)).unwrap();
    let stray = tree.insert(FrameKind::Break).unwrap().unwrap();

    tree.reorder(stray, first, 0).unwrap();
    assert_eq!(tree.frame(stray).unwrap().parent_id, first);
    assert_eq!(tree.children(first).unwrap(), &[stray]);
    assert_eq!(tree.children(FrameId::MAIN_CONTAINER).unwrap(), &[first]);
    tree.validate().unwrap();
}
