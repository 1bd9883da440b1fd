//! Depth-first walker over frames in program order

use crate::error::TreeError;
use crate::tree::FrameTree;
use crate::types::FrameId;

/// How a walked frame relates to the frame that led to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    /// One of the three top-level containers
    Container,
    /// A frame in some body
    Body,
    /// A joint continuation of the preceding head
    Joint,
}

/// A visited frame with its indentation depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub frame_id: FrameId,
    /// Number of enclosing bodies; container children sit at depth 0
    pub depth: usize,
    pub role: EntryRole,
}

/// Walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Report the containers themselves as entries
    pub include_containers: bool,
    /// Maximum body depth to descend into (None = unlimited)
    pub max_depth: Option<usize>,
}

/// Frame walker
pub struct Walker<'a> {
    tree: &'a FrameTree,
    config: WalkerConfig,
}

impl<'a> Walker<'a> {
    pub fn new(tree: &'a FrameTree) -> Self {
        Self {
            tree,
            config: WalkerConfig::default(),
        }
    }

    pub fn with_config(tree: &'a FrameTree, config: WalkerConfig) -> Self {
        Self { tree, config }
    }

    /// Visit every frame under the root in the order the program text lists them.
    ///
    /// A head is followed by its body, then by each joint frame and that frame's body.
    pub fn walk(&self) -> Result<Vec<Entry>, TreeError> {
        let mut entries = Vec::new();
        for container_id in self.tree.children(FrameId::ROOT)? {
            if self.config.include_containers {
                entries.push(Entry {
                    frame_id: *container_id,
                    depth: 0,
                    role: EntryRole::Container,
                });
            }
            self.walk_body(*container_id, 0, &mut entries)?;
        }
        Ok(entries)
    }

    /// Walk only the body below `frame_id` (the frame itself excluded).
    pub fn walk_from(&self, frame_id: FrameId) -> Result<Vec<Entry>, TreeError> {
        let mut entries = Vec::new();
        self.walk_body(frame_id, 0, &mut entries)?;
        Ok(entries)
    }

    fn walk_body(
        &self,
        parent_id: FrameId,
        depth: usize,
        entries: &mut Vec<Entry>,
    ) -> Result<(), TreeError> {
        if self.config.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        for child_id in self.tree.children(parent_id)? {
            entries.push(Entry {
                frame_id: *child_id,
                depth,
                role: EntryRole::Body,
            });
            self.walk_body(*child_id, depth + 1, entries)?;
            for joint_id in &self.tree.frame(*child_id)?.joint_frame_ids {
                entries.push(Entry {
                    frame_id: *joint_id,
                    depth,
                    role: EntryRole::Joint,
                });
                self.walk_body(*joint_id, depth + 1, entries)?;
            }
        }
        Ok(())
    }
}
