//! Error types for the frame tree, the importer and the editor facade.

use crate::import::SyntaxKind;
use crate::types::FrameId;
use thiserror::Error;

/// Frame tree errors.
///
/// These are contract violations: callers are expected to only hand out ids that exist.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Frame not found: {0}")]
    FrameNotFound(FrameId),

    #[error("Container frames cannot be removed or moved: {0}")]
    ContainerNotRemovable(FrameId),

    #[error("Invalid move of frame {frame} into {target}")]
    InvalidMove { frame: FrameId, target: FrameId },

    #[error("Slot {label_index} does not exist on frame {frame}")]
    SlotNotFound { frame: FrameId, label_index: usize },

    #[error("Tree invariant violated: {0}")]
    InvariantViolation(String),
}

/// Errors raised while reducing a parsed syntax tree into frames.
///
/// Any of these aborts the whole import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Node of kind {0:?} has neither a value nor children")]
    NodeWithoutValue(SyntaxKind),

    #[error("Cannot find a single value in node of kind {0:?}")]
    AmbiguousValue(SyntaxKind),

    #[error("Unknown operator {token:?} in node of kind {kind:?}")]
    UnknownOperator { kind: SyntaxKind, token: String },

    #[error("Node of kind {kind:?} has no child at index {index}")]
    MissingChild { kind: SyntaxKind, index: usize },

    #[error("Tree error during import: {0}")]
    Tree(#[from] TreeError),
}

/// Errors surfaced by the editor facade and the command line.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Snapshot(err.to_string())
    }
}
