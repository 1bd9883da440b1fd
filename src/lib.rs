//! Frametree: Structural Core of a Frame-Based Program Editor
//!
//! Programs are edited as a tree of frames (statements and compound headers with editable
//! slots) instead of free text. This crate owns that tree and its invariants, linearizes it
//! into indented program text with a position map for routing errors back, imports parsed
//! syntax trees into frames, and drives caret navigation and structural deletion.

pub mod cli;
pub mod collab;
pub mod config;
pub mod emit;
pub mod error;
pub mod frame;
pub mod import;
pub mod logging;
pub mod navigation;
pub mod session;
pub mod tree;
pub mod types;

pub use emit::{EmittedProgram, Emitter, LinePositionMap};
pub use error::{ApiError, ImportError, TreeError};
pub use frame::{Frame, FrameKind};
pub use session::{EditorSession, Notice};
pub use tree::FrameTree;
pub use types::{CaretPosition, Cursor, FrameId};
