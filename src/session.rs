//! Editor Session
//!
//! One editing session over a frame tree: the operations a host UI calls in response to
//! user input, wired to the configured emitter, importer and navigation rules.

use crate::collab::{ExecutionEngine, ExecutionOutcome, SourceParser};
use crate::config::EditorConfig;
use crate::emit::{EmittedProgram, Emitter};
use crate::error::TreeError;
use crate::frame::FrameKind;
use crate::import::{self, SyntaxNode};
use crate::navigation::{self, DeleteKey, DeleteOutcome, Direction, FocusMove, SlotFocus};
use crate::tree::FrameTree;
use crate::types::{Cursor, FrameId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Message for the host to surface to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// A delete removed a frame with at least `threshold` descendants
    LargeDeletion { frame: FrameId, threshold: usize },
    /// The pasted text could not be parsed or imported
    PasteRejected { reason: String },
    /// The program stopped with an error that names no line
    RuntimeError { message: String },
}

/// Editor session
pub struct EditorSession {
    tree: FrameTree,
    config: EditorConfig,
    focus: Option<SlotFocus>,
    notices: Vec<Notice>,
}

impl EditorSession {
    /// Start with an empty program.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_tree(FrameTree::new(), config)
    }

    pub fn with_tree(tree: FrameTree, config: EditorConfig) -> Self {
        Self {
            tree,
            config,
            focus: None,
            notices: Vec::new(),
        }
    }

    pub fn tree(&self) -> &FrameTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FrameTree {
        &mut self.tree
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn cursor(&self) -> Cursor {
        self.tree.cursor()
    }

    pub fn focus(&self) -> Option<SlotFocus> {
        self.focus
    }

    pub fn into_tree(self) -> FrameTree {
        self.tree
    }

    /// Insert a frame at the caret; `None` when the variant is not allowed there.
    pub fn insert(&mut self, kind: FrameKind) -> Result<Option<FrameId>, TreeError> {
        let inserted = self.tree.insert(kind)?;
        if inserted.is_some() {
            self.focus = None;
        }
        Ok(inserted)
    }

    /// Apply a directional key.
    pub fn navigate(&mut self, direction: Direction) -> Result<Cursor, TreeError> {
        let FocusMove { cursor, focus } =
            navigation::focus::move_horizontal(&self.tree, self.tree.cursor(), self.focus, direction)?;
        self.tree.set_cursor(cursor)?;
        self.focus = focus;
        Ok(cursor)
    }

    /// Apply Delete or Backspace at the caret.
    pub fn delete(&mut self, key: DeleteKey) -> Result<DeleteOutcome, TreeError> {
        let threshold = self.config.large_deletion_threshold;
        let outcome = navigation::delete::structural_delete(&mut self.tree, key, threshold)?;
        if let (Some(frame), true) = (outcome.removed, outcome.large_deletion_warning) {
            self.notices.push(Notice::LargeDeletion { frame, threshold });
        }
        if self
            .focus
            .is_some_and(|focus| !self.tree.contains(focus.frame_id))
        {
            self.focus = None;
        }
        Ok(outcome)
    }

    /// Emit the program with the configured indentation.
    pub fn emit(&self) -> Result<EmittedProgram, TreeError> {
        Emitter::with_indent(&self.tree, &self.config.indent).emit()
    }

    /// Lint the current program and annotate the frames. Returns the number of applied
    /// diagnostics.
    pub fn lint(&mut self, parser: &dyn SourceParser) -> Result<usize, TreeError> {
        let program = self.emit()?;
        let diagnostics = parser.lint(&program.text);
        self.tree.apply_diagnostics(&diagnostics, &program.positions)
    }

    /// Run the current program and map a runtime failure back to its frame.
    pub fn run(&mut self, engine: &dyn ExecutionEngine) -> Result<ExecutionOutcome, TreeError> {
        let program = self.emit()?;
        self.tree.clear_errors();
        let outcome = engine.run(&program.text, &program.positions);
        match &outcome {
            ExecutionOutcome::Completed => {}
            ExecutionOutcome::Failed(failure) => {
                if self
                    .tree
                    .apply_runtime_failure(failure, &program.positions)?
                    .is_none()
                {
                    self.notices.push(Notice::RuntimeError {
                        message: failure.message.clone(),
                    });
                }
            }
            ExecutionOutcome::FailedWithoutLine(message) => {
                self.notices.push(Notice::RuntimeError {
                    message: message.clone(),
                });
            }
        }
        Ok(outcome)
    }

    /// Parse pasted program text and import it at the caret.
    pub fn paste_source(&mut self, parser: &dyn SourceParser, text: &str) -> bool {
        match parser.parse(text) {
            Ok(root) => self.import_from_parsed_text(&root),
            Err(failure) => {
                warn!(error = %failure.message, "Pasted text did not parse");
                self.notices.push(Notice::PasteRejected {
                    reason: failure.message,
                });
                false
            }
        }
    }

    /// Import an already parsed program at the caret.
    pub fn import_from_parsed_text(&mut self, root: &SyntaxNode) -> bool {
        let imported = import::import_from_parsed_text(&mut self.tree, root, &self.config.import);
        if imported {
            self.focus = None;
        } else {
            self.notices.push(Notice::PasteRejected {
                reason: "the pasted code has no frame representation here".to_string(),
            });
        }
        debug!(imported, "Paste handled");
        imported
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
