//! Tree Importer
//!
//! Rebuilds frames from a generic parsed syntax tree (one node per grammar production).
//! New frames are collected in a [`FrameBatch`] outside the live tree and committed in one
//! step, so a failed import never leaves partial content behind.

pub mod slots;
pub mod statements;

pub use slots::{dig_value, is_operator, to_slots};
pub use statements::Importer;

use crate::config::ImportConfig;
use crate::tree::FrameTree;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Grammar production tags understood by the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    // Wrappers
    FileInput,
    Stmt,
    SimpleStmt,
    SmallStmt,
    FlowStmt,
    CompoundStmt,
    Suite,
    // Statements
    ExprStmt,
    PassStmt,
    BreakStmt,
    ContinueStmt,
    RaiseStmt,
    ReturnStmt,
    GlobalStmt,
    ImportName,
    ImportFrom,
    IfStmt,
    WhileStmt,
    ForStmt,
    TryStmt,
    WithStmt,
    Funcdef,
    // Statements without a frame variant
    Classdef,
    Decorated,
    AsyncStmt,
    DelStmt,
    AssertStmt,
    NonlocalStmt,
    // Clause and expression productions
    ExceptClause,
    WithItem,
    Parameters,
    Trailer,
    CompOp,
    Augassign,
    Expression,
    // Terminal token (names, literals, keywords, punctuation, layout)
    Token,
}

impl SyntaxKind {
    /// Nodes that only group statements.
    pub fn is_wrapper(self) -> bool {
        matches!(
            self,
            SyntaxKind::FileInput
                | SyntaxKind::Stmt
                | SyntaxKind::SimpleStmt
                | SyntaxKind::SmallStmt
                | SyntaxKind::FlowStmt
                | SyntaxKind::CompoundStmt
                | SyntaxKind::Suite
        )
    }

    /// Statement productions no frame variant can represent.
    pub fn is_unsupported_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Classdef
                | SyntaxKind::Decorated
                | SyntaxKind::AsyncStmt
                | SyntaxKind::DelStmt
                | SyntaxKind::AssertStmt
                | SyntaxKind::NonlocalStmt
        )
    }

    /// Grammar name of the production, as parsers spell it.
    pub fn name(self) -> &'static str {
        match self {
            SyntaxKind::FileInput => "file_input",
            SyntaxKind::Stmt => "stmt",
            SyntaxKind::SimpleStmt => "simple_stmt",
            SyntaxKind::SmallStmt => "small_stmt",
            SyntaxKind::FlowStmt => "flow_stmt",
            SyntaxKind::CompoundStmt => "compound_stmt",
            SyntaxKind::Suite => "suite",
            SyntaxKind::ExprStmt => "expr_stmt",
            SyntaxKind::PassStmt => "pass_stmt",
            SyntaxKind::BreakStmt => "break_stmt",
            SyntaxKind::ContinueStmt => "continue_stmt",
            SyntaxKind::RaiseStmt => "raise_stmt",
            SyntaxKind::ReturnStmt => "return_stmt",
            SyntaxKind::GlobalStmt => "global_stmt",
            SyntaxKind::ImportName => "import_name",
            SyntaxKind::ImportFrom => "import_from",
            SyntaxKind::IfStmt => "if_stmt",
            SyntaxKind::WhileStmt => "while_stmt",
            SyntaxKind::ForStmt => "for_stmt",
            SyntaxKind::TryStmt => "try_stmt",
            SyntaxKind::WithStmt => "with_stmt",
            SyntaxKind::Funcdef => "funcdef",
            SyntaxKind::Classdef => "classdef",
            SyntaxKind::Decorated => "decorated",
            SyntaxKind::AsyncStmt => "async_stmt",
            SyntaxKind::DelStmt => "del_stmt",
            SyntaxKind::AssertStmt => "assert_stmt",
            SyntaxKind::NonlocalStmt => "nonlocal_stmt",
            SyntaxKind::ExceptClause => "except_clause",
            SyntaxKind::WithItem => "with_item",
            SyntaxKind::Parameters => "parameters",
            SyntaxKind::Trailer => "trailer",
            SyntaxKind::CompOp => "comp_op",
            SyntaxKind::Augassign => "augassign",
            SyntaxKind::Expression => "expression",
            SyntaxKind::Token => "token",
        }
    }
}

/// One node of a parsed syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SyntaxNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl SyntaxNode {
    /// A terminal token carrying its source text.
    pub fn token(value: impl Into<String>) -> Self {
        Self {
            kind: SyntaxKind::Token,
            value: Some(value.into()),
            children: None,
            line: None,
            column: None,
        }
    }

    /// An interior production node.
    pub fn node(kind: SyntaxKind, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            value: None,
            children: Some(children),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Children, empty for terminals.
    pub fn children(&self) -> &[SyntaxNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// The same production restricted to a range of its children.
    pub fn with_children(&self, children: &[SyntaxNode]) -> Self {
        Self {
            kind: self.kind,
            value: self.value.clone(),
            children: Some(children.to_vec()),
            line: self.line,
            column: self.column,
        }
    }

    /// True when this node is the terminal `text`.
    pub fn is_token(&self, text: &str) -> bool {
        self.value.as_deref() == Some(text)
    }
}

/// Import a parsed program at the tree's cursor.
///
/// Returns `true` when the whole batch was spliced in; on any failure the tree is left
/// exactly as it was and `false` is returned.
#[instrument(skip(tree, root, config), fields(kind = root.kind.name()))]
pub fn import_from_parsed_text(
    tree: &mut FrameTree,
    root: &SyntaxNode,
    config: &ImportConfig,
) -> bool {
    let start = Instant::now();
    let importer = Importer::new(config.clone(), tree.next_id());
    let batch = match importer.build(root) {
        Ok(batch) => batch,
        Err(err) => {
            warn!(error = %err, "Import aborted while reducing syntax tree");
            return false;
        }
    };
    let frame_count = batch.frames.len();
    match tree.splice_imported(batch) {
        Ok(placed) => {
            info!(
                frames = frame_count,
                top_level = placed.len(),
                duration_ms = start.elapsed().as_millis(),
                "Import completed"
            );
            true
        }
        Err(err) => {
            warn!(error = %err, "Import rejected by the frame tree");
            false
        }
    }
}
