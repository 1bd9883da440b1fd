//! Reduction of statement productions into frames

use crate::config::ImportConfig;
use crate::error::{ImportError, TreeError};
use crate::frame::{Frame, FrameKind, SlotsStructure};
use crate::import::slots::to_slots;
use crate::import::{SyntaxKind, SyntaxNode};
use crate::tree::FrameBatch;
use crate::types::FrameId;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Builds a detached batch of frames from a syntax tree
#[derive(Debug, Clone)]
pub struct Importer {
    config: ImportConfig,
    first_id: i64,
}

impl Importer {
    /// `first_id` is the first id the batch may hand out, normally the tree's next free id.
    pub fn new(config: ImportConfig, first_id: i64) -> Self {
        Self { config, first_id }
    }

    /// Reduce `root` into a batch. Any error discards everything built so far.
    pub fn build(&self, root: &SyntaxNode) -> Result<FrameBatch, ImportError> {
        let mut builder = BatchBuilder {
            config: &self.config,
            frames: BTreeMap::new(),
            next_id: self.first_id,
        };
        let mut top_level = Vec::new();
        builder.reduce(root, None, &mut top_level)?;
        debug!(
            frames = builder.frames.len(),
            top_level = top_level.len(),
            "Syntax tree reduced"
        );
        Ok(FrameBatch {
            frames: builder.frames,
            top_level,
            next_id: builder.next_id,
        })
    }
}

struct BatchBuilder<'a> {
    config: &'a ImportConfig,
    frames: BTreeMap<FrameId, Frame>,
    next_id: i64,
}

fn child(node: &SyntaxNode, index: usize) -> Result<&SyntaxNode, ImportError> {
    node.children().get(index).ok_or(ImportError::MissingChild {
        kind: node.kind,
        index,
    })
}

/// Slot content for everything after the first `from` children (empty when nothing is left).
fn remainder(node: &SyntaxNode, from: usize) -> Result<SlotsStructure, ImportError> {
    let rest = node.children().get(from..).unwrap_or_default();
    if rest.is_empty() {
        return Ok(SlotsStructure::leaf(""));
    }
    to_slots(&node.with_children(rest))
}

fn token_index(node: &SyntaxNode, text: &str) -> Option<usize> {
    node.children().iter().position(|child| child.is_token(text))
}

impl<'a> BatchBuilder<'a> {
    fn reduce(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        match node.kind {
            kind if kind.is_wrapper() => {
                for child in node.children() {
                    if kind == SyntaxKind::Suite && child.kind == SyntaxKind::Token {
                        continue;
                    }
                    self.reduce(child, parent, out)?;
                }
            }
            SyntaxKind::ExprStmt => self.expr_stmt(node, parent, out)?,
            SyntaxKind::PassStmt => {}
            SyntaxKind::BreakStmt => {
                self.add_frame(FrameKind::Break, Vec::new(), parent, out);
            }
            SyntaxKind::ContinueStmt => {
                self.add_frame(FrameKind::Continue, Vec::new(), parent, out);
            }
            SyntaxKind::RaiseStmt => {
                let slot = remainder(node, 1)?;
                self.add_frame(FrameKind::Raise, vec![slot], parent, out);
            }
            SyntaxKind::ReturnStmt => {
                let slot = remainder(node, 1)?;
                self.add_frame(FrameKind::Return, vec![slot], parent, out);
            }
            SyntaxKind::GlobalStmt => {
                let slot = remainder(node, 1)?;
                self.add_frame(FrameKind::Global, vec![slot], parent, out);
            }
            SyntaxKind::ImportName => {
                let slot = remainder(node, 1)?;
                self.add_frame(FrameKind::Import, vec![slot], parent, out);
            }
            SyntaxKind::ImportFrom => self.import_from(node, parent, out)?,
            SyntaxKind::IfStmt => self.if_stmt(node, parent, out)?,
            SyntaxKind::WhileStmt => self.while_stmt(node, parent, out)?,
            SyntaxKind::ForStmt => self.for_stmt(node, parent, out)?,
            SyntaxKind::TryStmt => self.try_stmt(node, parent, out)?,
            SyntaxKind::WithStmt => self.with_stmt(node, parent, out)?,
            SyntaxKind::Funcdef => {
                let slots = vec![to_slots(child(node, 1)?)?, to_slots(child(node, 2)?)?];
                let body = node.children().len().saturating_sub(1);
                let def = self.frame_with_body(node, FrameKind::FuncDef, slots, body, parent, out)?;
                if token_index(node, "->").is_some() {
                    let mut notes = Vec::new();
                    self.unsupported("return_annotation", Some(def), &mut notes);
                    self.frame_mut(def)?.children_ids.splice(0..0, notes);
                }
            }
            kind if kind.is_unsupported_statement() => self.unsupported(kind.name(), parent, out),
            kind => debug!(kind = kind.name(), "Skipping non-statement node"),
        }
        Ok(())
    }

    fn add_frame(
        &mut self,
        kind: FrameKind,
        slots: Vec<SlotsStructure>,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        let mut frame = Frame::with_slots(id, kind, slots);
        frame.parent_id = parent.unwrap_or(FrameId::ROOT);
        self.frames.insert(id, frame);
        out.push(id);
        id
    }

    fn frame_mut(&mut self, id: FrameId) -> Result<&mut Frame, ImportError> {
        self.frames
            .get_mut(&id)
            .ok_or(ImportError::Tree(TreeError::FrameNotFound(id)))
    }

    /// Add a compound frame and reduce the child at `body_index` into its body.
    fn frame_with_body(
        &mut self,
        node: &SyntaxNode,
        kind: FrameKind,
        slots: Vec<SlotsStructure>,
        body_index: usize,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<FrameId, ImportError> {
        let id = self.add_frame(kind, slots, parent, out);
        let mut body = Vec::new();
        self.reduce(child(node, body_index)?, Some(id), &mut body)?;
        self.frame_mut(id)?.children_ids = body;
        Ok(id)
    }

    /// Add a joint frame to `head` and reduce the child at `body_index` into its body.
    fn joint_with_body(
        &mut self,
        node: &SyntaxNode,
        kind: FrameKind,
        slots: Vec<SlotsStructure>,
        body_index: usize,
        head: FrameId,
    ) -> Result<FrameId, ImportError> {
        let mut joints = Vec::new();
        let id = self.add_frame(kind, slots, None, &mut joints);
        self.frame_mut(id)?.joint_parent_id = head;
        let mut body = Vec::new();
        self.reduce(child(node, body_index)?, Some(id), &mut body)?;
        self.frame_mut(id)?.children_ids = body;
        self.frame_mut(head)?.joint_frame_ids.extend(joints);
        Ok(id)
    }

    fn unsupported(&mut self, construct: &str, parent: Option<FrameId>, out: &mut Vec<FrameId>) {
        if self.config.unsupported_placeholders {
            warn!(construct, "Unsupported construct replaced by a placeholder comment");
            let text = format!("unsupported construct: {}", construct);
            self.add_frame(FrameKind::Comment, vec![SlotsStructure::leaf(text)], parent, out);
        } else {
            warn!(construct, "Unsupported construct dropped");
        }
    }

    fn expr_stmt(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        let children = node.children();
        match token_index(node, "=") {
            Some(index) => {
                let target = to_slots(&node.with_children(&children[..index]))?;
                let value = to_slots(&node.with_children(&children[index + 1..]))?;
                self.add_frame(FrameKind::VarAssign, vec![target, value], parent, out);
            }
            None => {
                let expression = to_slots(node)?;
                self.add_frame(FrameKind::GenericExpression, vec![expression], parent, out);
            }
        }
        Ok(())
    }

    fn import_from(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        let split = token_index(node, "import").ok_or(ImportError::MissingChild {
            kind: node.kind,
            index: 2,
        })?;
        let children = node.children();
        let module = to_slots(&node.with_children(&children[1..split]))?;
        let names = remainder(node, split + 1)?;
        self.add_frame(FrameKind::FromImport, vec![module, names], parent, out);
        Ok(())
    }

    /// `if c : body (elif c : body)* (else : body)?`, continuations joined to the first `if`.
    fn if_stmt(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        let condition = to_slots(child(node, 1)?)?;
        let head = self.frame_with_body(node, FrameKind::If, vec![condition], 3, parent, out)?;
        let children = node.children();
        let mut index = 4;
        while index < children.len() {
            if children[index].is_token("else") {
                index += 2;
                self.joint_with_body(node, FrameKind::Else, Vec::new(), index, head)?;
            } else if children[index].is_token("elif") {
                index += 1;
                let condition = to_slots(child(node, index)?)?;
                self.joint_with_body(node, FrameKind::Elif, vec![condition], index + 2, head)?;
                index += 2;
            }
            index += 1;
        }
        Ok(())
    }

    fn while_stmt(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        let condition = to_slots(child(node, 1)?)?;
        self.frame_with_body(node, FrameKind::While, vec![condition], 3, parent, out)?;
        if node.children().get(4).is_some_and(|token| token.is_token("else")) {
            self.unsupported("while_else", parent, out);
        }
        Ok(())
    }

    /// `for v in items : body (else : body)?`
    fn for_stmt(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        let slots = vec![to_slots(child(node, 1)?)?, to_slots(child(node, 3)?)?];
        let head = self.frame_with_body(node, FrameKind::For, slots, 5, parent, out)?;
        if node.children().get(6).is_some_and(|token| token.is_token("else")) {
            self.joint_with_body(node, FrameKind::Else, Vec::new(), 8, head)?;
        }
        Ok(())
    }

    /// `try : body` followed by any of `except_clause : body`, `else : body`,
    /// `finally : body`, all joined to the `try` frame.
    fn try_stmt(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        let head = self.frame_with_body(node, FrameKind::Try, Vec::new(), 2, parent, out)?;
        let children = node.children();
        let mut index = 3;
        while index < children.len() {
            let clause = &children[index];
            let joint = if clause.kind == SyntaxKind::ExceptClause {
                Some((FrameKind::Except, vec![remainder(clause, 1)?]))
            } else if clause.is_token("except") {
                Some((FrameKind::Except, vec![SlotsStructure::leaf("")]))
            } else if clause.is_token("else") {
                Some((FrameKind::Else, Vec::new()))
            } else if clause.is_token("finally") {
                Some((FrameKind::Finally, Vec::new()))
            } else {
                None
            };
            match joint {
                Some((kind, slots)) => {
                    self.joint_with_body(node, kind, slots, index + 2, head)?;
                    index += 3;
                }
                None => index += 1,
            }
        }
        Ok(())
    }

    /// `with item (, item)* : body`; a single `x as y` item fills both slots, anything else
    /// goes in the first slot with the `as` label hidden.
    fn with_stmt(
        &mut self,
        node: &SyntaxNode,
        parent: Option<FrameId>,
        out: &mut Vec<FrameId>,
    ) -> Result<(), ImportError> {
        let children = node.children();
        if children.len() < 4 {
            return Err(ImportError::MissingChild {
                kind: node.kind,
                index: 3,
            });
        }
        let body = children.len() - 1;
        let items = &children[1..body - 1];

        let split = match items {
            [item] => token_index(item, "as").map(|index| (item, index)),
            _ => None,
        };
        let (slots, shows_alias) = match split {
            Some((item, index)) => {
                let parts = item.children();
                let context = to_slots(&item.with_children(&parts[..index]))?;
                let alias = remainder(item, index + 1)?;
                (vec![context, alias], true)
            }
            None => (vec![to_slots(&node.with_children(items))?], false),
        };
        let id = self.frame_with_body(node, FrameKind::With, slots, body, parent, out)?;
        if !shows_alias {
            if let Some(alias) = self.frame_mut(id)?.label_slots.get_mut(&1) {
                alias.shown = false;
            }
        }
        Ok(())
    }
}
