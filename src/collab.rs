//! External collaborators
//!
//! The text parser, the execution engine and the display-text lookup live outside this
//! crate. They are consumed only through the traits below.

use crate::emit::LinePositionMap;
use crate::import::SyntaxNode;
use serde::{Deserialize, Serialize};

/// A lint finding on the emitted program text (0-based line and column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Failure reported by a parser collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
}

/// Parses and lints program text.
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<SyntaxNode, ParseFailure>;
    fn lint(&self, source: &str) -> Vec<Diagnostic>;
}

/// A runtime failure: 1-based line number plus message, as execution engines report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFailure {
    pub line: usize,
    pub message: String,
}

impl RuntimeFailure {
    const LINE_MARKER: &'static str = " on line ";

    /// Extract the failure from an engine message of the form `"<message> on line <n>"`.
    ///
    /// The line marker is stripped from the kept message. Returns `None` when the text
    /// carries no line number.
    pub fn from_message(text: &str) -> Option<Self> {
        let marker = text.find(Self::LINE_MARKER)?;
        let digits_start = marker + Self::LINE_MARKER.len();
        let digits: String = text[digits_start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let line = digits.parse::<usize>().ok()?;
        let mut message = String::with_capacity(text.len());
        message.push_str(&text[..marker]);
        message.push_str(&text[digits_start + digits.len()..]);
        Some(Self { line, message })
    }
}

/// Result of running emitted program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Completed,
    Failed(RuntimeFailure),
    /// Failure the engine could not tie to a line
    FailedWithoutLine(String),
}

/// Executes emitted program text.
pub trait ExecutionEngine {
    fn run(&self, program: &str, positions: &LinePositionMap) -> ExecutionOutcome;
}

/// Message-key lookup for placeholder texts and container labels.
pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

/// Translator that returns the key itself, for hosts without localisation.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}
