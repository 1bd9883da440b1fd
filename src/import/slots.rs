//! Reduction of expression nodes into slot content

use crate::error::ImportError;
use crate::frame::SlotsStructure;
use crate::import::{SyntaxKind, SyntaxNode};

/// Symbolic operators a slot may join fields with.
pub const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "//", "%", "**", "@", "<<", ">>", "&", "|", "^", "~", "<", ">", "<=",
    ">=", "==", "!=", "<>", "=", "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=",
    "|=", "^=", "@=", ",", ":", ".", "->",
];

/// Keyword operators, trimmed of surrounding spaces.
pub const KEYWORD_OPERATORS: &[&str] = &[
    "and", "or", "not", "in", "is", "is not", "not in", "as", "if", "else", "lambda",
];

pub fn is_operator(token: &str) -> bool {
    OPERATORS.contains(&token) || KEYWORD_OPERATORS.contains(&token)
}

const OPENING_BRACKETS: [char; 3] = ['(', '[', '{'];

fn opening_bracket(node: &SyntaxNode) -> Option<char> {
    let value = node.value.as_deref()?;
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if OPENING_BRACKETS.contains(&c) => Some(c),
        _ => None,
    }
}

/// The single text value a node stands for, digging through one-child wrappers.
///
/// Two-token comparison operators (`not in`, `is not`) are joined with a space.
pub fn dig_value(node: &SyntaxNode) -> Result<String, ImportError> {
    if let Some(value) = node.value.as_deref().filter(|value| !value.is_empty()) {
        return Ok(value.to_string());
    }
    let children = node.children();
    match children {
        [] => Err(ImportError::NodeWithoutValue(node.kind)),
        [only] => dig_value(only),
        [first, second] if node.kind == SyntaxKind::CompOp => {
            Ok(format!("{} {}", dig_value(first)?, dig_value(second)?))
        }
        _ => Err(ImportError::AmbiguousValue(node.kind)),
    }
}

/// Reduce an expression node to slot content.
pub fn to_slots(node: &SyntaxNode) -> Result<SlotsStructure, ImportError> {
    let children = node.children();
    let Some(first) = children.first() else {
        return Ok(SlotsStructure::leaf(node.value.clone().unwrap_or_default()));
    };
    if children.len() == 1 {
        return to_slots(first);
    }

    if first.is_token("-") || first.is_token("not") {
        let operator = first.value.as_deref().unwrap_or_default();
        return Ok(SlotsStructure::concat(
            SlotsStructure::leaf(""),
            operator,
            to_slots(&children[1])?,
        ));
    }

    if let Some(opening) = opening_bracket(first) {
        let interior = node.with_children(&children[1..children.len() - 1]);
        let inner = to_slots(&interior)?;
        if node.kind == SyntaxKind::Parameters {
            return Ok(inner);
        }
        return Ok(SlotsStructure::bracketed(inner, opening));
    }

    let mut current = to_slots(first)?;
    let mut index = 1;
    while index < children.len() {
        let child = &children[index];
        if child.kind == SyntaxKind::Trailer {
            let suffix = child.children();
            current = if suffix.first().is_some_and(|token| token.is_token(".")) {
                let name = suffix.get(1).ok_or(ImportError::MissingChild {
                    kind: SyntaxKind::Trailer,
                    index: 1,
                })?;
                SlotsStructure::concat(current, ".", to_slots(name)?)
            } else {
                SlotsStructure::concat(current, "", to_slots(child)?)
            };
            index += 1;
            continue;
        }

        let operator = dig_value(child)?;
        if !is_operator(&operator) {
            return Err(ImportError::UnknownOperator {
                kind: node.kind,
                token: operator,
            });
        }
        let operand = children.get(index + 1).ok_or(ImportError::MissingChild {
            kind: node.kind,
            index: index + 1,
        })?;
        current = SlotsStructure::concat(current, &operator, to_slots(operand)?);
        index += 2;
    }
    Ok(current)
}
