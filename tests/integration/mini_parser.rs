//! Small indentation-aware parser for a Python subset, producing generic syntax trees.
//!
//! Test-only stand-in for the external parser collaborator: enough grammar to round-trip
//! programs through emission and import, and a bracket-balance linter for error mapping.

use frametree::collab::{Diagnostic, ParseFailure, SourceParser};
use frametree::import::{is_operator, SyntaxKind, SyntaxNode};

const DISABLED_DELIMITER: &str = "\"\"\"";

pub struct MiniParser;

impl SourceParser for MiniParser {
    fn parse(&self, source: &str) -> Result<SyntaxNode, ParseFailure> {
        parse_program(source).map_err(|message| ParseFailure { message })
    }

    fn lint(&self, source: &str) -> Vec<Diagnostic> {
        lint_brackets(source)
    }
}

fn tok(value: &str) -> SyntaxNode {
    SyntaxNode::token(value)
}

fn node(kind: SyntaxKind, children: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::node(kind, children)
}

struct Line {
    number: usize,
    indent: usize,
    text: String,
}

fn source_lines(source: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut in_disabled = false;
    for (number, raw) in source.lines().enumerate() {
        let text = raw.trim();
        if text == DISABLED_DELIMITER {
            in_disabled = !in_disabled;
            continue;
        }
        if in_disabled || text.is_empty() || text.starts_with('#') {
            continue;
        }
        lines.push(Line {
            number,
            indent: raw.len() - raw.trim_start().len(),
            text: text.to_string(),
        });
    }
    lines
}

pub fn parse_program(source: &str) -> Result<SyntaxNode, String> {
    let lines = source_lines(source);
    let mut pos = 0;
    let indent = lines.first().map(|line| line.indent).unwrap_or(0);
    let mut statements = parse_block(&lines, &mut pos, indent)?;
    if pos < lines.len() {
        return Err(format!("unexpected indent on line {}", lines[pos].number + 1));
    }
    statements.push(tok(""));
    Ok(node(SyntaxKind::FileInput, statements))
}

fn parse_block(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Vec<SyntaxNode>, String> {
    let mut statements = Vec::new();
    while *pos < lines.len() {
        let line = &lines[*pos];
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(format!("unexpected indent on line {}", line.number + 1));
        }
        statements.push(parse_statement(lines, pos, indent)?);
    }
    Ok(statements)
}

fn keyword(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn header_rest<'a>(text: &'a str, word: &str) -> Result<&'a str, String> {
    let rest = text[word.len()..].trim();
    rest.strip_suffix(':')
        .map(str::trim)
        .ok_or_else(|| format!("expected ':' after {}", word))
}

/// Body of the compound statement whose header is at `*pos - 1`.
fn suite(lines: &[Line], pos: &mut usize, indent: usize) -> Result<SyntaxNode, String> {
    let body_indent = match lines.get(*pos) {
        Some(line) if line.indent > indent => line.indent,
        _ => return Err("expected an indented block".to_string()),
    };
    let mut children = vec![tok("\n")];
    children.extend(parse_block(lines, pos, body_indent)?);
    Ok(node(SyntaxKind::Suite, children))
}

fn continues_with(lines: &[Line], pos: usize, indent: usize, words: &[&str]) -> Option<String> {
    let line = lines.get(pos)?;
    let word = keyword(&line.text);
    (line.indent == indent && words.contains(&word)).then(|| word.to_string())
}

fn parse_statement(lines: &[Line], pos: &mut usize, indent: usize) -> Result<SyntaxNode, String> {
    let text = lines[*pos].text.clone();
    let word = keyword(&text).to_string();
    *pos += 1;

    let compound = match word.as_str() {
        "if" => {
            let mut children = vec![tok("if"), expression_text(header_rest(&text, "if")?)?];
            children.push(tok(":"));
            children.push(suite(lines, pos, indent)?);
            while let Some(next) = continues_with(lines, *pos, indent, &["elif", "else"]) {
                let header = lines[*pos].text.clone();
                *pos += 1;
                if next == "elif" {
                    children.push(tok("elif"));
                    children.push(expression_text(header_rest(&header, "elif")?)?);
                } else {
                    header_rest(&header, "else")?;
                    children.push(tok("else"));
                }
                children.push(tok(":"));
                children.push(suite(lines, pos, indent)?);
                if next == "else" {
                    break;
                }
            }
            Some(node(SyntaxKind::IfStmt, children))
        }
        "while" => {
            let mut children = vec![tok("while"), expression_text(header_rest(&text, "while")?)?];
            children.push(tok(":"));
            children.push(suite(lines, pos, indent)?);
            if continues_with(lines, *pos, indent, &["else"]).is_some() {
                *pos += 1;
                children.extend([tok("else"), tok(":"), suite(lines, pos, indent)?]);
            }
            Some(node(SyntaxKind::WhileStmt, children))
        }
        "for" => {
            let tokens = tokenize(header_rest(&text, "for")?)?;
            let split = tokens
                .iter()
                .position(|t| t == "in")
                .ok_or_else(|| "expected 'in' in for statement".to_string())?;
            let mut children = vec![
                tok("for"),
                expression(&tokens[..split])?,
                tok("in"),
                expression(&tokens[split + 1..])?,
                tok(":"),
                suite(lines, pos, indent)?,
            ];
            if continues_with(lines, *pos, indent, &["else"]).is_some() {
                *pos += 1;
                children.extend([tok("else"), tok(":"), suite(lines, pos, indent)?]);
            }
            Some(node(SyntaxKind::ForStmt, children))
        }
        "try" => {
            header_rest(&text, "try")?;
            let mut children = vec![tok("try"), tok(":"), suite(lines, pos, indent)?];
            while let Some(next) =
                continues_with(lines, *pos, indent, &["except", "else", "finally"])
            {
                let header = lines[*pos].text.clone();
                *pos += 1;
                let rest = header_rest(&header, &next)?;
                if next == "except" && !rest.is_empty() {
                    children.push(node(
                        SyntaxKind::ExceptClause,
                        vec![tok("except"), expression_text(rest)?],
                    ));
                } else {
                    children.push(tok(&next));
                }
                children.push(tok(":"));
                children.push(suite(lines, pos, indent)?);
            }
            Some(node(SyntaxKind::TryStmt, children))
        }
        "with" => {
            let tokens = tokenize(header_rest(&text, "with")?)?;
            let item = match tokens.iter().position(|t| t == "as") {
                Some(split) => node(
                    SyntaxKind::WithItem,
                    vec![
                        expression(&tokens[..split])?,
                        tok("as"),
                        expression(&tokens[split + 1..])?,
                    ],
                ),
                None => expression(&tokens)?,
            };
            Some(node(
                SyntaxKind::WithStmt,
                vec![tok("with"), item, tok(":"), suite(lines, pos, indent)?],
            ))
        }
        "def" => {
            let rest = header_rest(&text, "def")?;
            let (signature, annotation) = match rest.split_once("->") {
                Some((signature, annotation)) => (signature.trim(), Some(annotation.trim())),
                None => (rest, None),
            };
            let open = signature
                .find('(')
                .ok_or_else(|| "expected '(' in def".to_string())?;
            let inner = signature[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| "expected ')' in def".to_string())?;
            let mut parameters = vec![tok("(")];
            if !inner.trim().is_empty() {
                parameters.push(expression_text(inner)?);
            }
            parameters.push(tok(")"));
            let mut children = vec![
                tok("def"),
                tok(signature[..open].trim()),
                node(SyntaxKind::Parameters, parameters),
            ];
            if let Some(annotation) = annotation {
                children.push(tok("->"));
                children.push(expression_text(annotation)?);
            }
            children.push(tok(":"));
            children.push(suite(lines, pos, indent)?);
            Some(node(SyntaxKind::Funcdef, children))
        }
        _ => None,
    };
    if let Some(compound) = compound {
        return Ok(node(SyntaxKind::Stmt, vec![node(SyntaxKind::CompoundStmt, vec![compound])]));
    }

    let rest = text[word.len()..].trim();
    let small = match word.as_str() {
        "pass" => node(SyntaxKind::PassStmt, vec![tok("pass")]),
        "break" => node(SyntaxKind::FlowStmt, vec![node(SyntaxKind::BreakStmt, vec![tok("break")])]),
        "continue" => node(
            SyntaxKind::FlowStmt,
            vec![node(SyntaxKind::ContinueStmt, vec![tok("continue")])],
        ),
        "return" | "raise" => {
            let kind = if word == "return" {
                SyntaxKind::ReturnStmt
            } else {
                SyntaxKind::RaiseStmt
            };
            let mut children = vec![tok(&word)];
            if !rest.is_empty() {
                children.push(expression_text(rest)?);
            }
            node(SyntaxKind::FlowStmt, vec![node(kind, children)])
        }
        "global" => node(SyntaxKind::GlobalStmt, vec![tok("global"), expression_text(rest)?]),
        "del" => node(SyntaxKind::DelStmt, vec![tok("del"), expression_text(rest)?]),
        "assert" => node(SyntaxKind::AssertStmt, vec![tok("assert"), expression_text(rest)?]),
        "import" => node(SyntaxKind::ImportName, vec![tok("import"), expression_text(rest)?]),
        "from" => {
            let tokens = tokenize(rest)?;
            let split = tokens
                .iter()
                .position(|t| t == "import")
                .ok_or_else(|| "expected 'import' in from statement".to_string())?;
            node(
                SyntaxKind::ImportFrom,
                vec![
                    tok("from"),
                    expression(&tokens[..split])?,
                    tok("import"),
                    expression(&tokens[split + 1..])?,
                ],
            )
        }
        _ => expression_statement(&text)?,
    };
    Ok(node(
        SyntaxKind::SimpleStmt,
        vec![node(SyntaxKind::SmallStmt, vec![small]), tok("\n")],
    ))
}

fn expression_statement(text: &str) -> Result<SyntaxNode, String> {
    let tokens = tokenize(text)?;
    let mut depth = 0i32;
    let mut split = None;
    for (index, token) in tokens.iter().enumerate() {
        match token.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            "=" if depth == 0 => {
                split = Some(index);
                break;
            }
            _ => {}
        }
    }
    let children = match split {
        Some(index) => vec![
            expression(&tokens[..index])?,
            tok("="),
            expression(&tokens[index + 1..])?,
        ],
        None => vec![expression(&tokens)?],
    };
    Ok(node(SyntaxKind::ExprStmt, children))
}

fn expression_text(text: &str) -> Result<SyntaxNode, String> {
    expression(&tokenize(text)?)
}

const THREE_CHAR: [&str; 4] = ["//=", "**=", ">>=", "<<="];
const TWO_CHAR: [&str; 18] = [
    "//", "**", "<<", ">>", "<=", ">=", "==", "!=", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "@=", "->",
];

fn tokenize(text: &str) -> Result<Vec<String>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        } else if c == '"' || c == '\'' {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != c {
                i += 1;
            }
            if i == chars.len() {
                return Err("unterminated string".to_string());
            }
            i += 1;
            tokens.push(chars[start..i].iter().collect());
        } else {
            let rest: String = chars[i..].iter().take(3).collect();
            let op = THREE_CHAR
                .iter()
                .chain(TWO_CHAR.iter())
                .copied()
                .find(|op| rest.starts_with(*op))
                .map(|op| op.to_string())
                .unwrap_or_else(|| c.to_string());
            if op.len() == 1 && !"+-*/%@&|^~<>=,:.()[]{}".contains(c) {
                return Err(format!("unexpected character {:?}", c));
            }
            i += op.chars().count();
            tokens.push(op);
        }
    }
    Ok(tokens)
}

fn closing(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        _ => None,
    }
}

fn matching_close(tokens: &[String], open_index: usize) -> Result<usize, String> {
    let mut depth = 0;
    for (index, token) in tokens.iter().enumerate().skip(open_index) {
        if closing(token).is_some() {
            depth += 1;
        } else if matches!(token.as_str(), ")" | "]" | "}") {
            depth -= 1;
            if depth == 0 {
                return Ok(index);
            }
        }
    }
    Err("unclosed bracket".to_string())
}

fn bracket_group(
    tokens: &[String],
    open_index: usize,
    kind: SyntaxKind,
) -> Result<(SyntaxNode, usize), String> {
    let close = matching_close(tokens, open_index)?;
    let mut children = vec![tok(&tokens[open_index])];
    if close > open_index + 1 {
        children.push(expression(&tokens[open_index + 1..close])?);
    }
    children.push(tok(&tokens[close]));
    Ok((node(kind, children), close + 1))
}

/// One operand starting at `i`, with its trailers, as a flat list of nodes.
fn operand(tokens: &[String], mut i: usize) -> Result<(Vec<SyntaxNode>, usize), String> {
    let first = tokens
        .get(i)
        .ok_or_else(|| "expected an expression".to_string())?;
    let mut parts = Vec::new();
    if first == "-" || first == "not" {
        let (inner, next) = operand(tokens, i + 1)?;
        let inner = if inner.len() == 1 {
            inner.into_iter().next().ok_or("empty operand")?
        } else {
            node(SyntaxKind::Expression, inner)
        };
        parts.push(node(SyntaxKind::Expression, vec![tok(first), inner]));
        return Ok((parts, next));
    }
    if closing(first).is_some() {
        let (group, next) = bracket_group(tokens, i, SyntaxKind::Expression)?;
        parts.push(group);
        i = next;
    } else {
        parts.push(tok(first));
        i += 1;
    }
    while let Some(token) = tokens.get(i) {
        if closing(token).is_some() {
            let (trailer, next) = bracket_group(tokens, i, SyntaxKind::Trailer)?;
            parts.push(trailer);
            i = next;
        } else if token == "." {
            let name = tokens
                .get(i + 1)
                .ok_or_else(|| "expected a name after '.'".to_string())?;
            parts.push(node(SyntaxKind::Trailer, vec![tok("."), tok(name)]));
            i += 2;
        } else {
            break;
        }
    }
    Ok((parts, i))
}

fn expression(tokens: &[String]) -> Result<SyntaxNode, String> {
    let (mut items, mut i) = operand(tokens, 0)?;
    while i < tokens.len() {
        let token = &tokens[i];
        let next = tokens.get(i + 1).map(String::as_str);
        let operator = match (token.as_str(), next) {
            ("not", Some("in")) | ("is", Some("not")) => {
                let op = node(SyntaxKind::CompOp, vec![tok(token), tok(next.unwrap_or_default())]);
                i += 2;
                op
            }
            (op, _) if is_operator(op) => {
                i += 1;
                tok(op)
            }
            (other, _) => return Err(format!("unexpected token {:?}", other)),
        };
        items.push(operator);
        let (parts, next_index) = operand(tokens, i)?;
        items.extend(parts);
        i = next_index;
    }
    Ok(if items.len() == 1 {
        items.remove(0)
    } else {
        node(SyntaxKind::Expression, items)
    })
}

/// One diagnostic per unmatched opening bracket, at the bracket's column.
fn lint_brackets(source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (number, line) in source.lines().enumerate() {
        let mut open = Vec::new();
        for (column, c) in line.chars().enumerate() {
            match c {
                '(' | '[' | '{' => open.push(column),
                ')' | ']' | '}' => {
                    if open.pop().is_none() {
                        diagnostics.push(Diagnostic::new(number, column, "unmatched bracket"));
                    }
                }
                _ => {}
            }
        }
        for column in open {
            diagnostics.push(Diagnostic::new(number, column, "unclosed bracket"));
        }
    }
    diagnostics
}

#[test]
fn test_mini_parser_builds_nested_statements() {
    let root = parse_program("if a:\n    x = f(1)\nelse:\n    pass\n").unwrap();
    assert_eq!(root.kind, SyntaxKind::FileInput);
    let compound = &root.children()[0].children()[0];
    let if_stmt = &compound.children()[0];
    assert_eq!(if_stmt.kind, SyntaxKind::IfStmt);
    assert_eq!(if_stmt.children().len(), 7);
}

#[test]
fn test_mini_parser_rejects_bad_indent() {
    assert!(parse_program("x = 1\n    y = 2\n").is_err());
    assert!(parse_program("while x:\ny = 2\n").is_err());
}
