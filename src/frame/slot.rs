//! Slot content
//!
//! A slot holds either flat code, a quoted string literal, or a bracketed group of fields
//! separated by operators. Groups nest arbitrarily; a bracketed group is always framed by an
//! empty field on each side inside its parent.

use serde::{Deserialize, Serialize};

/// One field of a slot structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSlot {
    Code { code: String },
    Quoted { code: String, quote: String },
    Bracketed(SlotsStructure),
}

impl FieldSlot {
    pub fn code(code: impl Into<String>) -> Self {
        FieldSlot::Code { code: code.into() }
    }

    pub fn empty() -> Self {
        FieldSlot::code("")
    }

    pub fn is_empty_code(&self) -> bool {
        matches!(self, FieldSlot::Code { code } if code.is_empty())
    }

    fn render_into(&self, out: &mut String) {
        match self {
            FieldSlot::Code { code } => out.push_str(code),
            FieldSlot::Quoted { code, quote } => {
                out.push_str(quote);
                out.push_str(code);
                out.push_str(quote);
            }
            FieldSlot::Bracketed(group) => group.render_into(out),
        }
    }
}

/// Ordered fields joined by operators, optionally wrapped in brackets.
///
/// `operators.len() == fields.len() - 1` whenever there is at least one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotsStructure {
    pub fields: Vec<FieldSlot>,
    pub operators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_bracket: Option<char>,
}

impl Default for SlotsStructure {
    fn default() -> Self {
        Self::leaf("")
    }
}

impl SlotsStructure {
    /// A single flat field.
    pub fn leaf(code: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldSlot::code(code)],
            operators: Vec::new(),
            opening_bracket: None,
        }
    }

    /// A single string literal field.
    pub fn quoted(code: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldSlot::Quoted {
                code: code.into(),
                quote: quote.into(),
            }],
            operators: Vec::new(),
            opening_bracket: None,
        }
    }

    /// Joins two structures with an operator: fields and operators are concatenated.
    pub fn concat(lhs: SlotsStructure, operator: &str, rhs: SlotsStructure) -> Self {
        let mut fields = lhs.fields;
        fields.extend(rhs.fields);
        let mut operators = lhs.operators;
        operators.push(operator.to_string());
        operators.extend(rhs.operators);
        Self {
            fields,
            operators,
            opening_bracket: None,
        }
    }

    /// Wraps `inner` in brackets, framed by an empty field and empty operator on each side.
    pub fn bracketed(mut inner: SlotsStructure, opening: char) -> Self {
        inner.opening_bracket = Some(opening);
        Self {
            fields: vec![
                FieldSlot::empty(),
                FieldSlot::Bracketed(inner),
                FieldSlot::empty(),
            ],
            operators: vec![String::new(), String::new()],
            opening_bracket: None,
        }
    }

    /// Renders the structure as program text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        if let Some(opening) = self.opening_bracket {
            out.push(opening);
        }
        let start = out.len();
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                if let Some(operator) = self.operators.get(index - 1) {
                    let at_group_start = out.len() == start;
                    push_operator(out, operator, at_group_start);
                }
            }
            field.render_into(out);
        }
        if let Some(opening) = self.opening_bracket {
            out.push(closing_bracket(opening));
        }
    }

    /// True when the structure renders to nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.render().trim().is_empty()
    }

    /// Checks the operator/field count relation at every nesting level.
    pub fn is_consistent(&self) -> bool {
        let counts_match = if self.fields.is_empty() {
            self.operators.is_empty()
        } else {
            self.operators.len() == self.fields.len() - 1
        };
        let brackets_framed = self.fields.iter().enumerate().all(|(index, field)| {
            !matches!(field, FieldSlot::Bracketed(_))
                || (index > 0
                    && index + 1 < self.fields.len()
                    && self.fields[index - 1].is_empty_code()
                    && self.fields[index + 1].is_empty_code())
        });
        counts_match
            && brackets_framed
            && self.fields.iter().all(|field| match field {
                FieldSlot::Bracketed(group) => group.is_consistent(),
                _ => true,
            })
    }
}

fn push_operator(out: &mut String, operator: &str, at_group_start: bool) {
    match operator {
        "" => {}
        "." => out.push('.'),
        "," => out.push_str(", "),
        _ if at_group_start => {
            out.push_str(operator);
            out.push(' ');
        }
        _ => {
            out.push(' ');
            out.push_str(operator);
            out.push(' ');
        }
    }
}

/// Matching closing bracket for an opening bracket character.
pub fn closing_bracket(opening: char) -> char {
    match opening {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        other => other,
    }
}

/// The content of one label's slot inside a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSlot {
    /// `false` hides a hidable label together with its slot
    #[serde(default = "default_true")]
    pub shown: bool,
    pub slots: SlotsStructure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for LabelSlot {
    fn default() -> Self {
        Self::new(SlotsStructure::default())
    }
}

impl LabelSlot {
    pub fn new(slots: SlotsStructure) -> Self {
        Self {
            shown: true,
            slots,
            error: None,
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self::new(SlotsStructure::leaf(code))
    }

    pub fn render(&self) -> String {
        self.slots.render()
    }
}
