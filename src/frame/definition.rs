//! Frame variant catalog
//!
//! Every frame variant carries a static descriptor: its label sequence (which labels own an
//! editable slot), whether it owns a body, which joint continuations it accepts and which
//! variants may not appear in its body.

use crate::collab::Translator;
use serde::{Deserialize, Serialize};

/// Closed set of frame variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Root,
    ImportsContainer,
    FuncDefsContainer,
    MainContainer,
    If,
    Elif,
    Else,
    For,
    While,
    Try,
    Except,
    Finally,
    FuncDef,
    With,
    VarAssign,
    Return,
    Break,
    Continue,
    Raise,
    Global,
    Comment,
    Import,
    FromImport,
    GenericExpression,
}

impl FrameKind {
    /// All variants a user can create (containers and root excluded).
    pub const USER_KINDS: [FrameKind; 20] = [
        FrameKind::If,
        FrameKind::Elif,
        FrameKind::Else,
        FrameKind::For,
        FrameKind::While,
        FrameKind::Try,
        FrameKind::Except,
        FrameKind::Finally,
        FrameKind::FuncDef,
        FrameKind::With,
        FrameKind::VarAssign,
        FrameKind::Return,
        FrameKind::Break,
        FrameKind::Continue,
        FrameKind::Raise,
        FrameKind::Global,
        FrameKind::Comment,
        FrameKind::Import,
        FrameKind::FromImport,
        FrameKind::GenericExpression,
    ];

    pub fn definition(self) -> &'static FrameDefinition {
        match self {
            FrameKind::Root => &ROOT,
            FrameKind::ImportsContainer => &IMPORTS_CONTAINER,
            FrameKind::FuncDefsContainer => &FUNC_DEFS_CONTAINER,
            FrameKind::MainContainer => &MAIN_CONTAINER,
            FrameKind::If => &IF,
            FrameKind::Elif => &ELIF,
            FrameKind::Else => &ELSE,
            FrameKind::For => &FOR,
            FrameKind::While => &WHILE,
            FrameKind::Try => &TRY,
            FrameKind::Except => &EXCEPT,
            FrameKind::Finally => &FINALLY,
            FrameKind::FuncDef => &FUNC_DEF,
            FrameKind::With => &WITH,
            FrameKind::VarAssign => &VAR_ASSIGN,
            FrameKind::Return => &RETURN,
            FrameKind::Break => &BREAK,
            FrameKind::Continue => &CONTINUE,
            FrameKind::Raise => &RAISE,
            FrameKind::Global => &GLOBAL,
            FrameKind::Comment => &COMMENT,
            FrameKind::Import => &IMPORT,
            FrameKind::FromImport => &FROM_IMPORT,
            FrameKind::GenericExpression => &GENERIC_EXPRESSION,
        }
    }

    pub fn is_container(self) -> bool {
        matches!(
            self,
            FrameKind::ImportsContainer | FrameKind::FuncDefsContainer | FrameKind::MainContainer
        )
    }

    pub fn allows_children(self) -> bool {
        self.definition().allow_children
    }

    pub fn is_joint_frame(self) -> bool {
        self.definition().is_joint_frame
    }

    /// Whether `follower` may be attached as a joint continuation after a frame of this kind.
    pub fn accepts_joint(self, follower: FrameKind) -> bool {
        self.definition().joint_frame_types.contains(&follower)
    }

    /// Whether `members` form a legal continuation sequence after a head of this kind.
    ///
    /// Each member must be accepted both by the head and by the member before it.
    pub fn accepts_joint_sequence(self, members: &[FrameKind]) -> bool {
        let mut previous = self;
        members.iter().all(|&kind| {
            let fits = self.accepts_joint(kind) && previous.accepts_joint(kind);
            previous = kind;
            fits
        })
    }

    /// Whether `descendant` is forbidden anywhere in the body of a frame of this kind.
    pub fn forbids(self, descendant: FrameKind) -> bool {
        self.definition().forbidden_children.contains(&descendant)
    }
}

/// One label of a frame, optionally paired with an editable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLabel {
    pub text: &'static str,
    pub has_slot: bool,
    /// `false` when the label text is never rendered (the slot still is)
    pub show_label: bool,
    /// The label and its slot can be hidden as a pair
    pub hidable: bool,
    pub optional_slot: bool,
    /// Message key of the placeholder shown in an empty slot
    pub default_text_key: &'static str,
}

impl FrameLabel {
    const fn slot(text: &'static str, default_text_key: &'static str) -> Self {
        Self {
            text,
            has_slot: true,
            show_label: true,
            hidable: false,
            optional_slot: false,
            default_text_key,
        }
    }

    const fn optional(text: &'static str, default_text_key: &'static str) -> Self {
        Self {
            optional_slot: true,
            ..Self::slot(text, default_text_key)
        }
    }

    const fn fixed(text: &'static str) -> Self {
        Self {
            text,
            has_slot: false,
            show_label: true,
            hidable: false,
            optional_slot: false,
            default_text_key: "",
        }
    }

    /// Placeholder text for an empty slot, resolved through the host's translator.
    pub fn default_text(&self, translator: &dyn Translator) -> String {
        if self.default_text_key.is_empty() {
            String::new()
        } else {
            translator.translate(self.default_text_key)
        }
    }
}

/// Static descriptor of a frame variant.
#[derive(Debug)]
pub struct FrameDefinition {
    pub kind: FrameKind,
    pub labels: &'static [FrameLabel],
    pub allow_children: bool,
    pub allow_joint_children: bool,
    pub is_joint_frame: bool,
    pub joint_frame_types: &'static [FrameKind],
    pub forbidden_children: &'static [FrameKind],
    pub is_import_frame: bool,
    /// Message key of the container heading (containers only)
    pub container_label_key: &'static str,
}

impl FrameDefinition {
    /// Indices of the labels that own an editable slot, in label order.
    pub fn slot_label_indices(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.has_slot)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn slot_count(&self) -> usize {
        self.labels.iter().filter(|label| label.has_slot).count()
    }

    /// Heading text for a container, empty for any other variant.
    pub fn container_label(&self, translator: &dyn Translator) -> String {
        if self.container_label_key.is_empty() {
            String::new()
        } else {
            translator.translate(self.container_label_key)
        }
    }
}

use FrameKind::*;

const JOINT_KINDS: &[FrameKind] = &[Elif, Else, Except, Finally];

const BLOCK_FORBIDDEN: &[FrameKind] = &[Import, FromImport, FuncDef, Elif, Else, Except, Finally];

const STATEMENT_FORBIDDEN: &[FrameKind] = &FrameKind::USER_KINDS;

const IMPORTS_FORBIDDEN: &[FrameKind] = &[
    If,
    Elif,
    Else,
    For,
    While,
    Try,
    Except,
    Finally,
    FuncDef,
    With,
    VarAssign,
    Return,
    Break,
    Continue,
    Raise,
    Global,
    GenericExpression,
];

const FUNC_DEFS_FORBIDDEN: &[FrameKind] = &[
    If,
    Elif,
    Else,
    For,
    While,
    Try,
    Except,
    Finally,
    With,
    VarAssign,
    Return,
    Break,
    Continue,
    Raise,
    Global,
    Import,
    FromImport,
    GenericExpression,
];

const BLOCK: FrameDefinition = FrameDefinition {
    kind: Root,
    labels: &[],
    allow_children: true,
    allow_joint_children: false,
    is_joint_frame: false,
    joint_frame_types: &[],
    forbidden_children: BLOCK_FORBIDDEN,
    is_import_frame: false,
    container_label_key: "",
};

const STATEMENT: FrameDefinition = FrameDefinition {
    allow_children: false,
    forbidden_children: STATEMENT_FORBIDDEN,
    ..BLOCK
};

static ROOT: FrameDefinition = FrameDefinition {
    kind: Root,
    forbidden_children: &[],
    ..BLOCK
};

static IMPORTS_CONTAINER: FrameDefinition = FrameDefinition {
    kind: ImportsContainer,
    forbidden_children: IMPORTS_FORBIDDEN,
    container_label_key: "appMessage.importsContainer",
    ..BLOCK
};

static FUNC_DEFS_CONTAINER: FrameDefinition = FrameDefinition {
    kind: FuncDefsContainer,
    forbidden_children: FUNC_DEFS_FORBIDDEN,
    container_label_key: "appMessage.funcDefsContainer",
    ..BLOCK
};

static MAIN_CONTAINER: FrameDefinition = FrameDefinition {
    kind: MainContainer,
    container_label_key: "appMessage.mainContainer",
    ..BLOCK
};

static IF: FrameDefinition = FrameDefinition {
    kind: If,
    labels: &[
        FrameLabel::slot("if ", "frame.defaultText.condition"),
        FrameLabel::fixed(":"),
    ],
    allow_joint_children: true,
    joint_frame_types: &[Elif, Else],
    ..BLOCK
};

static ELIF: FrameDefinition = FrameDefinition {
    kind: Elif,
    labels: &[
        FrameLabel::slot("elif ", "frame.defaultText.condition"),
        FrameLabel::fixed(":"),
    ],
    is_joint_frame: true,
    joint_frame_types: &[Elif, Else],
    ..BLOCK
};

static ELSE: FrameDefinition = FrameDefinition {
    kind: Else,
    labels: &[FrameLabel::fixed("else:")],
    is_joint_frame: true,
    joint_frame_types: &[Finally],
    ..BLOCK
};

static FOR: FrameDefinition = FrameDefinition {
    kind: For,
    labels: &[
        FrameLabel::slot("for ", "frame.defaultText.identifier"),
        FrameLabel::slot("in ", "frame.defaultText.list"),
        FrameLabel::fixed(":"),
    ],
    allow_joint_children: true,
    joint_frame_types: &[Else],
    ..BLOCK
};

static WHILE: FrameDefinition = FrameDefinition {
    kind: While,
    labels: &[
        FrameLabel::slot("while ", "frame.defaultText.condition"),
        FrameLabel::fixed(":"),
    ],
    ..BLOCK
};

static TRY: FrameDefinition = FrameDefinition {
    kind: Try,
    labels: &[FrameLabel::fixed("try:")],
    allow_joint_children: true,
    joint_frame_types: &[Except, Else, Finally],
    ..BLOCK
};

static EXCEPT: FrameDefinition = FrameDefinition {
    kind: Except,
    labels: &[
        FrameLabel::optional("except ", "frame.defaultText.exception"),
        FrameLabel::fixed(":"),
    ],
    is_joint_frame: true,
    joint_frame_types: &[Except, Else, Finally],
    ..BLOCK
};

static FINALLY: FrameDefinition = FrameDefinition {
    kind: Finally,
    labels: &[FrameLabel::fixed("finally:")],
    is_joint_frame: true,
    ..BLOCK
};

static FUNC_DEF: FrameDefinition = FrameDefinition {
    kind: FuncDef,
    labels: &[
        FrameLabel::slot("def ", "frame.defaultText.name"),
        FrameLabel::optional("(", "frame.defaultText.parameters"),
        FrameLabel::fixed(") :"),
    ],
    ..BLOCK
};

static WITH: FrameDefinition = FrameDefinition {
    kind: With,
    labels: &[
        FrameLabel::slot("with ", "frame.defaultText.expression"),
        FrameLabel {
            hidable: true,
            ..FrameLabel::slot("as ", "frame.defaultText.identifier")
        },
        FrameLabel::fixed(":"),
    ],
    ..BLOCK
};

static VAR_ASSIGN: FrameDefinition = FrameDefinition {
    kind: VarAssign,
    labels: &[
        FrameLabel::slot("", "frame.defaultText.identifier"),
        FrameLabel::slot("= ", "frame.defaultText.value"),
    ],
    ..STATEMENT
};

static RETURN: FrameDefinition = FrameDefinition {
    kind: Return,
    labels: &[FrameLabel::optional("return ", "frame.defaultText.expression")],
    ..STATEMENT
};

static BREAK: FrameDefinition = FrameDefinition {
    kind: Break,
    labels: &[FrameLabel::fixed("break")],
    ..STATEMENT
};

static CONTINUE: FrameDefinition = FrameDefinition {
    kind: Continue,
    labels: &[FrameLabel::fixed("continue")],
    ..STATEMENT
};

static RAISE: FrameDefinition = FrameDefinition {
    kind: Raise,
    labels: &[FrameLabel::optional("raise ", "frame.defaultText.exception")],
    ..STATEMENT
};

static GLOBAL: FrameDefinition = FrameDefinition {
    kind: Global,
    labels: &[FrameLabel::slot("global ", "frame.defaultText.variable")],
    ..STATEMENT
};

static COMMENT: FrameDefinition = FrameDefinition {
    kind: Comment,
    labels: &[FrameLabel::optional("# ", "frame.defaultText.comment")],
    ..STATEMENT
};

static IMPORT: FrameDefinition = FrameDefinition {
    kind: Import,
    labels: &[FrameLabel::slot("import ", "frame.defaultText.modulePart")],
    is_import_frame: true,
    ..STATEMENT
};

static FROM_IMPORT: FrameDefinition = FrameDefinition {
    kind: FromImport,
    labels: &[
        FrameLabel::slot("from ", "frame.defaultText.module"),
        FrameLabel::slot("import ", "frame.defaultText.modulePart"),
    ],
    is_import_frame: true,
    ..STATEMENT
};

static GENERIC_EXPRESSION: FrameDefinition = FrameDefinition {
    kind: GenericExpression,
    labels: &[FrameLabel {
        show_label: false,
        ..FrameLabel::optional("", "frame.defaultText.funcCall")
    }],
    ..STATEMENT
};
