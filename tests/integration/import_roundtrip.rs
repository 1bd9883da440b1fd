//! Integration tests for importing parsed program text

use super::mini_parser::{parse_program, MiniParser};
use frametree::config::{EditorConfig, ImportConfig};
use frametree::import::Importer;
use frametree::{Cursor, EditorSession, FrameId, FrameKind, FrameTree, Notice};

fn paste(session: &mut EditorSession, source: &str) -> bool {
    session.paste_source(&MiniParser, source)
}

fn main_kinds(tree: &FrameTree) -> Vec<FrameKind> {
    tree.children(FrameId::MAIN_CONTAINER)
        .unwrap()
        .iter()
        .map(|id| tree.frame(*id).unwrap().kind)
        .collect()
}

/// Pasting source builds frames and emits the canonical form of the program
#[test]
fn test_paste_emits_canonical_text() {
    let mut session = EditorSession::default();
    assert!(paste(&mut session, "x = 1\nif x > 0:\n    return x\n"));

    assert_eq!(main_kinds(session.tree()), vec![FrameKind::VarAssign, FrameKind::If]);
    assert_eq!(session.emit().unwrap().text, "x = 1 \nif x > 0 :\n    return x \n");
    session.tree().validate().unwrap();
}

/// Canonical text survives a second parse and import unchanged
#[test]
fn test_canonical_text_is_a_fixed_point() {
    let source = "\
total = 0
for item in items:
    if item.size >= limit and not item.hidden:
        total += item.size
    elif item in skipped:
        continue
    else:
        print(item.name, - 1)
while total > 10:
    total = total // 2
try:
    risky([1, 2], {x: y})
except ValueError:
    raise
except:
    log(error)
finally:
    done()
with open(path) as handle:
    data = handle.read()
";
    let mut first = EditorSession::default();
    assert!(paste(&mut first, source));
    let canonical = first.emit().unwrap().text;

    let mut second = EditorSession::default();
    assert!(paste(&mut second, &canonical));
    assert_eq!(second.emit().unwrap().text, canonical);
    assert_eq!(first.tree().len(), second.tree().len());
    second.tree().validate().unwrap();
}

/// if/elif/else and try/except/finally become joint groups on their head
#[test]
fn test_continuations_become_joint_frames() {
    let mut session = EditorSession::default();
    let source = "if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\ntry:\n    go()\nexcept E:\n    stop()\nfinally:\n    done()\n";
    assert!(paste(&mut session, source));

    let tree = session.tree();
    let main = tree.children(FrameId::MAIN_CONTAINER).unwrap().to_vec();
    assert_eq!(main.len(), 2);

    let joint_kinds = |head: FrameId| -> Vec<FrameKind> {
        tree.frame(head)
            .unwrap()
            .joint_frame_ids
            .iter()
            .map(|id| tree.frame(*id).unwrap().kind)
            .collect()
    };
    assert_eq!(joint_kinds(main[0]), vec![FrameKind::Elif, FrameKind::Else]);
    assert_eq!(joint_kinds(main[1]), vec![FrameKind::Except, FrameKind::Finally]);
    for joint in &tree.frame(main[0]).unwrap().joint_frame_ids {
        assert_eq!(tree.frame(*joint).unwrap().joint_parent_id, main[0]);
        assert_eq!(tree.children(*joint).unwrap().len(), 1);
    }
}

/// Statements without a frame variant leave a placeholder comment
#[test]
fn test_unsupported_statement_placeholder() {
    let mut session = EditorSession::default();
    assert!(paste(&mut session, "del cache\nassert ok\n"));
    assert_eq!(
        session.emit().unwrap().text,
        "# unsupported construct: del_stmt \n# unsupported construct: assert_stmt \n"
    );
}

/// With placeholders disabled, unsupported statements are dropped silently
#[test]
fn test_unsupported_statement_dropped_when_configured() {
    let config = EditorConfig {
        import: ImportConfig {
            unsupported_placeholders: false,
        },
        ..EditorConfig::default()
    };
    let mut session = EditorSession::new(config);
    assert!(paste(&mut session, "del cache\nx = 1\n"));
    assert_eq!(main_kinds(session.tree()), vec![FrameKind::VarAssign]);
}

/// Pasting lands at the caret and leaves the caret below the last imported frame
#[test]
fn test_paste_at_caret_between_frames() {
    let mut session = EditorSession::default();
    assert!(paste(&mut session, "a = 1\nc = 3\n"));
    let first = session.tree().children(FrameId::MAIN_CONTAINER).unwrap()[0];
    session.tree_mut().set_cursor(Cursor::below(first)).unwrap();

    assert!(paste(&mut session, "b = 2\n"));
    assert_eq!(session.emit().unwrap().text, "a = 1 \nb = 2 \nc = 3 \n");
    let inserted = session.tree().children(FrameId::MAIN_CONTAINER).unwrap()[1];
    assert_eq!(session.cursor(), Cursor::below(inserted));
}

/// A parse failure is reported and the tree is left untouched
#[test]
fn test_parse_failure_reports_notice() {
    let mut session = EditorSession::default();
    assert!(paste(&mut session, "x = 1\n"));
    let before = session.tree().snapshot();

    assert!(!paste(&mut session, "while x:\ny = 2\n"));
    assert_eq!(session.tree().snapshot(), before);
    assert!(matches!(
        session.take_notices().as_slice(),
        [Notice::PasteRejected { .. }]
    ));
}

/// A function definition nested in a loop cannot be pasted into the main body
#[test]
fn test_nested_forbidden_frame_rejected_atomically() {
    let mut session = EditorSession::default();
    let before = session.tree().snapshot();

    assert!(!paste(&mut session, "while x:\n    def f():\n        return 1\n"));
    assert_eq!(session.tree().snapshot(), before);
    assert_eq!(session.take_notices().len(), 1);
}

/// Imports and function definitions go into their own containers
#[test]
fn test_import_into_dedicated_containers() {
    let mut session = EditorSession::default();
    session
        .tree_mut()
        .set_cursor(Cursor::inside(FrameId::IMPORTS_CONTAINER))
        .unwrap();
    assert!(paste(&mut session, "import os\nfrom os.path import join, split\n"));

    session
        .tree_mut()
        .set_cursor(Cursor::inside(FrameId::FUNC_DEFS_CONTAINER))
        .unwrap();
    assert!(paste(&mut session, "def area(w, h):\n    return w * h\n"));

    assert_eq!(
        session.emit().unwrap().text,
        "import os \nfrom os.path import join, split \ndef area (w, h ) :\n    return w * h \n"
    );
}

/// A return annotation has no slot, so the function keeps a placeholder note in its body
#[test]
fn test_return_annotation_becomes_placeholder() {
    let mut session = EditorSession::default();
    session
        .tree_mut()
        .set_cursor(Cursor::inside(FrameId::FUNC_DEFS_CONTAINER))
        .unwrap();
    assert!(paste(&mut session, "def size(n) -> int:\n    return 0\n"));
    assert_eq!(
        session.emit().unwrap().text,
        "def size (n ) :\n    # unsupported construct: return_annotation \n    return 0 \n"
    );
    session.tree().validate().unwrap();
}

/// The importer hands out ids from the tree's next free id upwards
#[test]
fn test_batch_ids_start_at_next_free_id() {
    let tree = FrameTree::new();
    let root = parse_program("x = 1\ny = 2\n").unwrap();
    let batch = Importer::new(ImportConfig::default(), tree.next_id())
        .build(&root)
        .unwrap();
    assert_eq!(batch.top_level, vec![FrameId(1), FrameId(2)]);
    assert_eq!(batch.next_id, 3);
}
