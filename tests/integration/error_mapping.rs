//! Integration tests for mapping lint and runtime errors back onto frames

use super::mini_parser::MiniParser;
use frametree::collab::{ExecutionEngine, ExecutionOutcome, RuntimeFailure};
use frametree::{EditorSession, FrameId, FrameKind, LinePositionMap, Notice};

/// Engine that fails on the first line dividing by zero, the way interpreters report it
struct DivisionEngine;

impl ExecutionEngine for DivisionEngine {
    fn run(&self, program: &str, _positions: &LinePositionMap) -> ExecutionOutcome {
        match program.lines().position(|line| line.contains("/ 0")) {
            Some(index) => {
                let text = format!("ZeroDivisionError: division by zero on line {}", index + 1);
                RuntimeFailure::from_message(&text)
                    .map(ExecutionOutcome::Failed)
                    .unwrap_or(ExecutionOutcome::FailedWithoutLine(text))
            }
            None => ExecutionOutcome::Completed,
        }
    }
}

fn assignment(session: &mut EditorSession, target: &str, value: &str) -> FrameId {
    let id = session.insert(FrameKind::VarAssign).unwrap().unwrap();
    session.tree_mut().set_slot_code(id, 0, target).unwrap();
    session.tree_mut().set_slot_code(id, 1, value).unwrap();
    id
}

/// A lint diagnostic inside a slot's span is attached to that slot
#[test]
fn test_lint_error_lands_on_value_slot() {
    let mut session = EditorSession::default();
    let ok = assignment(&mut session, "a", "1");
    let broken = assignment(&mut session, "x", "f(1");

    assert_eq!(session.lint(&MiniParser).unwrap(), 1);
    let frame = session.tree().frame(broken).unwrap();
    assert_eq!(frame.label_slots[&1].error.as_deref(), Some("unclosed bracket"));
    assert_eq!(frame.label_slots[&0].error, None);
    assert!(session
        .tree()
        .frame(ok)
        .unwrap()
        .label_slots
        .values()
        .all(|slot| slot.error.is_none()));
}

/// Linting again after a fix clears the earlier annotation
#[test]
fn test_relint_clears_fixed_error() {
    let mut session = EditorSession::default();
    let broken = assignment(&mut session, "x", "[1, 2");
    assert_eq!(session.lint(&MiniParser).unwrap(), 1);

    session.tree_mut().set_slot_code(broken, 1, "[1, 2]").unwrap();
    assert_eq!(session.lint(&MiniParser).unwrap(), 0);
    let frame = session.tree().frame(broken).unwrap();
    assert!(frame.label_slots.values().all(|slot| slot.error.is_none()));
}

/// A runtime failure is recorded on the frame whose emitted line raised it
#[test]
fn test_runtime_failure_maps_to_frame() {
    let mut session = EditorSession::default();
    assignment(&mut session, "a", "1");
    let loop_id = session.insert(FrameKind::While).unwrap().unwrap();
    session.tree_mut().set_slot_code(loop_id, 0, "a").unwrap();
    let failing = assignment(&mut session, "b", "a / 0");

    let outcome = session.run(&DivisionEngine).unwrap();
    assert!(matches!(outcome, ExecutionOutcome::Failed(ref failure) if failure.line == 3));

    let frame = session.tree().frame(failing).unwrap();
    assert_eq!(
        frame.last_runtime_error.as_deref(),
        Some("ZeroDivisionError: division by zero")
    );
    assert!(frame.label_slots.values().all(|slot| slot.error.is_some()));
    assert!(session.take_notices().is_empty());
}

/// A successful run clears annotations left by an earlier failure
#[test]
fn test_successful_run_clears_annotations() {
    let mut session = EditorSession::default();
    let failing = assignment(&mut session, "b", "1 / 0");
    session.run(&DivisionEngine).unwrap();
    assert!(session.tree().frame(failing).unwrap().last_runtime_error.is_some());

    session.tree_mut().set_slot_code(failing, 1, "1 / 2").unwrap();
    assert_eq!(session.run(&DivisionEngine).unwrap(), ExecutionOutcome::Completed);
    let frame = session.tree().frame(failing).unwrap();
    assert!(frame.label_slots.values().all(|slot| slot.error.is_none()));
}

/// Failures on lines without a frame surface as a notice instead
#[test]
fn test_failure_outside_program_becomes_notice() {
    struct LateFailure;
    impl ExecutionEngine for LateFailure {
        fn run(&self, _program: &str, _positions: &LinePositionMap) -> ExecutionOutcome {
            ExecutionOutcome::Failed(RuntimeFailure {
                line: 40,
                message: "SystemExit".to_string(),
            })
        }
    }

    let mut session = EditorSession::default();
    assignment(&mut session, "a", "1");
    session.run(&LateFailure).unwrap();
    assert_eq!(
        session.take_notices(),
        vec![Notice::RuntimeError {
            message: "SystemExit".to_string()
        }]
    );
}
