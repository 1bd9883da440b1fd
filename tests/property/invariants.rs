//! Structural invariants under arbitrary editing sequences

use frametree::config::EditorConfig;
use frametree::navigation::{DeleteKey, Direction};
use frametree::{EditorSession, FrameKind, FrameTree};
use proptest::prelude::*;

/// One user action
#[derive(Debug, Clone)]
enum Action {
    Insert(FrameKind),
    Navigate(Direction),
    Delete(DeleteKey),
    ToggleDisabled,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => prop::sample::select(FrameKind::USER_KINDS.to_vec()).prop_map(Action::Insert),
        4 => prop::sample::select(vec![
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ])
        .prop_map(Action::Navigate),
        2 => prop::sample::select(vec![DeleteKey::Forward, DeleteKey::Backward])
            .prop_map(Action::Delete),
        1 => Just(Action::ToggleDisabled),
    ]
}

fn apply(session: &mut EditorSession, action: &Action) {
    match action {
        Action::Insert(kind) => {
            session.insert(*kind).unwrap();
        }
        Action::Navigate(direction) => {
            session.navigate(*direction).unwrap();
        }
        Action::Delete(key) => {
            session.delete(*key).unwrap();
        }
        Action::ToggleDisabled => {
            let id = session.cursor().frame_id;
            if !session.tree().frame(id).unwrap().is_container() {
                session.tree_mut().toggle_disabled(id).unwrap();
            }
        }
    }
}

fn emitted_lines(tree: &FrameTree) -> (String, usize) {
    let program = frametree::Emitter::new(tree).emit().unwrap();
    (program.text, program.positions.len())
}

/// Every reachable tree satisfies the structural invariants, and the cursor always
/// points at a live frame
#[test]
fn test_edit_sequences_preserve_invariants() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(action(), 1..60), |actions| {
            let mut session = EditorSession::new(EditorConfig::default());
            for action in &actions {
                apply(&mut session, action);
                prop_assert!(session.tree().validate().is_ok(), "after {:?}", action);
                prop_assert!(session.tree().contains(session.cursor().frame_id));
            }
            Ok(())
        })
        .unwrap();
}

/// Emission is a pure function of the tree: repeated emission gives identical output, one
/// position entry per frame, and balanced disabled-block delimiters
#[test]
fn test_emission_is_deterministic_and_balanced() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(action(), 1..60), |actions| {
            let mut session = EditorSession::default();
            for action in &actions {
                apply(&mut session, action);
            }
            let tree = session.tree();
            let (first, recorded) = emitted_lines(tree);
            let (second, _) = emitted_lines(tree);
            prop_assert_eq!(&first, &second);

            let user_frames = tree.frames().filter(|frame| !frame.is_container()).count() - 1;
            prop_assert_eq!(recorded, user_frames);

            let delimiters = first
                .lines()
                .filter(|line| line.trim() == "\"\"\"")
                .count();
            prop_assert_eq!(delimiters % 2, 0);
            prop_assert_eq!(first.lines().count(), recorded + delimiters);
            Ok(())
        })
        .unwrap();
}

/// A large-deletion notice is raised exactly when the removed frame reached the threshold
#[test]
fn test_large_deletion_notice_matches_descendants() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(action(), 1..60), |actions| {
            let mut session = EditorSession::default();
            for action in &actions {
                let Action::Delete(key) = action else {
                    apply(&mut session, action);
                    continue;
                };
                let outcome = session.delete(*key).unwrap();
                let notices = session.take_notices();
                prop_assert_eq!(
                    notices.len(),
                    usize::from(outcome.removed.is_some() && outcome.large_deletion_warning)
                );
            }
            Ok(())
        })
        .unwrap();
}
