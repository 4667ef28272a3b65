//! Property-based tests: the registry graph stays consistent under
//! arbitrary add/remove sequences.

use proptest::prelude::*;

use super::Registry;
use crate::application::SessionId;
use crate::geometry::{Point, Size};
use crate::window::{SurfaceId, Window, WindowSpec, WindowType};

#[derive(Debug, Clone)]
enum Op {
    AddWindow { parent_choice: usize },
    RemoveWindow { choice: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8).prop_map(|parent_choice| Op::AddWindow { parent_choice }),
        (0usize..8).prop_map(|choice| Op::RemoveWindow { choice }),
    ]
}

fn spec(parent: Option<Window>) -> WindowSpec {
    WindowSpec {
        name: Some("prop".into()),
        top_left: Some(Point::new(0, 0)),
        size: Some(Size::new(64, 64)),
        window_type: parent.map(|_| WindowType::Dialog),
        parent,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn links_stay_symmetric_under_arbitrary_ops(ops in proptest::collection::vec(op_strategy(), 1..64)) {
        let mut registry = Registry::new();
        let app = registry.add_application(SessionId(1)).unwrap();
        let mut live: Vec<Window> = Vec::new();
        let mut next_surface = 0u64;

        for op in ops {
            match op {
                Op::AddWindow { parent_choice } => {
                    // Roughly half the additions get a parent when one exists.
                    let parent = if parent_choice % 2 == 0 && !live.is_empty() {
                        Some(live[parent_choice % live.len()])
                    } else {
                        None
                    };
                    next_surface += 1;
                    let window = registry
                        .add_window(app, SurfaceId(next_surface), &spec(parent))
                        .unwrap()
                        .window;
                    live.push(window);
                }
                Op::RemoveWindow { choice } => {
                    if live.is_empty() {
                        continue;
                    }
                    let window = live.remove(choice % live.len());
                    registry.remove_window(window);
                }
            }
            prop_assert!(registry.links_are_symmetric());
        }

        // Full teardown keeps the invariant and frees the application.
        for window in live {
            registry.remove_window(window);
            prop_assert!(registry.links_are_symmetric());
        }
        prop_assert!(registry.remove_application(SessionId(1)).is_ok());
    }
}
