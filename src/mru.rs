//! Most-recently-used focus history.
//!
//! Front of the list is the window focused most recently. Focusing a window
//! moves it to the front; destroying a window purges it wherever it sits.

use std::collections::VecDeque;

use crate::window::Window;

#[derive(Debug, Default)]
pub struct MruWindowList {
    windows: VecDeque<Window>,
    limit: Option<usize>,
}

impl MruWindowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list that keeps at most `limit` entries, dropping the oldest.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            windows: VecDeque::new(),
            limit: Some(limit.max(1)),
        }
    }

    /// Record `window` as the most recently focused.
    pub fn push(&mut self, window: Window) {
        self.windows.retain(|w| *w != window);
        self.windows.push_front(window);

        if let Some(limit) = self.limit {
            while self.windows.len() > limit {
                self.windows.pop_back();
            }
        }
    }

    /// Remove `window` regardless of position.
    pub fn erase(&mut self, window: Window) {
        self.windows.retain(|w| *w != window);
    }

    /// The most recently focused window, if any.
    pub fn top(&self) -> Option<Window> {
        self.windows.front().copied()
    }

    /// The most recently focused window satisfying `predicate`.
    pub fn top_matching(&self, mut predicate: impl FnMut(Window) -> bool) -> Option<Window> {
        self.windows.iter().copied().find(|w| predicate(*w))
    }

    pub fn contains(&self, window: Window) -> bool {
        self.windows.contains(&window)
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Windows in most-recent-first order.
    pub fn iter(&self) -> impl Iterator<Item = Window> + '_ {
        self.windows.iter().copied()
    }
}
