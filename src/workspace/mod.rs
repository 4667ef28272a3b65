//! Virtual-desktop workspaces.
//!
//! A [`Workspace`] is an opaque grouping token. It keeps no window list of
//! its own: membership is recorded on each window as a weak reference, so a
//! workspace lives exactly as long as some policy holds a clone of the token
//! and dies without unlinking anything.
//!
//! [`WorkspaceSwitcher`] is the reference switch algorithm a policy embeds:
//! hide the outgoing workspace (deferring the focused window so focus does
//! not bounce mid-switch), reveal the incoming one, and remember the
//! deferred window as the workspace's last-active.

use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::engine::WindowManagerTools;
use crate::window::{Window, WindowSpec, WindowState};

static NEXT_WORKSPACE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity payload behind a workspace token.
#[derive(Debug)]
pub struct WorkspaceTag {
    id: u64,
}

/// Cloneable opaque workspace token. Two clones compare equal; two separate
/// `create_workspace` calls never do.
#[derive(Debug, Clone)]
pub struct Workspace(Arc<WorkspaceTag>);

impl Workspace {
    pub(crate) fn create() -> Self {
        let id = NEXT_WORKSPACE_ID.fetch_add(1, Ordering::Relaxed);
        debug!("Created workspace {id}");
        Self(Arc::new(WorkspaceTag { id }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub(crate) fn downgrade(&self) -> Weak<WorkspaceTag> {
        Arc::downgrade(&self.0)
    }

    pub(crate) fn from_tag(tag: Arc<WorkspaceTag>) -> Self {
        Self(tag)
    }

    pub(crate) fn is_tag(&self, tag: &Arc<WorkspaceTag>) -> bool {
        Arc::ptr_eq(&self.0, tag)
    }
}

impl PartialEq for Workspace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Workspace {}

/// Reference workspace-switching state machine.
///
/// Tracks the active workspace, each window's pre-hide state, and each
/// workspace's last-active window so that re-entering a workspace with no
/// other focus candidate restores it.
pub struct WorkspaceSwitcher {
    active: Workspace,
    /// Pre-hide state per window hidden by this switcher
    hidden_state: HashMap<Window, WindowState>,
    /// Last focused window per workspace, recorded when switching away
    last_active: HashMap<u64, Window>,
}

impl WorkspaceSwitcher {
    pub fn new(active: Workspace) -> Self {
        Self {
            active,
            hidden_state: HashMap::new(),
            last_active: HashMap::new(),
        }
    }

    pub fn active(&self) -> &Workspace {
        &self.active
    }

    /// The window recorded as `workspace`'s last-active, if any.
    pub fn last_active_in(&self, workspace: &Workspace) -> Option<Window> {
        self.last_active.get(&workspace.id()).copied()
    }

    /// A policy calls this from its new-window advisory: top-level windows
    /// join the active workspace; children of a hidden parent start hidden.
    pub fn on_window_added(&mut self, tools: &WindowManagerTools, window: Window) {
        let Ok(info) = tools.info_for_window(window) else {
            return;
        };
        match info.parent {
            None => tools.add_tree_to_workspace(window, &self.active),
            Some(parent) => {
                if self.hidden_state.contains_key(&parent) {
                    self.hide(tools, window);
                }
            }
        }
    }

    /// Forget a destroyed window.
    pub fn on_window_removed(&mut self, window: Window) {
        self.hidden_state.remove(&window);
        self.last_active.retain(|_, w| *w != window);
    }

    /// Switch to `workspace`, optionally carrying `carry` (and its tree)
    /// along from the outgoing workspace.
    pub fn switch_to(&mut self, tools: &WindowManagerTools, workspace: &Workspace, carry: Option<Window>) {
        if *workspace == self.active {
            return;
        }

        let outgoing = std::mem::replace(&mut self.active, workspace.clone());
        let previously_focused = tools.active_window();
        debug!(
            "Switching workspace {} -> {} (focused: {:?})",
            outgoing.id(),
            workspace.id(),
            previously_focused
        );

        // With nothing focused, reveal the incoming workspace's remembered
        // window first so it grabs focus rather than an arbitrary one.
        if previously_focused.is_none() {
            if let Some(remembered) = self.last_active_in(workspace) {
                let still_member = tools
                    .info_for_window(remembered)
                    .map(|info| info.is_in_workspace(workspace))
                    .unwrap_or(false);
                if still_member {
                    self.reveal(tools, remembered);
                }
            }
        }

        if let Some(window) = carry {
            tools.remove_tree_from_workspace(window, &outgoing);
            tools.add_tree_to_workspace(window, workspace);
        }

        for window in tools.windows_in_workspace(workspace) {
            self.reveal(tools, window);
        }

        // Hide the focused window last so focus does not bounce through
        // half-hidden siblings mid-switch.
        let mut deferred = None;
        for window in tools.windows_in_workspace(&outgoing) {
            if Some(window) == previously_focused {
                deferred = Some(window);
                continue;
            }
            self.hide(tools, window);
        }

        if let Some(window) = deferred {
            self.hide(tools, window);
            self.last_active.insert(outgoing.id(), window);
        }
    }

    fn hide(&mut self, tools: &WindowManagerTools, window: Window) {
        let Ok(info) = tools.info_for_window(window) else {
            return;
        };
        if self.hidden_state.contains_key(&window) {
            return;
        }
        self.hidden_state.insert(window, info.state);

        let spec = WindowSpec {
            state: Some(WindowState::Hidden),
            ..Default::default()
        };
        if let Err(err) = tools.modify_window(window, &spec) {
            debug!("Hiding {window:?} failed: {err}");
        }
    }

    fn reveal(&mut self, tools: &WindowManagerTools, window: Window) {
        let Some(old_state) = self.hidden_state.remove(&window) else {
            return;
        };

        let spec = WindowSpec {
            state: Some(old_state),
            ..Default::default()
        };
        if let Err(err) = tools.modify_window(window, &spec) {
            debug!("Revealing {window:?} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_compare_by_identity() {
        let a = Workspace::create();
        let b = Workspace::create();
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn dropping_all_clones_kills_the_tag() {
        let a = Workspace::create();
        let weak = a.downgrade();
        assert!(weak.upgrade().is_some());

        drop(a);
        assert!(weak.upgrade().is_none());
    }
}
