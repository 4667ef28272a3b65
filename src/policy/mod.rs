//! The pluggable window-management policy contract.
//!
//! A policy is one strategy object (canonical, tiling, kiosk, ...) the
//! engine consults for every decision: where a new window goes, whether a
//! modification stands, how input is handled. Decision callbacks are
//! required; advisory hooks default to no-ops so a policy implements only
//! what it needs.
//!
//! Callbacks are invoked synchronously while the engine lock is held and
//! may call back into the engine through the [`WindowManagerTools`] handle
//! the policy received at construction; the lock is reentrant. Because the
//! lock serializes all entry, callbacks take `&self`; a policy keeps private
//! mutable state in `Cell`/`RefCell` fields.
//!
//! [`WindowManagerTools`]: crate::engine::WindowManagerTools

pub mod canonical;
pub mod placement;


use crate::application::ApplicationInfo;
use crate::geometry::{Point, Rectangle, Size};
use crate::input::{KeyboardEvent, PointerEvent, TouchEvent};
use crate::window::{Window, WindowInfo, WindowSpec, WindowState};
use crate::workspace::Workspace;

/// Optional interfaces a policy declares at construction, replacing any
/// runtime type inspection. The engine skips dispatch the policy did not
/// sign up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyCapabilities {
    /// Receive workspace membership advisories
    pub workspaces: bool,
}

impl Default for PolicyCapabilities {
    fn default() -> Self {
        Self { workspaces: false }
    }
}

/// A window management strategy.
pub trait Policy: Send {
    /// Declared once at policy registration.
    fn capabilities(&self) -> PolicyCapabilities {
        PolicyCapabilities::default()
    }

    // --- decision callbacks ---

    /// Decide placement for a new window: receives the client-requested
    /// specification, returns the specification to build. Must leave
    /// position and size set.
    fn place_new_window(&self, app: &ApplicationInfo, request: WindowSpec) -> WindowSpec;

    /// Approve, clamp, or veto a modification. The engine passes only the
    /// fields the client set; returning `None` vetoes the change (a
    /// decision, not an error; the request becomes a no-op).
    fn handle_modify_window(
        &self,
        window: &WindowInfo,
        modifications: WindowSpec,
    ) -> Option<WindowSpec>;

    /// Map a requested state to the state that will actually be applied.
    fn handle_set_state(&self, window: &WindowInfo, requested: WindowState) -> WindowState;

    /// A raise request that passed the input-timestamp gate.
    fn handle_raise_window(&self, window: &WindowInfo);

    /// Input events. Return `true` to consume the event and stop
    /// propagation.
    fn handle_keyboard_event(&self, event: &KeyboardEvent) -> bool;
    fn handle_pointer_event(&self, event: &PointerEvent) -> bool;
    fn handle_touch_event(&self, event: &TouchEvent) -> bool;

    // --- advisory callbacks (fire-and-forget, no-op defaults) ---

    fn advise_new_app(&self, _app: &ApplicationInfo) {}
    fn advise_delete_app(&self, _app: &ApplicationInfo) {}
    fn advise_new_window(&self, _window: &WindowInfo) {}
    /// Fired exactly once per window, after its surface is first drawn.
    fn advise_window_ready(&self, _window: &WindowInfo) {}
    fn advise_delete_window(&self, _window: &WindowInfo) {}
    fn advise_focus_gained(&self, _window: &WindowInfo) {}
    fn advise_focus_lost(&self, _window: &WindowInfo) {}
    fn advise_state_change(&self, _window: &WindowInfo, _state: WindowState) {}
    fn advise_resize(&self, _window: &WindowInfo, _new_size: Size) {}
    fn advise_move(&self, _window: &WindowInfo, _new_top_left: Point) {}
    fn advise_raise(&self, _windows: &[Window]) {}
    fn advise_displays_updated(&self, _displays: &[Rectangle]) {}
    /// Only dispatched to policies whose capabilities declare `workspaces`.
    fn advise_adding_to_workspace(&self, _workspace: &Workspace, _windows: &[Window]) {}
    fn advise_removing_from_workspace(&self, _workspace: &Workspace, _windows: &[Window]) {}
}
