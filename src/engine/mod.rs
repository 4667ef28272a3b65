//! The window management engine.
//!
//! [`WindowManager`] is the facade compositor glue drives: every lifecycle
//! and input event enters here, updates the entity registry and MRU list
//! under one lock, and is forwarded to the active [`Policy`] for a decision
//! or an advisory. [`WindowManagerTools`] is the handle a policy uses to
//! query and mutate engine state from inside its callbacks. The lock is
//! reentrant, so callbacks may call straight back in.
//!
//! All mutation goes through this module; nothing else touches the
//! registry.

pub mod backends;

use log::{debug, info};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::{Arc, Weak};

use crate::application::{Application, ApplicationInfo, SessionId};
use crate::config::CoreConfig;
use crate::error::{Result, WmError};
use crate::geometry::{Displacement, Point, Rectangle, Size};
use crate::input::InputEvent;
use crate::mru::MruWindowList;
use crate::output::{Output, OutputId};
use crate::policy::{Policy, PolicyCapabilities};
use crate::registry::Registry;
use crate::window::{Window, WindowInfo, WindowSpec, WindowState};
use crate::workspace::Workspace;

use backends::{DisplayLayout, FocusBackend, SurfaceFactory};

struct State {
    config: CoreConfig,
    registry: Registry,
    displays: Vec<Output>,
    cursor: Point,
    last_input_timestamp: u64,
    mru: MruWindowList,
    focus: Box<dyn FocusBackend>,
    layout: Box<dyn DisplayLayout>,
    surfaces: Box<dyn SurfaceFactory>,
}

impl State {
    fn focused_window(&self) -> Option<Window> {
        self.focus
            .focused_surface()
            .and_then(|s| self.registry.window_for_surface(s).ok())
    }

    fn focused_application(&self) -> Option<Application> {
        self.focused_window()
            .and_then(|w| self.registry.window_info(w).ok().map(|i| i.application))
            .or_else(|| {
                self.focus
                    .focused_session()
                    .and_then(|s| self.registry.application_for_session(s).ok())
            })
    }

    /// The display with the greatest overlap with `info`; ties go to the
    /// first maximal match in registration order.
    fn display_for(&self, info: &WindowInfo) -> Rectangle {
        let extents = info.extents();
        let mut best: Option<(u64, Rectangle)> = None;
        for output in &self.displays {
            let area = output.extents.overlap_area(&extents);
            if best.map_or(true, |(max, _)| area > max) {
                best = Some((area, output.extents));
            }
        }
        best.map(|(_, rect)| rect).unwrap_or_default()
    }

    fn active_display(&self) -> Rectangle {
        if let Some(focused) = self.focused_window() {
            if let Ok(info) = self.registry.window_info(focused) {
                return self.display_for(info);
            }
        }
        for output in &self.displays {
            if output.extents.contains(self.cursor) {
                return output.extents;
            }
        }
        self.displays
            .first()
            .map(|o| o.extents)
            .unwrap_or_default()
    }

    fn display_rects(&self) -> Vec<Rectangle> {
        self.displays.iter().map(|o| o.extents).collect()
    }
}

struct Inner {
    state: RefCell<State>,
    policy: Box<dyn Policy>,
    capabilities: PolicyCapabilities,
}

struct Shared {
    inner: ReentrantMutex<Inner>,
}

/// The policy-driven window management engine.
pub struct WindowManager {
    shared: Arc<Shared>,
}

impl WindowManager {
    /// Construct the engine around its collaborators and build the policy.
    /// The policy receives its [`WindowManagerTools`] handle through
    /// `build`.
    pub fn new(
        config: CoreConfig,
        focus: Box<dyn FocusBackend>,
        layout: Box<dyn DisplayLayout>,
        surfaces: Box<dyn SurfaceFactory>,
        build: impl FnOnce(WindowManagerTools) -> Box<dyn Policy>,
    ) -> Self {
        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let tools = WindowManagerTools {
                shared: weak.clone(),
            };
            let policy = build(tools);
            let capabilities = policy.capabilities();
            info!(
                "Window management engine initialized (workspace advisories: {})",
                capabilities.workspaces
            );
            let state = State {
                mru: MruWindowList::with_limit(config.focus.mru_limit),
                config,
                registry: Registry::new(),
                displays: Vec::new(),
                cursor: Point::new(0, 0),
                last_input_timestamp: 0,
                focus,
                layout,
                surfaces,
            };
            Shared {
                inner: ReentrantMutex::new(Inner {
                    state: RefCell::new(state),
                    policy,
                    capabilities,
                }),
            }
        });
        Self { shared }
    }

    /// A tools handle for engine-side composite operations.
    pub fn tools(&self) -> WindowManagerTools {
        WindowManagerTools {
            shared: Arc::downgrade(&self.shared),
        }
    }

    // --- compositor-facing entry points; each is one lock acquisition ---

    pub fn add_session(&self, session: SessionId) -> Result<Application> {
        self.shared.inner.lock().add_session(session)
    }

    pub fn remove_session(&self, session: SessionId) -> Result<()> {
        self.shared.inner.lock().remove_session(session)
    }

    /// Create a window for `session` from the client-requested spec. The
    /// policy decides final placement before the surface is built.
    pub fn add_window(&self, session: SessionId, spec: WindowSpec) -> Result<Window> {
        self.shared.inner.lock().add_window(session, spec)
    }

    /// The underlying surface has been drawn for the first time.
    pub fn handle_window_ready(&self, window: Window) -> Result<()> {
        self.shared.inner.lock().handle_window_ready(window)
    }

    /// A client asked to modify a window; `delta` carries only the fields
    /// the client set.
    pub fn modify_window(&self, window: Window, delta: &WindowSpec) -> Result<()> {
        self.shared.inner.lock().handle_modify_window(window, delta)
    }

    /// A client asked for a state change.
    pub fn set_window_state(&self, window: Window, requested: WindowState) -> Result<WindowState> {
        self.shared.inner.lock().set_state(window, requested)
    }

    /// A window is going away (client close or policy decision).
    pub fn remove_window(&self, window: Window) -> Result<()> {
        self.shared.inner.lock().remove_window(window)
    }

    /// A client asked to be raised. Requests older than the latest user
    /// interaction are dropped so background clients cannot steal the
    /// stacking order.
    pub fn handle_raise_request(&self, window: Window, timestamp: u64) -> Result<()> {
        self.shared.inner.lock().handle_raise_request(window, timestamp)
    }

    /// Dispatch one input event. Returns `true` when the policy consumed it.
    pub fn handle_input_event(&self, event: &InputEvent) -> bool {
        self.shared.inner.lock().handle_input_event(event)
    }

    pub fn add_display(&self, output: Output) {
        self.shared.inner.lock().add_display(output)
    }

    pub fn remove_display(&self, id: OutputId) {
        self.shared.inner.lock().remove_display(id)
    }

    /// Swap in a complete new output configuration (assembled without the
    /// engine lock held).
    pub fn update_displays(&self, outputs: Vec<Output>) {
        self.shared.inner.lock().update_displays(outputs)
    }

    /// Run `f` with exclusive access to engine state, for composite
    /// read-modify-write sequences through a tools handle.
    pub fn invoke_under_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.shared.inner.lock();
        f()
    }
}

impl Inner {
    // --- sessions ---

    fn add_session(&self, session: SessionId) -> Result<Application> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let application = state.registry.add_application(session)?;
            state.registry.app_info(application)?.clone()
        };
        let application = snapshot.application;
        self.policy.advise_new_app(&snapshot);
        Ok(application)
    }

    fn remove_session(&self, session: SessionId) -> Result<()> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            state.registry.remove_application(session)?
        };
        self.policy.advise_delete_app(&snapshot);
        Ok(())
    }

    // --- window lifecycle ---

    fn add_window(&self, session: SessionId, requested: WindowSpec) -> Result<Window> {
        let (application, app_snapshot) = {
            let state = self.state.borrow();
            let application = state.registry.application_for_session(session)?;
            (application, state.registry.app_info(application)?.clone())
        };

        let placed = self.policy.place_new_window(&app_snapshot, requested);

        let snapshot = {
            let mut state = self.state.borrow_mut();
            let surface = state.surfaces.create_surface(application, session, &placed);
            let built = match state.registry.add_window(application, surface, &placed) {
                Ok(info) => info.clone(),
                Err(err) => {
                    // Roll the surface back; the graph was never linked.
                    state.surfaces.destroy_surface(surface);
                    return Err(err);
                }
            };
            state
                .surfaces
                .configure_surface(surface, built.top_left, built.size);
            built
        };

        self.policy.advise_new_window(&snapshot);
        Ok(snapshot.window)
    }

    fn handle_window_ready(&self, window: Window) -> Result<()> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let info = state.registry.window_info_mut(window)?;
            if info.ready_notified {
                return Ok(());
            }
            info.ready_notified = true;
            info.clone()
        };
        self.policy.advise_window_ready(&snapshot);
        Ok(())
    }

    fn handle_modify_window(&self, window: Window, delta: &WindowSpec) -> Result<()> {
        let snapshot = {
            let state = self.state.borrow();
            state.registry.window_info(window)?.clone()
        };

        match self.policy.handle_modify_window(&snapshot, delta.clone()) {
            Some(approved) => self.apply_modifications(window, &approved),
            None => {
                // A veto is a decision, not an error.
                debug!("Policy rejected modification of window {}", window.raw());
                Ok(())
            }
        }
    }

    fn set_state(&self, window: Window, requested: WindowState) -> Result<WindowState> {
        let snapshot = {
            let state = self.state.borrow();
            state.registry.window_info(window)?.clone()
        };
        let resulting = self.policy.handle_set_state(&snapshot, requested);
        let spec = WindowSpec {
            state: Some(resulting),
            ..Default::default()
        };
        self.apply_modifications(window, &spec)?;
        Ok(resulting)
    }

    /// Apply a policy-approved specification to the window record and its
    /// surface, firing move/resize/state advisories for what changed.
    fn apply_modifications(&self, window: Window, spec: &WindowSpec) -> Result<()> {
        struct Applied {
            snapshot: WindowInfo,
            moved: bool,
            resized: bool,
            state_changed: Option<WindowState>,
            lost_focus: bool,
        }

        let applied = {
            let mut state = self.state.borrow_mut();
            let current = state.registry.window_info(window)?.clone();

            let mut new_top_left = spec.top_left;
            let mut new_size = spec.size;
            let new_state = spec.state.filter(|s| *s != current.state);
            let mut save_restore = false;
            let mut clear_restore = false;

            if let Some(target_state) = new_state {
                match target_state {
                    WindowState::Maximized => {
                        let display = state.display_for(&current);
                        save_restore = true;
                        new_top_left = Some(display.top_left);
                        new_size = Some(display.size);
                    }
                    WindowState::VertMaximized => {
                        let display = state.display_for(&current);
                        save_restore = true;
                        new_top_left =
                            Some(Point::new(current.top_left.x, display.top_left.y));
                        new_size =
                            Some(Size::new(current.size.width, display.size.height));
                    }
                    WindowState::HorizMaximized => {
                        let display = state.display_for(&current);
                        save_restore = true;
                        new_top_left =
                            Some(Point::new(display.top_left.x, current.top_left.y));
                        new_size =
                            Some(Size::new(display.size.width, current.size.height));
                    }
                    WindowState::Fullscreen => {
                        let rect = state.layout.size_to_output(current.extents());
                        save_restore = true;
                        new_top_left = Some(rect.top_left);
                        new_size = Some(rect.size);
                    }
                    WindowState::Restored => {
                        clear_restore = true;
                        if let Some(rect) = current.restore_rect {
                            new_top_left = new_top_left.or(Some(rect.top_left));
                            new_size = new_size.or(Some(rect.size));
                        }
                    }
                    // Geometry survives minimize/hide for later restore.
                    WindowState::Minimized | WindowState::Hidden => {}
                }
            }

            let previous_extents = current.extents();
            let (surface, top_left, size, moved, resized, snapshot) = {
                let info = state.registry.window_info_mut(window)?;

                if let Some(name) = &spec.name {
                    info.name = name.clone();
                }
                if let Some(v) = spec.min_width {
                    info.constraints.min_width = v;
                }
                if let Some(v) = spec.min_height {
                    info.constraints.min_height = v;
                }
                if let Some(v) = spec.max_width {
                    info.constraints.max_width = v;
                }
                if let Some(v) = spec.max_height {
                    info.constraints.max_height = v;
                }
                if let Some(v) = spec.width_inc {
                    info.constraints.width_inc = v;
                }
                if let Some(v) = spec.height_inc {
                    info.constraints.height_inc = v;
                }
                if let Some(v) = spec.min_aspect {
                    info.constraints.min_aspect = Some(v);
                }
                if let Some(v) = spec.max_aspect {
                    info.constraints.max_aspect = Some(v);
                }
                if let Some(data) = &spec.userdata {
                    info.userdata = Some(data.clone());
                }

                let moved = match new_top_left {
                    Some(p) if p != info.top_left => {
                        info.top_left = p;
                        true
                    }
                    _ => false,
                };
                let resized = match new_size {
                    Some(s) if s != info.size => {
                        info.size = s;
                        true
                    }
                    _ => false,
                };
                if let Some(target_state) = new_state {
                    if save_restore && info.restore_rect.is_none() {
                        info.restore_rect = Some(previous_extents);
                    }
                    if clear_restore {
                        info.restore_rect = None;
                    }
                    info.state = target_state;
                }

                (info.surface, info.top_left, info.size, moved, resized, info.clone())
            };

            if moved || resized {
                state.surfaces.configure_surface(surface, top_left, size);
            }
            if let Some(target_state) = new_state {
                state.surfaces.apply_state(surface, target_state);
            }

            let lost_focus = new_state.is_some_and(|s| !s.allows_focus())
                && state.focused_window() == Some(window);
            if lost_focus {
                state.focus.set_focus(None, None);
            }

            Applied {
                snapshot,
                moved,
                resized,
                state_changed: new_state,
                lost_focus,
            }
        };

        if applied.moved {
            self.policy
                .advise_move(&applied.snapshot, applied.snapshot.top_left);
        }
        if applied.resized {
            self.policy
                .advise_resize(&applied.snapshot, applied.snapshot.size);
        }
        if let Some(new_state) = applied.state_changed {
            self.policy.advise_state_change(&applied.snapshot, new_state);
        }
        if applied.lost_focus {
            self.policy.advise_focus_lost(&applied.snapshot);
        }
        Ok(())
    }

    fn remove_window(&self, window: Window) -> Result<()> {
        let Some(snapshot) = ({
            let state = self.state.borrow();
            state.registry.window_info(window).ok().cloned()
        }) else {
            // Teardown races between client disconnect and policy close are
            // expected; a second removal is a no-op.
            debug!("Removal of unknown window {} ignored", window.raw());
            return Ok(());
        };

        let was_focused = { self.state.borrow().focused_window() == Some(window) };
        if was_focused {
            self.refocus_after_removal(&snapshot);
        }

        {
            let mut state = self.state.borrow_mut();
            if let Some(removed) = state.registry.remove_window(window) {
                state.mru.erase(window);
                state.surfaces.destroy_surface(removed.surface);
            }
        }

        self.policy.advise_delete_window(&snapshot);
        Ok(())
    }

    /// Reassign focus away from a dying window: its parent, else the first
    /// remaining top-level window of the same application in creation
    /// order, else the next application's top window.
    fn refocus_after_removal(&self, dying: &WindowInfo) {
        if let Some(parent) = dying.parent {
            if self.activate(parent).is_some() {
                return;
            }
        }

        let siblings = {
            let state = self.state.borrow();
            state.registry.top_level_windows(dying.application)
        };
        for candidate in siblings {
            if candidate == dying.window {
                continue;
            }
            if self.activate(candidate).is_some() {
                return;
            }
        }

        let apps = {
            let state = self.state.borrow();
            state.registry.applications().collect::<Vec<_>>()
        };
        let start = apps
            .iter()
            .position(|a| *a == dying.application)
            .map(|i| i + 1)
            .unwrap_or(0);
        for offset in 0..apps.len() {
            let app = apps[(start + offset) % apps.len()];
            if app == dying.application {
                continue;
            }
            let tops = {
                let state = self.state.borrow();
                state.registry.top_level_windows(app)
            };
            for candidate in tops {
                if self.activate(candidate).is_some() {
                    return;
                }
            }
        }

        let mut state = self.state.borrow_mut();
        state.focus.set_focus(None, None);
    }

    // --- raise and input ---

    fn handle_raise_request(&self, window: Window, timestamp: u64) -> Result<()> {
        let snapshot = {
            let state = self.state.borrow();
            if timestamp < state.last_input_timestamp {
                debug!(
                    "Dropping stale raise request for window {} ({} < {})",
                    window.raw(),
                    timestamp,
                    state.last_input_timestamp
                );
                return Ok(());
            }
            state.registry.window_info(window)?.clone()
        };
        self.policy.handle_raise_window(&snapshot);
        Ok(())
    }

    fn handle_input_event(&self, event: &InputEvent) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if let Some(timestamp) = event.interaction_timestamp() {
                if timestamp > state.last_input_timestamp {
                    state.last_input_timestamp = timestamp;
                }
            }
            if let InputEvent::Pointer(pointer) = event {
                state.cursor = pointer.position;
            }
        }

        match event {
            InputEvent::Keyboard(k) => self.policy.handle_keyboard_event(k),
            InputEvent::Pointer(p) => self.policy.handle_pointer_event(p),
            InputEvent::Touch(t) => self.policy.handle_touch_event(t),
        }
    }

    fn raise_tree(&self, root: Window) -> Result<()> {
        let (tree, surfaces) = {
            let state = self.state.borrow();
            state.registry.window_info(root)?;
            let tree = state.registry.tree_of(root);
            let surfaces = tree
                .iter()
                .filter_map(|w| state.registry.window_info(*w).ok().map(|i| i.surface))
                .collect::<Vec<_>>();
            (tree, surfaces)
        };
        {
            let mut state = self.state.borrow_mut();
            state.focus.raise(&surfaces);
        }
        self.policy.advise_raise(&tree);
        Ok(())
    }

    // --- focus ---

    /// Focus `target` if it can currently be activated. Direct: no
    /// fallback search.
    fn activate(&self, target: Window) -> Option<Window> {
        let (previous_info, target_info) = {
            let mut state = self.state.borrow_mut();
            let info = state.registry.window_info(target).ok()?;
            if !info.can_be_active() {
                return None;
            }
            let target_info = info.clone();
            let previous = state.focused_window();
            if previous == Some(target) {
                state.mru.push(target);
                return Some(target);
            }
            let session = state.registry.app_info(target_info.application).ok()?.session;
            state
                .focus
                .set_focus(Some(session), Some(target_info.surface));
            state.mru.push(target);
            let previous_info =
                previous.and_then(|w| state.registry.window_info(w).ok().cloned());
            (previous_info, target_info)
        };

        if let Some(previous_info) = previous_info {
            self.policy.advise_focus_lost(&previous_info);
        }
        debug!("Focus moved to window {}", target.raw());
        self.policy.advise_focus_gained(&target_info);
        Some(target)
    }

    /// Focus `hint`, or silently do nothing when it cannot be activated.
    /// A non-activatable hint falls back to the most recently used
    /// activatable window of the same application.
    fn select_active_window(&self, hint: Window) -> Option<Window> {
        let resolved = {
            let state = self.state.borrow();
            let info = state.registry.window_info(hint).ok()?;
            if info.can_be_active() {
                Some(hint)
            } else {
                let application = info.application;
                state.mru.top_matching(|w| {
                    w != hint
                        && state
                            .registry
                            .window_info(w)
                            .map(|i| i.application == application && i.can_be_active())
                            .unwrap_or(false)
                })
            }
        };
        self.activate(resolved?)
    }

    fn focus_next_application(&self) {
        let (apps, current) = {
            let state = self.state.borrow();
            (
                state.registry.applications().collect::<Vec<_>>(),
                state.focused_application(),
            )
        };
        if apps.is_empty() {
            return;
        }

        let start = current
            .and_then(|c| apps.iter().position(|a| *a == c))
            .map(|i| i + 1)
            .unwrap_or(0);
        for offset in 0..apps.len() {
            let app = apps[(start + offset) % apps.len()];
            let tops = {
                let state = self.state.borrow();
                state.registry.top_level_windows(app)
            };
            for candidate in tops {
                if self.activate(candidate).is_some() {
                    return;
                }
            }
        }
    }

    fn focus_next_within_application(&self) {
        let Some(current) = ({ self.state.borrow().focused_window() }) else {
            self.focus_next_application();
            return;
        };
        let tops = {
            let state = self.state.borrow();
            let Ok(info) = state.registry.window_info(current) else {
                return;
            };
            state.registry.top_level_windows(info.application)
        };
        if tops.is_empty() {
            return;
        }

        let start = tops
            .iter()
            .position(|w| *w == current)
            .map(|i| i + 1)
            .unwrap_or(0);
        for offset in 0..tops.len() {
            let candidate = tops[(start + offset) % tops.len()];
            if candidate == current {
                continue;
            }
            if self.activate(candidate).is_some() {
                return;
            }
        }
    }

    // --- movement ---

    fn move_tree(&self, root: Window, movement: Displacement) -> Result<()> {
        if movement == Displacement::default() {
            return Ok(());
        }

        let snapshots = {
            let mut state = self.state.borrow_mut();
            state.registry.window_info(root)?;
            let tree = state.registry.tree_of(root);
            let mut snapshots = Vec::with_capacity(tree.len());
            for window in tree {
                let (surface, top_left, size, snapshot) = {
                    let info = state.registry.window_info_mut(window)?;
                    info.top_left += movement;
                    (info.surface, info.top_left, info.size, info.clone())
                };
                state.surfaces.configure_surface(surface, top_left, size);
                snapshots.push(snapshot);
            }
            snapshots
        };

        for snapshot in &snapshots {
            self.policy.advise_move(snapshot, snapshot.top_left);
        }
        Ok(())
    }

    fn drag_active_window(&self, movement: Displacement) {
        let Some(active) = ({ self.state.borrow().focused_window() }) else {
            return;
        };
        if let Err(err) = self.move_tree(active, movement) {
            debug!("Drag of active window failed: {err}");
        }
    }

    // --- workspaces ---

    fn add_tree_to_workspace(&self, root: Window, workspace: &Workspace) {
        let added = {
            let mut state = self.state.borrow_mut();
            let tree = state.registry.tree_of(root);
            let mut added = Vec::new();
            for window in tree {
                if let Ok(info) = state.registry.window_info_mut(window) {
                    if info.add_to_workspace(workspace) {
                        added.push(window);
                    }
                }
            }
            added
        };
        if !added.is_empty() && self.capabilities.workspaces {
            self.policy.advise_adding_to_workspace(workspace, &added);
        }
    }

    fn remove_tree_from_workspace(&self, root: Window, workspace: &Workspace) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let tree = state.registry.tree_of(root);
            let mut removed = Vec::new();
            for window in tree {
                if let Ok(info) = state.registry.window_info_mut(window) {
                    if info.remove_from_workspace(workspace) {
                        removed.push(window);
                    }
                }
            }
            removed
        };
        if !removed.is_empty() && self.capabilities.workspaces {
            self.policy
                .advise_removing_from_workspace(workspace, &removed);
        }
    }

    fn windows_in_workspace(&self, workspace: &Workspace) -> Vec<Window> {
        let state = self.state.borrow();
        state
            .registry
            .windows_in_registration_order()
            .into_iter()
            .filter(|w| {
                state
                    .registry
                    .window_info(*w)
                    .map(|i| i.is_in_workspace(workspace))
                    .unwrap_or(false)
            })
            .collect()
    }

    // --- displays ---

    fn add_display(&self, output: Output) {
        let displays = {
            let mut state = self.state.borrow_mut();
            match state.displays.iter_mut().find(|o| o.id == output.id) {
                Some(existing) => existing.extents = output.extents,
                None => state.displays.push(output),
            }
            state.display_rects()
        };
        self.policy.advise_displays_updated(&displays);
    }

    fn remove_display(&self, id: OutputId) {
        let displays = {
            let mut state = self.state.borrow_mut();
            state.displays.retain(|o| o.id != id);
            state.display_rects()
        };
        self.policy.advise_displays_updated(&displays);
    }

    fn update_displays(&self, outputs: Vec<Output>) {
        let displays = {
            let mut state = self.state.borrow_mut();
            state.displays = outputs;
            state.display_rects()
        };
        self.policy.advise_displays_updated(&displays);
    }
}

/// Handle a policy (or engine-side composite operation) uses to query and
/// mutate the engine. Cheap to clone; all methods acquire the engine lock,
/// which is reentrant, so they are safe to call from inside policy
/// callbacks.
#[derive(Clone)]
pub struct WindowManagerTools {
    shared: Weak<Shared>,
}

impl WindowManagerTools {
    fn with<R>(&self, f: impl FnOnce(&Inner) -> R) -> Option<R> {
        let shared = self.shared.upgrade()?;
        let guard = shared.inner.lock();
        Some(f(&guard))
    }

    // --- queries ---

    /// The engine's configuration, as constructed.
    pub fn config(&self) -> CoreConfig {
        self.with(|inner| inner.state.borrow().config.clone())
            .unwrap_or_default()
    }

    pub fn count_applications(&self) -> usize {
        self.with(|inner| inner.state.borrow().registry.count_applications())
            .unwrap_or(0)
    }

    /// Run `f` over a snapshot of every application, in registration order.
    pub fn for_each_application(&self, mut f: impl FnMut(&ApplicationInfo)) {
        let snapshots = self
            .with(|inner| {
                let state = inner.state.borrow();
                state
                    .registry
                    .applications()
                    .filter_map(|a| state.registry.app_info(a).ok().cloned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        for snapshot in &snapshots {
            f(snapshot);
        }
    }

    pub fn find_application(
        &self,
        mut predicate: impl FnMut(&ApplicationInfo) -> bool,
    ) -> Option<Application> {
        self.with(|inner| {
            let state = inner.state.borrow();
            let found = state
                .registry
                .applications()
                .filter_map(|a| state.registry.app_info(a).ok())
                .find(|info| predicate(info))
                .map(|info| info.application);
            found
        })
        .flatten()
    }

    pub fn info_for_window(&self, window: Window) -> Result<WindowInfo> {
        self.with(|inner| {
            inner
                .state
                .borrow()
                .registry
                .window_info(window)
                .map(|i| i.clone())
        })
        .unwrap_or(Err(WmError::no_window(window.raw())))
    }

    pub fn info_for_application(&self, application: Application) -> Result<ApplicationInfo> {
        self.with(|inner| {
            inner
                .state
                .borrow()
                .registry
                .app_info(application)
                .map(|i| i.clone())
        })
        .unwrap_or(Err(WmError::no_application(application.raw())))
    }

    /// Attach opaque policy data to an application record.
    pub fn set_application_userdata(
        &self,
        application: Application,
        data: std::sync::Arc<dyn std::any::Any + Send + Sync>,
    ) -> Result<()> {
        self.with(|inner| {
            let mut state = inner.state.borrow_mut();
            state.registry.app_info_mut(application)?.userdata = Some(data);
            Ok(())
        })
        .unwrap_or(Err(WmError::no_application(application.raw())))
    }

    pub fn active_window(&self) -> Option<Window> {
        self.with(|inner| inner.state.borrow().focused_window())
            .flatten()
    }

    /// The window under `point`, per the stacking backend.
    pub fn window_at(&self, point: Point) -> Option<Window> {
        self.with(|inner| {
            let state = inner.state.borrow();
            state
                .focus
                .surface_at(point)
                .and_then(|s| state.registry.window_for_surface(s).ok())
        })
        .flatten()
    }

    /// The display rectangle focus/placement decisions should target.
    pub fn active_display(&self) -> Rectangle {
        self.with(|inner| inner.state.borrow().active_display())
            .unwrap_or_default()
    }

    pub fn displays(&self) -> Vec<Rectangle> {
        self.with(|inner| inner.state.borrow().display_rects())
            .unwrap_or_default()
    }

    // --- focus and stacking ---

    pub fn select_active_window(&self, hint: Window) -> Option<Window> {
        self.with(|inner| inner.select_active_window(hint)).flatten()
    }

    pub fn focus_next_application(&self) {
        self.with(|inner| inner.focus_next_application());
    }

    pub fn focus_next_within_application(&self) {
        self.with(|inner| inner.focus_next_within_application());
    }

    /// Raise `root` and its whole tree as a unit.
    pub fn raise_tree(&self, root: Window) -> Result<()> {
        self.with(|inner| inner.raise_tree(root))
            .unwrap_or(Err(WmError::no_window(root.raw())))
    }

    pub fn drag_active_window(&self, movement: Displacement) {
        self.with(|inner| inner.drag_active_window(movement));
    }

    pub fn move_tree(&self, root: Window, movement: Displacement) -> Result<()> {
        self.with(|inner| inner.move_tree(root, movement))
            .unwrap_or(Err(WmError::no_window(root.raw())))
    }

    // --- mutation ---

    /// Apply `spec` to a window directly (no policy decision round-trip);
    /// this is the mutation path policies use from inside their callbacks.
    pub fn modify_window(&self, window: Window, spec: &WindowSpec) -> Result<()> {
        self.with(|inner| inner.apply_modifications(window, spec))
            .unwrap_or(Err(WmError::no_window(window.raw())))
    }

    pub fn place_and_size(&self, window: Window, top_left: Point, size: Size) -> Result<()> {
        let spec = WindowSpec {
            top_left: Some(top_left),
            size: Some(size),
            ..Default::default()
        };
        self.modify_window(window, &spec)
    }

    pub fn set_state(&self, window: Window, requested: WindowState) -> Result<WindowState> {
        self.with(|inner| inner.set_state(window, requested))
            .unwrap_or(Err(WmError::no_window(window.raw())))
    }

    // --- workspaces ---

    pub fn create_workspace(&self) -> Workspace {
        Workspace::create()
    }

    pub fn add_tree_to_workspace(&self, root: Window, workspace: &Workspace) {
        self.with(|inner| inner.add_tree_to_workspace(root, workspace));
    }

    pub fn remove_tree_from_workspace(&self, root: Window, workspace: &Workspace) {
        self.with(|inner| inner.remove_tree_from_workspace(root, workspace));
    }

    /// Windows belonging to `workspace`, in application-registration order.
    pub fn windows_in_workspace(&self, workspace: &Workspace) -> Vec<Window> {
        self.with(|inner| inner.windows_in_workspace(workspace))
            .unwrap_or_default()
    }

    pub fn for_each_window_in_workspace(
        &self,
        workspace: &Workspace,
        mut f: impl FnMut(Window),
    ) {
        for window in self.windows_in_workspace(workspace) {
            f(window);
        }
    }

    /// Live workspaces containing `window`.
    pub fn workspaces_containing(&self, window: Window) -> Vec<Workspace> {
        self.info_for_window(window)
            .map(|info| info.workspaces())
            .unwrap_or_default()
    }

    /// Run `f` with the engine lock held, for composite read-modify-write
    /// sequences.
    pub fn invoke_under_lock<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let shared = self.shared.upgrade()?;
        let _guard = shared.inner.lock();
        Some(f())
    }
}
