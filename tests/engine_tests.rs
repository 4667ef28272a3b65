//! Integration tests for the window management engine.
//!
//! The engine is driven end to end through fake backends: a focus/stacking
//! backend that records intent, a surface factory that logs lifecycle
//! calls, and a policy that records every decision and advisory it sees.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use strata::engine::backends::{DisplayLayout, FocusBackend, SurfaceFactory};
use strata::engine::{WindowManager, WindowManagerTools};
use strata::geometry::{Point, Rectangle, Size};
use strata::input::{
    InputEvent, PointerAction, PointerButton, PointerEvent, MODIFIER_NONE,
};
use strata::output::{Output, OutputId};
use strata::policy::{Policy, PolicyCapabilities};
use strata::window::{SurfaceId, Window, WindowInfo, WindowSpec, WindowState, WindowType};
use strata::workspace::WorkspaceSwitcher;
use strata::{Application, ApplicationInfo, CanonicalPolicy, CoreConfig, SessionId, WmError};

// --- fake backends ---

#[derive(Default)]
struct FocusState {
    focused_surface: Option<SurfaceId>,
    focused_session: Option<SessionId>,
    raised: Vec<Vec<SurfaceId>>,
    surface_under_cursor: Option<SurfaceId>,
}

struct FakeFocus(Arc<Mutex<FocusState>>);

impl FocusBackend for FakeFocus {
    fn raise(&mut self, surfaces: &[SurfaceId]) {
        self.0.lock().raised.push(surfaces.to_vec());
    }

    fn set_focus(&mut self, session: Option<SessionId>, surface: Option<SurfaceId>) {
        let mut state = self.0.lock();
        state.focused_session = session;
        state.focused_surface = surface;
    }

    fn surface_at(&self, _point: Point) -> Option<SurfaceId> {
        self.0.lock().surface_under_cursor
    }

    fn focused_surface(&self) -> Option<SurfaceId> {
        self.0.lock().focused_surface
    }

    fn focused_session(&self) -> Option<SessionId> {
        self.0.lock().focused_session
    }
}

#[derive(Default)]
struct SurfaceLog {
    next: u64,
    destroyed: Vec<SurfaceId>,
    configured: Vec<(SurfaceId, Point, Size)>,
}

struct FakeSurfaces(Arc<Mutex<SurfaceLog>>);

impl SurfaceFactory for FakeSurfaces {
    fn create_surface(
        &mut self,
        _application: Application,
        _session: SessionId,
        _spec: &WindowSpec,
    ) -> SurfaceId {
        let mut log = self.0.lock();
        log.next += 1;
        SurfaceId(log.next)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        self.0.lock().destroyed.push(surface);
    }

    fn configure_surface(&mut self, surface: SurfaceId, top_left: Point, size: Size) {
        self.0.lock().configured.push((surface, top_left, size));
    }
}

struct FakeLayout {
    outputs: Vec<Rectangle>,
}

impl DisplayLayout for FakeLayout {
    fn size_to_output(&self, rect: Rectangle) -> Rectangle {
        self.outputs
            .iter()
            .find(|o| o.contains(rect.top_left))
            .or_else(|| self.outputs.first())
            .copied()
            .unwrap_or(rect)
    }

    fn place_in_output(&self, output: OutputId, rect: Rectangle) -> Option<Rectangle> {
        self.outputs
            .get(output.0 as usize)
            .map(|o| Rectangle::new(o.top_left, rect.size))
    }
}

// --- recording policy ---

#[derive(Debug, Clone, PartialEq)]
enum Event {
    NewApp,
    DeleteApp,
    NewWindow(Window),
    Ready(Window),
    DeleteWindow(Window),
    FocusGained(Window),
    FocusLost(Window),
    StateChange(Window, WindowState),
    Moved(Window, Point),
    Resized(Window, Size),
    Raised(Vec<Window>),
    RaiseRequested(Window),
    DisplaysUpdated(usize),
}

struct RecordingPolicy {
    tools: WindowManagerTools,
    events: Arc<Mutex<Vec<Event>>>,
    veto_modify: Arc<AtomicBool>,
    consume_pointer: Arc<AtomicBool>,
}

impl RecordingPolicy {
    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl Policy for RecordingPolicy {
    fn capabilities(&self) -> PolicyCapabilities {
        PolicyCapabilities { workspaces: true }
    }

    fn place_new_window(&self, _app: &ApplicationInfo, request: WindowSpec) -> WindowSpec {
        let mut spec = request;
        if spec.top_left.is_none() {
            spec.top_left = Some(Point::new(0, 0));
        }
        if spec.size.is_none() {
            spec.size = Some(Size::new(640, 480));
        }
        spec
    }

    fn handle_modify_window(
        &self,
        _window: &WindowInfo,
        modifications: WindowSpec,
    ) -> Option<WindowSpec> {
        if self.veto_modify.load(Ordering::SeqCst) {
            None
        } else {
            Some(modifications)
        }
    }

    fn handle_set_state(&self, _window: &WindowInfo, requested: WindowState) -> WindowState {
        requested
    }

    fn handle_raise_window(&self, window: &WindowInfo) {
        self.record(Event::RaiseRequested(window.window));
        self.tools.select_active_window(window.window);
        let _ = self.tools.raise_tree(window.window);
    }

    fn handle_keyboard_event(&self, _event: &strata::input::KeyboardEvent) -> bool {
        false
    }

    fn handle_pointer_event(&self, _event: &PointerEvent) -> bool {
        self.consume_pointer.load(Ordering::SeqCst)
    }

    fn handle_touch_event(&self, _event: &strata::input::TouchEvent) -> bool {
        false
    }

    fn advise_new_app(&self, _app: &ApplicationInfo) {
        self.record(Event::NewApp);
    }

    fn advise_delete_app(&self, _app: &ApplicationInfo) {
        self.record(Event::DeleteApp);
    }

    fn advise_new_window(&self, window: &WindowInfo) {
        self.record(Event::NewWindow(window.window));
    }

    fn advise_window_ready(&self, window: &WindowInfo) {
        self.record(Event::Ready(window.window));
    }

    fn advise_delete_window(&self, window: &WindowInfo) {
        self.record(Event::DeleteWindow(window.window));
    }

    fn advise_focus_gained(&self, window: &WindowInfo) {
        self.record(Event::FocusGained(window.window));
    }

    fn advise_focus_lost(&self, window: &WindowInfo) {
        self.record(Event::FocusLost(window.window));
    }

    fn advise_state_change(&self, window: &WindowInfo, state: WindowState) {
        self.record(Event::StateChange(window.window, state));
    }

    fn advise_move(&self, window: &WindowInfo, new_top_left: Point) {
        self.record(Event::Moved(window.window, new_top_left));
    }

    fn advise_resize(&self, window: &WindowInfo, new_size: Size) {
        self.record(Event::Resized(window.window, new_size));
    }

    fn advise_raise(&self, windows: &[Window]) {
        self.record(Event::Raised(windows.to_vec()));
    }

    fn advise_displays_updated(&self, displays: &[Rectangle]) {
        self.record(Event::DisplaysUpdated(displays.len()));
    }
}

// --- harness ---

struct Harness {
    wm: WindowManager,
    focus: Arc<Mutex<FocusState>>,
    surfaces: Arc<Mutex<SurfaceLog>>,
    events: Arc<Mutex<Vec<Event>>>,
    veto_modify: Arc<AtomicBool>,
    consume_pointer: Arc<AtomicBool>,
}

impl Harness {
    fn new() -> Self {
        let focus = Arc::new(Mutex::new(FocusState::default()));
        let surfaces = Arc::new(Mutex::new(SurfaceLog::default()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let veto_modify = Arc::new(AtomicBool::new(false));
        let consume_pointer = Arc::new(AtomicBool::new(false));

        let policy_events = events.clone();
        let policy_veto = veto_modify.clone();
        let policy_consume = consume_pointer.clone();
        let wm = WindowManager::new(
            CoreConfig::default(),
            Box::new(FakeFocus(focus.clone())),
            Box::new(FakeLayout {
                outputs: vec![Rectangle::from_loc_and_size((0, 0), (800, 600))],
            }),
            Box::new(FakeSurfaces(surfaces.clone())),
            move |tools| {
                Box::new(RecordingPolicy {
                    tools,
                    events: policy_events,
                    veto_modify: policy_veto,
                    consume_pointer: policy_consume,
                })
            },
        );

        Self {
            wm,
            focus,
            surfaces,
            events,
            veto_modify,
            consume_pointer,
        }
    }

    fn tools(&self) -> WindowManagerTools {
        self.wm.tools()
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn clear_events(&self) {
        self.events.lock().clear();
    }

    fn add_window(&self, session: SessionId, x: i32, y: i32, w: u32, h: u32) -> Window {
        self.wm
            .add_window(
                session,
                WindowSpec {
                    name: Some("test".into()),
                    top_left: Some(Point::new(x, y)),
                    size: Some(Size::new(w, h)),
                    ..Default::default()
                },
            )
            .expect("window creation failed")
    }

    fn add_child(&self, session: SessionId, parent: Window) -> Window {
        self.wm
            .add_window(
                session,
                WindowSpec {
                    name: Some("child".into()),
                    top_left: Some(Point::new(10, 10)),
                    size: Some(Size::new(50, 50)),
                    window_type: Some(WindowType::Dialog),
                    parent: Some(parent),
                    ..Default::default()
                },
            )
            .expect("child creation failed")
    }

    fn pointer_event(&self, action: PointerAction, x: i32, y: i32, timestamp_ns: u64) -> bool {
        self.wm.handle_input_event(&InputEvent::Pointer(PointerEvent {
            timestamp_ns,
            action,
            position: Point::new(x, y),
            button: None,
            pressed: Vec::new(),
            modifiers: MODIFIER_NONE,
        }))
    }
}

// --- tests ---

#[test]
fn window_lifecycle_fires_advisories_in_order() {
    let h = Harness::new();
    let session = SessionId(1);

    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 0, 0, 100, 100);

    assert_eq!(h.events(), vec![Event::NewApp, Event::NewWindow(window)]);

    // The ready advisory fires exactly once, however often the surface
    // signals.
    h.wm.handle_window_ready(window).unwrap();
    h.wm.handle_window_ready(window).unwrap();
    assert_eq!(
        h.events()
            .iter()
            .filter(|e| **e == Event::Ready(window))
            .count(),
        1
    );
}

#[test]
fn application_userdata_round_trips() {
    let h = Harness::new();
    let session = SessionId(1);
    let app = h.wm.add_session(session).unwrap();
    let tools = h.tools();

    tools
        .set_application_userdata(app, Arc::new(42u32))
        .unwrap();

    let info = tools.info_for_application(app).unwrap();
    let data = info
        .userdata
        .as_ref()
        .and_then(|d| d.downcast_ref::<u32>().copied());
    assert_eq!(data, Some(42));
}

#[test]
fn duplicate_session_is_an_invariant_violation() {
    let h = Harness::new();
    h.wm.add_session(SessionId(1)).unwrap();

    assert!(matches!(
        h.wm.add_session(SessionId(1)),
        Err(WmError::InvariantViolation(_))
    ));
}

#[test]
fn removing_session_with_windows_fails() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 0, 0, 100, 100);

    assert!(matches!(
        h.wm.remove_session(session),
        Err(WmError::InvariantViolation(_))
    ));

    h.wm.remove_window(window).unwrap();
    h.wm.remove_session(session).unwrap();
}

#[test]
fn remove_window_is_idempotent_and_destroys_the_surface() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 0, 0, 100, 100);

    h.wm.remove_window(window).unwrap();
    h.wm.remove_window(window).unwrap();

    assert_eq!(h.surfaces.lock().destroyed, vec![SurfaceId(1)]);
    assert_eq!(
        h.events()
            .iter()
            .filter(|e| **e == Event::DeleteWindow(window))
            .count(),
        1
    );

    // A stale handle now fails lookups.
    assert!(matches!(
        h.tools().info_for_window(window),
        Err(WmError::NotFound { .. })
    ));
}

#[test]
fn focus_falls_back_to_parent_then_sibling_then_next_application() {
    let h = Harness::new();
    let s1 = SessionId(1);
    let s2 = SessionId(2);
    h.wm.add_session(s1).unwrap();
    h.wm.add_session(s2).unwrap();

    let w1 = h.add_window(s1, 0, 0, 100, 100);
    let w2 = h.add_window(s1, 100, 0, 100, 100);
    let dialog = h.add_child(s1, w2);
    let other = h.add_window(s2, 200, 0, 100, 100);

    let tools = h.tools();

    // Parent takes over from a dying dialog.
    tools.select_active_window(dialog);
    assert_eq!(tools.active_window(), Some(dialog));
    h.wm.remove_window(dialog).unwrap();
    assert_eq!(tools.active_window(), Some(w2));

    // A sibling top-level takes over from a dying top-level, in creation
    // order.
    h.wm.remove_window(w2).unwrap();
    assert_eq!(tools.active_window(), Some(w1));

    // The next application takes over when the last window goes.
    h.wm.remove_window(w1).unwrap();
    assert_eq!(tools.active_window(), Some(other));

    // Nothing left to focus.
    h.wm.remove_window(other).unwrap();
    assert_eq!(tools.active_window(), None);
}

#[test]
fn select_active_window_is_silent_for_unactivatable_hints() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 0, 0, 100, 100);

    h.wm.set_window_state(window, WindowState::Hidden).unwrap();
    h.clear_events();

    let tools = h.tools();
    assert_eq!(tools.select_active_window(window), None);
    assert_eq!(tools.active_window(), None);
    assert!(h.events().is_empty());
}

#[test]
fn focus_moves_to_mru_front_and_removal_purges_it() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let w1 = h.add_window(session, 0, 0, 100, 100);
    let w2 = h.add_window(session, 100, 0, 100, 100);

    let tools = h.tools();
    tools.select_active_window(w1);
    tools.select_active_window(w2);

    // Removing the focused window falls back to the MRU survivor.
    h.wm.remove_window(w2).unwrap();
    assert_eq!(tools.active_window(), Some(w1));

    h.wm.remove_window(w1).unwrap();
    assert_eq!(tools.active_window(), None);
}

#[test]
fn raise_tree_raises_exactly_the_subtree_in_order() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();

    let root = h.add_window(session, 0, 0, 100, 100);
    let c1 = h.add_child(session, root);
    let c2 = h.add_child(session, root);
    let grandchild = h.add_child(session, c1);
    let outsider = h.add_window(session, 300, 0, 100, 100);

    h.tools().raise_tree(root).unwrap();

    let raised = h.focus.lock().raised.last().unwrap().clone();
    let infos: Vec<SurfaceId> = [root, c1, grandchild, c2]
        .iter()
        .map(|w| h.tools().info_for_window(*w).unwrap().surface)
        .collect();
    assert_eq!(raised, infos);

    let outsider_surface = h.tools().info_for_window(outsider).unwrap().surface;
    assert!(!raised.contains(&outsider_surface));

    assert_eq!(
        h.events().last(),
        Some(&Event::Raised(vec![root, c1, grandchild, c2]))
    );
}

#[test]
fn stale_raise_requests_are_dropped() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 0, 0, 100, 100);

    // A button press at t=100 is the latest interaction.
    h.pointer_event(PointerAction::ButtonDown, 10, 10, 100);
    h.clear_events();

    // An older raise request is starved.
    h.wm.handle_raise_request(window, 50).unwrap();
    assert!(h.events().is_empty());
    assert!(h.focus.lock().raised.is_empty());

    // A newer one goes through to the policy.
    h.wm.handle_raise_request(window, 150).unwrap();
    assert!(h.events().contains(&Event::RaiseRequested(window)));
    assert!(!h.focus.lock().raised.is_empty());
}

#[test]
fn pointer_motion_does_not_starve_raise_requests() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 0, 0, 100, 100);

    h.pointer_event(PointerAction::ButtonDown, 10, 10, 100);
    // Much later motion must not update the interaction timestamp.
    h.pointer_event(PointerAction::Motion, 20, 20, 10_000);
    h.clear_events();

    h.wm.handle_raise_request(window, 150).unwrap();
    assert!(h.events().contains(&Event::RaiseRequested(window)));
}

#[test]
fn consumed_input_stops_propagation() {
    let h = Harness::new();

    assert!(!h.pointer_event(PointerAction::ButtonDown, 0, 0, 1));
    h.consume_pointer.store(true, Ordering::SeqCst);
    assert!(h.pointer_event(PointerAction::ButtonDown, 0, 0, 2));
}

#[test]
fn active_display_prefers_focused_window_then_pointer_then_first() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let tools = h.tools();

    // No outputs at all: empty rectangle.
    assert!(tools.active_display().is_empty());

    let out1 = Rectangle::from_loc_and_size((0, 0), (800, 600));
    let out2 = Rectangle::from_loc_and_size((800, 0), (800, 600));
    h.wm.add_display(Output::new(OutputId(1), out1));
    h.wm.add_display(Output::new(OutputId(2), out2));

    // Spec scenario: W1 at (0,0) 100x100 unfocused, pointer at (50,50)
    // inside the first output.
    let w1 = h.add_window(session, 0, 0, 100, 100);
    h.pointer_event(PointerAction::Motion, 50, 50, 1);
    assert_eq!(tools.active_display(), out1);

    // A focused window pulls the decision to its majority output.
    let w2 = h.add_window(session, 780, 0, 100, 100);
    tools.select_active_window(w2);
    assert_eq!(tools.active_display(), out2);

    // Back to the pointer rule once focus is gone.
    h.wm.remove_window(w2).unwrap();
    tools.select_active_window(w1);
    h.wm.remove_window(w1).unwrap();
    assert_eq!(tools.active_display(), out1);
}

#[test]
fn equal_overlap_returns_a_maximal_output() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();

    let out1 = Rectangle::from_loc_and_size((0, 0), (800, 600));
    let out2 = Rectangle::from_loc_and_size((800, 0), (800, 600));
    h.wm.add_display(Output::new(OutputId(1), out1));
    h.wm.add_display(Output::new(OutputId(2), out2));

    // Straddling the boundary exactly: 50px on each side.
    let window = h.add_window(session, 750, 0, 100, 100);
    let tools = h.tools();
    tools.select_active_window(window);

    let display = tools.active_display();
    let info = tools.info_for_window(window).unwrap();
    let max_overlap = out1
        .overlap_area(&info.extents())
        .max(out2.overlap_area(&info.extents()));
    assert_eq!(display.overlap_area(&info.extents()), max_overlap);
}

#[test]
fn partial_modify_applies_only_the_fields_present() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 10, 10, 100, 100);

    let delta = WindowSpec {
        top_left: Some(Point::new(30, 40)),
        ..Default::default()
    };
    h.wm.modify_window(window, &delta).unwrap();

    let info = h.tools().info_for_window(window).unwrap();
    assert_eq!(info.top_left, Point::new(30, 40));
    assert_eq!(info.size, Size::new(100, 100));
    assert_eq!(info.name, "test");
    assert!(h.events().contains(&Event::Moved(window, Point::new(30, 40))));
    assert!(!h
        .events()
        .iter()
        .any(|e| matches!(e, Event::Resized(_, _))));
}

#[test]
fn vetoed_modifications_are_noops() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 10, 10, 100, 100);
    h.clear_events();

    h.veto_modify.store(true, Ordering::SeqCst);
    let delta = WindowSpec {
        top_left: Some(Point::new(500, 500)),
        ..Default::default()
    };
    h.wm.modify_window(window, &delta).unwrap();

    let info = h.tools().info_for_window(window).unwrap();
    assert_eq!(info.top_left, Point::new(10, 10));
    assert!(h.events().is_empty());
}

#[test]
fn maximize_saves_and_restore_returns_geometry() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let display = Rectangle::from_loc_and_size((0, 0), (800, 600));
    h.wm.add_display(Output::new(OutputId(1), display));

    let window = h.add_window(session, 10, 20, 100, 150);
    h.wm.set_window_state(window, WindowState::Maximized).unwrap();

    let info = h.tools().info_for_window(window).unwrap();
    assert_eq!(info.extents(), display);
    assert_eq!(info.state, WindowState::Maximized);
    assert!(h
        .events()
        .contains(&Event::StateChange(window, WindowState::Maximized)));

    h.wm.set_window_state(window, WindowState::Restored).unwrap();
    let info = h.tools().info_for_window(window).unwrap();
    assert_eq!(info.top_left, Point::new(10, 20));
    assert_eq!(info.size, Size::new(100, 150));
}

#[test]
fn fullscreen_uses_the_display_layout() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();

    // The fake layout snaps to its configured 800x600 output.
    let window = h.add_window(session, 100, 100, 200, 200);
    h.wm.set_window_state(window, WindowState::Fullscreen).unwrap();

    let info = h.tools().info_for_window(window).unwrap();
    assert_eq!(info.extents(), Rectangle::from_loc_and_size((0, 0), (800, 600)));

    h.wm.set_window_state(window, WindowState::Restored).unwrap();
    let info = h.tools().info_for_window(window).unwrap();
    assert_eq!(info.extents(), Rectangle::from_loc_and_size((100, 100), (200, 200)));
}

#[test]
fn hiding_the_focused_window_clears_focus() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let window = h.add_window(session, 0, 0, 100, 100);

    let tools = h.tools();
    tools.select_active_window(window);
    assert_eq!(tools.active_window(), Some(window));

    h.wm.set_window_state(window, WindowState::Hidden).unwrap();
    assert_eq!(tools.active_window(), None);
    assert!(h.events().contains(&Event::FocusLost(window)));
}

#[test]
fn workspace_membership_is_per_tree_and_purged_on_removal() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();

    let root = h.add_window(session, 0, 0, 100, 100);
    let child = h.add_child(session, root);
    let tools = h.tools();

    let workspace = tools.create_workspace();
    tools.add_tree_to_workspace(root, &workspace);

    assert_eq!(tools.windows_in_workspace(&workspace), vec![root, child]);
    assert!(tools
        .info_for_window(child)
        .unwrap()
        .is_in_workspace(&workspace));

    // Removal purges membership; a fresh window starts with none.
    h.wm.remove_window(child).unwrap();
    assert_eq!(tools.windows_in_workspace(&workspace), vec![root]);

    let fresh = h.add_window(session, 50, 50, 80, 80);
    assert!(tools.windows_in_workspace(&workspace) == vec![root]);
    assert!(!tools
        .info_for_window(fresh)
        .unwrap()
        .is_in_workspace(&workspace));
}

#[test]
fn workspace_switch_hides_and_remembers_the_focused_window() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();

    let w1 = h.add_window(session, 0, 0, 100, 100);
    let w2 = h.add_window(session, 100, 0, 100, 100);
    let tools = h.tools();

    let s1 = tools.create_workspace();
    let s2 = tools.create_workspace();
    tools.add_tree_to_workspace(w1, &s1);
    tools.add_tree_to_workspace(w2, &s1);

    let mut switcher = WorkspaceSwitcher::new(s1.clone());
    tools.select_active_window(w1);

    // Spec scenario: switching to an empty workspace hides both windows
    // and remembers the focused one as S1's last-active.
    switcher.switch_to(&tools, &s2, None);

    assert_eq!(
        tools.info_for_window(w1).unwrap().state,
        WindowState::Hidden
    );
    assert_eq!(
        tools.info_for_window(w2).unwrap().state,
        WindowState::Hidden
    );
    assert_eq!(switcher.last_active_in(&s1), Some(w1));
    assert_eq!(tools.active_window(), None);

    // Membership survives hiding.
    assert_eq!(tools.windows_in_workspace(&s1), vec![w1, w2]);

    // Switching back restores the pre-hide states.
    switcher.switch_to(&tools, &s1, None);
    assert_eq!(
        tools.info_for_window(w1).unwrap().state,
        WindowState::Restored
    );
    assert_eq!(
        tools.info_for_window(w2).unwrap().state,
        WindowState::Restored
    );
}

#[test]
fn carried_window_changes_workspace_on_switch() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();

    let w1 = h.add_window(session, 0, 0, 100, 100);
    let w2 = h.add_window(session, 100, 0, 100, 100);
    let tools = h.tools();

    let s1 = tools.create_workspace();
    let s2 = tools.create_workspace();
    tools.add_tree_to_workspace(w1, &s1);
    tools.add_tree_to_workspace(w2, &s1);

    let mut switcher = WorkspaceSwitcher::new(s1.clone());
    tools.select_active_window(w1);
    switcher.switch_to(&tools, &s2, Some(w1));

    assert_eq!(tools.windows_in_workspace(&s1), vec![w2]);
    assert_eq!(tools.windows_in_workspace(&s2), vec![w1]);
    // The carried window stays visible in its new workspace.
    assert_eq!(
        tools.info_for_window(w1).unwrap().state,
        WindowState::Restored
    );
    assert_eq!(
        tools.info_for_window(w2).unwrap().state,
        WindowState::Hidden
    );
}

#[test]
fn drag_moves_the_whole_tree() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();

    let root = h.add_window(session, 100, 100, 200, 200);
    let child = h.add_child(session, root);
    let tools = h.tools();
    tools.select_active_window(root);

    tools.drag_active_window(strata::Displacement::new(25, -10));

    assert_eq!(
        tools.info_for_window(root).unwrap().top_left,
        Point::new(125, 90)
    );
    assert_eq!(
        tools.info_for_window(child).unwrap().top_left,
        Point::new(35, 0)
    );
}

#[test]
fn invoke_under_lock_supports_composite_sequences() {
    let h = Harness::new();
    let session = SessionId(1);
    h.wm.add_session(session).unwrap();
    let w1 = h.add_window(session, 0, 0, 100, 100);
    let tools = h.tools();

    // Reentrant: tools calls inside the locked section must not deadlock.
    let result = h.wm.invoke_under_lock(|| {
        tools.select_active_window(w1);
        tools.place_and_size(w1, Point::new(5, 5), Size::new(50, 50))?;
        Ok::<_, WmError>(tools.info_for_window(w1)?.extents())
    });

    assert_eq!(
        result.unwrap(),
        Rectangle::from_loc_and_size((5, 5), (50, 50))
    );
}

#[test]
fn display_updates_reach_the_policy() {
    let h = Harness::new();

    h.wm.add_display(Output::new(
        OutputId(1),
        Rectangle::from_loc_and_size((0, 0), (800, 600)),
    ));
    h.wm.update_displays(vec![
        Output::new(OutputId(1), Rectangle::from_loc_and_size((0, 0), (1024, 768))),
        Output::new(OutputId(2), Rectangle::from_loc_and_size((1024, 0), (800, 600))),
    ]);
    h.wm.remove_display(OutputId(2));

    assert_eq!(
        h.events(),
        vec![
            Event::DisplaysUpdated(1),
            Event::DisplaysUpdated(2),
            Event::DisplaysUpdated(1),
        ]
    );
}

fn canonical_harness() -> (WindowManager, Arc<Mutex<FocusState>>) {
    let focus = Arc::new(Mutex::new(FocusState::default()));
    let surfaces = Arc::new(Mutex::new(SurfaceLog::default()));
    let config = CoreConfig::default();

    let wm = WindowManager::new(
        config.clone(),
        Box::new(FakeFocus(focus.clone())),
        Box::new(FakeLayout {
            outputs: vec![Rectangle::from_loc_and_size((0, 0), (800, 600))],
        }),
        Box::new(FakeSurfaces(surfaces)),
        move |tools| Box::new(CanonicalPolicy::new(tools, config)),
    );
    (wm, focus)
}

#[test]
fn canonical_policy_focuses_on_click_and_raises() {
    let (wm, focus) = canonical_harness();
    let tools = wm.tools();

    let session = SessionId(1);
    wm.add_session(session).unwrap();
    wm.add_display(Output::new(
        OutputId(1),
        Rectangle::from_loc_and_size((0, 0), (800, 600)),
    ));

    let window = wm
        .add_window(
            session,
            WindowSpec {
                name: Some("app".into()),
                size: Some(Size::new(200, 200)),
                ..Default::default()
            },
        )
        .unwrap();

    // Canonical placement filled in a position for a spec without one.
    let info = tools.info_for_window(window).unwrap();
    assert_eq!(info.top_left, Point::new(0, 0));

    // The window becomes active once ready.
    wm.handle_window_ready(window).unwrap();
    assert_eq!(tools.active_window(), Some(window));

    // Click-to-focus goes through the stacking backend's hit test.
    focus.lock().surface_under_cursor = Some(info.surface);
    focus.lock().focused_surface = None;
    focus.lock().focused_session = None;
    wm.handle_input_event(&InputEvent::Pointer(PointerEvent {
        timestamp_ns: 10,
        action: PointerAction::ButtonDown,
        position: Point::new(50, 50),
        button: Some(PointerButton::Primary),
        pressed: vec![PointerButton::Primary],
        modifiers: MODIFIER_NONE,
    }));
    assert_eq!(tools.active_window(), Some(window));
    // raise_on_focus raised the tree.
    assert!(!focus.lock().raised.is_empty());
}

#[test]
fn canonical_policy_places_menus_against_their_anchor() {
    let (wm, _focus) = canonical_harness();
    let tools = wm.tools();

    let session = SessionId(1);
    wm.add_session(session).unwrap();
    wm.add_display(Output::new(
        OutputId(1),
        Rectangle::from_loc_and_size((0, 0), (800, 600)),
    ));

    let parent = wm
        .add_window(
            session,
            WindowSpec {
                name: Some("app".into()),
                top_left: Some(Point::new(100, 100)),
                size: Some(Size::new(300, 200)),
                ..Default::default()
            },
        )
        .unwrap();

    // A menu attached below an anchor rectangle inside the parent.
    let menu = wm
        .add_window(
            session,
            WindowSpec {
                name: Some("menu".into()),
                size: Some(Size::new(100, 80)),
                window_type: Some(WindowType::Popup),
                parent: Some(parent),
                aux_rect: Some(Rectangle::from_loc_and_size((10, 10), (50, 20))),
                edge_attachment: Some(strata::window::EdgeAttachment::Vertical),
                ..Default::default()
            },
        )
        .unwrap();

    let info = tools.info_for_window(menu).unwrap();
    assert_eq!(info.top_left, Point::new(110, 130));
    assert_eq!(info.parent, Some(parent));
}
