//! A minimal floating window-management strategy.
//!
//! Canonical behavior: new windows cascade across the active display,
//! attached windows (menus, tooltips) place against their anchor rectangle,
//! click or tap focuses, Alt+drag moves, Alt+Tab cycles applications. It is
//! the strategy the integration tests drive and a starting point for real
//! shells.

use log::debug;
use std::cell::Cell;

use crate::application::ApplicationInfo;
use crate::config::CoreConfig;
use crate::engine::WindowManagerTools;
use crate::geometry::{Displacement, Point, Size};
use crate::input::{
    KeyboardAction, KeyboardEvent, PointerAction, PointerButton, PointerEvent, TouchAction,
    TouchEvent, MODIFIER_ALT,
};
use crate::policy::placement;
use crate::policy::Policy;
use crate::window::{EdgeAttachment, WindowInfo, WindowSpec, WindowState};

const KEY_TAB: u32 = 15;
const KEY_GRAVE: u32 = 41;

pub struct CanonicalPolicy {
    tools: WindowManagerTools,
    config: CoreConfig,
    old_cursor: Cell<Point>,
}

impl CanonicalPolicy {
    pub fn new(tools: WindowManagerTools, config: CoreConfig) -> Self {
        Self {
            tools,
            config,
            old_cursor: Cell::new(Point::new(0, 0)),
        }
    }

    fn place_attached(&self, spec: &mut WindowSpec) -> bool {
        let (Some(parent), Some(aux_rect)) = (spec.parent, spec.aux_rect) else {
            return false;
        };
        let Ok(parent_info) = self.tools.info_for_window(parent) else {
            return false;
        };
        let size = match spec.size {
            Some(size) => size,
            None => return false,
        };

        let attachment = spec.edge_attachment.unwrap_or(EdgeAttachment::Any);
        spec.top_left = Some(placement::place_relative(
            parent_info.extents(),
            aux_rect,
            size,
            attachment,
            self.tools.active_display(),
        ));
        true
    }

    fn place_cascading(&self, app: &ApplicationInfo, spec: &mut WindowSpec) {
        let display = self.tools.active_display();
        let top_level = app
            .windows
            .iter()
            .filter(|w| {
                self.tools
                    .info_for_window(**w)
                    .map(|info| info.parent.is_none())
                    .unwrap_or(false)
            })
            .count();

        let position = placement::cascade_position(
            display,
            top_level,
            self.config.placement.cascade_offset,
        );
        spec.top_left = Some(position);

        if let Some(size) = spec.size {
            spec.size = Some(placement::clip_to_tile(position, size, display));
        }
    }
}

impl Policy for CanonicalPolicy {
    fn place_new_window(&self, app: &ApplicationInfo, request: WindowSpec) -> WindowSpec {
        let mut spec = request;

        if spec.state.is_none() {
            spec.state = Some(WindowState::Restored);
        }
        if spec.size.is_none() {
            spec.size = Some(Size::new(640, 480));
        }

        if !self.place_attached(&mut spec) && spec.top_left.is_none() {
            self.place_cascading(app, &mut spec);
        }
        spec
    }

    fn handle_modify_window(
        &self,
        window: &WindowInfo,
        modifications: WindowSpec,
    ) -> Option<WindowSpec> {
        let mut mods = modifications;

        // Keep client-requested sizes inside the window's own limits.
        if let Some(size) = mods.size {
            let mut delta = match mods.top_left {
                Some(requested) => requested - window.top_left,
                None => Displacement::default(),
            };
            let mut size = size;
            placement::keep_size_within_limits(
                &window.constraints,
                &mut delta,
                &mut size,
                self.config.placement.min_size_floor,
            );
            mods.size = Some(size);
            if mods.top_left.is_some() {
                mods.top_left = Some(window.top_left + delta);
            }
        }
        Some(mods)
    }

    fn handle_set_state(&self, _window: &WindowInfo, requested: WindowState) -> WindowState {
        requested
    }

    fn handle_raise_window(&self, window: &WindowInfo) {
        self.tools.select_active_window(window.window);
        if let Err(err) = self.tools.raise_tree(window.window) {
            debug!("Raise of {:?} failed: {err}", window.window);
        }
    }

    fn handle_keyboard_event(&self, event: &KeyboardEvent) -> bool {
        if event.action != KeyboardAction::Press || event.modifiers != MODIFIER_ALT {
            return false;
        }
        match event.scan_code {
            KEY_TAB => {
                self.tools.focus_next_application();
                true
            }
            KEY_GRAVE => {
                self.tools.focus_next_within_application();
                true
            }
            _ => false,
        }
    }

    fn handle_pointer_event(&self, event: &PointerEvent) -> bool {
        let cursor = event.position;
        let mut consumed = false;

        match event.action {
            PointerAction::ButtonDown => {
                if let Some(window) = self.tools.window_at(cursor) {
                    self.tools.select_active_window(window);
                }
            }
            PointerAction::Motion
                if event.modifiers == MODIFIER_ALT
                    && event.button_state(PointerButton::Primary) =>
            {
                let movement = cursor - self.old_cursor.get();
                self.tools.drag_active_window(movement);
                consumed = true;
            }
            _ => {}
        }

        self.old_cursor.set(cursor);
        consumed
    }

    fn handle_touch_event(&self, event: &TouchEvent) -> bool {
        for point in &event.points {
            if point.action == TouchAction::Down {
                if let Some(window) = self.tools.window_at(point.position) {
                    self.tools.select_active_window(window);
                }
                return true;
            }
        }
        false
    }

    fn advise_window_ready(&self, window: &WindowInfo) {
        debug!("Window {:?} ready, focusing", window.window);
        self.tools.select_active_window(window.window);
    }

    fn advise_focus_gained(&self, window: &WindowInfo) {
        if self.config.focus.raise_on_focus {
            let _ = self.tools.raise_tree(window.window);
        }
    }
}
