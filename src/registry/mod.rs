//! Entity registry: the authoritative session/surface to application/window
//! mapping.
//!
//! This is the single source of truth for the object graph. All handles held
//! outside it are weak by construction (ids are never reused), and every
//! mutation either completes fully or leaves the graph untouched. Parent and
//! child pointers are maintained symmetrically: if A records B as a child,
//! B records A as its parent.

#[cfg(test)]
mod property_tests;

use log::debug;
use std::collections::HashMap;

use crate::application::{Application, ApplicationInfo, SessionId};
use crate::error::{Result, WmError};
use crate::window::{SurfaceId, Window, WindowInfo, WindowSpec};

#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    sessions: HashMap<SessionId, Application>,
    apps: HashMap<Application, ApplicationInfo>,
    /// Applications in registration order
    app_order: Vec<Application>,
    windows: HashMap<Window, WindowInfo>,
    surfaces: HashMap<SurfaceId, Window>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // --- applications ---

    pub fn add_application(&mut self, session: SessionId) -> Result<Application> {
        if self.sessions.contains_key(&session) {
            return Err(WmError::InvariantViolation(format!(
                "session {} is already registered",
                session.0
            )));
        }

        let application = Application::from_raw(self.next_id());
        self.sessions.insert(session, application);
        self.apps
            .insert(application, ApplicationInfo::new(application, session));
        self.app_order.push(application);
        debug!("Registered application {} for session {}", application.raw(), session.0);
        Ok(application)
    }

    /// Remove an application. The caller must remove its windows first.
    pub fn remove_application(&mut self, session: SessionId) -> Result<ApplicationInfo> {
        let application = self.application_for_session(session)?;
        let info = self
            .apps
            .get(&application)
            .ok_or_else(|| WmError::no_application(application.raw()))?;

        if !info.windows.is_empty() {
            return Err(WmError::InvariantViolation(format!(
                "application {} still owns {} window(s)",
                application.raw(),
                info.windows.len()
            )));
        }

        self.sessions.remove(&session);
        self.app_order.retain(|a| *a != application);
        let info = self
            .apps
            .remove(&application)
            .ok_or_else(|| WmError::no_application(application.raw()))?;
        debug!("Removed application {}", application.raw());
        Ok(info)
    }

    pub fn application_for_session(&self, session: SessionId) -> Result<Application> {
        self.sessions
            .get(&session)
            .copied()
            .ok_or(WmError::no_session(session.0))
    }

    pub fn app_info(&self, application: Application) -> Result<&ApplicationInfo> {
        self.apps
            .get(&application)
            .ok_or_else(|| WmError::no_application(application.raw()))
    }

    pub fn app_info_mut(&mut self, application: Application) -> Result<&mut ApplicationInfo> {
        self.apps
            .get_mut(&application)
            .ok_or_else(|| WmError::no_application(application.raw()))
    }

    pub fn count_applications(&self) -> usize {
        self.app_order.len()
    }

    /// Applications in registration order.
    pub fn applications(&self) -> impl Iterator<Item = Application> + '_ {
        self.app_order.iter().copied()
    }

    // --- windows ---

    /// Create and link a window record. Validation happens before any link
    /// is touched, so a failure leaves the graph unchanged.
    pub fn add_window(
        &mut self,
        application: Application,
        surface: SurfaceId,
        spec: &WindowSpec,
    ) -> Result<&WindowInfo> {
        self.app_info(application)?;
        if let Some(parent) = spec.parent {
            if !self.windows.contains_key(&parent) {
                return Err(WmError::no_window(parent.raw()));
            }
        }
        if self.surfaces.contains_key(&surface) {
            return Err(WmError::InvariantViolation(format!(
                "surface {} is already registered",
                surface.0
            )));
        }

        let window = Window::from_raw(self.next_id());
        let info = WindowInfo::new(window, surface, application, spec)?;

        if let Some(parent) = info.parent {
            // Checked above; linking cannot fail past this point.
            if let Some(parent_info) = self.windows.get_mut(&parent) {
                parent_info.children.push(window);
            }
        }
        if let Ok(app_info) = self.app_info_mut(application) {
            app_info.windows.push(window);
        }

        debug!(
            "Registered window {} ({:?}) for application {}",
            window.raw(),
            info.window_type,
            application.raw()
        );
        self.surfaces.insert(surface, window);
        let entry = self.windows.entry(window).or_insert(info);
        Ok(entry)
    }

    pub fn window_for_surface(&self, surface: SurfaceId) -> Result<Window> {
        self.surfaces
            .get(&surface)
            .copied()
            .ok_or(WmError::NotFound {
                kind: "surface",
                id: surface.0,
            })
    }

    /// Remove a window record, detaching every back-reference. Idempotent:
    /// removing an unknown handle is a no-op, tolerating teardown races.
    pub fn remove_window(&mut self, window: Window) -> Option<WindowInfo> {
        let info = self.windows.remove(&window)?;
        self.surfaces.remove(&info.surface);

        if let Some(parent) = info.parent {
            if let Some(parent_info) = self.windows.get_mut(&parent) {
                parent_info.children.retain(|c| *c != window);
            }
        }

        // Orphan surviving children rather than leaving dangling parents.
        for child in &info.children {
            if let Some(child_info) = self.windows.get_mut(child) {
                child_info.parent = None;
            }
        }

        if let Some(app_info) = self.apps.get_mut(&info.application) {
            app_info.windows.retain(|w| *w != window);
        }

        debug!("Removed window {}", window.raw());
        Some(info)
    }

    pub fn window_info(&self, window: Window) -> Result<&WindowInfo> {
        self.windows
            .get(&window)
            .ok_or_else(|| WmError::no_window(window.raw()))
    }

    pub fn window_info_mut(&mut self, window: Window) -> Result<&mut WindowInfo> {
        self.windows
            .get_mut(&window)
            .ok_or_else(|| WmError::no_window(window.raw()))
    }

    /// Top-level windows of an application, in creation order.
    pub fn top_level_windows(&self, application: Application) -> Vec<Window> {
        let Ok(info) = self.app_info(application) else {
            return Vec::new();
        };
        info.windows
            .iter()
            .copied()
            .filter(|w| {
                self.windows
                    .get(w)
                    .is_some_and(|wi| wi.parent.is_none())
            })
            .collect()
    }

    /// `root` plus its transitive descendants, depth-first, children in
    /// creation order. Parents are assigned once at creation, so the
    /// traversal cannot cycle.
    pub fn tree_of(&self, root: Window) -> Vec<Window> {
        let mut tree = Vec::new();
        let mut pending = vec![root];

        while let Some(window) = pending.pop() {
            if let Some(info) = self.windows.get(&window) {
                tree.push(window);
                for child in info.children.iter().rev() {
                    pending.push(*child);
                }
            }
        }
        tree
    }

    /// All windows, grouped by application registration order, each
    /// application's windows in creation order.
    pub fn windows_in_registration_order(&self) -> Vec<Window> {
        self.app_order
            .iter()
            .filter_map(|a| self.apps.get(a))
            .flat_map(|info| info.windows.iter().copied())
            .collect()
    }

    /// Parent/child links are symmetric in both directions.
    #[cfg(test)]
    pub(crate) fn links_are_symmetric(&self) -> bool {
        self.windows.iter().all(|(window, info)| {
            let parent_ok = match info.parent {
                Some(parent) => self
                    .windows
                    .get(&parent)
                    .is_some_and(|p| p.children.contains(window)),
                None => true,
            };
            let children_ok = info.children.iter().all(|child| {
                self.windows
                    .get(child)
                    .is_some_and(|c| c.parent == Some(*window))
            });
            parent_ok && children_ok
        })
    }
}
