//! Window handles and metadata.
//!
//! A [`Window`] is a lightweight `Copy` handle policies pass around freely;
//! the authoritative metadata lives in the registry's [`WindowInfo`] record.
//! [`WindowSpec`] is the all-optional field record used both as creation
//! parameters and as a modification delta: only the fields a caller sets are
//! ever applied.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::application::Application;
use crate::error::{Result, WmError};
use crate::geometry::{Point, Rectangle, Size};
use crate::workspace::{Workspace, WorkspaceTag};

/// Handle to the compositor-side surface backing a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Handle to one on-screen surface. Ids are never reused, so a handle to a
/// destroyed window simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Window(u64);

impl Window {
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Window display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Restored,
    Maximized,
    VertMaximized,
    HorizMaximized,
    Minimized,
    Fullscreen,
    Hidden,
}

impl WindowState {
    /// Whether a window in this state is eligible for input focus.
    pub fn allows_focus(&self) -> bool {
        !matches!(self, WindowState::Minimized | WindowState::Hidden)
    }
}

/// Window type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Normal,
    Dialog,
    Popup,
    Utility,
    InputMethod,
    Satellite,
}

impl WindowType {
    /// Whether this type of window may take input focus.
    pub fn can_take_focus(&self) -> bool {
        matches!(self, WindowType::Normal | WindowType::Dialog | WindowType::Utility)
    }

    /// Whether this type only makes sense attached to a parent window.
    pub fn requires_parent(&self) -> bool {
        matches!(
            self,
            WindowType::Popup | WindowType::InputMethod | WindowType::Satellite
        )
    }
}

/// Aspect ratio constraint as a width:height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

/// Per-window size constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeConstraints {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub width_inc: u32,
    pub height_inc: u32,
    pub min_aspect: Option<AspectRatio>,
    pub max_aspect: Option<AspectRatio>,
}

impl Default for SizeConstraints {
    fn default() -> Self {
        Self {
            min_width: 0,
            min_height: 0,
            max_width: u32::MAX,
            max_height: u32::MAX,
            width_inc: 1,
            height_inc: 1,
            min_aspect: None,
            max_aspect: None,
        }
    }
}

/// Which axis a child window attaches to its anchor rectangle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAttachment {
    Vertical,
    Horizontal,
    Any,
}

/// Creation parameters and modification deltas. Every field is optional;
/// unset fields are left at their prior values when applied.
#[derive(Clone, Default)]
pub struct WindowSpec {
    pub name: Option<String>,
    pub top_left: Option<Point>,
    pub size: Option<Size>,
    pub window_type: Option<WindowType>,
    pub state: Option<WindowState>,
    pub parent: Option<Window>,
    pub output_id: Option<u32>,
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub width_inc: Option<u32>,
    pub height_inc: Option<u32>,
    pub min_aspect: Option<AspectRatio>,
    pub max_aspect: Option<AspectRatio>,
    /// Anchor rectangle within the parent, for attached placement
    pub aux_rect: Option<Rectangle>,
    /// Requested edge attachment relative to the anchor rectangle
    pub edge_attachment: Option<EdgeAttachment>,
    pub userdata: Option<Arc<dyn Any + Send + Sync>>,
}

impl WindowSpec {
    /// Copy into `self` only the fields explicitly set in `delta`.
    pub fn merge_from(&mut self, delta: &WindowSpec) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if delta.$field.is_some() {
                    self.$field = delta.$field.clone();
                })*
            };
        }
        merge!(
            name,
            top_left,
            size,
            window_type,
            state,
            parent,
            output_id,
            min_width,
            min_height,
            max_width,
            max_height,
            width_inc,
            height_inc,
            min_aspect,
            max_aspect,
            aux_rect,
            edge_attachment,
            userdata,
        );
    }

    /// The constraints described by this spec, with defaults for unset fields.
    pub fn constraints(&self) -> SizeConstraints {
        let defaults = SizeConstraints::default();
        SizeConstraints {
            min_width: self.min_width.unwrap_or(defaults.min_width),
            min_height: self.min_height.unwrap_or(defaults.min_height),
            max_width: self.max_width.unwrap_or(defaults.max_width),
            max_height: self.max_height.unwrap_or(defaults.max_height),
            width_inc: self.width_inc.unwrap_or(defaults.width_inc),
            height_inc: self.height_inc.unwrap_or(defaults.height_inc),
            min_aspect: self.min_aspect.or(defaults.min_aspect),
            max_aspect: self.max_aspect.or(defaults.max_aspect),
        }
    }
}

// The opaque userdata payload has no Debug; render everything else.
impl fmt::Debug for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSpec")
            .field("name", &self.name)
            .field("top_left", &self.top_left)
            .field("size", &self.size)
            .field("window_type", &self.window_type)
            .field("state", &self.state)
            .field("parent", &self.parent)
            .field("has_userdata", &self.userdata.is_some())
            .finish_non_exhaustive()
    }
}

/// The mutable metadata record for a window. Exactly one exists per live
/// window; parent/child pointers are lookup-only back-references kept
/// symmetric by the registry.
#[derive(Clone)]
pub struct WindowInfo {
    pub window: Window,
    pub surface: SurfaceId,
    pub application: Application,
    pub name: String,
    pub window_type: WindowType,
    pub state: WindowState,
    pub top_left: Point,
    pub size: Size,
    pub constraints: SizeConstraints,
    pub parent: Option<Window>,
    pub children: Vec<Window>,
    /// Saved geometry for restoring from maximized/fullscreen
    pub restore_rect: Option<Rectangle>,
    pub userdata: Option<Arc<dyn Any + Send + Sync>>,
    /// Set once the window-ready advisory has fired
    pub(crate) ready_notified: bool,
    /// Weak workspace membership; dead entries are pruned lazily
    pub(crate) workspaces: Vec<Weak<WorkspaceTag>>,
}

impl WindowInfo {
    pub(crate) fn new(
        window: Window,
        surface: SurfaceId,
        application: Application,
        spec: &WindowSpec,
    ) -> Result<Self> {
        let window_type = spec.window_type.unwrap_or(WindowType::Normal);

        if window_type.requires_parent() && spec.parent.is_none() {
            return Err(WmError::InvariantViolation(format!(
                "{window_type:?} window requires a parent"
            )));
        }
        let size = spec.size.ok_or_else(|| {
            WmError::InvariantViolation("window creation requires a size".into())
        })?;
        let top_left = spec.top_left.ok_or_else(|| {
            WmError::InvariantViolation("window creation requires a position".into())
        })?;

        Ok(Self {
            window,
            surface,
            application,
            name: spec.name.clone().unwrap_or_default(),
            window_type,
            state: spec.state.unwrap_or(WindowState::Restored),
            top_left,
            size,
            constraints: spec.constraints(),
            parent: spec.parent,
            children: Vec::new(),
            restore_rect: None,
            userdata: spec.userdata.clone(),
            ready_notified: false,
            workspaces: Vec::new(),
        })
    }

    pub fn extents(&self) -> Rectangle {
        Rectangle::new(self.top_left, self.size)
    }

    /// Whether this window is currently eligible for input focus.
    pub fn can_be_active(&self) -> bool {
        self.window_type.can_take_focus() && self.state.allows_focus()
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.state, WindowState::Hidden | WindowState::Minimized)
    }

    /// Whether this window has been added to `workspace`.
    pub fn is_in_workspace(&self, workspace: &Workspace) -> bool {
        self.workspaces
            .iter()
            .any(|w| w.upgrade().is_some_and(|tag| workspace.is_tag(&tag)))
    }

    /// Live workspaces this window belongs to.
    pub fn workspaces(&self) -> Vec<Workspace> {
        self.workspaces
            .iter()
            .filter_map(|w| w.upgrade().map(Workspace::from_tag))
            .collect()
    }

    pub(crate) fn add_to_workspace(&mut self, workspace: &Workspace) -> bool {
        self.prune_dead_workspaces();
        if self.is_in_workspace(workspace) {
            return false;
        }
        self.workspaces.push(workspace.downgrade());
        true
    }

    pub(crate) fn remove_from_workspace(&mut self, workspace: &Workspace) -> bool {
        let before = self.workspaces.len();
        self.workspaces
            .retain(|w| match w.upgrade() {
                Some(tag) => !workspace.is_tag(&tag),
                None => false,
            });
        self.workspaces.len() != before
    }

    fn prune_dead_workspaces(&mut self) {
        self.workspaces.retain(|w| w.upgrade().is_some());
    }
}

impl fmt::Debug for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowInfo")
            .field("window", &self.window)
            .field("surface", &self.surface)
            .field("application", &self.application)
            .field("name", &self.name)
            .field("window_type", &self.window_type)
            .field("state", &self.state)
            .field("top_left", &self.top_left)
            .field("size", &self.size)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
