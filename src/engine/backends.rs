//! Collaborator interfaces the engine consumes.
//!
//! The core never talks to the scene graph, the renderer, or the display
//! hardware directly: compositor glue implements these narrow traits, and
//! tests substitute fakes. The engine is the sole writer of focus and
//! stacking *intent*; the focus backend is the sole authority on what is
//! actually rendered on top.

use crate::application::{Application, SessionId};
use crate::geometry::{Point, Rectangle, Size};
use crate::output::OutputId;
use crate::window::{SurfaceId, WindowSpec, WindowState};

/// Creates and destroys the compositor-side surfaces backing windows, and
/// receives the engine's approved geometry and state for them.
pub trait SurfaceFactory: Send {
    /// Build the surface for a new window. Called synchronously during
    /// window creation, with the policy-approved specification.
    fn create_surface(
        &mut self,
        application: Application,
        session: SessionId,
        spec: &WindowSpec,
    ) -> SurfaceId;

    fn destroy_surface(&mut self, surface: SurfaceId);

    /// Push approved geometry to the surface.
    fn configure_surface(&mut self, _surface: SurfaceId, _top_left: Point, _size: Size) {}

    /// Push an approved state change to the surface.
    fn apply_state(&mut self, _surface: SurfaceId, _state: WindowState) {}
}

/// Focus and stacking backend.
pub trait FocusBackend: Send {
    /// Raise `surfaces` as a unit, preserving their relative order.
    fn raise(&mut self, surfaces: &[SurfaceId]);

    fn set_focus(&mut self, session: Option<SessionId>, surface: Option<SurfaceId>);

    /// Topmost surface containing `point`, if any.
    fn surface_at(&self, point: Point) -> Option<SurfaceId>;

    fn focused_surface(&self) -> Option<SurfaceId>;

    fn focused_session(&self) -> Option<SessionId>;
}

/// Geometry normalization the core delegates rather than reimplements.
pub trait DisplayLayout: Send {
    /// Grow/shrink `rect` to exactly cover the output it is on.
    fn size_to_output(&self, rect: Rectangle) -> Rectangle;

    /// Place `rect` inside the identified output, or `None` if that output
    /// is not currently active.
    fn place_in_output(&self, output: OutputId, rect: Rectangle) -> Option<Rectangle>;
}
