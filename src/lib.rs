//! # Strata window management core
//!
//! The policy-driven window-management engine of a compositing display
//! server: it tracks every open window and application, arbitrates focus,
//! placement, resizing and workspace membership, and dispatches input to a
//! pluggable policy.
//!
//! ## Architecture
//!
//! - `engine`: the facade and dispatcher; all lifecycle and input events
//!   enter here, and all state mutation happens here, under one reentrant
//!   lock
//! - `registry`: the authoritative session/surface to application/window
//!   mapping
//! - `policy`: the pluggable strategy contract plus the reference
//!   placement/resize algorithms and a canonical floating strategy
//! - `workspace`: virtual-desktop grouping tokens and the reference
//!   switching algorithm
//! - `output`: active display registry with change notification
//! - `mru`: most-recently-used focus history
//! - `config`: TOML configuration for placement and focus tunables
//!
//! Rendering, the wire protocol and input devices are collaborators behind
//! the narrow traits in `engine::backends`, not part of this crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strata::{CanonicalPolicy, CoreConfig, WindowManager};
//!
//! let config = CoreConfig::default();
//! let wm = WindowManager::new(
//!     config.clone(),
//!     Box::new(focus_backend),
//!     Box::new(display_layout),
//!     Box::new(surface_factory),
//!     move |tools| Box::new(CanonicalPolicy::new(tools, config)),
//! );
//! let app = wm.add_session(session_id)?;
//! ```

pub mod application;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod mru;
pub mod output;
pub mod policy;
pub mod registry;
pub mod window;
pub mod workspace;

// Re-export main types for easy access
pub use application::{Application, ApplicationInfo, SessionId};
pub use config::CoreConfig;
pub use engine::{WindowManager, WindowManagerTools};
pub use error::{Result, WmError};
pub use geometry::{Displacement, Point, Rectangle, Size};
pub use mru::MruWindowList;
pub use output::{Output, OutputId, OutputsMonitor};
pub use policy::canonical::CanonicalPolicy;
pub use policy::{Policy, PolicyCapabilities};
pub use window::{SurfaceId, Window, WindowInfo, WindowSpec, WindowState, WindowType};
pub use workspace::{Workspace, WorkspaceSwitcher};

/// Version information for Strata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
