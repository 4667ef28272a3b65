//! Application handles and metadata.
//!
//! An application is one running client session. Like windows, applications
//! are identified by lightweight `Copy` handles whose ids are never reused.

use std::any::Any;
use std::sync::Arc;

use crate::window::Window;

/// Opaque handle to the compositor-side client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Handle to one running client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Application(u64);

impl Application {
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Metadata record for an application: the session it wraps and its windows
/// in creation order (top-level and child alike).
#[derive(Clone)]
pub struct ApplicationInfo {
    pub application: Application,
    pub session: SessionId,
    /// Owned windows, oldest first
    pub windows: Vec<Window>,
    pub userdata: Option<Arc<dyn Any + Send + Sync>>,
}

impl ApplicationInfo {
    pub(crate) fn new(application: Application, session: SessionId) -> Self {
        Self {
            application,
            session,
            windows: Vec::new(),
            userdata: None,
        }
    }
}

impl std::fmt::Debug for ApplicationInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationInfo")
            .field("application", &self.application)
            .field("session", &self.session)
            .field("windows", &self.windows)
            .field("has_userdata", &self.userdata.is_some())
            .finish()
    }
}
