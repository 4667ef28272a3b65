//! Active output (display) registry.
//!
//! Tracks the set of currently active display rectangles and notifies
//! listeners when the configuration changes. Reconfiguration is
//! double-buffered: a caller assembles the complete new output list without
//! holding the monitor lock, then `update_configuration` diffs and swaps it
//! in under the lock, bracketing the listener callbacks with begin/end.

use log::debug;
use parking_lot::Mutex;

use crate::geometry::Rectangle;

/// Identity of one physical display, stable across reconfigurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u32);

/// One active display's geometry and identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub id: OutputId,
    pub extents: Rectangle,
}

impl Output {
    pub fn new(id: OutputId, extents: Rectangle) -> Self {
        Self { id, extents }
    }

    pub fn is_same_output(&self, other: &Output) -> bool {
        self.id == other.id
    }
}

/// Listener for output configuration changes. All hooks default to no-ops;
/// implement only what you need.
pub trait OutputListener: Send {
    fn advise_output_begin(&self) {}
    fn advise_output_create(&self, _output: &Output) {}
    fn advise_output_update(&self, _updated: &Output, _original: &Output) {}
    fn advise_output_delete(&self, _output: &Output) {}
    fn advise_output_end(&self) {}
}

/// Registry of active outputs with change notification.
pub struct OutputsMonitor {
    inner: Mutex<MonitorState>,
}

#[derive(Default)]
struct MonitorState {
    listeners: Vec<Box<dyn OutputListener>>,
    outputs: Vec<Output>,
}

impl Default for OutputsMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputsMonitor {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MonitorState::default()),
        }
    }

    pub fn add_listener(&self, listener: Box<dyn OutputListener>) {
        self.inner.lock().listeners.push(listener);
    }

    /// Run `f` over the current output list.
    pub fn process_outputs<R>(&self, f: impl FnOnce(&[Output]) -> R) -> R {
        let state = self.inner.lock();
        f(&state.outputs)
    }

    /// Replace the active set with `current`, notifying listeners of every
    /// created, resized/moved, and deleted output. `current` is assembled by
    /// the caller without the lock held.
    pub fn update_configuration(&self, current: Vec<Output>) {
        let mut state = self.inner.lock();

        for l in &state.listeners {
            l.advise_output_begin();
        }

        for output in &current {
            match state.outputs.iter().find(|o| o.is_same_output(output)) {
                None => {
                    debug!("Output {:?} connected: {:?}", output.id, output.extents);
                    for l in &state.listeners {
                        l.advise_output_create(output);
                    }
                }
                Some(existing) if existing.extents != output.extents => {
                    debug!("Output {:?} reconfigured: {:?}", output.id, output.extents);
                    for l in &state.listeners {
                        l.advise_output_update(output, existing);
                    }
                }
                Some(_) => {}
            }
        }

        for old in &state.outputs {
            if !current.iter().any(|o| o.is_same_output(old)) {
                debug!("Output {:?} disconnected", old.id);
                for l in &state.listeners {
                    l.advise_output_delete(old);
                }
            }
        }

        state.outputs = current;

        for l in &state.listeners {
            l.advise_output_end();
        }
    }
}
