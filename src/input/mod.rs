//! Input event records delivered to the engine.
//!
//! These mirror what compositor-side input plumbing hands over: keyboard,
//! pointer and touch events with nanosecond timestamps. The engine only
//! inspects actions and timestamps (for the stale-raise gate and pointer
//! tracking); everything else is forwarded to the policy verbatim.

use crate::geometry::Point;

/// Keyboard modifier bitmask (compositor-defined bits).
pub type Modifiers = u32;

pub const MODIFIER_NONE: Modifiers = 0;
pub const MODIFIER_ALT: Modifiers = 1 << 0;
pub const MODIFIER_CTRL: Modifiers = 1 << 1;
pub const MODIFIER_SHIFT: Modifiers = 1 << 2;
pub const MODIFIER_META: Modifiers = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardEvent {
    /// Event time in nanoseconds, monotonically increasing per seat
    pub timestamp_ns: u64,
    pub action: KeyboardAction,
    pub scan_code: u32,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    ButtonDown,
    ButtonUp,
    Motion,
    Enter,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Tertiary,
    Other(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub timestamp_ns: u64,
    pub action: PointerAction,
    /// Pointer position in global coordinates
    pub position: Point,
    /// Button involved in a down/up action
    pub button: Option<PointerButton>,
    /// Buttons currently held
    pub pressed: Vec<PointerButton>,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn button_state(&self, button: PointerButton) -> bool {
        self.pressed.contains(&button)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Up,
    Motion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u32,
    pub action: TouchAction,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub timestamp_ns: u64,
    pub points: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Whether any contact went down or up in this event.
    pub fn has_contact_change(&self) -> bool {
        self.points
            .iter()
            .any(|p| matches!(p.action, TouchAction::Down | TouchAction::Up))
    }
}

/// One event from any input stream.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Keyboard(KeyboardEvent),
    Pointer(PointerEvent),
    Touch(TouchEvent),
}

impl InputEvent {
    /// The timestamp the stale-raise gate should observe, if this event
    /// counts as user interaction. Pointer and touch motion never count:
    /// a hover must not starve later raise requests.
    pub fn interaction_timestamp(&self) -> Option<u64> {
        match self {
            InputEvent::Keyboard(k) => Some(k.timestamp_ns),
            InputEvent::Pointer(p) => match p.action {
                PointerAction::ButtonDown | PointerAction::ButtonUp => Some(p.timestamp_ns),
                _ => None,
            },
            InputEvent::Touch(t) => {
                if t.has_contact_change() {
                    Some(t.timestamp_ns)
                } else {
                    None
                }
            }
        }
    }
}
