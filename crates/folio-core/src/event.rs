#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Hosts translate DOM events into these values before handing them to the
//! components. All events derive `Clone`, `PartialEq`, and `Eq` for use in
//! tests and pattern matching.
//!
//! # Design Notes
//!
//! - Only the events the page components react to are modelled; everything
//!   else is dropped by the host.
//! - `KeyEventKind` defaults to `Press`; the components only see key-down.
//! - `Modifiers` use bitflags for easy combination.
//! - `Target` identifies the element an event was dispatched on, so one
//!   queue can carry input for both the table of contents and the search
//!   overlay.

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event observed at document level.
    Key(KeyEvent),

    /// A wheel event anywhere in the window.
    Wheel,

    /// A touch-start anywhere in the window.
    TouchStart,

    /// Pointer pressed on a target.
    PointerDown(Target),

    /// Click (activation) on a target.
    Click(Target),

    /// A target gained focus.
    Focus(Target),

    /// The value of a text input changed.
    Input {
        /// Input the edit happened in.
        target: Target,
        /// Full current value of the input.
        value: String,
    },

    /// The host finished a (soft) navigation and the document was replaced.
    PageLoad,

    /// The viewport was resized.
    Resize {
        /// New viewport width in CSS pixels.
        width: u32,
        /// New viewport height in CSS pixels.
        height: u32,
    },
}

impl Event {
    /// Whether this event expresses manual scrolling intent.
    ///
    /// Wheel, touch-start and any key press count; they all pre-empt a
    /// programmatic scroll that is still in flight.
    #[must_use]
    pub fn is_user_intent(&self) -> bool {
        match self {
            Self::Wheel | Self::TouchStart => true,
            Self::Key(key) => key.kind == KeyEventKind::Press,
            _ => false,
        }
    }
}

/// Which of the two search inputs an event or focus request concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSlot {
    /// Inline header input shown at and above the desktop breakpoint.
    Desktop,
    /// Input inside the mobile search panel.
    Mobile,
}

/// Element an event was dispatched on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A table-of-contents link for the heading with this anchor id.
    NavLink(String),
    /// One of the search inputs.
    SearchInput(InputSlot),
    /// The mobile search toggle button.
    MobileToggle,
    /// The full-viewport scrim mounted behind the open search panel.
    Scrim,
    /// A rendered search result, by result id.
    SearchResult(String),
    /// Anything else.
    Other,
}

/// What the host must do with the native event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventDisposition {
    /// Nobody cared; let the browser proceed.
    #[default]
    Ignored,
    /// State changed; default browser behavior still applies.
    Handled,
    /// Prevent the default action and stop propagation.
    Consumed,
}

impl EventDisposition {
    /// Merge two dispositions, keeping the strongest.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Consumed, _) | (_, Self::Consumed) => Self::Consumed,
            (Self::Handled, _) | (_, Self::Handled) => Self::Handled,
            _ => Self::Ignored,
        }
    }

    /// Whether the host must call `preventDefault` / `stopPropagation`.
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with no modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Build a key event from DOM `KeyboardEvent` fields.
    #[must_use]
    pub fn from_dom(key: &str, ctrl: bool, meta: bool, alt: bool, shift: bool) -> Self {
        let mut modifiers = Modifiers::NONE;
        modifiers.set(Modifiers::CTRL, ctrl);
        modifiers.set(Modifiers::SUPER, meta);
        modifiers.set(Modifiers::ALT, alt);
        modifiers.set(Modifiers::SHIFT, shift);
        Self::new(KeyCode::from_dom_key(key)).with_modifiers(modifiers)
    }

    /// Check if this is a specific character key, ignoring ASCII case.
    #[must_use]
    pub fn is_char_ignore_case(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&c))
    }

    /// Cmd+`c` on macOS or Ctrl+`c` elsewhere.
    #[must_use]
    pub fn is_command_chord(&self, c: char) -> bool {
        (self.ctrl() || self.super_key()) && self.is_char_ignore_case(c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character key.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F24).
    F(u8),
    /// A key the normalizer does not know; keeps the raw DOM `key` string.
    Unidentified(Box<str>),
}

impl KeyCode {
    /// Normalize a DOM `KeyboardEvent.key` string.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Backspace" => Self::Backspace,
            "Tab" => Self::Tab,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            " " => Self::Char(' '),
            _ => {
                if let Some(n) = parse_function_key(key) {
                    return Self::F(n);
                }
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => {
                        tracing::trace!(key, "unidentified DOM key");
                        Self::Unidentified(key.into())
                    }
                }
            }
        }
    }
}

fn parse_function_key(key: &str) -> Option<u8> {
    let digits = key.strip_prefix('F')?;
    let n: u8 = digits.parse().ok()?;
    (1..=24).contains(&n).then_some(n)
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
