#![forbid(unsafe_code)]

//! Global keyboard shortcuts and presentation choice.

use folio_core::event::{InputSlot, KeyCode, KeyEvent, KeyEventKind};

/// A recognized document-level shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Cmd+K / Ctrl+K.
    OpenSearch,
    /// Escape.
    Close,
}

/// Desktop or mobile layout, decided per interaction from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Desktop,
    Mobile,
}

impl Presentation {
    /// Desktop at and above `breakpoint`.
    #[must_use]
    pub const fn for_width(width: u32, breakpoint: u32) -> Self {
        if width >= breakpoint {
            Self::Desktop
        } else {
            Self::Mobile
        }
    }

    #[must_use]
    pub const fn input(self) -> InputSlot {
        match self {
            Self::Desktop => InputSlot::Desktop,
            Self::Mobile => InputSlot::Mobile,
        }
    }
}

/// Maps key events to shortcuts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortcutDispatcher;

impl ShortcutDispatcher {
    #[must_use]
    pub fn classify(key: &KeyEvent) -> Option<Shortcut> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.is_command_chord('k') {
            return Some(Shortcut::OpenSearch);
        }
        if key.code == KeyCode::Escape {
            return Some(Shortcut::Close);
        }
        None
    }
}
