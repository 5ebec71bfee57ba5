//! Widget event types.
//!
//! Events reach a widget through [`Widget::send_event`](crate::widget::Widget::send_event),
//! which lets installed event filters observe (and optionally consume) them
//! before the widget's own handling runs.

use std::time::Instant;

use crate::types::Point;

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held.
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Meta modifier only.
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Control + Shift modifiers.
    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        control: true,
        ..Self::NONE
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Keyboard key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
    Home, End, PageUp, PageDown,

    Backspace, Delete, Insert, Enter, Tab, Space, Escape,

    Minus, Equal, BracketLeft, BracketRight, Backslash,
    Semicolon, Quote, Comma, Period, Slash, Grave,
}

#[rustfmt::skip]
const LETTERS: [Key; 26] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

#[rustfmt::skip]
const DIGITS: [Key; 10] = [
    Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
    Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
];

#[rustfmt::skip]
const FUNCTION_KEYS: [Key; 12] = [
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
    Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
];

impl Key {
    /// Map an ASCII letter or digit to its key.
    pub fn from_char(ch: char) -> Option<Key> {
        let upper = ch.to_ascii_uppercase();
        match upper {
            'A'..='Z' => Some(LETTERS[(upper as u8 - b'A') as usize]),
            '0'..='9' => Some(DIGITS[(upper as u8 - b'0') as usize]),
            _ => None,
        }
    }

    /// Map a function key number (1..=12) to its key.
    pub fn function(n: u8) -> Option<Key> {
        n.checked_sub(1)
            .and_then(|i| FUNCTION_KEYS.get(i as usize))
            .copied()
    }

    /// The uppercase character of a letter or digit key.
    pub fn to_char(self) -> Option<char> {
        if let Some(i) = LETTERS.iter().position(|&k| k == self) {
            return Some((b'A' + i as u8) as char);
        }
        DIGITS
            .iter()
            .position(|&k| k == self)
            .map(|i| (b'0' + i as u8) as char)
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::ArrowUp
                | Key::ArrowDown
                | Key::ArrowLeft
                | Key::ArrowRight
                | Key::Home
                | Key::End
                | Key::PageUp
                | Key::PageDown
        )
    }

    /// Canonical display name used by key sequences.
    pub fn name(self) -> String {
        if let Some(ch) = self.to_char() {
            return ch.to_string();
        }
        if let Some(i) = FUNCTION_KEYS.iter().position(|&k| k == self) {
            return format!("F{}", i + 1);
        }
        let name = match self {
            Key::ArrowUp => "Up",
            Key::ArrowDown => "Down",
            Key::ArrowLeft => "Left",
            Key::ArrowRight => "Right",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Insert => "Insert",
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::Space => "Space",
            Key::Escape => "Escape",
            Key::Minus => "-",
            Key::Equal => "=",
            Key::BracketLeft => "[",
            Key::BracketRight => "]",
            Key::Backslash => "\\",
            Key::Semicolon => ";",
            Key::Quote => "'",
            Key::Comma => ",",
            Key::Period => ".",
            Key::Slash => "/",
            Key::Grave => "`",
            _ => "Unknown",
        };
        name.to_string()
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Events delivered to widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The pointer entered the widget.
    Enter,
    /// The pointer left the widget.
    Leave,
    /// The widget gained keyboard focus.
    FocusIn,
    /// The widget lost keyboard focus.
    FocusOut,
    MousePress {
        button: MouseButton,
        pos: Point,
        timestamp: Instant,
    },
    MouseRelease {
        button: MouseButton,
        pos: Point,
        timestamp: Instant,
    },
    MouseDoubleClick {
        button: MouseButton,
        pos: Point,
    },
    KeyPress {
        key: Key,
        modifiers: KeyboardModifiers,
        /// Text produced by the key press, if any.
        text: String,
    },
}

impl WidgetEvent {
    /// A left-button press at the origin, stamped now.
    pub fn mouse_press() -> Self {
        Self::MousePress {
            button: MouseButton::Left,
            pos: Point::ZERO,
            timestamp: Instant::now(),
        }
    }

    /// A left-button release at the origin, stamped now.
    pub fn mouse_release() -> Self {
        Self::MouseRelease {
            button: MouseButton::Left,
            pos: Point::ZERO,
            timestamp: Instant::now(),
        }
    }

    /// A key press without text.
    pub fn key_press(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self::KeyPress {
            key,
            modifiers,
            text: String::new(),
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Leave => "Leave",
            Self::FocusIn => "FocusIn",
            Self::FocusOut => "FocusOut",
            Self::MousePress { .. } => "MousePress",
            Self::MouseRelease { .. } => "MouseRelease",
            Self::MouseDoubleClick { .. } => "MouseDoubleClick",
            Self::KeyPress { .. } => "KeyPress",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_char_mapping() {
        assert_eq!(Key::from_char('s'), Some(Key::S));
        assert_eq!(Key::from_char('7'), Some(Key::Digit7));
        assert_eq!(Key::from_char('%'), None);
        assert_eq!(Key::S.to_char(), Some('S'));
        assert_eq!(Key::Enter.to_char(), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::F11.name(), "F11");
        assert_eq!(Key::ArrowLeft.name(), "Left");
        assert_eq!(Key::Q.name(), "Q");
        assert_eq!(Key::function(12), Some(Key::F12));
        assert_eq!(Key::function(0), None);
    }

    #[test]
    fn test_modifiers() {
        assert!(!KeyboardModifiers::NONE.any());
        assert!(KeyboardModifiers::CTRL_SHIFT.control && KeyboardModifiers::CTRL_SHIFT.shift);
    }
}
