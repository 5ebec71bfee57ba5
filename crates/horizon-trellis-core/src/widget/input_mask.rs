//! Input masks for text widgets.
//!
//! A mask constrains typed text to a fixed pattern of literal separators and
//! editable slots, as used for phone numbers, dates, IP or MAC addresses.
//!
//! | Char | Slot |
//! |------|------|
//! | `A` / `a` | letter, required / optional |
//! | `N` / `n` | letter or digit |
//! | `X` / `x` | any non-blank character |
//! | `9` / `0` | digit |
//! | `D` / `d` | digit 1-9 |
//! | `#`  | digit or sign, optional |
//! | `H` / `h` | hex digit |
//! | `B` / `b` | binary digit |
//!
//! `>` uppercases following letters, `<` lowercases them, `!` turns case
//! conversion off. `\` escapes the next character as a literal, and a
//! trailing `;c` sets the blank character (default space).
//!
//! ```
//! use horizon_trellis_core::widget::InputMask;
//!
//! let mask = InputMask::new("(999) 999-9999").unwrap();
//! assert_eq!(mask.display_text("5551234"), "(555) 123-4   ");
//! ```

use std::fmt;

/// Case conversion applied to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
    #[default]
    Keep,
    Upper,
    Lower,
}

impl CaseMode {
    fn apply(self, ch: char) -> char {
        match self {
            Self::Keep => ch,
            Self::Upper => ch.to_uppercase().next().unwrap_or(ch),
            Self::Lower => ch.to_lowercase().next().unwrap_or(ch),
        }
    }
}

/// Characters an editable slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Letter,
    Alphanumeric,
    Any,
    Digit,
    NonZeroDigit,
    DigitOrSign,
    Hex,
    Binary,
}

impl CharClass {
    pub fn accepts(self, ch: char) -> bool {
        match self {
            Self::Letter => ch.is_alphabetic(),
            Self::Alphanumeric => ch.is_alphanumeric(),
            Self::Any => !ch.is_whitespace(),
            Self::Digit => ch.is_ascii_digit(),
            Self::NonZeroDigit => matches!(ch, '1'..='9'),
            Self::DigitOrSign => ch.is_ascii_digit() || ch == '+' || ch == '-',
            Self::Hex => ch.is_ascii_hexdigit(),
            Self::Binary => ch == '0' || ch == '1',
        }
    }

    /// Map a mask character to its class and whether the slot is required.
    fn from_mask_char(ch: char) -> Option<(Self, bool)> {
        let slot = match ch {
            'A' => (Self::Letter, true),
            'a' => (Self::Letter, false),
            'N' => (Self::Alphanumeric, true),
            'n' => (Self::Alphanumeric, false),
            'X' => (Self::Any, true),
            'x' => (Self::Any, false),
            '9' => (Self::Digit, true),
            '0' => (Self::Digit, false),
            'D' => (Self::NonZeroDigit, true),
            'd' => (Self::NonZeroDigit, false),
            '#' => (Self::DigitOrSign, false),
            'H' => (Self::Hex, true),
            'h' => (Self::Hex, false),
            'B' => (Self::Binary, true),
            'b' => (Self::Binary, false),
            _ => return None,
        };
        Some(slot)
    }
}

/// One position of a parsed mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskSlot {
    /// A fixed separator.
    Literal(char),
    /// A position the user types into.
    Edit {
        class: CharClass,
        required: bool,
        case: CaseMode,
    },
}

impl MaskSlot {
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Edit { required: true, .. })
    }

    /// The character this slot stores for `ch`, if it accepts it.
    fn admit(&self, ch: char) -> Option<char> {
        match *self {
            Self::Literal(_) => None,
            Self::Edit { class, case, .. } => class.accepts(ch).then(|| case.apply(ch)),
        }
    }
}

/// A parsed input mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMask {
    pattern: String,
    slots: Vec<MaskSlot>,
    blank: char,
}

impl InputMask {
    /// Parse a mask. Returns `None` for an empty pattern.
    pub fn new(pattern: &str) -> Option<Self> {
        let (body, blank) = split_blank(pattern);
        let slots = parse_slots(body);
        if slots.is_empty() {
            return None;
        }
        Some(Self {
            pattern: pattern.to_string(),
            slots,
            blank,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn blank_char(&self) -> char {
        self.blank
    }

    pub fn slots(&self) -> &[MaskSlot] {
        &self.slots
    }

    /// Number of positions, literals included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn editable_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_literal()).count()
    }

    pub fn required_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_required()).count()
    }

    /// Keep the characters of `raw` that fit the editable slots in order.
    ///
    /// Literal separators typed by the user are skipped; characters that do
    /// not fit the next slot are dropped. The result has at most
    /// [`editable_count`](Self::editable_count) characters.
    pub fn filter_input(&self, raw: &str) -> String {
        let mut editable = self.slots.iter().filter(|s| !s.is_literal());
        let mut out = String::new();
        let mut slot = editable.next();
        for ch in raw.chars() {
            let Some(current) = slot else { break };
            if ch == self.blank {
                continue;
            }
            if let Some(stored) = current.admit(ch) {
                out.push(stored);
                slot = editable.next();
            }
        }
        out
    }

    /// Render filtered input with literals and blanks.
    pub fn display_text(&self, input: &str) -> String {
        let mut chars = input.chars();
        self.slots
            .iter()
            .map(|slot| match *slot {
                MaskSlot::Literal(c) => c,
                MaskSlot::Edit { case, .. } => chars.next().map_or(self.blank, |c| case.apply(c)),
            })
            .collect()
    }

    /// Recover the typed characters from display text.
    pub fn extract_input(&self, display: &str) -> String {
        self.slots
            .iter()
            .zip(display.chars())
            .filter(|(slot, ch)| !slot.is_literal() && *ch != self.blank)
            .map(|(_, ch)| ch)
            .collect()
    }

    /// Whether every required slot is filled by `input`.
    pub fn is_complete(&self, input: &str) -> bool {
        let filled = input.chars().count();
        self.slots
            .iter()
            .filter(|s| !s.is_literal())
            .enumerate()
            .all(|(i, slot)| !slot.is_required() || i < filled)
    }

    /// Display position of the `n`th editable slot.
    pub fn input_pos_to_display_pos(&self, n: usize) -> usize {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_literal())
            .nth(n)
            .map_or(self.slots.len(), |(i, _)| i)
    }
}

impl fmt::Display for InputMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Split off an unescaped `;c` blank specifier.
fn split_blank(pattern: &str) -> (&str, char) {
    let mut escaped = false;
    for (pos, ch) in pattern.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == ';' {
            if let Some(blank) = pattern[pos + 1..].chars().next() {
                return (&pattern[..pos], blank);
            }
        }
    }
    (pattern, ' ')
}

fn parse_slots(body: &str) -> Vec<MaskSlot> {
    let mut slots = Vec::new();
    let mut case = CaseMode::Keep;
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => slots.extend(chars.next().map(MaskSlot::Literal)),
            '>' => case = CaseMode::Upper,
            '<' => case = CaseMode::Lower,
            '!' => case = CaseMode::Keep,
            _ => slots.push(match CharClass::from_mask_char(ch) {
                Some((class, required)) => MaskSlot::Edit {
                    class,
                    required,
                    case,
                },
                None => MaskSlot::Literal(ch),
            }),
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts_and_blank() {
        let mask = InputMask::new("000.000.000.000;_").unwrap();
        assert_eq!(mask.blank_char(), '_');
        assert_eq!(mask.len(), 15);
        assert_eq!(mask.editable_count(), 12);
        assert_eq!(mask.required_count(), 0);
        assert!(InputMask::new("").is_none());
        assert!(InputMask::new(";_").is_none());
    }

    #[test]
    fn test_display_and_extract() {
        let mask = InputMask::new("(999) 999-9999").unwrap();
        assert_eq!(mask.display_text(""), "(   )    -    ");
        assert_eq!(mask.display_text("5551234567"), "(555) 123-4567");
        assert_eq!(mask.extract_input("(555)    -    "), "555");
    }

    #[test]
    fn test_filter_input_skips_literals_and_rejects() {
        let mask = InputMask::new("(999) 999-9999").unwrap();
        assert_eq!(mask.filter_input("(555) 12x3-4567"), "5551234567");
        assert_eq!(mask.filter_input("55512345678999"), "5551234567");

        let license = InputMask::new(">AAAAA-AAAAA;#").unwrap();
        assert_eq!(license.filter_input("abcde-fghij"), "ABCDEFGHIJ");
    }

    #[test]
    fn test_case_switches() {
        let mask = InputMask::new(">AA!AA<AA").unwrap();
        assert_eq!(mask.display_text("aaBBcc"), "AABBcc");
    }

    #[test]
    fn test_is_complete_with_optional_tail() {
        let mask = InputMask::new("99-990").unwrap();
        assert!(!mask.is_complete("123"));
        assert!(mask.is_complete("1234"));
        assert!(InputMask::new("000").unwrap().is_complete(""));
    }

    #[test]
    fn test_escapes_are_literals() {
        let mask = InputMask::new("\\9\\;99;_").unwrap();
        assert!(mask.slots()[0].is_literal());
        assert!(mask.slots()[1].is_literal());
        assert_eq!(mask.blank_char(), '_');
        assert_eq!(mask.display_text("4"), "9;4_");
        assert_eq!(mask.input_pos_to_display_pos(1), 3);
    }
}
