//! Display width calculation for terminal rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width calculation method, also selecting how grapheme clusters are
/// segmented (see [`crate::unicode::grapheme`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1. Clustering follows full
    /// Unicode extended grapheme cluster rules (ZWJ joins).
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2. Clustering follows
    /// full Unicode extended grapheme cluster rules (ZWJ joins).
    Unicode,
    /// `wcwidth`-style per-codepoint width, but ZWJ *terminates* a cluster
    /// instead of joining it — each emoji in what would otherwise be a
    /// ZWJ-sequence (e.g. a family emoji) is its own grapheme.
    ///
    /// Exceptions that stay joined regardless, since none of them involve
    /// ZWJ in the first place: skin-tone modifier sequences, keycap
    /// sequences (`<digit> U+20E3`), Regional Indicator pairs (flags), and
    /// combining marks attached to a base character.
    NoZwj,
}

/// Get the display width of a string in terminal columns.
#[must_use]
pub fn display_width_with_method(s: &str, method: WidthMethod) -> usize {
    match method {
        WidthMethod::WcWidth | WidthMethod::NoZwj => UnicodeWidthStr::width(s),
        WidthMethod::Unicode => UnicodeWidthStr::width_cjk(s),
    }
}

/// Get the display width of a character in terminal columns.
///
/// Includes a fast path for ASCII printable characters (0x20-0x7E), which
/// are always width 1 and are the most common case.
#[inline]
#[must_use]
pub fn display_width_char_with_method(c: char, method: WidthMethod) -> usize {
    if c.is_ascii() && (' '..='~').contains(&c) {
        return 1;
    }
    if c < ' ' {
        return 0;
    }
    match method {
        WidthMethod::WcWidth | WidthMethod::NoZwj => UnicodeWidthChar::width(c).unwrap_or(0),
        WidthMethod::Unicode => UnicodeWidthChar::width_cjk(c).unwrap_or(0),
    }
}

/// Check if a character is zero-width under the given method.
#[must_use]
pub fn is_zero_width(c: char, method: WidthMethod) -> bool {
    display_width_char_with_method(c, method) == 0
}

/// Check if a character is wide (takes 2 columns) under the given method.
#[must_use]
pub fn is_wide(c: char, method: WidthMethod) -> bool {
    display_width_char_with_method(c, method) == 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(display_width_with_method("hello", WidthMethod::WcWidth), 5);
        assert_eq!(display_width_char_with_method('a', WidthMethod::WcWidth), 1);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(display_width_with_method("汉字", WidthMethod::WcWidth), 4);
        assert!(is_wide('汉', WidthMethod::WcWidth));
    }

    #[test]
    fn test_zero_width() {
        assert!(is_zero_width('\u{0301}', WidthMethod::WcWidth));
    }

    #[test]
    fn test_ambiguous_width_methods() {
        // Circled digit one (U+2460): 1 under wcwidth, 2 under unicode/CJK.
        let ch = '①';
        assert_eq!(display_width_char_with_method(ch, WidthMethod::WcWidth), 1);
        assert_eq!(display_width_char_with_method(ch, WidthMethod::Unicode), 2);
        assert_eq!(display_width_char_with_method(ch, WidthMethod::NoZwj), 1);
    }
}
