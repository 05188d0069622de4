//! Small shared helpers: name normalization for duplicate detection and
//! cache keys, plus text sanitation for strings that arrive over the network.

use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Normalize a name for duplicate detection and cache keys: trim + lowercase.
///
/// Two items are considered "the same" iff their normalized names are equal.
/// The same normalization keys the query cache.
pub fn normalize_name(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Strip ANSI escape sequences and C0 control characters from a string.
///
/// Catalog providers return names we render directly into the terminal;
/// a crafted name containing escape sequences could corrupt the display.
/// Tabs, newlines, and carriage returns are preserved.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let needs_strip = s.chars().any(|c| {
        c == '\u{1b}' || c == '\u{7f}' || (c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    });

    if !needs_strip {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            match chars.peek() {
                // CSI sequence: consume until the final byte (0x40..=0x7e)
                Some('[') => {
                    chars.next();
                    for f in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&f) {
                            break;
                        }
                    }
                }
                // OSC sequence: consume until BEL
                Some(']') => {
                    chars.next();
                    for f in chars.by_ref() {
                        if f == '\u{07}' {
                            break;
                        }
                    }
                }
                // Two-char escape: drop the following char as well
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
            continue;
        }
        if c == '\u{7f}' || (c.is_control() && !matches!(c, '\t' | '\n' | '\r')) {
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Truncate a string to fit within `max_width` terminal columns, appending
/// "..." when text was cut. Unicode-aware so CJK names truncate cleanly.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let width: usize = s
        .chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum();
    if width <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width <= 3 {
        let mut out = String::new();
        let mut used = 0;
        for c in s.chars() {
            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            if used + w > max_width {
                break;
            }
            used += w;
            out.push(c);
        }
        return Cow::Owned(out);
    }

    let target = max_width - 3;
    let mut out = String::with_capacity(max_width);
    let mut used = 0;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > target {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_name("  The Witcher 3  "), "the witcher 3");
        assert_eq!(normalize_name("FOO"), normalize_name("foo"));
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn strip_clean_text_returns_borrowed() {
        let input = "Hollow Knight: Silksong";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn strip_removes_csi_sequence() {
        let input = "evil\u{1b}[31mname";
        assert_eq!(strip_control_chars(input), "evilname");
    }

    #[test]
    fn strip_removes_osc_sequence() {
        let input = "a\u{1b}]0;title\u{07}b";
        assert_eq!(strip_control_chars(input), "ab");
    }

    #[test]
    fn strip_preserves_tabs_and_newlines() {
        let input = "line1\nline2\ttabbed";
        assert_eq!(strip_control_chars(input), input);
    }

    #[test]
    fn truncate_fits_returns_borrowed() {
        assert_eq!(truncate_to_width("Short", 10), "Short");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn truncate_narrow_width() {
        assert_eq!(truncate_to_width("Test!", 2), "Te");
        assert_eq!(truncate_to_width("Test!", 0), "");
    }
}
