//! Canonical text normalization for capture payloads.
//!
//! Every function here is total: any byte or text input maps to a valid
//! UTF-8 string, substituting rather than failing on malformed sequences.
//! Callers rely on this when coercing arbitrary captured data (including
//! hostile input) into the text slots of an error-report payload.

use std::borrow::Cow;

/// Returns true for characters removed by normalization.
///
/// Line feeds and tabs survive; every other control character (C0, DEL,
/// C1) is stripped. `\r` is handled separately by line-ending rewriting
/// but also answers true here so the borrow fast-path stays correct.
fn is_stripped_control(c: char) -> bool {
    if c == '\n' || c == '\t' {
        return false;
    }
    c.is_control()
}

/// Canonicalizes line endings and strips control characters.
///
/// CRLF and lone CR both become LF. Borrows when the input is already
/// canonical.
///
/// Examples:
/// - `"a\r\nb" -> "a\nb"`
/// - `"a\rb" -> "a\nb"`
/// - `"a\u{0}b" -> "ab"`
pub fn normalize_str(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_stripped_control) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
            continue;
        }
        if is_stripped_control(c) {
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Decodes arbitrary bytes to canonical text.
///
/// Invalid UTF-8 sequences become U+FFFD, then the result goes through
/// [`normalize_str`]. Never fails, for any input.
pub fn normalize_bytes(input: &[u8]) -> String {
    match String::from_utf8_lossy(input) {
        Cow::Borrowed(s) => normalize_str(s).into_owned(),
        Cow::Owned(s) => match normalize_str(&s) {
            Cow::Borrowed(_) => s,
            Cow::Owned(out) => out,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_str_borrows_clean_input() {
        assert!(matches!(normalize_str("plain text\twith tab\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn normalize_str_line_endings() {
        assert_eq!(normalize_str("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_str("\r\n"), "\n");
        assert_eq!(normalize_str("\r"), "\n");
    }

    #[test]
    fn normalize_str_strips_controls() {
        assert_eq!(normalize_str("a\u{0}b\u{7f}c\u{9b}d"), "abcd");
        assert_eq!(normalize_str("keep\ttab\nand newline"), "keep\ttab\nand newline");
    }

    #[test]
    fn normalize_bytes_valid_utf8() {
        assert_eq!(normalize_bytes(b"hello\r\nworld"), "hello\nworld");
    }

    #[test]
    fn normalize_bytes_invalid_utf8_substitutes() {
        assert_eq!(normalize_bytes(b"ok\xffend"), "ok\u{fffd}end");
        assert_eq!(normalize_bytes(&[0xf0, 0x28, 0x8c, 0x28]), "\u{fffd}(\u{fffd}(");
    }

    #[test]
    fn normalize_bytes_empty() {
        assert_eq!(normalize_bytes(b""), "");
    }
}
