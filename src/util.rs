//! String helpers for outgoing message construction.
//!
//! IRC lines are capped at 512 bytes including CR LF, so long message bodies
//! must be split across several PRIVMSG/NOTICE lines. Splitting happens on
//! UTF-8 code-point boundaries only.

/// Maximum length of an IRC line body, excluding CR LF.
pub const MAX_LINE_BODY: usize = 510;

/// Truncate `s` to at most `max_bytes` bytes without breaking a multi-byte
/// UTF-8 code point at the end.
#[inline]
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Split `s` into chunks of at most `max_bytes` bytes, each as large as fits,
/// never breaking inside a multi-byte code point.
///
/// Concatenating the chunks in order reproduces `s` exactly. A `max_bytes`
/// too small to fit the next code point would make no progress, so it is
/// clamped up to that code point's width.
pub fn split_message(s: &str, max_bytes: usize) -> impl Iterator<Item = &str> {
    SplitMessage {
        remaining: s,
        max_bytes: max_bytes.max(1),
    }
}

struct SplitMessage<'a> {
    remaining: &'a str,
    max_bytes: usize,
}

impl<'a> Iterator for SplitMessage<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let mut chunk = truncate_utf8_safe(self.remaining, self.max_bytes);
        if chunk.is_empty() {
            // Budget smaller than the next code point: emit it whole rather
            // than loop forever.
            let width = self.remaining.chars().next().map(char::len_utf8)?;
            chunk = &self.remaining[..width];
        }
        self.remaining = &self.remaining[chunk.len()..];
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_utf8_safe("hello world", 5), "hello");
        assert_eq!(truncate_utf8_safe("hello", 10), "hello");
        assert_eq!(truncate_utf8_safe("", 5), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        let s = "café";
        assert_eq!(truncate_utf8_safe(s, 4), "caf");
        assert_eq!(truncate_utf8_safe(s, 5), "café");

        let s = "日本語";
        assert_eq!(truncate_utf8_safe(s, 3), "日");
        assert_eq!(truncate_utf8_safe(s, 5), "日");
        assert_eq!(truncate_utf8_safe(s, 6), "日本");
    }

    #[test]
    fn test_split_concatenates_losslessly() {
        let text = "日本語テスト with some ascii";
        let chunks: Vec<_> = split_message(text, 7).collect();
        assert!(chunks.iter().all(|c| c.len() <= 7));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_message("", 5).next().is_none());
    }

    #[test]
    fn test_split_tiny_budget_makes_progress() {
        let chunks: Vec<_> = split_message("語x", 1).collect();
        assert_eq!(chunks, vec!["語", "x"]);
    }
}
