//! IRC case-mapping and case-folded identifiers.
//!
//! IRC compares channel and nick names case-insensitively under the
//! `rfc1459` casemapping, where a handful of ASCII punctuation characters
//! are equivalent in addition to the letter cases (e.g. `[` and `{`).

use std::fmt;
use std::hash::{Hash, Hasher};

/// Fold one character under the RFC 1459 case mapping.
///
/// Maps `[` → `{`, `]` → `}`, `\` → `|`, `~` → `^`, and ASCII uppercase
/// to lowercase. Everything else is unchanged.
#[inline]
pub fn fold_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using the RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| fold_char(ca) == fold_char(cb))
}

/// A channel or nick name compared and hashed under RFC 1459 case folding.
///
/// The original spelling is preserved for display; equality, ordering, and
/// hashing all operate on the folded form, so `Identifier` is usable as a
/// map key that treats `Nick` and `nick` (and `foo[]` / `foo{}`) as equal.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier(name.into())
    }

    /// The name as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The case-folded form.
    pub fn folded(&self) -> String {
        irc_to_lower(&self.0)
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        irc_eq(&self.0, &other.0)
    }
}

impl Eq for Identifier {}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .chars()
            .map(fold_char)
            .cmp(other.0.chars().map(fold_char))
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.0.chars() {
            fold_char(c).hash(state);
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier(s)
    }
}
