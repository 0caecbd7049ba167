//! RFC 1459 case mapping for channel and nick keys.
//!
//! Besides ASCII letters, `[]\~` fold to `{}|^`. The session registry keys
//! channels and users by their folded form so `#Rust` and `#rust` resolve
//! to the same entry.

#[inline]
fn fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c.to_ascii_lowercase(),
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().map(fold).eq(b.chars().map(fold))
}
