//! Helpers for `nick!user@host` style sources.

/// Extract the nickname from a raw `nick!user@host` field.
///
/// Everything from the first `!` or `@` onward is dropped, as is a leading
/// `:`. A bare nickname or server name is returned unchanged.
///
/// ```
/// use slirc_session::prefix::nick_from_raw;
///
/// assert_eq!(nick_from_raw("nick!user@host"), "nick");
/// assert_eq!(nick_from_raw("nick@host"), "nick");
/// assert_eq!(nick_from_raw("irc.example.net"), "irc.example.net");
/// ```
pub fn nick_from_raw(raw: &str) -> &str {
    let raw = raw.strip_prefix(':').unwrap_or(raw);
    match raw.find(['!', '@']) {
        Some(end) => &raw[..end],
        None => raw,
    }
}
