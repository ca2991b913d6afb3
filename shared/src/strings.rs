//! Helpers for the decorated strings hosts send back.
//!
//! Host and player names may carry `^`-prefixed color codes. Anything the
//! engine compares or searches on goes through these first.

const COLOR_ESCAPE: char = '^';

/// Strips color codes and non-printing characters, leaving display text.
pub fn clean(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == COLOR_ESCAPE {
            if let Some(&next) = chars.peek() {
                if next != COLOR_ESCAPE {
                    chars.next();
                    continue;
                }
            }
        }
        if (' '..='~').contains(&c) {
            out.push(c);
        }
    }

    out
}

/// Reduces a string to lowercase alphanumerics, dropping color codes.
/// Used to decide whether two differently-decorated hostnames name the
/// same server.
pub fn sanitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == COLOR_ESCAPE {
            if let Some(&next) = chars.peek() {
                if next != COLOR_ESCAPE {
                    chars.next();
                    continue;
                }
            }
        }
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        }
    }

    out
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
