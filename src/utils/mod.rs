//! Utility functions.

/// Find the byte offset of the first occurrence of an ASCII `needle` in
/// `haystack`, ignoring ASCII case.
///
/// A match window can only contain ASCII bytes (non-ASCII bytes never
/// compare equal to ASCII ones), so the returned offset is always on a
/// char boundary.
pub fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Remove the first occurrence of `token` from `text`, ignoring ASCII case.
///
/// Returns `None` when the token does not occur.
pub fn strip_first_ascii_ci(text: &str, token: &str) -> Option<String> {
    find_ascii_ci(text, token).map(|i| {
        let mut out = String::with_capacity(text.len() - token.len());
        out.push_str(&text[..i]);
        out.push_str(&text[i + token.len()..]);
        out
    })
}
