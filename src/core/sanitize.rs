// src/core/sanitize.rs

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Blank = missing or empty after trimming.
pub fn is_blank(v: Option<&str>) -> bool {
    v.map_or(true, |s| s.trim().is_empty())
}

/// Trimmed copy, or `None` if nothing is left.
pub fn non_blank(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// Split a variant number like `OGN-012a` into (prefix, number, suffix).
/// Returns `None` when there is no `-` or no digits after it.
pub fn split_variant_number(s: &str) -> Option<(&str, u32, &str)> {
    let (prefix, rest) = s.split_once('-')?;
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let number = rest[..digits_end].parse().ok()?;
    Some((prefix, number, &rest[digits_end..]))
}
