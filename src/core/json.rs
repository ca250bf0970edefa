// src/core/json.rs
// Typed walks over untyped JSON. Missing keys, out-of-range indexes and
// wrong node types all resolve to `None`.

use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Key(&'static str),
    Index(usize),
}

pub type KeyPath = &'static [Step];

pub fn lookup<'a>(root: &'a Value, path: &[Step]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, step| match step {
        Step::Key(k) => node.as_object()?.get(*k),
        Step::Index(i) => node.as_array()?.get(*i),
    })
}

/// String at `path`, trimmed; `None` if absent, not a string, or blank.
pub fn lookup_str<'a>(root: &'a Value, path: &[Step]) -> Option<&'a str> {
    lookup(root, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First path in `paths` that yields a non-blank string.
pub fn first_str<'a>(root: &'a Value, paths: &[KeyPath]) -> Option<&'a str> {
    paths.iter().find_map(|p| lookup_str(root, p))
}
