//! Node name matching used by `find()`.
//!
//! Names and patterns are dot-separated parts. Before matching, a trailing
//! all-digit part is stripped from the name (`"Crate.004"` becomes `"Crate"`),
//! which is how duplicated objects are disambiguated on export.
//!
//! A pattern part matches a name part when equal or when it is `*`. Both
//! must have the same number of parts, except that a trailing `*` may also
//! match nothing (`"Foo.*"` matches `"Foo"` and `"Foo.Bar"`).

/// Strips a trailing `.<digits>` part from `name`.
#[must_use]
pub fn strip_numeric_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => name,
    }
}

/// Matches one `/`-free pattern segment against an already stripped name.
#[must_use]
pub fn match_pattern(pattern: &str, name: &str) -> bool {
    let mut pattern_parts = pattern.split('.');
    let mut name_parts = name.split('.');

    loop {
        match (pattern_parts.next(), name_parts.next()) {
            (None, None) => return true,
            (Some(p), Some(n)) => {
                if p != "*" && p != n {
                    return false;
                }
            }
            // optional trailing wildcard
            (Some("*"), None) => return pattern_parts.next().is_none(),
            _ => return false,
        }
    }
}

/// Matches a pattern segment against a raw node name.
#[inline]
#[must_use]
pub fn matches_node_name(pattern: &str, name: &str) -> bool {
    match_pattern(pattern, strip_numeric_suffix(name))
}
