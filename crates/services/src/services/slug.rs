//! URL slugs for products and categories.

use std::collections::HashSet;

/// Lowercase `name` and replace each run of whitespace with a single hyphen.
///
/// Punctuation is kept and leading/trailing whitespace becomes a hyphen too,
/// so `"  Multiple   Spaces "` yields `"-multiple-spaces-"`.
pub fn derive_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
        } else {
            slug.extend(ch.to_lowercase());
            in_whitespace = false;
        }
    }
    slug
}

/// First of `base`, `base-2`, `base-3`, ... that is not in `taken`.
pub fn disambiguate<S: AsRef<str>>(base: &str, taken: &[S]) -> String {
    let taken: HashSet<&str> = taken.iter().map(AsRef::as_ref).collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
