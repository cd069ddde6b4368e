use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Trailing segment of an identifier: the IRI fragment if present, otherwise
/// the last path segment.
pub fn local_name(identity: &str) -> &str {
    let trimmed = identity.trim_end_matches(['/', '#']);
    if let Some((_, fragment)) = trimmed.rsplit_once('#')
        && !fragment.is_empty()
    {
        return fragment;
    }

    match trimmed.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => segment,
        _ if trimmed.is_empty() => identity,
        _ => trimmed,
    }
}

/// Deterministic pair in `[-1, 1]` derived from the identifier hash.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_name_prefers_fragment() {
        assert_eq!(
            local_name("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            "type"
        );
        assert_eq!(local_name("http://example.org/people/alice"), "alice");
        assert_eq!(local_name("http://example.org/people/"), "people");
        assert_eq!(local_name("plain"), "plain");
        assert_eq!(local_name("/"), "/");
    }

    #[test]
    fn stable_pair_is_bounded_and_repeatable() {
        for id in ["a", "b", "http://example.org/x", ""] {
            let (x, y) = stable_pair(id);
            assert!((-1.0..=1.0).contains(&x));
            assert!((-1.0..=1.0).contains(&y));
            assert_eq!(stable_pair(id), (x, y));
        }
        assert_ne!(stable_pair("a"), stable_pair("b"));
    }
}
