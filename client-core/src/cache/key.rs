use std::fmt;

/// Hierarchical identifier for cached resources.
///
/// Keys are ordered segment lists compared structurally, e.g.
/// `["orders"]`, `["orders", "42"]`, `["users", uid, "orders"]`.
/// Prefix matching is what makes bulk invalidation work: invalidating
/// `["orders"]` covers every key that starts with that segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey(Vec<String>);

impl ResourceKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The empty key; prefix of every key.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A copy of this key with one more segment appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Structural prefix test: `orders/42` starts with `orders`.
    pub fn starts_with(&self, prefix: &ResourceKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for ResourceKey {
    fn from(segments: [S; N]) -> Self {
        Self::new(segments)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_matches_prefixes() {
        let key = ResourceKey::from(["users", "u1", "orders"]);
        assert!(key.starts_with(&ResourceKey::root()));
        assert!(key.starts_with(&ResourceKey::from(["users"])));
        assert!(key.starts_with(&ResourceKey::from(["users", "u1"])));
        assert!(key.starts_with(&key.clone()));
        assert!(!key.starts_with(&ResourceKey::from(["users", "u2"])));
        assert!(!key.starts_with(&ResourceKey::from(["orders"])));
    }

    #[test]
    fn test_prefix_is_not_symmetric() {
        let list = ResourceKey::from(["orders"]);
        let detail = list.child("42");
        assert!(detail.starts_with(&list));
        assert!(!list.starts_with(&detail));
    }

    #[test]
    fn test_display_joins_segments() {
        assert_eq!(ResourceKey::from(["orders", "42"]).to_string(), "orders/42");
        assert_eq!(ResourceKey::root().to_string(), "");
    }
}
