use std::fmt;

use serde::{Deserialize, Serialize};

/// Single label key/value pair attached to a cluster object.
///
/// Equality is exact on both key and value; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelPair {
    key: String,
    value: String,
}

impl LabelPair {
    /// Create a new label pair.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for LabelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl From<(&str, &str)> for LabelPair {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

impl From<(String, String)> for LabelPair {
    fn from((key, value): (String, String)) -> Self {
        Self { key, value }
    }
}

#[cfg(test)]
mod tests {
    use super::LabelPair;

    #[test]
    fn new_sets_key_and_value() {
        let p = LabelPair::new("app", "web");
        assert_eq!(p.key(), "app");
        assert_eq!(p.value(), "web");
    }

    #[test]
    fn equality_is_exact_on_both_sides() {
        let a = LabelPair::new("app.kubernetes.io/managed-by", "rig");
        let b: LabelPair = ("app.kubernetes.io/managed-by", "rig").into();
        let c = LabelPair::new("app.kubernetes.io/managed-by", "Rig");
        let d = LabelPair::new("app.kubernetes.io/managed-by ", "rig");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn display_uses_selector_syntax() {
        assert_eq!(LabelPair::new("tier", "db").to_string(), "tier=db");
    }
}
