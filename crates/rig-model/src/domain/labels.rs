use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::LabelPair;

/// Label set of a cluster object, kept sorted by key.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(pub BTreeMap<String, String>);

impl Labels {
    /// Create an empty set of labels.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no labels are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert or overwrite a label.
    ///
    /// Returns `self` for chaining.
    pub fn insert<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), val.into());
        self
    }

    /// Get the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Returns `true` if the exact key/value pair is present.
    pub fn contains(&self, pair: &LabelPair) -> bool {
        self.get(pair.key()) == Some(pair.value())
    }

    /// Iterate through all labels as ordered pairs.
    pub fn pairs(&self) -> impl Iterator<Item = LabelPair> + '_ {
        self.0.iter().map(|(k, v)| LabelPair::new(k.as_str(), v.as_str()))
    }
}

impl FromIterator<LabelPair> for Labels {
    fn from_iter<I: IntoIterator<Item = LabelPair>>(iter: I) -> Self {
        let mut out = Labels::new();
        for pair in iter {
            out.insert(pair.key(), pair.value());
        }
        out
    }
}
