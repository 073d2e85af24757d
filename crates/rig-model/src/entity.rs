use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    DEFAULT_NAMESPACE, LabelPair, Labels,
    error::{ModelError, ModelResult},
};

/// One cluster object extracted from a cluster target's documents.
///
/// Addressed by `kind` + `name` + `namespace`. The full object is kept so it can
/// be handed back to the cluster unchanged (apart from injected labels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ClusterEntity {
    kind: String,
    name: String,
    namespace: String,
    labels: Labels,
    object: Value,
}

impl ClusterEntity {
    /// Build an entity from a decoded cluster object.
    pub fn from_object(object: Value) -> ModelResult<Self> {
        let Value::Object(map) = &object else {
            return Err(ModelError::MalformedDocument(format!(
                "expected an object, got {}",
                json_type(&object)
            )));
        };

        let kind = map
            .get("kind")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(ModelError::MissingField("kind"))?
            .to_string();

        let metadata = map.get("metadata").and_then(Value::as_object);
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(ModelError::MissingField("metadata.name"))?
            .to_string();
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_string();
        // `labels: null` is what an empty `labels:` key decodes to
        let labels = match metadata.and_then(|m| m.get("labels")) {
            Some(Value::Null) | None => Labels::new(),
            Some(v) => serde_json::from_value(v.clone())?,
        };

        Ok(Self {
            kind,
            name,
            namespace,
            labels,
            object,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// The underlying cluster object.
    pub fn object(&self) -> &Value {
        &self.object
    }

    /// Returns `true` if the entity carries the exact key/value pair.
    pub fn has_label(&self, pair: &LabelPair) -> bool {
        self.labels.contains(pair)
    }

    /// Return a copy of this entity with `pairs` written into `metadata.labels`.
    ///
    /// Existing labels with the same keys are overwritten; others are kept.
    pub fn with_labels<'a, I>(&self, pairs: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = &'a LabelPair>,
    {
        let mut object = self.object.clone();
        let root = object
            .as_object_mut()
            .ok_or_else(|| ModelError::MalformedDocument("entity is not an object".into()))?;
        let metadata = root
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| ModelError::MalformedDocument("metadata is not an object".into()))?;
        let labels = metadata.entry("labels").or_insert(Value::Null);
        if labels.is_null() {
            *labels = Value::Object(Map::new());
        }
        let labels = labels
            .as_object_mut()
            .ok_or_else(|| ModelError::MalformedDocument("metadata.labels is not an object".into()))?;

        for pair in pairs {
            labels.insert(pair.key().to_string(), Value::String(pair.value().to_string()));
        }
        Self::from_object(object)
    }
}

impl fmt::Display for ClusterEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} (namespace {})", self.kind, self.name, self.namespace)
    }
}

impl TryFrom<Value> for ClusterEntity {
    type Error = ModelError;
    fn try_from(v: Value) -> ModelResult<Self> {
        Self::from_object(v)
    }
}

impl From<ClusterEntity> for Value {
    fn from(e: ClusterEntity) -> Self {
        e.object
    }
}

/// Extract every cluster object from a JSON document set.
///
/// Accepted shapes, freely concatenated:
/// - a single object;
/// - an array of objects;
/// - a list object (`kind` ending in `List`) with an `items` array.
pub fn parse_entities(documents: &str) -> ModelResult<Vec<ClusterEntity>> {
    let mut out = Vec::new();
    for doc in serde_json::Deserializer::from_str(documents).into_iter::<Value>() {
        collect(doc?, &mut out)?;
    }
    Ok(out)
}

fn collect(doc: Value, out: &mut Vec<ClusterEntity>) -> ModelResult<()> {
    match doc {
        Value::Array(items) => {
            for item in items {
                collect(item, out)?;
            }
            Ok(())
        }
        Value::Object(mut map) if is_list(&map) => match map.remove("items") {
            Some(Value::Array(items)) => {
                for item in items {
                    collect(item, out)?;
                }
                Ok(())
            }
            Some(Value::Null) | None => Ok(()),
            Some(other) => Err(ModelError::MalformedDocument(format!(
                "list items must be an array, got {}",
                json_type(&other)
            ))),
        },
        other => {
            out.push(ClusterEntity::from_object(other)?);
            Ok(())
        }
    }
}

fn is_list(map: &Map<String, Value>) -> bool {
    map.get("kind")
        .and_then(Value::as_str)
        .is_some_and(|k| k.ends_with("List"))
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
