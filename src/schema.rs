//! Dynamic field inference over serialized samples.
//!
//! Every key of every sample, including keys of nested embedded documents,
//! becomes a dotted field path with the kind of value observed there.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key carrying the class name of an embedded document.
pub const CLASS_KEY: &str = "_cls";

const DEFAULT_EMBEDDED_CLASS: &str = "EmbeddedDocument";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    List(Box<FieldKind>),
    Embedded(String),
    Mixed,
}

impl FieldKind {
    /// Combine two observations of the same field.
    pub fn merge(self, other: FieldKind) -> FieldKind {
        use FieldKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            (List(a), List(b)) => List(Box::new(a.merge(*b))),
            _ => Mixed,
        }
    }

    /// Kind of a single JSON value; `None` when the value carries no type information.
    pub fn of(value: &Value) -> Option<FieldKind> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(FieldKind::Bool),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(FieldKind::Int),
            Value::Number(_) => Some(FieldKind::Float),
            Value::String(_) => Some(FieldKind::String),
            Value::Array(items) => items
                .iter()
                .filter_map(FieldKind::of)
                .reduce(FieldKind::merge)
                .map(|inner| FieldKind::List(Box::new(inner))),
            Value::Object(map) => Some(FieldKind::Embedded(
                map.get(CLASS_KEY)
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_EMBEDDED_CLASS)
                    .to_string(),
            )),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => f.write_str("StringField"),
            FieldKind::Int => f.write_str("IntField"),
            FieldKind::Float => f.write_str("FloatField"),
            FieldKind::Bool => f.write_str("BooleanField"),
            FieldKind::List(inner) => write!(f, "ListField({})", inner),
            FieldKind::Embedded(class) => write!(f, "EmbeddedDocumentField({})", class),
            FieldKind::Mixed => f.write_str("MixedField"),
        }
    }
}

/// Field path to inferred kind, ordered by path.
pub type Schema = BTreeMap<String, FieldKind>;

/// Infer the schema of a collection of JSON documents.
pub fn infer_schema<'a, I>(documents: I) -> Schema
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut schema = Schema::new();
    for document in documents {
        if let Value::Object(map) = document {
            visit(None, map, &mut schema);
        }
    }
    schema
}

fn visit(prefix: Option<&str>, map: &Map<String, Value>, schema: &mut Schema) {
    for (key, value) in map {
        if key == CLASS_KEY {
            continue;
        }
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };

        if let Some(kind) = FieldKind::of(value) {
            let merged = match schema.remove(&path) {
                Some(existing) => existing.merge(kind),
                None => kind,
            };
            schema.insert(path.clone(), merged);
        }

        if let Value::Object(inner) = value {
            visit(Some(&path), inner, schema);
        }
    }
}
