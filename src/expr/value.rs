use serde::{Deserialize, Serialize};

use crate::types::Type;

/// Payload of a constant node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An object instance, typically a closure holding captured locals.
    Object { ty: Type, fields: Vec<(String, Value)> },
    /// An in-memory query source.
    Query { elem: Type, items: Vec<Value> },
}

impl Value {
    /// Static type of the value. `Null` is typed `object`.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::object(),
            Value::Bool(_) => Type::bool(),
            Value::Int(_) => Type::long(),
            Value::Float(_) => Type::double(),
            Value::Str(_) => Type::string(),
            Value::Object { ty, .. } => ty.clone(),
            Value::Query { elem, .. } => Type::query(elem.clone()),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object { fields, .. } => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Object { ty, .. } => write!(f, "value({ty})"),
            Value::Query { elem, .. } => write!(f, "value(Query<{elem}>)"),
        }
    }
}
