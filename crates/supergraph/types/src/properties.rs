//! User-defined properties and opaque metadata.
//!
//! Properties are restricted to values a graph store can index and filter
//! natively. Anything else travels in [`Meta`] as an opaque JSON blob; the
//! split happens before content reaches the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque, arbitrarily nested metadata. Absent metadata is `Value::Null`.
pub type Meta = serde_json::Value;

/// Named property values of a primitive.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A natively storable property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(PropertyList),
}

/// A homogeneous list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyList {
    Bools(Vec<bool>),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Texts(Vec<String>),
}

impl PropertyList {
    pub fn len(&self) -> usize {
        match self {
            Self::Bools(v) => v.len(),
            Self::Ints(v) => v.len(),
            Self::Floats(v) => v.len(),
            Self::Texts(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<i64>> for PropertyValue {
    fn from(value: Vec<i64>) -> Self {
        Self::List(PropertyList::Ints(value))
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(value: Vec<f64>) -> Self {
        Self::List(PropertyList::Floats(value))
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(PropertyList::Texts(value))
    }
}

impl From<Vec<bool>> for PropertyValue {
    fn from(value: Vec<bool>) -> Self {
        Self::List(PropertyList::Bools(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_deserialize_to_matching_variant() {
        let v: PropertyValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(v, PropertyValue::Bool(true));
        let v: PropertyValue = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(v, PropertyValue::Int(42));
        let v: PropertyValue = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(v, PropertyValue::Float(1.5));
        let v: PropertyValue = serde_json::from_value(json!("x")).unwrap();
        assert_eq!(v, PropertyValue::Text("x".into()));
    }

    #[test]
    fn homogeneous_lists_are_accepted() {
        let v: PropertyValue = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(
            v,
            PropertyValue::List(PropertyList::Texts(vec!["a".into(), "b".into()]))
        );
        let v: PropertyValue = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(v, PropertyValue::from(vec![1_i64, 2, 3]));
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(serde_json::from_value::<PropertyValue>(json!({"a": 1})).is_err());
        assert!(serde_json::from_value::<PropertyValue>(json!([1, "a"])).is_err());
        assert!(serde_json::from_value::<PropertyValue>(json!([[1]])).is_err());
    }
}
