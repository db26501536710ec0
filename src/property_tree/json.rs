//! Bridge between [`PropertyTree`] and `serde_json` values.
//!
//! Dictionaries map to objects (order preserved), lists to arrays, `None` to `null`.
//! Doubles always render as JSON floats and integers as JSON integers, so a value read back from
//! its JSON form keeps its property tree type.

use super::{Dictionary, PropertyTree};
use crate::err::{SerializationError, SerializationResult};

use serde_json::{Map, Number, Value};

impl PropertyTree {
    pub fn to_json_value(&self) -> SerializationResult<Value> {
        let value = match self {
            PropertyTree::None => Value::Null,
            PropertyTree::Bool(b) => Value::Bool(*b),
            PropertyTree::Double(d) => Number::from_f64(*d)
                .map(Value::Number)
                .ok_or(SerializationError::NonFiniteDouble { value: *d })?,
            PropertyTree::Int(i) => Value::Number(Number::from(*i)),
            PropertyTree::String(s) => Value::String(s.clone()),
            PropertyTree::List(items) => Value::Array(
                items
                    .iter()
                    .map(PropertyTree::to_json_value)
                    .collect::<SerializationResult<Vec<_>>>()?,
            ),
            PropertyTree::Dictionary(dict) => {
                let mut map = Map::with_capacity(dict.len());
                for (key, child) in dict.iter() {
                    map.insert(key.to_owned(), child.to_json_value()?);
                }
                Value::Object(map)
            }
        };

        Ok(value)
    }

    pub fn from_json_value(value: &Value) -> SerializationResult<PropertyTree> {
        let tree = match value {
            Value::Null => PropertyTree::None,
            Value::Bool(b) => PropertyTree::Bool(*b),
            Value::Number(n) => number_to_tree(n)?,
            Value::String(s) => PropertyTree::String(s.clone()),
            Value::Array(items) => PropertyTree::List(
                items
                    .iter()
                    .map(PropertyTree::from_json_value)
                    .collect::<SerializationResult<Vec<_>>>()?,
            ),
            Value::Object(map) => {
                let mut dict = Dictionary::with_capacity(map.len());
                for (key, child) in map {
                    dict.insert(key.as_str(), PropertyTree::from_json_value(child)?);
                }
                PropertyTree::Dictionary(dict)
            }
        };

        Ok(tree)
    }

    pub fn from_json_str(json: &str) -> SerializationResult<PropertyTree> {
        let value: Value = serde_json::from_str(json)?;
        PropertyTree::from_json_value(&value)
    }

    pub fn to_json_string(&self, indent: bool) -> SerializationResult<String> {
        let value = self.to_json_value()?;
        let json = if indent {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(json)
    }
}

fn number_to_tree(n: &Number) -> SerializationResult<PropertyTree> {
    if n.is_f64() {
        // `is_f64` guarantees `as_f64` succeeds.
        return Ok(PropertyTree::Double(n.as_f64().unwrap_or_default()));
    }

    n.as_i64()
        .and_then(|i| i32::try_from(i).ok())
        .map(PropertyTree::Int)
        .ok_or_else(|| SerializationError::IntegerOutOfRange {
            value: n.to_string(),
        })
}

impl TryFrom<&Value> for PropertyTree {
    type Error = SerializationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        PropertyTree::from_json_value(value)
    }
}
