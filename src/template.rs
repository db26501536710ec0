//! Detached captures of single setting values.

use crate::property_tree::PropertyTree;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A captured scalar setting value.
///
/// Serialized as a bare JSON scalar. When reading JSON, whole numbers that fit 32 bits become
/// [`ValueTemplate::Int`] and every other number becomes [`ValueTemplate::Double`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueTemplate {
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),
}

#[derive(Debug, Error, PartialEq)]
#[error("cannot read {found} value `{value}` as {expected}")]
pub struct ValueFormatError {
    pub expected: &'static str,
    pub found: &'static str,
    pub value: String,
}

impl ValueTemplate {
    /// Capture a scalar tree node. Containers and `None` have no template.
    pub fn from_tree(tree: &PropertyTree) -> Option<ValueTemplate> {
        match tree {
            PropertyTree::Bool(b) => Some(ValueTemplate::Bool(*b)),
            PropertyTree::Double(d) => Some(ValueTemplate::Double(*d)),
            PropertyTree::Int(i) => Some(ValueTemplate::Int(*i)),
            PropertyTree::String(s) => Some(ValueTemplate::String(s.clone())),
            PropertyTree::None | PropertyTree::List(_) | PropertyTree::Dictionary(_) => None,
        }
    }

    pub fn to_tree(&self) -> PropertyTree {
        match self {
            ValueTemplate::Bool(b) => PropertyTree::Bool(*b),
            ValueTemplate::Double(d) => PropertyTree::Double(*d),
            ValueTemplate::Int(i) => PropertyTree::Int(*i),
            ValueTemplate::String(s) => PropertyTree::String(s.clone()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ValueTemplate::Bool(_) => "bool",
            ValueTemplate::Double(_) => "double",
            ValueTemplate::Int(_) => "int",
            ValueTemplate::String(_) => "string",
        }
    }

    /// Read the captured value as `T`.
    ///
    /// ```
    /// use modsettings::ValueTemplate;
    ///
    /// let template = ValueTemplate::String("42".to_owned());
    /// assert_eq!(template.get_value::<i32>(), Ok(42));
    /// assert!(template.get_value::<bool>().is_err());
    /// ```
    pub fn get_value<T: TemplateValue>(&self) -> Result<T, ValueFormatError> {
        T::from_template(self).ok_or_else(|| ValueFormatError {
            expected: T::KIND,
            found: self.kind(),
            value: self.to_string(),
        })
    }

    /// Coerce this value to the kind of `target`, as a setting currently holding `target` would.
    pub fn coerce_like(&self, target: &ValueTemplate) -> Result<ValueTemplate, ValueFormatError> {
        match target {
            ValueTemplate::Bool(_) => self.get_value::<bool>().map(ValueTemplate::Bool),
            ValueTemplate::Double(_) => self.get_value::<f64>().map(ValueTemplate::Double),
            ValueTemplate::Int(_) => self.get_value::<i32>().map(ValueTemplate::Int),
            ValueTemplate::String(_) => self.get_value::<String>().map(ValueTemplate::String),
        }
    }
}

impl fmt::Display for ValueTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTemplate::Bool(b) => write!(f, "{}", b),
            ValueTemplate::Double(d) => write!(f, "{}", d),
            ValueTemplate::Int(i) => write!(f, "{}", i),
            ValueTemplate::String(s) => f.write_str(s),
        }
    }
}

/// Types a [`ValueTemplate`] can be read as and captured from.
pub trait TemplateValue: Sized {
    /// Name used in error messages.
    const KIND: &'static str;

    fn from_template(template: &ValueTemplate) -> Option<Self>;

    fn into_template(self) -> ValueTemplate;
}

impl TemplateValue for bool {
    const KIND: &'static str = "bool";

    fn from_template(template: &ValueTemplate) -> Option<Self> {
        match template {
            ValueTemplate::Bool(b) => Some(*b),
            ValueTemplate::String(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            ValueTemplate::Int(_) | ValueTemplate::Double(_) => None,
        }
    }

    fn into_template(self) -> ValueTemplate {
        ValueTemplate::Bool(self)
    }
}

impl TemplateValue for i32 {
    const KIND: &'static str = "int";

    fn from_template(template: &ValueTemplate) -> Option<Self> {
        match template {
            ValueTemplate::Int(i) => Some(*i),
            ValueTemplate::Double(d) => {
                let in_range = *d >= f64::from(i32::MIN) && *d <= f64::from(i32::MAX);
                if d.fract() == 0.0 && in_range {
                    Some(*d as i32)
                } else {
                    None
                }
            }
            ValueTemplate::String(s) => s.trim().parse().ok(),
            ValueTemplate::Bool(_) => None,
        }
    }

    fn into_template(self) -> ValueTemplate {
        ValueTemplate::Int(self)
    }
}

impl TemplateValue for f64 {
    const KIND: &'static str = "double";

    fn from_template(template: &ValueTemplate) -> Option<Self> {
        match template {
            ValueTemplate::Double(d) => Some(*d),
            ValueTemplate::Int(i) => Some(f64::from(*i)),
            ValueTemplate::String(s) => s.trim().parse().ok(),
            ValueTemplate::Bool(_) => None,
        }
    }

    fn into_template(self) -> ValueTemplate {
        ValueTemplate::Double(self)
    }
}

impl TemplateValue for String {
    const KIND: &'static str = "string";

    fn from_template(template: &ValueTemplate) -> Option<Self> {
        Some(template.to_string())
    }

    fn into_template(self) -> ValueTemplate {
        ValueTemplate::String(self)
    }
}

impl TemplateValue for ValueTemplate {
    const KIND: &'static str = "scalar";

    fn from_template(template: &ValueTemplate) -> Option<Self> {
        Some(template.clone())
    }

    fn into_template(self) -> ValueTemplate {
        self
    }
}
