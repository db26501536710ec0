//! In-memory representation of a property tree document.

mod json;

use indexmap::IndexMap;
use std::fmt;

/// On-disk type tag of a property tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyTreeType {
    None = 0,
    Bool = 1,
    Double = 2,
    String = 3,
    List = 4,
    Dictionary = 5,
    Int = 6,
}

impl PropertyTreeType {
    pub fn from_u8(tag: u8) -> Option<PropertyTreeType> {
        match tag {
            0 => Some(PropertyTreeType::None),
            1 => Some(PropertyTreeType::Bool),
            2 => Some(PropertyTreeType::Double),
            3 => Some(PropertyTreeType::String),
            4 => Some(PropertyTreeType::List),
            5 => Some(PropertyTreeType::Dictionary),
            6 => Some(PropertyTreeType::Int),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            PropertyTreeType::Bool
                | PropertyTreeType::Double
                | PropertyTreeType::String
                | PropertyTreeType::Int
        )
    }
}

impl fmt::Display for PropertyTreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyTreeType::None => "none",
            PropertyTreeType::Bool => "bool",
            PropertyTreeType::Double => "double",
            PropertyTreeType::String => "string",
            PropertyTreeType::List => "list",
            PropertyTreeType::Dictionary => "dictionary",
            PropertyTreeType::Int => "int",
        };
        f.write_str(name)
    }
}

/// A property tree node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyTree {
    #[default]
    None,
    Bool(bool),
    Double(f64),
    Int(i32),
    String(String),
    List(Vec<PropertyTree>),
    Dictionary(Dictionary),
}

impl PropertyTree {
    pub fn tree_type(&self) -> PropertyTreeType {
        match self {
            PropertyTree::None => PropertyTreeType::None,
            PropertyTree::Bool(_) => PropertyTreeType::Bool,
            PropertyTree::Double(_) => PropertyTreeType::Double,
            PropertyTree::Int(_) => PropertyTreeType::Int,
            PropertyTree::String(_) => PropertyTreeType::String,
            PropertyTree::List(_) => PropertyTreeType::List,
            PropertyTree::Dictionary(_) => PropertyTreeType::Dictionary,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PropertyTree::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyTree::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyTree::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            PropertyTree::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyTree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyTree]> {
        match self {
            PropertyTree::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            PropertyTree::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            PropertyTree::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Dictionary lookup; `None` for missing keys and non-dictionary nodes.
    pub fn get(&self, key: &str) -> Option<&PropertyTree> {
        self.as_dictionary().and_then(|dict| dict.get(key))
    }
}

impl From<bool> for PropertyTree {
    fn from(value: bool) -> Self {
        PropertyTree::Bool(value)
    }
}

impl From<f64> for PropertyTree {
    fn from(value: f64) -> Self {
        PropertyTree::Double(value)
    }
}

impl From<i32> for PropertyTree {
    fn from(value: i32) -> Self {
        PropertyTree::Int(value)
    }
}

impl From<&str> for PropertyTree {
    fn from(value: &str) -> Self {
        PropertyTree::String(value.to_owned())
    }
}

impl From<String> for PropertyTree {
    fn from(value: String) -> Self {
        PropertyTree::String(value)
    }
}

impl From<Vec<PropertyTree>> for PropertyTree {
    fn from(value: Vec<PropertyTree>) -> Self {
        PropertyTree::List(value)
    }
}

impl From<Dictionary> for PropertyTree {
    fn from(value: Dictionary) -> Self {
        PropertyTree::Dictionary(value)
    }
}

/// Insertion ordered string-keyed map.
///
/// Entry order is part of the document and is reproduced when encoding. Keys are unique:
/// inserting an existing key replaces its value and keeps its position. Equality takes order
/// into account.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: IndexMap<String, PropertyTree>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Dictionary {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyTree) -> Option<PropertyTree> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyTree> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropertyTree> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove `key`, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<PropertyTree> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyTree)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PropertyTree)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

// Compared entry by entry: `IndexMap` equality ignores order.
impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyTree)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, PropertyTree)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl IntoIterator for Dictionary {
    type Item = (String, PropertyTree);
    type IntoIter = indexmap::map::IntoIter<String, PropertyTree>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
pub(crate) mod test_trees {
    use super::{Dictionary, PropertyTree};

    /// Scalars at the edges of what each node type can hold. All doubles are finite.
    pub(crate) fn edge_scalars() -> Vec<PropertyTree> {
        let doubles = [
            0.0,
            -0.0,
            0.1,
            f64::EPSILON,
            f64::MIN_POSITIVE,
            f64::from_bits(1),
            f64::MAX,
            f64::MIN,
            1.0715660391465826e-75,
            -1.81996730402717e-179,
            -1.603964615428183e143,
            1e16,
        ];

        let mut scalars = vec![
            PropertyTree::Bool(true),
            PropertyTree::Bool(false),
            PropertyTree::Int(i32::MIN),
            PropertyTree::Int(i32::MAX),
            PropertyTree::Int(0),
            PropertyTree::Int(-1),
        ];
        scalars.extend(doubles.into_iter().map(PropertyTree::Double));
        scalars.extend(
            [
                String::new(),
                // 254 and 255 bytes, the edge of the one byte length form.
                "é".repeat(127),
                "é".repeat(127) + "a",
                "€".repeat(85),
                "🦀 mod ⚙ setting".to_owned(),
                "nul \0 and \u{1} control".to_owned(),
            ]
            .into_iter()
            .map(PropertyTree::String),
        );
        scalars
    }

    /// Nested containers of every kind holding `edge_scalars`.
    pub(crate) fn edge_tree() -> PropertyTree {
        let scalars = edge_scalars();

        let mut by_name = Dictionary::new();
        for (i, scalar) in scalars.iter().enumerate() {
            by_name.insert(format!("réglage-{}", i), scalar.clone());
        }

        let mut nested = Dictionary::new();
        nested.insert("none", PropertyTree::None);
        nested.insert("empty-list", PropertyTree::List(vec![]));
        nested.insert("empty-dictionary", PropertyTree::Dictionary(Dictionary::new()));
        nested.insert(
            "lists",
            PropertyTree::List(vec![
                PropertyTree::List(scalars.clone()),
                PropertyTree::Dictionary(by_name.clone()),
            ]),
        );

        let mut root = Dictionary::new();
        root.insert("scalars", PropertyTree::List(scalars));
        root.insert("by-name", PropertyTree::Dictionary(by_name));
        root.insert("nested", PropertyTree::Dictionary(nested));
        PropertyTree::Dictionary(root)
    }

    /// Structural equality that compares doubles bit for bit, so `-0.0` and `0.0` differ.
    pub(crate) fn assert_identical(left: &PropertyTree, right: &PropertyTree) {
        match (left, right) {
            (PropertyTree::Double(l), PropertyTree::Double(r)) => {
                assert_eq!(l.to_bits(), r.to_bits(), "{:e} != {:e}", l, r)
            }
            (PropertyTree::List(l), PropertyTree::List(r)) => {
                assert_eq!(l.len(), r.len());
                for (l, r) in l.iter().zip(r) {
                    assert_identical(l, r);
                }
            }
            (PropertyTree::Dictionary(l), PropertyTree::Dictionary(r)) => {
                assert_eq!(l.keys().collect::<Vec<_>>(), r.keys().collect::<Vec<_>>());
                for ((_, l), (_, r)) in l.iter().zip(r.iter()) {
                    assert_identical(l, r);
                }
            }
            _ => assert_eq!(left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_tags_match_wire_values() {
        for tag in 0..=6u8 {
            let t = PropertyTreeType::from_u8(tag).unwrap();
            assert_eq!(t.as_u8(), tag);
        }
        assert_eq!(PropertyTreeType::from_u8(7), None);
        assert_eq!(PropertyTreeType::from_u8(0xff), None);
    }

    #[test]
    fn test_dictionary_preserves_insertion_order() {
        let mut dict = Dictionary::new();
        dict.insert("b", PropertyTree::Int(1));
        dict.insert("a", PropertyTree::Int(2));
        dict.insert("c", PropertyTree::Int(3));

        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_dictionary_replaces_in_place() {
        let mut dict: Dictionary = vec![
            ("first", PropertyTree::Bool(true)),
            ("second", PropertyTree::Bool(false)),
        ]
        .into_iter()
        .collect();

        let previous = dict.insert("first", PropertyTree::from("replaced"));

        assert_eq!(previous, Some(PropertyTree::Bool(true)));
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(dict.get("first"), Some(&PropertyTree::from("replaced")));
    }

    #[test]
    fn test_dictionary_remove_keeps_order() {
        let mut dict: Dictionary = vec![
            ("x", PropertyTree::Int(1)),
            ("y", PropertyTree::Int(2)),
            ("z", PropertyTree::Int(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(dict.remove("y"), Some(PropertyTree::Int(2)));
        assert_eq!(dict.remove("y"), None);
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["x", "z"]);
    }

    #[test]
    fn test_dictionary_equality_is_order_sensitive() {
        let ab: Dictionary = vec![("a", PropertyTree::Int(1)), ("b", PropertyTree::Int(2))]
            .into_iter()
            .collect();
        let ba: Dictionary = vec![("b", PropertyTree::Int(2)), ("a", PropertyTree::Int(1))]
            .into_iter()
            .collect();

        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_get_on_nested_dictionary() {
        let tree = PropertyTree::Dictionary(
            vec![(
                "startup",
                PropertyTree::Dictionary(
                    vec![("setting", PropertyTree::Double(0.5))].into_iter().collect(),
                ),
            )]
            .into_iter()
            .collect(),
        );

        assert_eq!(
            tree.get("startup").and_then(|s| s.get("setting")),
            Some(&PropertyTree::Double(0.5))
        );
        assert_eq!(tree.get("missing"), None);
        assert_eq!(PropertyTree::Int(1).get("startup"), None);
    }
}
