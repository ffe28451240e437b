//! Ordered object map.
//!
//! [`Map`] wraps [`IndexMap`] so that object keys iterate in insertion order.
//! Decode relies on this to walk dynamic-key objects in the order the wire
//! presented them, and encode relies on it to emit fields in declaration order.
//!
//! ## Examples
//!
//! ```rust
//! use recmap::{Map, Value};
//!
//! let mut map = Map::new();
//! map.insert("Banana".to_string(), Value::from(200));
//! map.insert("Orange".to_string(), Value::from(100));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["Banana", "Orange"]);
//! ```

use crate::Value;
use indexmap::IndexMap;

/// An ordered map of string keys to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map(IndexMap<String, Value>);

impl Map {
    #[must_use]
    pub fn new() -> Self {
        Map(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// An existing key keeps its original position.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Returns the object stored under `key`, inserting an empty one when the
    /// key is absent. Returns `None` when the key holds a non-object value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recmap::{Map, Value};
    ///
    /// let mut map = Map::new();
    /// map.object_entry("feature")
    ///     .unwrap()
    ///     .insert("height".to_string(), Value::from("180cm"));
    /// map.object_entry("feature")
    ///     .unwrap()
    ///     .insert("weight".to_string(), Value::from("70kg"));
    ///
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get("feature").and_then(|f| f.as_object()).map(|f| f.len()), Some(2));
    /// ```
    pub fn object_entry(&mut self, key: &str) -> Option<&mut Map> {
        let slot = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match slot {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Map(IndexMap::from_iter(iter))
    }
}

impl Extend<(String, Value)> for Map {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}
