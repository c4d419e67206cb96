//! JSON output values and the paths used to address slots inside them.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Map;

/// A JSON object.
pub type Object = Map<serde_json_bytes::ByteString, Value>;

/// The JSON value type written into output slots.
pub type Value = serde_json_bytes::Value;

/// A GraphQL path element that is composed of strings or numbers.
/// e.g `/book/3/name`
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index path element.
    Index(usize),

    /// A key path element.
    Key(String),
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Index(index) => write!(f, "{index}"),
            PathElement::Key(key) => write!(f, "{key}"),
        }
    }
}

/// A path into the result document.
///
/// This can be composed of strings and numbers.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn empty() -> Path {
        Path(Default::default())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }

    pub fn push(&mut self, element: PathElement) {
        self.0.push(element)
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// Returns a new path with `element` appended.
    pub fn join(&self, element: PathElement) -> Path {
        let mut path = self.clone();
        path.push(element);
        path
    }

    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }

    /// The last index element, if the path ends with one.
    pub fn last_index(&self) -> Option<usize> {
        match self.last() {
            Some(PathElement::Index(index)) => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.iter() {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path(iter.into_iter().collect())
    }
}

/// Extension trait for [`Value`].
pub trait ValueExt {
    /// Write `value` at `path`, creating intermediate objects and arrays as needed.
    ///
    /// Arrays are grown with nulls so that the addressed index exists. Whatever was previously
    /// at `path` is replaced.
    fn insert_at_path(&mut self, path: &Path, value: Value);

    /// Get a reference to the value at `path`, if it exists.
    fn get_path(&self, path: &Path) -> Option<&Value>;
}

impl ValueExt for Value {
    fn insert_at_path(&mut self, path: &Path, value: Value) {
        let mut current = self;
        for element in path.iter() {
            current = match element {
                PathElement::Key(key) => {
                    if !current.is_object() {
                        *current = Value::Object(Object::new());
                    }
                    match current {
                        Value::Object(object) => {
                            object.entry(key.as_str()).or_insert(Value::Null)
                        }
                        _ => unreachable!("replaced by an object above"),
                    }
                }
                PathElement::Index(index) => {
                    if !current.is_array() {
                        *current = Value::Array(Vec::new());
                    }
                    match current {
                        Value::Array(array) => {
                            if array.len() <= *index {
                                array.resize(*index + 1, Value::Null);
                            }
                            &mut array[*index]
                        }
                        _ => unreachable!("replaced by an array above"),
                    }
                }
            };
        }
        *current = value;
    }

    fn get_path(&self, path: &Path) -> Option<&Value> {
        let mut current = self;
        for element in path.iter() {
            current = match (element, current) {
                (PathElement::Key(key), Value::Object(object)) => object.get(key.as_str())?,
                (PathElement::Index(index), Value::Array(array)) => array.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }
}
