use serde::Deserialize;
use serde::Serialize;

use crate::spec::FieldType;

/// The shape a query requests at one position: the field type plus the sub-selections made on it.
///
/// Shapes are produced by the query validator. They are immutable and compared structurally,
/// which makes them usable as part of a resolver cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selections: Vec<Selection>,
}

impl Shape {
    /// A leaf shape, with nothing selected below it.
    pub fn leaf(field_type: FieldType) -> Self {
        Self {
            field_type,
            selections: Vec::new(),
        }
    }

    pub fn new(field_type: FieldType, selections: Vec<Selection>) -> Self {
        Self {
            field_type,
            selections,
        }
    }

    /// The requested shape of each element when this shape is a list.
    ///
    /// Selections apply to the innermost named type, so they carry over unchanged.
    pub fn element(&self) -> Option<Shape> {
        self.field_type.list_item().map(|item| Shape {
            field_type: item.clone(),
            selections: self.selections.clone(),
        })
    }

    pub fn is_list(&self) -> bool {
        self.field_type.is_list()
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_type)?;
        if !self.selections.is_empty() {
            write!(f, " {{")?;
            for selection in &self.selections {
                write!(f, " {selection}")?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}

/// A field selected on an object shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// The field name on the parent type.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub shape: Shape,
}

impl Selection {
    pub fn field(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            alias: None,
            shape,
        }
    }

    pub fn aliased(alias: impl Into<String>, name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
            shape,
        }
    }

    /// The key under which this selection appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{alias}: ")?;
        }
        write!(f, "{}", self.name)?;
        if !self.shape.selections.is_empty() {
            write!(f, " {{")?;
            for selection in &self.shape.selections {
                write!(f, " {selection}")?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}
