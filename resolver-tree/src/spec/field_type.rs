use serde::Deserialize;
use serde::Serialize;

// Primitives are taken from scalars: https://spec.graphql.org/draft/#sec-Scalars
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Named type {0}
    Named(String),
    /// List type {0}
    List(Box<FieldType>),
    /// Non null type {0}
    NonNull(Box<FieldType>),
    /// String
    String,
    /// Int
    Int,
    /// Float
    Float,
    /// Id
    Id,
    /// Boolean
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Named(ty) => write!(f, "{ty}"),
            FieldType::List(ty) => write!(f, "[{ty}]"),
            FieldType::NonNull(ty) => write!(f, "{ty}!"),
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Id => write!(f, "ID"),
            FieldType::Boolean => write!(f, "Boolean"),
        }
    }
}

impl FieldType {
    /// Parse a type name the way it is spelled in a schema: `"Int"`, `"User"`, ...
    ///
    /// Wrapping types are not parsed here, build them with [`FieldType::list`] and
    /// [`FieldType::non_null`].
    pub fn named(name: &str) -> Self {
        match name {
            "String" => Self::String,
            "Int" => Self::Int,
            "Float" => Self::Float,
            "ID" => Self::Id,
            "Boolean" => Self::Boolean,
            _ => Self::Named(name.to_string()),
        }
    }

    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    /// return the name of the type on which selections happen
    ///
    /// Example if we get the field `list: [User!]!`, it will return "User"
    pub fn inner_type_name(&self) -> Option<&str> {
        match self {
            FieldType::Named(name) => Some(name.as_str()),
            FieldType::List(inner) | FieldType::NonNull(inner) => inner.inner_type_name(),
            FieldType::String
            | FieldType::Int
            | FieldType::Float
            | FieldType::Id
            | FieldType::Boolean => None,
        }
    }

    /// The element type of a list type, looking through one level of non-null.
    ///
    /// `[User!]!` gives `User!`, `Int` gives `None`.
    pub fn list_item(&self) -> Option<&FieldType> {
        match self {
            FieldType::List(inner) => Some(inner),
            FieldType::NonNull(inner) => match inner.as_ref() {
                FieldType::List(inner) => Some(inner),
                _ => None,
            },
            _ => None,
        }
    }

    /// The type without its outer non-null wrapper.
    pub fn nullable(&self) -> &FieldType {
        match self {
            FieldType::NonNull(inner) => inner,
            ty => ty,
        }
    }

    pub fn is_list(&self) -> bool {
        self.list_item().is_some()
    }

    pub fn is_builtin_scalar(&self) -> bool {
        match self {
            FieldType::Named(_) | FieldType::List(_) | FieldType::NonNull(_) => false,
            FieldType::String
            | FieldType::Int
            | FieldType::Float
            | FieldType::Id
            | FieldType::Boolean => true,
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_sdl_notation() {
        let ty = FieldType::named("User").non_null().list().non_null();
        assert_eq!(ty.to_string(), "[User!]!");
        assert_eq!(FieldType::named("ID").to_string(), "ID");
    }

    #[test]
    fn list_item_looks_through_one_non_null() {
        let ty = FieldType::Int.non_null().list().non_null();
        assert_eq!(ty.list_item(), Some(&FieldType::Int.non_null()));
        assert!(ty.is_list());
        assert_eq!(FieldType::Int.list_item(), None);
        assert_eq!(FieldType::Int.list().non_null().non_null().list_item(), None);
    }

    #[test]
    fn inner_type_name() {
        let ty = FieldType::named("User").non_null().list();
        assert_eq!(ty.inner_type_name(), Some("User"));
        assert_eq!(FieldType::String.list().inner_type_name(), None);
    }
}
