//! Resolver tree errors.
use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::json_ext::Object;
use crate::json_ext::Path;

/// Errors raised while building a resolver tree.
///
/// These are schema mismatches: they are reported to whoever assembles the schema and never
/// reach a response.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    /// cannot accept non-immediate result in mutations (at {native_type}): mutations cannot return deferred values
    StreamInSerialContext {
        /// The offending native type.
        native_type: String,
    },

    /// invalid list type {native_type}: should be a receive-only stream, is a {direction}
    InvalidStreamDirection {
        /// The offending native type.
        native_type: String,
        /// The direction the stream was declared with.
        direction: String,
    },

    /// streaming lists are disabled (at {native_type})
    StreamingDisabled {
        /// The offending native type.
        native_type: String,
    },

    /// expected list type, got {native_type} (should be a sequence or a receive-only stream)
    NotAList {
        /// The offending native type.
        native_type: String,
    },

    /// cannot resolve '{shape}' from native type {native_type}
    ShapeMismatch {
        /// The requested shape.
        shape: String,
        /// The offending native type.
        native_type: String,
    },

    /// cannot query field '{field}' on type '{type_name}'
    UnknownField {
        /// The selected field.
        field: String,
        /// The native object type.
        type_name: String,
    },
}

/// Errors raised while resolving one value.
///
/// They are written into the output slot of the failing value and never abort its siblings.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FieldError {
    /// expected a {expected} value, found a {found}
    UnexpectedValue {
        /// The category the resolver was built for.
        expected: String,
        /// The category of the value it was handed.
        found: String,
    },

    /// float value {value} cannot be represented in the response
    InvalidFloat {
        /// The rejected value.
        value: String,
    },

    /// {0}
    Resolver(String),
}

impl FieldError {
    pub fn unexpected_value(expected: &str, found: &str) -> Self {
        FieldError::UnexpectedValue {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn extension_code(&self) -> &'static str {
        match self {
            FieldError::UnexpectedValue { .. } => "UNEXPECTED_NATIVE_VALUE",
            FieldError::InvalidFloat { .. } => "INVALID_FLOAT",
            FieldError::Resolver(_) => "RESOLVER_ERROR",
        }
    }

    /// Convert the field error to a GraphQL error at `path`.
    pub fn to_graphql_error(&self, path: Path) -> Error {
        let mut extensions = Object::new();
        extensions.insert("code", self.extension_code().to_string().into());
        Error {
            message: self.to_string(),
            path: Some(path),
            extensions,
        }
    }
}

/// Errors from the process-wide registry.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// a resolver registry is already installed for this process
    AlreadyInstalled,

    /// no {kind} resolver registered for {key}
    MissingResolver {
        /// The operation kind the resolver was looked up for.
        kind: String,
        /// The (requested shape, native type) pair that was looked up.
        key: String,
    },
}

/// A [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors)
/// as found in the `errors` field of a [`Response`](crate::Response).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct Error {
    /// The error message.
    pub message: String,

    /// The JSON path to the failing field in the response data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional GraphQL extensions for this error.
    #[serde(skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;
    use crate::json_ext::PathElement;

    #[test]
    fn build_errors_name_the_native_type() {
        let error = BuildError::NotAList {
            native_type: "i64".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "expected list type, got i64 (should be a sequence or a receive-only stream)"
        );

        let error = BuildError::InvalidStreamDirection {
            native_type: "Sender<i64>".to_string(),
            direction: "send-only stream".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "invalid list type Sender<i64>: should be a receive-only stream, is a send-only stream"
        );
    }

    #[test]
    fn field_error_to_graphql_error() {
        let error = FieldError::unexpected_value("sequence", "stream")
            .to_graphql_error(Path(vec![PathElement::Key("list".into())]));
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({
                "message": "expected a sequence value, found a stream",
                "path": ["list"],
                "extensions": { "code": "UNEXPECTED_NATIVE_VALUE" }
            })
        );
        assert_eq!(error.extensions.get("code"), Some(&json!("UNEXPECTED_NATIVE_VALUE")));
    }
}
