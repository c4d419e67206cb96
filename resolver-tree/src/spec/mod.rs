//! Requested shapes, as handed over by the query validator.

mod field_type;
mod selection;

use std::fmt::Display;

pub use field_type::*;
use serde::Deserialize;
use serde::Serialize;
pub use selection::*;

pub const TYPENAME: &str = "__typename";

/// The kind of operation a resolver tree is built for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    #[default]
    Query,
    Mutation,
    Subscription,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default_type_name())
    }
}

impl OperationKind {
    pub const fn default_type_name(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }

    /// Mutation fields are executed one after the other, so trees rooted at a mutation
    /// must not fan out.
    pub const fn is_write(&self) -> bool {
        matches!(self, OperationKind::Mutation)
    }
}
