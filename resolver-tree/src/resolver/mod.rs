//! Resolvers: stateless strategies mapping one native value onto one requested shape.

mod list;
mod object;
mod scalar;
mod stream;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
pub(crate) use list::ElementResolver;
pub use list::ListResolver;
pub(crate) use object::FieldResolver;
pub use object::ObjectResolver;
pub use scalar::ScalarResolver;
pub use stream::StreamEnd;
pub use stream::StreamListResolver;

use crate::context::ResolutionContext;
use crate::native::NativeType;
use crate::native::NativeValue;
use crate::spec::Shape;

/// Resolves native values of one type against one requested shape.
///
/// A resolver is built once per [`TypeResolverKey`] and then invoked concurrently for every
/// occurrence of that pair. Results and errors only flow through the context.
#[async_trait]
pub trait Resolver: Send + Sync + fmt::Debug {
    async fn execute(&self, context: ResolutionContext, value: NativeValue);
}

/// Cache key identifying a resolver: the requested shape and the native type it resolves.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeResolverKey {
    pub shape: Shape,
    pub native_type: NativeType,
}

impl TypeResolverKey {
    pub fn new(shape: Shape, native_type: NativeType) -> Self {
        Self { shape, native_type }
    }
}

impl fmt::Display for TypeResolverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.shape, self.native_type)
    }
}

pub type SharedResolver = Arc<dyn Resolver>;
