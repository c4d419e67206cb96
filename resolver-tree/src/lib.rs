//! Resolver trees: map native values onto the shapes a GraphQL operation requests.
//!
//! A [`ResolverTree`] builds one [`Resolver`](resolver::Resolver) per distinct
//! (requested shape, native type) pair. Lists are backed either by finite sequences, resolved
//! element by element into order-preserving slots, or by receive-only streams, drained in the
//! background until they close or the execution is cancelled.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(unreachable_pub)]

pub mod configuration;
pub mod context;
pub mod error;
pub mod json_ext;
pub mod native;
pub mod registry;
pub mod resolver;
mod response;
pub mod spawn;
pub mod spec;
mod sync;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use configuration::Configuration;
pub use context::Execution;
pub use context::ResolutionContext;
pub use registry::Registry;
pub use registry::RegistryBuilder;
pub use response::Response;
pub use tree::ResolverTree;
