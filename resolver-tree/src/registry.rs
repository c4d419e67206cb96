//! The resolver registry.
//!
//! Resolvers are built into a [`RegistryBuilder`] while the schema is set up. The builder is then
//! frozen into a read-only [`Registry`], which may be installed once for the whole process.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::configuration::Configuration;
use crate::context::Execution;
use crate::error::BuildError;
use crate::error::RegistryError;
use crate::native::NativeType;
use crate::native::NativeValue;
use crate::resolver::SharedResolver;
use crate::resolver::TypeResolverKey;
use crate::response::Response;
use crate::spec::OperationKind;
use crate::spec::Shape;
use crate::tree::ResolverTree;

static REGISTRY: OnceCell<Registry> = OnceCell::new();

const OPERATION_KINDS: [OperationKind; 3] = [
    OperationKind::Query,
    OperationKind::Mutation,
    OperationKind::Subscription,
];

/// Builds one resolver tree per operation kind.
///
/// Building takes `&self`: several threads may build and look up resolvers at the same time.
#[derive(Debug)]
pub struct RegistryBuilder {
    trees: HashMap<OperationKind, ResolverTree>,
}

impl RegistryBuilder {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            trees: OPERATION_KINDS
                .into_iter()
                .map(|kind| (kind, ResolverTree::new(kind, configuration)))
                .collect(),
        }
    }

    pub fn tree(&self, kind: OperationKind) -> &ResolverTree {
        &self.trees[&kind]
    }

    /// Get or build the resolver for `native_type` and `shape` in the `kind` tree.
    pub fn build(
        &self,
        kind: OperationKind,
        native_type: &NativeType,
        shape: &Shape,
    ) -> Result<SharedResolver, BuildError> {
        self.tree(kind).build_follow_resolver(native_type, shape)
    }

    /// Stop building. The resulting registry is read-only.
    pub fn freeze(self) -> Registry {
        let trees = self
            .trees
            .into_iter()
            .map(|(kind, tree)| {
                let frozen = FrozenTree {
                    serial_only: tree.is_serial_only(),
                    resolvers: tree.into_resolvers(),
                };
                tracing::debug!(%kind, resolvers = frozen.resolvers.len(), "resolver tree frozen");
                (kind, frozen)
            })
            .collect();
        Registry { trees }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new(&Configuration::default())
    }
}

#[derive(Debug)]
struct FrozenTree {
    serial_only: bool,
    resolvers: HashMap<TypeResolverKey, SharedResolver>,
}

/// Resolvers built during schema setup, looked up during execution.
#[derive(Debug)]
pub struct Registry {
    trees: HashMap<OperationKind, FrozenTree>,
}

impl Registry {
    /// Make this registry the process-wide one.
    ///
    /// Only one registry can be installed.
    pub fn install(self) -> Result<&'static Registry, RegistryError> {
        let mut installed = false;
        let registry = REGISTRY.get_or_init(|| {
            installed = true;
            self
        });
        if installed {
            tracing::info!(resolvers = registry.len(), "resolver registry installed");
            Ok(registry)
        } else {
            Err(RegistryError::AlreadyInstalled)
        }
    }

    /// The process-wide registry, if one was installed.
    pub fn global() -> Option<&'static Registry> {
        REGISTRY.get()
    }

    pub fn get(
        &self,
        kind: OperationKind,
        native_type: &NativeType,
        shape: &Shape,
    ) -> Option<SharedResolver> {
        self.trees.get(&kind).and_then(|tree| {
            tree.resolvers
                .get(&TypeResolverKey::new(shape.clone(), native_type.clone()))
                .cloned()
        })
    }

    pub fn is_serial_only(&self, kind: OperationKind) -> bool {
        self.trees.get(&kind).is_some_and(|tree| tree.serial_only)
    }

    /// Number of resolvers across every operation kind.
    pub fn len(&self) -> usize {
        self.trees.values().map(|tree| tree.resolvers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A new execution of a `kind` operation.
    pub fn execution(&self, kind: OperationKind) -> Execution {
        Execution::new(self.is_serial_only(kind))
    }

    /// Resolve `value` as the root of a `kind` operation and wait for the response.
    pub async fn execute(
        &self,
        kind: OperationKind,
        native_type: &NativeType,
        shape: &Shape,
        value: NativeValue,
    ) -> Result<Response, RegistryError> {
        let resolver =
            self.get(kind, native_type, shape)
                .ok_or_else(|| RegistryError::MissingResolver {
                    kind: kind.to_string(),
                    key: TypeResolverKey::new(shape.clone(), native_type.clone()).to_string(),
                })?;
        let execution = self.execution(kind);
        resolver.execute(execution.root(shape.clone()), value).await;
        Ok(execution.finish().await)
    }
}
