//! Building resolvers for (requested shape, native type) pairs.
use std::collections::HashMap;
use std::sync::Arc;

use crate::configuration::Configuration;
use crate::error::BuildError;
use crate::native::NativeKind;
use crate::native::NativeType;
use crate::native::ObjectType;
use crate::native::ScalarKind;
use crate::native::StreamDirection;
use crate::resolver::ElementResolver;
use crate::resolver::FieldResolver;
use crate::resolver::ListResolver;
use crate::resolver::ObjectResolver;
use crate::resolver::ScalarResolver;
use crate::resolver::SharedResolver;
use crate::resolver::StreamListResolver;
use crate::resolver::TypeResolverKey;
use crate::spec::OperationKind;
use crate::spec::Shape;
use crate::spec::TYPENAME;
use crate::sync::RwLock;

/// The resolvers built for one operation kind, keyed by (requested shape, native type).
///
/// Building only takes the lock to look up and to register, so lookups of keys that are already
/// built can run while other keys are being built. A resolver is registered once its whole
/// subtree has been built: a failed build leaves nothing behind for its key.
#[derive(Debug)]
pub struct ResolverTree {
    kind: OperationKind,
    serial_only: bool,
    streaming_lists: bool,
    resolvers: RwLock<HashMap<TypeResolverKey, SharedResolver>>,
}

impl ResolverTree {
    pub fn new(kind: OperationKind, configuration: &Configuration) -> Self {
        Self {
            kind,
            serial_only: configuration.is_serial_only(kind),
            streaming_lists: configuration.streaming_lists,
            resolvers: Default::default(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Whether resolvers are built for executions that must not fan out.
    pub fn is_serial_only(&self) -> bool {
        self.serial_only
    }

    pub fn get(&self, native_type: &NativeType, shape: &Shape) -> Option<SharedResolver> {
        self.resolvers
            .read()
            .get(&TypeResolverKey::new(shape.clone(), native_type.clone()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.resolvers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.read().is_empty()
    }

    pub(crate) fn into_resolvers(self) -> HashMap<TypeResolverKey, SharedResolver> {
        self.resolvers.into_inner()
    }

    /// Get or build the resolver mapping values of `native_type` onto `shape`.
    ///
    /// List shapes go through [`ResolverTree::build_list_resolver`], anything else resolves to
    /// a scalar or an object.
    pub fn build_follow_resolver(
        &self,
        native_type: &NativeType,
        shape: &Shape,
    ) -> Result<SharedResolver, BuildError> {
        if let Some(resolver) = self.get(native_type, shape) {
            return Ok(resolver);
        }
        if shape.is_list() {
            return self.build_list_resolver(native_type, shape);
        }

        let resolver: SharedResolver = match native_type.deref_all() {
            NativeType::Scalar(kind) => Arc::new(build_scalar(*kind, native_type, shape)?),
            NativeType::Object(object) => Arc::new(self.build_object(object, native_type, shape)?),
            _ => return Err(shape_mismatch(native_type, shape)),
        };
        Ok(self.register(native_type, shape, resolver))
    }

    /// Get or build the resolver for a list shape backed by a sequence or a receive-only stream,
    /// either of them possibly behind a pointer.
    pub fn build_list_resolver(
        &self,
        native_type: &NativeType,
        shape: &Shape,
    ) -> Result<SharedResolver, BuildError> {
        if let Some(resolver) = self.get(native_type, shape) {
            return Ok(resolver);
        }

        let (list_type, nullable) = native_type.pointee();
        let (element_type, streaming) = match list_type.classify() {
            NativeKind::Stream(direction, element) => {
                if self.serial_only {
                    return Err(BuildError::StreamInSerialContext {
                        native_type: native_type.to_string(),
                    });
                }
                if direction != StreamDirection::Receive {
                    return Err(BuildError::InvalidStreamDirection {
                        native_type: native_type.to_string(),
                        direction: direction.to_string(),
                    });
                }
                if !self.streaming_lists {
                    return Err(BuildError::StreamingDisabled {
                        native_type: native_type.to_string(),
                    });
                }
                (element, true)
            }
            NativeKind::Sequence(element) => (element, false),
            NativeKind::Pointer(_) | NativeKind::Other => {
                return Err(BuildError::NotAList {
                    native_type: native_type.to_string(),
                })
            }
        };
        let element_shape = shape
            .element()
            .ok_or_else(|| shape_mismatch(native_type, shape))?;

        let (element_type, element_nullable) = element_type.pointee();
        let element = ElementResolver::new(
            self.build_follow_resolver(element_type, &element_shape)?,
            element_shape,
            element_nullable,
        );

        tracing::debug!(
            kind = %self.kind,
            native_type = %native_type,
            shape = %shape,
            streaming,
            "built list resolver"
        );
        let resolver: SharedResolver = if streaming {
            Arc::new(StreamListResolver::new(element))
        } else {
            Arc::new(ListResolver::new(nullable, element))
        };
        Ok(self.register(native_type, shape, resolver))
    }

    fn build_object(
        &self,
        object: &ObjectType,
        native_type: &NativeType,
        shape: &Shape,
    ) -> Result<ObjectResolver, BuildError> {
        if shape.field_type.is_builtin_scalar() {
            return Err(shape_mismatch(native_type, shape));
        }

        let mut fields = Vec::with_capacity(shape.selections.len());
        for selection in &shape.selections {
            let response_key = selection.response_key().to_string();
            if selection.name == TYPENAME {
                fields.push(FieldResolver::typename(
                    response_key,
                    selection.shape.clone(),
                ));
                continue;
            }
            let field_type =
                object
                    .field(&selection.name)
                    .ok_or_else(|| BuildError::UnknownField {
                        field: selection.name.clone(),
                        type_name: object.name.clone(),
                    })?;
            let resolver = self.build_follow_resolver(field_type, &selection.shape)?;
            fields.push(FieldResolver::native(
                response_key,
                selection.shape.clone(),
                selection.name.clone(),
                resolver,
            ));
        }
        Ok(ObjectResolver::new(object.name.clone(), fields))
    }

    /// Register `resolver`, unless another build registered the same key first.
    fn register(
        &self,
        native_type: &NativeType,
        shape: &Shape,
        resolver: SharedResolver,
    ) -> SharedResolver {
        let key = TypeResolverKey::new(shape.clone(), native_type.clone());
        tracing::trace!(kind = %self.kind, %key, "registering resolver");
        self.resolvers.write().entry(key).or_insert(resolver).clone()
    }
}

fn build_scalar(
    kind: ScalarKind,
    native_type: &NativeType,
    shape: &Shape,
) -> Result<ScalarResolver, BuildError> {
    if !shape.selections.is_empty() {
        return Err(shape_mismatch(native_type, shape));
    }
    ScalarResolver::for_field_type(kind, &shape.field_type)
        .ok_or_else(|| shape_mismatch(native_type, shape))
}

fn shape_mismatch(native_type: &NativeType, shape: &Shape) -> BuildError {
    BuildError::ShapeMismatch {
        shape: shape.to_string(),
        native_type: native_type.to_string(),
    }
}
