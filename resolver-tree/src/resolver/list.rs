use async_trait::async_trait;

use super::Resolver;
use super::SharedResolver;
use crate::context::ResolutionContext;
use crate::error::FieldError;
use crate::json_ext::Value;
use crate::native::NativeValue;
use crate::spec::Shape;

/// Resolves one list element, writing null for a nil element pointer.
#[derive(Clone, Debug)]
pub(crate) struct ElementResolver {
    resolver: SharedResolver,
    shape: Shape,
    nullable: bool,
}

impl ElementResolver {
    pub(crate) fn new(resolver: SharedResolver, shape: Shape, nullable: bool) -> Self {
        Self {
            resolver,
            shape,
            nullable,
        }
    }

    pub(crate) fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) async fn resolve(&self, context: ResolutionContext, value: NativeValue) {
        let value = if self.nullable {
            match value {
                NativeValue::Pointer(None) => {
                    context.set_value(Value::Null);
                    return;
                }
                NativeValue::Pointer(Some(inner)) => *inner,
                value => value,
            }
        } else {
            value
        };
        self.resolver.execute(context, value).await
    }
}

/// Resolves a finite sequence, one child slot per element.
///
/// Outside of serial executions every element is dispatched as its own task and the resolver
/// returns without waiting for them. Serial executions resolve the elements one after the
/// other, in index order.
#[derive(Debug)]
pub struct ListResolver {
    /// The sequence sits behind a pointer and may be nil.
    nullable: bool,
    element: ElementResolver,
}

impl ListResolver {
    pub(crate) fn new(nullable: bool, element: ElementResolver) -> Self {
        Self { nullable, element }
    }
}

#[async_trait]
impl Resolver for ListResolver {
    async fn execute(&self, context: ResolutionContext, value: NativeValue) {
        let value = if self.nullable {
            match value {
                NativeValue::Pointer(None) => {
                    context.set_value(Value::Null);
                    return;
                }
                NativeValue::Pointer(Some(inner)) => *inner,
                value => value,
            }
        } else {
            value
        };

        let elements = match value {
            NativeValue::Sequence(elements) => elements,
            other => {
                context.set_error(FieldError::unexpected_value("sequence", other.kind_name()));
                return;
            }
        };

        if elements.is_empty() {
            // an empty list, which is not the same as null
            context.set_value(Value::Array(Vec::new()));
            return;
        }

        let serial = context.is_serial();
        tracing::debug!(
            path = %context.path(),
            count = elements.len(),
            serial,
            "resolving list"
        );

        for (index, element) in elements.into_iter().enumerate() {
            let mut child = context.child(self.element.shape().clone(), true, false);
            child.set_array_index(index);
            if serial {
                self.element.resolve(child, element).await;
            } else {
                let resolver = self.element.clone();
                context.spawn(async move { resolver.resolve(child, element).await });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;
    use crate::context::Execution;
    use crate::json_ext::Path;
    use crate::resolver::ScalarResolver;
    use crate::spec::FieldType;
    use crate::test_support::Recorder;
    use crate::test_support::RecordingResolver;

    fn int_list_resolver(nullable: bool, element_nullable: bool) -> ListResolver {
        ListResolver::new(
            nullable,
            ElementResolver::new(
                Arc::new(ScalarResolver::int()),
                Shape::leaf(FieldType::Int),
                element_nullable,
            ),
        )
    }

    fn ints(values: &[i64]) -> NativeValue {
        NativeValue::from(values.to_vec())
    }

    #[test_log::test(tokio::test)]
    async fn resolves_every_element_at_its_index() {
        let execution = Execution::new(false);
        let context = execution.root(Shape::leaf(FieldType::Int.list()));
        int_list_resolver(false, false)
            .execute(context, ints(&[3, 1, 4, 1, 5]))
            .await;

        let response = execution.finish().await;
        assert_eq!(response.data, json!([3, 1, 4, 1, 5]));
        let mut indices = response.assigned_indices(&Path::empty());
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn nil_pointer_is_null() {
        let execution = Execution::new(false);
        let context = execution.root(Shape::leaf(FieldType::Int.list()));
        int_list_resolver(true, false)
            .execute(context, NativeValue::nil())
            .await;

        let response = execution.finish().await;
        assert_eq!(response.data, Value::Null);
        assert_eq!(response.assigned, vec![Path::empty()]);
    }

    #[tokio::test]
    async fn empty_sequence_is_an_empty_list() {
        let execution = Execution::new(false);
        let context = execution.root(Shape::leaf(FieldType::Int.list()));
        int_list_resolver(true, false)
            .execute(context, NativeValue::some(ints(&[])))
            .await;

        let response = execution.finish().await;
        assert_eq!(response.data, json!([]));
        assert_eq!(response.assigned, vec![Path::empty()]);
    }

    #[tokio::test]
    async fn nil_elements_are_null() {
        let execution = Execution::new(false);
        let context = execution.root(Shape::leaf(FieldType::Int.list()));
        let value = NativeValue::Sequence(vec![
            NativeValue::some(1i64),
            NativeValue::nil(),
            NativeValue::some(3i64),
        ]);
        int_list_resolver(false, true).execute(context, value).await;

        let response = execution.finish().await;
        assert_eq!(response.data, json!([1, null, 3]));
    }

    #[tokio::test]
    async fn unexpected_value_is_a_field_error() {
        let execution = Execution::new(false);
        let context = execution.root_field("list", Shape::leaf(FieldType::Int.list()));
        int_list_resolver(false, false)
            .execute(context, NativeValue::Stream(None))
            .await;

        let response = execution.finish().await;
        assert_eq!(response.data, json!({ "list": null }));
        assert_eq!(
            response.errors[0].message,
            "expected a sequence value, found a stream"
        );
    }

    #[tokio::test]
    async fn completion_order_does_not_change_positions() {
        let recorder = Recorder::default();
        // later elements finish first
        let element = RecordingResolver::new(recorder.clone())
            .with_delay(|index| Duration::from_millis(20 * (4 - index as u64)));
        let list = ListResolver::new(
            false,
            ElementResolver::new(Arc::new(element), Shape::leaf(FieldType::Int), false),
        );

        let execution = Execution::new(false);
        let context = execution.root(Shape::leaf(FieldType::Int.list()));
        list.execute(context, ints(&[0, 1, 2, 3])).await;

        let response = execution.finish().await;
        assert_eq!(response.data, json!([0, 1, 2, 3]));
        assert_eq!(response.assigned_indices(&Path::empty()), vec![3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn serial_execution_resolves_in_order() {
        let recorder = Recorder::default();
        let element = RecordingResolver::new(recorder.clone())
            .with_delay(|index| Duration::from_millis(30 - 10 * index as u64));
        let list = ListResolver::new(
            false,
            ElementResolver::new(Arc::new(element), Shape::leaf(FieldType::Int), false),
        );

        let execution = Execution::new(true);
        let context = execution.root(Shape::leaf(FieldType::Int.list()));
        list.execute(context, ints(&[0, 1, 2])).await;

        // everything already resolved by the time `execute` returns
        assert_eq!(
            recorder.events(),
            vec![
                "start 0", "end 0", "start 1", "end 1", "start 2", "end 2"
            ]
        );
        let response = execution.finish().await;
        assert_eq!(response.data, json!([0, 1, 2]));
        assert_eq!(response.assigned_indices(&Path::empty()), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn failing_elements_do_not_affect_siblings() {
        let recorder = Recorder::default();
        let element = RecordingResolver::new(recorder).failing_on(1);
        let list = ListResolver::new(
            false,
            ElementResolver::new(Arc::new(element), Shape::leaf(FieldType::Int), false),
        );

        let execution = Execution::new(false);
        let context = execution.root(Shape::leaf(FieldType::Int.list()));
        list.execute(context, ints(&[0, 1, 2])).await;

        let response = execution.finish().await;
        assert_eq!(response.data, json!([0, null, 2]));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "element 1 failed");
    }
}
