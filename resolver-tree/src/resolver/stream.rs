use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::ElementResolver;
use super::Resolver;
use crate::context::ResolutionContext;
use crate::error::FieldError;
use crate::native::NativeStream;
use crate::native::NativeValue;

/// Why a stream stopped being drained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEnd {
    /// The producer closed the stream.
    Exhausted { emitted: usize },
    /// The execution was cancelled.
    Cancelled { emitted: usize },
}

/// Resolves an open-ended stream, one child slot per emitted element.
///
/// `execute` returns immediately: the stream is drained by a background task which dispatches
/// each element as its own task, at the next index, until the stream closes or the execution is
/// cancelled. Elements already dispatched are never aborted.
#[derive(Debug)]
pub struct StreamListResolver {
    element: ElementResolver,
}

impl StreamListResolver {
    pub(crate) fn new(element: ElementResolver) -> Self {
        Self { element }
    }
}

#[async_trait]
impl Resolver for StreamListResolver {
    async fn execute(&self, context: ResolutionContext, value: NativeValue) {
        let stream = match value.into_pointee() {
            Some(NativeValue::Stream(Some(stream))) => stream,
            // a nil stream produces nothing, not even null
            None | Some(NativeValue::Stream(None)) => {
                tracing::trace!(path = %context.path(), "nil stream, nothing to resolve");
                return;
            }
            Some(other) => {
                context.set_error(FieldError::unexpected_value("stream", other.kind_name()));
                return;
            }
        };

        let element = self.element.clone();
        let cancellation = context.cancellation();
        let parent = context.child(context.shape().clone(), false, true);
        context.spawn(async move {
            let end = drain(parent, stream, element, cancellation).await;
            tracing::debug!(?end, "stream drained");
        });
    }
}

/// Drain `stream` into children of `context` until it closes or `cancellation` fires.
///
/// When an element and the cancellation are ready at the same time, cancellation wins.
pub(crate) async fn drain(
    context: ResolutionContext,
    mut stream: NativeStream,
    element: ElementResolver,
    cancellation: CancellationToken,
) -> StreamEnd {
    let mut index = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                return StreamEnd::Cancelled { emitted: index };
            }
            next = stream.next() => match next {
                Some(value) => {
                    let mut child = context.child(element.shape().clone(), true, false);
                    child.set_array_index(index);
                    let element = element.clone();
                    context.spawn(async move { element.resolve(child, value).await });
                    index += 1;
                }
                None => return StreamEnd::Exhausted { emitted: index },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json_bytes::json;

    use super::*;
    use crate::context::Execution;
    use crate::json_ext::Path;
    use crate::json_ext::PathElement;
    use crate::json_ext::Value;
    use crate::resolver::ScalarResolver;
    use crate::spec::FieldType;
    use crate::spec::Shape;
    use crate::test_support::Recorder;
    use crate::test_support::RecordingResolver;

    fn int_stream_resolver() -> StreamListResolver {
        StreamListResolver::new(ElementResolver::new(
            Arc::new(ScalarResolver::int()),
            Shape::leaf(FieldType::Int),
            false,
        ))
    }

    fn list_shape() -> Shape {
        Shape::leaf(FieldType::Int.list())
    }

    #[test_log::test(tokio::test)]
    async fn assigns_sequential_indices() {
        let recorder = Recorder::default();
        // the first element is the slowest
        let element = RecordingResolver::new(recorder.clone())
            .with_delay(|index| Duration::from_millis(20 * (3 - index as u64)));
        let resolver = StreamListResolver::new(ElementResolver::new(
            Arc::new(element),
            Shape::leaf(FieldType::Int),
            false,
        ));

        let execution = Execution::new(false);
        let context = execution.root_field("numbers", list_shape());
        let stream = NativeStream::iter((0..3i64).map(NativeValue::Int).collect::<Vec<_>>());
        resolver.execute(context, stream.into()).await;

        let response = execution.finish().await;
        assert_eq!(response.data, json!({ "numbers": [0, 1, 2] }));
        let numbers = Path(vec![PathElement::Key("numbers".into())]);
        assert_eq!(response.assigned_indices(&numbers), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn nil_stream_assigns_nothing() {
        let execution = Execution::new(false);
        let context = execution.root_field("numbers", list_shape());
        int_stream_resolver()
            .execute(context, NativeValue::Stream(None))
            .await;

        let response = execution.finish().await;
        assert!(response.assigned.is_empty());
        assert_eq!(response.data, Value::Null);
    }

    #[tokio::test]
    async fn closed_stream_without_elements_assigns_nothing() {
        let execution = Execution::new(false);
        let context = execution.root(list_shape());
        int_stream_resolver()
            .execute(context, NativeStream::iter(Vec::new()).into())
            .await;

        let response = execution.finish().await;
        assert!(response.assigned.is_empty());
    }

    #[tokio::test]
    async fn cancellation_stops_draining() {
        let execution = Execution::new(false);
        let context = execution.root(list_shape());
        let (sender, stream) = NativeStream::channel(8);

        let drained = tokio::spawn(drain(
            context,
            stream,
            ElementResolver::new(
                Arc::new(ScalarResolver::int()),
                Shape::leaf(FieldType::Int),
                false,
            ),
            execution.cancellation(),
        ));

        sender.send(NativeValue::Int(0)).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while execution.snapshot().assigned.is_empty() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        execution.cancel();
        // whatever is sent now races the cancellation, which wins
        let _ = sender.send(NativeValue::Int(1)).await;
        let _ = sender.send(NativeValue::Int(2)).await;

        assert_eq!(
            drained.await.unwrap(),
            StreamEnd::Cancelled { emitted: 1 }
        );
        let response = execution.finish().await;
        assert_eq!(response.data, json!([0]));
        assert_eq!(response.assigned_indices(&Path::empty()), vec![0]);
    }

    #[tokio::test]
    async fn exhausted_stream_reports_count() {
        let execution = Execution::new(false);
        let context = execution.root(list_shape());
        let end = drain(
            context,
            NativeStream::iter(vec![NativeValue::Int(4), NativeValue::Int(2)]),
            ElementResolver::new(
                Arc::new(ScalarResolver::int()),
                Shape::leaf(FieldType::Int),
                false,
            ),
            execution.cancellation(),
        )
        .await;
        assert_eq!(end, StreamEnd::Exhausted { emitted: 2 });
        assert_eq!(execution.finish().await.data, json!([4, 2]));
    }

    #[tokio::test]
    async fn finite_values_are_field_errors() {
        let execution = Execution::new(false);
        let context = execution.root(list_shape());
        int_stream_resolver()
            .execute(context, NativeValue::from(vec![1i64]))
            .await;

        let response = execution.finish().await;
        assert_eq!(
            response.errors[0].message,
            "expected a stream value, found a sequence"
        );
    }
}
