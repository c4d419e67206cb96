//! Execution state and the per-field resolution contexts handed to resolvers.

use std::future::Future;
use std::sync::Arc;

use derivative::Derivative;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::Error;
use crate::error::FieldError;
use crate::json_ext::Path;
use crate::json_ext::PathElement;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::response::Response;
use crate::spawn::TaskSpawner;
use crate::spawn::TokioSpawner;
use crate::spec::Shape;
use crate::sync::Mutex;

/// Where resolved values end up: the response data tree plus the errors raised on the way.
#[derive(Debug, Default)]
struct OutputSink {
    data: Value,
    errors: Vec<Error>,
    assigned: Vec<Path>,
}

impl OutputSink {
    fn assign(&mut self, path: Path, value: Value) {
        self.data.insert_at_path(&path, value);
        self.assigned.push(path);
    }
}

/// State shared by every context of one execution.
#[derive(Derivative)]
#[derivative(Debug)]
struct ExecutionState {
    #[derivative(Debug = "ignore")]
    output: Mutex<OutputSink>,
    cancellation: CancellationToken,
    serial: bool,
    spawner: Arc<dyn TaskSpawner>,
}

/// One execution of a resolver tree against a root value.
///
/// The execution owns the output, the cancellation signal and the spawner. Resolvers only see
/// [`ResolutionContext`]s derived from it.
#[derive(Debug, Clone)]
pub struct Execution {
    state: Arc<ExecutionState>,
}

impl Execution {
    /// Create an execution spawning on the current tokio runtime.
    ///
    /// `serial` is true for executions rooted at a write-type operation.
    pub fn new(serial: bool) -> Self {
        Self::with_spawner(serial, Arc::new(TokioSpawner::new()))
    }

    pub fn with_spawner(serial: bool, spawner: Arc<dyn TaskSpawner>) -> Self {
        Self {
            state: Arc::new(ExecutionState {
                output: Mutex::new(OutputSink::default()),
                cancellation: CancellationToken::new(),
                serial,
                spawner,
            }),
        }
    }

    pub fn is_serial(&self) -> bool {
        self.state.serial
    }

    /// The context owning the root slot of the response.
    pub fn root(&self, shape: Shape) -> ResolutionContext {
        ResolutionContext {
            shape,
            path: Path::empty(),
            array_position: false,
            stream_position: false,
            state: self.state.clone(),
        }
    }

    /// The context owning the `response_key` slot of a root object.
    pub fn root_field(&self, response_key: &str, shape: Shape) -> ResolutionContext {
        ResolutionContext {
            shape,
            path: Path(vec![PathElement::Key(response_key.to_string())]),
            array_position: false,
            stream_position: false,
            state: self.state.clone(),
        }
    }

    /// Stop starting new work. Work already dispatched runs to completion.
    pub fn cancel(&self) {
        self.state.cancellation.cancel();
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.state.cancellation.clone()
    }

    /// Wait for every dispatched task and collect the response.
    pub async fn finish(self) -> Response {
        self.state.spawner.close();
        self.state.spawner.wait().await;
        self.snapshot()
    }

    /// The response as it stands, without waiting for in-flight tasks.
    pub fn snapshot(&self) -> Response {
        let output = self.state.output.lock();
        Response {
            data: output.data.clone(),
            errors: output.errors.clone(),
            assigned: output.assigned.clone(),
        }
    }
}

/// The handle a resolver gets for one field occurrence.
///
/// A context owns exactly one output slot. Writing to it consumes the context, so a slot is
/// written at most once.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ResolutionContext {
    shape: Shape,
    path: Path,
    array_position: bool,
    stream_position: bool,
    #[derivative(Debug = "ignore")]
    state: Arc<ExecutionState>,
}

impl ResolutionContext {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the root operation forbids concurrent fan-out.
    pub fn is_serial(&self) -> bool {
        self.state.serial
    }

    pub fn is_array_position(&self) -> bool {
        self.array_position
    }

    pub fn is_stream_position(&self) -> bool {
        self.stream_position
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.state.cancellation.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancellation.is_cancelled()
    }

    /// Create a child context for `shape` below this one.
    ///
    /// Array positions get their slot through [`ResolutionContext::set_array_index`].
    pub fn child(&self, shape: Shape, array_position: bool, stream_position: bool) -> Self {
        Self {
            shape,
            path: self.path.clone(),
            array_position,
            stream_position,
            state: self.state.clone(),
        }
    }

    /// Address this array position at `index` of the parent's list.
    pub fn set_array_index(&mut self, index: usize) {
        if self.array_position {
            self.path.push(PathElement::Index(index));
        } else {
            tracing::warn!(path = %self.path, index, "array index set on a non-array position");
        }
    }

    /// Create the context owning field `response_key` of the object in this slot.
    pub fn field(&self, response_key: &str, shape: Shape) -> Self {
        Self {
            shape,
            path: self.path.join(PathElement::Key(response_key.to_string())),
            array_position: false,
            stream_position: false,
            state: self.state.clone(),
        }
    }

    /// Write the resolved value into this context's slot.
    pub fn set_value(self, value: Value) {
        tracing::trace!(path = %self.path, "slot assigned");
        self.state.output.lock().assign(self.path, value);
    }

    /// Report a failure for this slot. The slot is set to null.
    pub fn set_error(self, error: FieldError) {
        tracing::debug!(path = %self.path, %error, "field resolution failed");
        let mut output = self.state.output.lock();
        output.errors.push(error.to_graphql_error(self.path.clone()));
        output.assign(self.path, Value::Null);
    }

    /// Dispatch `task` as an independent unit of work. The caller does not wait for it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state.spawner.spawn(Box::pin(task.in_current_span()));
    }
}
