//! Resolvers recording what they were asked to do, for tests.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json_bytes::json;

use crate::context::ResolutionContext;
use crate::error::FieldError;
use crate::native::NativeValue;
use crate::resolver::Resolver;
use crate::sync::Mutex;

#[derive(Clone, Debug, Default)]
pub(crate) struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub(crate) fn record(&self, event: String) {
        self.events.lock().push(event);
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

/// Resolves integers as themselves, recording when each one starts and ends.
#[derive(Debug)]
pub(crate) struct RecordingResolver {
    recorder: Recorder,
    delay: fn(usize) -> Duration,
    failing_on: Option<i64>,
}

impl RecordingResolver {
    pub(crate) fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            delay: |_| Duration::ZERO,
            failing_on: None,
        }
    }

    /// Sleep for `delay(value)` before writing `value`.
    pub(crate) fn with_delay(mut self, delay: fn(usize) -> Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn failing_on(mut self, value: i64) -> Self {
        self.failing_on = Some(value);
        self
    }
}

#[async_trait]
impl Resolver for RecordingResolver {
    async fn execute(&self, context: ResolutionContext, value: NativeValue) {
        let NativeValue::Int(value) = value else {
            context.set_error(FieldError::unexpected_value("int", value.kind_name()));
            return;
        };
        self.recorder.record(format!("start {value}"));
        let delay = (self.delay)(value as usize);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.recorder.record(format!("end {value}"));

        if self.failing_on == Some(value) {
            context.set_error(FieldError::Resolver(format!("element {value} failed")));
        } else {
            context.set_value(json!(value));
        }
    }
}
