use std::fmt;

use futures::stream::BoxStream;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Sending half of a channel-backed [`NativeStream`].
pub type StreamSender = mpsc::Sender<NativeValue>;

/// A runtime value held by a data source.
///
/// Resolvers take values by ownership and never hand them back, so a value is consumed by the
/// resolution it is passed to.
#[derive(Debug)]
pub enum NativeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Object(Vec<(String, NativeValue)>),
    /// `None` is a nil pointer.
    Pointer(Option<Box<NativeValue>>),
    Sequence(Vec<NativeValue>),
    /// `None` is a nil stream handle.
    Stream(Option<NativeStream>),
}

impl NativeValue {
    pub fn some(value: impl Into<NativeValue>) -> Self {
        NativeValue::Pointer(Some(Box::new(value.into())))
    }

    pub fn nil() -> Self {
        NativeValue::Pointer(None)
    }

    pub fn object<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<NativeValue>,
    {
        NativeValue::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    pub fn is_nil(&self) -> bool {
        matches!(
            self,
            NativeValue::Pointer(None) | NativeValue::Stream(None)
        )
    }

    /// Follow every pointer level, `None` when a nil pointer is found on the way.
    pub fn into_pointee(self) -> Option<NativeValue> {
        match self {
            NativeValue::Pointer(Some(inner)) => inner.into_pointee(),
            NativeValue::Pointer(None) => None,
            value => Some(value),
        }
    }

    /// Name of the value's category, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NativeValue::Bool(_) => "bool",
            NativeValue::Int(_) => "int",
            NativeValue::Float(_) => "float",
            NativeValue::String(_) => "string",
            NativeValue::Object(_) => "object",
            NativeValue::Pointer(_) => "pointer",
            NativeValue::Sequence(_) => "sequence",
            NativeValue::Stream(_) => "stream",
        }
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        NativeValue::Bool(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        NativeValue::Int(value)
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        NativeValue::Float(value)
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        NativeValue::String(value.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        NativeValue::String(value)
    }
}

impl<T> From<Vec<T>> for NativeValue
where
    T: Into<NativeValue>,
{
    fn from(values: Vec<T>) -> Self {
        NativeValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl From<NativeStream> for NativeValue {
    fn from(stream: NativeStream) -> Self {
        NativeValue::Stream(Some(stream))
    }
}

/// The receiving end of an open-ended sequence of native values.
///
/// The stream ends when its producer goes away.
pub struct NativeStream {
    inner: BoxStream<'static, NativeValue>,
}

impl NativeStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = NativeValue> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// A stream fed through a bounded channel.
    pub fn channel(capacity: usize) -> (StreamSender, NativeStream) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, NativeStream::new(ReceiverStream::new(receiver)))
    }

    /// A stream over already known values, closing after the last one.
    pub fn iter<I>(values: I) -> Self
    where
        I: IntoIterator<Item = NativeValue>,
        I::IntoIter: Send + 'static,
    {
        NativeStream::new(futures::stream::iter(values))
    }

    /// Wait for the next element, `None` once the stream is closed.
    pub async fn next(&mut self) -> Option<NativeValue> {
        self.inner.next().await
    }
}

impl fmt::Debug for NativeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_pointee_follows_pointers() {
        let value = NativeValue::some(NativeValue::some(3i64));
        assert!(matches!(value.into_pointee(), Some(NativeValue::Int(3))));
        assert!(NativeValue::some(NativeValue::nil()).into_pointee().is_none());
        assert!(matches!(
            NativeValue::from("a").into_pointee(),
            Some(NativeValue::String(s)) if s == "a"
        ));
    }

    #[test]
    fn nil_values() {
        assert!(NativeValue::nil().is_nil());
        assert!(NativeValue::Stream(None).is_nil());
        assert!(!NativeValue::Sequence(Vec::new()).is_nil());
    }

    #[tokio::test]
    async fn channel_stream_closes_with_its_sender() {
        let (sender, mut stream) = NativeStream::channel(4);
        sender.send(NativeValue::Int(1)).await.unwrap();
        drop(sender);
        assert!(matches!(stream.next().await, Some(NativeValue::Int(1))));
        assert!(stream.next().await.is_none());
    }
}
