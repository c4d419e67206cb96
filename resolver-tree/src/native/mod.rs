//! Descriptions of the native data a resolver tree maps onto requested shapes.
//!
//! A [`NativeType`] is classified once, when the tree is built, and each runtime
//! [`NativeValue`] is expected to have that type.

mod value;

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
pub use value::NativeStream;
pub use value::NativeValue;
pub use value::StreamSender;

/// Built-in scalar kinds of native data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Int => write!(f, "i64"),
            ScalarKind::Float => write!(f, "f64"),
            ScalarKind::String => write!(f, "String"),
        }
    }
}

/// Which ends of a stream are available to the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamDirection {
    /// Receive only.
    Receive,
    /// Send only.
    Send,
    /// Both send and receive.
    Both,
}

impl fmt::Display for StreamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamDirection::Receive => write!(f, "receive-only stream"),
            StreamDirection::Send => write!(f, "send-only stream"),
            StreamDirection::Both => write!(f, "bidirectional stream"),
        }
    }
}

/// A native object type: a named record of fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    pub fields: Vec<(String, NativeType)>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: NativeType) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    pub fn field(&self, name: &str) -> Option<&NativeType> {
        self.fields
            .iter()
            .find_map(|(field, ty)| (field == name).then_some(ty))
    }
}

/// The type of native data held by a data source.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NativeType {
    Scalar(ScalarKind),
    Object(ObjectType),
    /// A nullable indirection to a value of the inner type.
    Pointer(Box<NativeType>),
    /// A finite, indexable collection.
    Sequence(Box<NativeType>),
    /// An open-ended stream of elements.
    Stream {
        direction: StreamDirection,
        element: Box<NativeType>,
    },
}

/// The structural category of a [`NativeType`], as far as list building is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeKind<'a> {
    Pointer(&'a NativeType),
    Sequence(&'a NativeType),
    Stream(StreamDirection, &'a NativeType),
    Other,
}

impl NativeType {
    pub fn pointer(self) -> Self {
        NativeType::Pointer(Box::new(self))
    }

    pub fn sequence(self) -> Self {
        NativeType::Sequence(Box::new(self))
    }

    pub fn receiver(self) -> Self {
        self.stream(StreamDirection::Receive)
    }

    pub fn stream(self, direction: StreamDirection) -> Self {
        NativeType::Stream {
            direction,
            element: Box::new(self),
        }
    }

    /// Classify the type by its outermost constructor, exposing the wrapped type.
    pub fn classify(&self) -> NativeKind<'_> {
        match self {
            NativeType::Pointer(inner) => NativeKind::Pointer(inner),
            NativeType::Sequence(element) => NativeKind::Sequence(element),
            NativeType::Stream { direction, element } => NativeKind::Stream(*direction, element),
            NativeType::Scalar(_) | NativeType::Object(_) => NativeKind::Other,
        }
    }

    /// Strip one pointer level, if any.
    pub fn pointee(&self) -> (&NativeType, bool) {
        match self {
            NativeType::Pointer(inner) => (inner, true),
            ty => (ty, false),
        }
    }

    /// Strip every pointer level.
    pub fn deref_all(&self) -> &NativeType {
        match self {
            NativeType::Pointer(inner) => inner.deref_all(),
            ty => ty,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Scalar(kind) => write!(f, "{kind}"),
            NativeType::Object(object) => write!(f, "{}", object.name),
            NativeType::Pointer(inner) => write!(f, "*{inner}"),
            NativeType::Sequence(element) => write!(f, "[{element}]"),
            NativeType::Stream { direction, element } => match direction {
                StreamDirection::Receive => write!(f, "Receiver<{element}>"),
                StreamDirection::Send => write!(f, "Sender<{element}>"),
                StreamDirection::Both => write!(f, "Channel<{element}>"),
            },
        }
    }
}
