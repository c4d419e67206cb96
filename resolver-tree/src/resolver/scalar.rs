use async_trait::async_trait;

use super::Resolver;
use crate::context::ResolutionContext;
use crate::error::FieldError;
use crate::json_ext::Value;
use crate::native::NativeValue;
use crate::native::ScalarKind;
use crate::spec::FieldType;

/// How a scalar is written in the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScalarOutput {
    Boolean,
    Int,
    Float,
    String,
    Id,
    /// Custom scalars are written as they are.
    Custom,
}

/// Resolves native scalars, following pointers and writing null for nil ones.
#[derive(Clone, Debug)]
pub struct ScalarResolver {
    native: ScalarKind,
    output: ScalarOutput,
}

impl ScalarResolver {
    /// The resolver writing `native` scalars as `field_type`, if the two are compatible.
    pub fn for_field_type(native: ScalarKind, field_type: &FieldType) -> Option<Self> {
        let output = match (field_type.nullable(), native) {
            (FieldType::Boolean, ScalarKind::Bool) => ScalarOutput::Boolean,
            (FieldType::Int, ScalarKind::Int) => ScalarOutput::Int,
            (FieldType::Float, ScalarKind::Float | ScalarKind::Int) => ScalarOutput::Float,
            (FieldType::String, ScalarKind::String) => ScalarOutput::String,
            (FieldType::Id, ScalarKind::String | ScalarKind::Int) => ScalarOutput::Id,
            (FieldType::Named(_), _) => ScalarOutput::Custom,
            _ => return None,
        };
        Some(Self { native, output })
    }

    pub fn int() -> Self {
        Self {
            native: ScalarKind::Int,
            output: ScalarOutput::Int,
        }
    }

    pub fn string() -> Self {
        Self {
            native: ScalarKind::String,
            output: ScalarOutput::String,
        }
    }

    fn to_value(&self, value: NativeValue) -> Result<Value, FieldError> {
        match (self.output, value) {
            (ScalarOutput::Boolean | ScalarOutput::Custom, NativeValue::Bool(b)) => Ok(b.into()),
            (ScalarOutput::Int | ScalarOutput::Custom, NativeValue::Int(i)) => Ok(i.into()),
            (ScalarOutput::Float, NativeValue::Int(i)) => float(i as f64),
            (ScalarOutput::Float | ScalarOutput::Custom, NativeValue::Float(f)) => float(f),
            (
                ScalarOutput::String | ScalarOutput::Id | ScalarOutput::Custom,
                NativeValue::String(s),
            ) => Ok(s.into()),
            (ScalarOutput::Id, NativeValue::Int(i)) => Ok(i.to_string().into()),
            (_, other) => Err(FieldError::unexpected_value(
                &self.native.to_string(),
                other.kind_name(),
            )),
        }
    }
}

fn float(value: f64) -> Result<Value, FieldError> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| FieldError::InvalidFloat {
            value: value.to_string(),
        })
}

#[async_trait]
impl Resolver for ScalarResolver {
    async fn execute(&self, context: ResolutionContext, value: NativeValue) {
        match value.into_pointee() {
            None => context.set_value(Value::Null),
            Some(value) => match self.to_value(value) {
                Ok(value) => context.set_value(value),
                Err(error) => context.set_error(error),
            },
        }
    }
}
