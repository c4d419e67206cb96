use async_trait::async_trait;

use super::Resolver;
use super::SharedResolver;
use crate::context::ResolutionContext;
use crate::error::FieldError;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::native::NativeValue;
use crate::spec::Shape;

#[derive(Debug)]
enum FieldSource {
    Typename,
    Native {
        name: String,
        resolver: SharedResolver,
        /// Another selection reads the same native field later on.
        read_again: bool,
    },
}

#[derive(Debug)]
pub(crate) struct FieldResolver {
    response_key: String,
    shape: Shape,
    source: FieldSource,
}

impl FieldResolver {
    pub(crate) fn typename(response_key: String, shape: Shape) -> Self {
        Self {
            response_key,
            shape,
            source: FieldSource::Typename,
        }
    }

    pub(crate) fn native(
        response_key: String,
        shape: Shape,
        name: String,
        resolver: SharedResolver,
    ) -> Self {
        Self {
            response_key,
            shape,
            source: FieldSource::Native {
                name,
                resolver,
                read_again: false,
            },
        }
    }
}

/// Resolves the selections made on a native object, one field after the other.
#[derive(Debug)]
pub struct ObjectResolver {
    type_name: String,
    fields: Vec<FieldResolver>,
}

impl ObjectResolver {
    pub(crate) fn new(type_name: String, mut fields: Vec<FieldResolver>) -> Self {
        for index in 0..fields.len() {
            let (current, later) = fields.split_at_mut(index + 1);
            if let FieldSource::Native {
                name, read_again, ..
            } = &mut current[index].source
            {
                let name = name.as_str();
                *read_again = later.iter().any(|field| {
                    matches!(&field.source, FieldSource::Native { name: other, .. } if other.as_str() == name)
                });
            }
        }
        Self { type_name, fields }
    }
}

fn take_field(
    fields: &mut [(String, NativeValue)],
    name: &str,
    read_again: bool,
) -> Result<NativeValue, FieldError> {
    let Some((_, value)) = fields.iter_mut().find(|(field, _)| field == name) else {
        return Ok(NativeValue::nil());
    };
    if read_again {
        try_clone(value).ok_or_else(|| {
            FieldError::Resolver(format!("field '{name}' holds a stream and is selected more than once"))
        })
    } else {
        Ok(std::mem::replace(value, NativeValue::nil()))
    }
}

fn try_clone(value: &NativeValue) -> Option<NativeValue> {
    Some(match value {
        NativeValue::Bool(b) => NativeValue::Bool(*b),
        NativeValue::Int(i) => NativeValue::Int(*i),
        NativeValue::Float(f) => NativeValue::Float(*f),
        NativeValue::String(s) => NativeValue::String(s.clone()),
        NativeValue::Object(fields) => NativeValue::Object(
            fields
                .iter()
                .map(|(name, value)| Some((name.clone(), try_clone(value)?)))
                .collect::<Option<_>>()?,
        ),
        NativeValue::Pointer(None) => NativeValue::Pointer(None),
        NativeValue::Pointer(Some(inner)) => NativeValue::Pointer(Some(Box::new(try_clone(inner)?))),
        NativeValue::Sequence(values) => {
            NativeValue::Sequence(values.iter().map(try_clone).collect::<Option<_>>()?)
        }
        NativeValue::Stream(None) => NativeValue::Stream(None),
        NativeValue::Stream(Some(_)) => return None,
    })
}

#[async_trait]
impl Resolver for ObjectResolver {
    async fn execute(&self, context: ResolutionContext, value: NativeValue) {
        let mut native_fields = match value.into_pointee() {
            None => {
                context.set_value(Value::Null);
                return;
            }
            Some(NativeValue::Object(fields)) => fields,
            Some(other) => {
                context.set_error(FieldError::unexpected_value("object", other.kind_name()));
                return;
            }
        };

        let children: Vec<ResolutionContext> = self
            .fields
            .iter()
            .map(|field| context.field(&field.response_key, field.shape.clone()))
            .collect();
        context.set_value(Value::Object(Object::new()));

        for (field, child) in self.fields.iter().zip(children) {
            match &field.source {
                FieldSource::Typename => child.set_value(self.type_name.clone().into()),
                FieldSource::Native {
                    name,
                    resolver,
                    read_again,
                } => match take_field(&mut native_fields, name, *read_again) {
                    Ok(value) => resolver.execute(child, value).await,
                    Err(error) => child.set_error(error),
                },
            }
        }
    }
}
