//! Runtime values

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ConversionError, Fault, Typed};

/// Runtime type descriptor for parameters and results
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    S8,
    S16,
    S32,
    S64,
    F32,
    F64,
    Char,
    String,
    List(Box<ValueType>),
    Option(Box<ValueType>),
    Tuple(Vec<ValueType>),
    Record {
        name: String,
        fields: Vec<(String, ValueType)>,
    },
    /// Error-shaped slot: holds either a [`Fault`] or "no error"
    Error,
}

impl ValueType {
    /// The value a freshly declared variable of this type would hold.
    pub fn zero_value(&self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(false),
            ValueType::U8 => Value::U8(0),
            ValueType::U16 => Value::U16(0),
            ValueType::U32 => Value::U32(0),
            ValueType::U64 => Value::U64(0),
            ValueType::S8 => Value::S8(0),
            ValueType::S16 => Value::S16(0),
            ValueType::S32 => Value::S32(0),
            ValueType::S64 => Value::S64(0),
            ValueType::F32 => Value::F32(0.0),
            ValueType::F64 => Value::F64(0.0),
            ValueType::Char => Value::Char('\0'),
            ValueType::String => Value::String(String::new()),
            ValueType::List(elem) => Value::List {
                elem_type: (**elem).clone(),
                items: Vec::new(),
            },
            ValueType::Option(inner) => Value::Option {
                inner_type: (**inner).clone(),
                value: None,
            },
            ValueType::Tuple(items) => Value::Tuple(items.iter().map(ValueType::zero_value).collect()),
            ValueType::Record { name, fields } => Value::Record {
                type_name: name.clone(),
                fields: fields
                    .iter()
                    .map(|(field, ty)| (field.clone(), ty.zero_value()))
                    .collect(),
            },
            ValueType::Error => Value::Error(None),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::U8 => write!(f, "u8"),
            ValueType::U16 => write!(f, "u16"),
            ValueType::U32 => write!(f, "u32"),
            ValueType::U64 => write!(f, "u64"),
            ValueType::S8 => write!(f, "s8"),
            ValueType::S16 => write!(f, "s16"),
            ValueType::S32 => write!(f, "s32"),
            ValueType::S64 => write!(f, "s64"),
            ValueType::F32 => write!(f, "f32"),
            ValueType::F64 => write!(f, "f64"),
            ValueType::Char => write!(f, "char"),
            ValueType::String => write!(f, "string"),
            ValueType::List(elem) => write!(f, "list<{}>", elem),
            ValueType::Option(inner) => write!(f, "option<{}>", inner),
            ValueType::Tuple(items) => {
                write!(f, "tuple<")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ">")
            }
            ValueType::Record { name, .. } => write!(f, "{}", name),
            ValueType::Error => write!(f, "error"),
        }
    }
}

/// A runtime argument or result value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    S8(i8),
    S16(i16),
    S32(i32),
    S64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),

    // Compound types carry their element types so empty ones stay typed
    List { elem_type: ValueType, items: Vec<Value> },
    Option { inner_type: ValueType, value: Option<Box<Value>> },
    Tuple(Vec<Value>),
    Record { type_name: String, fields: Vec<(String, Value)> },

    Error(Option<Fault>),
}

impl Value {
    /// An error-slot value holding a fault with the given message.
    pub fn fault(message: impl Into<String>) -> Self {
        Value::Error(Some(Fault::new(message)))
    }

    /// The "no error" value for an error slot.
    pub fn no_error() -> Self {
        Value::Error(None)
    }

    /// Infer the ValueType from this Value
    pub fn infer_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::U8(_) => ValueType::U8,
            Value::U16(_) => ValueType::U16,
            Value::U32(_) => ValueType::U32,
            Value::U64(_) => ValueType::U64,
            Value::S8(_) => ValueType::S8,
            Value::S16(_) => ValueType::S16,
            Value::S32(_) => ValueType::S32,
            Value::S64(_) => ValueType::S64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::Char(_) => ValueType::Char,
            Value::String(_) => ValueType::String,
            Value::List { elem_type, .. } => ValueType::List(Box::new(elem_type.clone())),
            Value::Option { inner_type, .. } => ValueType::Option(Box::new(inner_type.clone())),
            Value::Tuple(items) => ValueType::Tuple(items.iter().map(|v| v.infer_type()).collect()),
            Value::Record { type_name, fields } => ValueType::Record {
                name: type_name.clone(),
                fields: fields
                    .iter()
                    .map(|(field, value)| (field.clone(), value.infer_type()))
                    .collect(),
            },
            Value::Error(_) => ValueType::Error,
        }
    }

    /// Whether this value may be stored in a slot declared as `ty`.
    ///
    /// Compound values are checked all the way down: a list must declare
    /// the expected element type and every item must conform to it.
    pub fn conforms_to(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (Value::List { elem_type, items }, ValueType::List(expected)) => {
                elem_type == &**expected && items.iter().all(|item| item.conforms_to(expected))
            }
            (Value::Option { inner_type, value }, ValueType::Option(expected)) => {
                inner_type == &**expected
                    && value.as_deref().map_or(true, |inner| inner.conforms_to(expected))
            }
            (Value::Tuple(items), ValueType::Tuple(types)) => {
                items.len() == types.len()
                    && items.iter().zip(types).all(|(item, ty)| item.conforms_to(ty))
            }
            (
                Value::Record { type_name, fields },
                ValueType::Record {
                    name,
                    fields: expected,
                },
            ) => {
                type_name == name
                    && fields.len() == expected.len()
                    && fields
                        .iter()
                        .zip(expected)
                        .all(|((field, value), (want, ty))| field == want && value.conforms_to(ty))
            }
            (Value::Error(_), ValueType::Error) => true,
            (value, ty) => !ty.is_compound() && value.infer_type() == *ty,
        }
    }
}

impl ValueType {
    fn is_compound(&self) -> bool {
        matches!(
            self,
            ValueType::List(_)
                | ValueType::Option(_)
                | ValueType::Tuple(_)
                | ValueType::Record { .. }
                | ValueType::Error
        )
    }
}

// ============================================================================
// Primitive conversions
// ============================================================================

macro_rules! impl_primitive_conversions {
    ($($rust:ty => $variant:ident;)*) => {
        $(
            impl From<$rust> for Value {
                fn from(v: $rust) -> Self {
                    Value::$variant(v)
                }
            }

            impl TryFrom<Value> for $rust {
                type Error = ConversionError;
                fn try_from(v: Value) -> Result<Self, Self::Error> {
                    match v {
                        Value::$variant(x) => Ok(x),
                        other => Err(ConversionError::TypeMismatch {
                            expected: ValueType::$variant.to_string(),
                            got: other.infer_type().to_string(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_primitive_conversions! {
    bool => Bool;
    u8 => U8;
    u16 => U16;
    u32 => U32;
    u64 => U64;
    i8 => S8;
    i16 => S16;
    i32 => S32;
    i64 => S64;
    f32 => F32;
    f64 => F64;
    char => Char;
    String => String;
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value> + Typed> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List {
            elem_type: T::value_type(),
            items: v.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T: Into<Value> + Typed> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::Option {
            inner_type: T::value_type(),
            value: v.map(|x| Box::new(x.into())),
        }
    }
}

impl From<Fault> for Value {
    fn from(fault: Fault) -> Self {
        Value::Error(Some(fault))
    }
}

/// `Ok(())` is "no error", `Err(fault)` is a fault.
impl From<Result<(), Fault>> for Value {
    fn from(v: Result<(), Fault>) -> Self {
        Value::Error(v.err())
    }
}

impl TryFrom<Value> for Result<(), Fault> {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Error(None) => Ok(Ok(())),
            Value::Error(Some(fault)) => Ok(Err(fault)),
            other => Err(ConversionError::TypeMismatch {
                expected: ValueType::Error.to_string(),
                got: other.infer_type().to_string(),
            }),
        }
    }
}

impl<T: TryFrom<Value, Error = ConversionError>> TryFrom<Value> for Vec<T> {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::List { items, .. } => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    T::try_from(item).map_err(|e| ConversionError::IndexError(i, Box::new(e)))
                })
                .collect(),
            other => Err(ConversionError::ExpectedList(other.infer_type().to_string())),
        }
    }
}

// ============================================================================
// FromValue trait - avoids coherence issues with TryFrom for Option<T>
// ============================================================================

/// Trait for converting from a Value.
///
/// This exists to sidestep the blanket `impl<T, U> TryFrom<U> for T where
/// U: Into<T>` when converting into generic types like `Option<T>`.
pub trait FromValue: Sized {
    fn from_value(v: Value) -> Result<Self, ConversionError>;
}

impl<T: TryFrom<Value, Error = ConversionError>> FromValue for T {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        T::try_from(v)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        match v {
            Value::Option { value: None, .. } => Ok(None),
            Value::Option {
                value: Some(inner), ..
            } => Ok(Some(T::from_value(*inner)?)),
            other => Err(ConversionError::ExpectedOption(other.infer_type().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_per_type() {
        assert_eq!(ValueType::String.zero_value(), Value::String(String::new()));
        assert_eq!(ValueType::S32.zero_value(), Value::S32(0));
        assert_eq!(ValueType::F64.zero_value(), Value::F64(0.0));
        assert_eq!(ValueType::Bool.zero_value(), Value::Bool(false));
        assert_eq!(ValueType::Error.zero_value(), Value::Error(None));
        assert_eq!(
            ValueType::Option(Box::new(ValueType::U8)).zero_value(),
            Value::Option {
                inner_type: ValueType::U8,
                value: None
            }
        );
    }

    #[test]
    fn zero_record_has_zeroed_fields() {
        let point = ValueType::Record {
            name: "point".to_string(),
            fields: vec![("x".to_string(), ValueType::S64), ("y".to_string(), ValueType::S64)],
        };
        let zero = point.zero_value();
        assert!(zero.conforms_to(&point));
        assert_eq!(zero.infer_type(), point);
    }

    #[test]
    fn error_slot_accepts_fault_and_no_error() {
        assert!(Value::fault("boom").conforms_to(&ValueType::Error));
        assert!(Value::no_error().conforms_to(&ValueType::Error));
        assert!(!Value::String("boom".into()).conforms_to(&ValueType::Error));
    }

    #[test]
    fn primitives_do_not_widen() {
        assert!(Value::S32(1).conforms_to(&ValueType::S32));
        assert!(!Value::S32(1).conforms_to(&ValueType::S64));
        assert!(!Value::F32(1.0).conforms_to(&ValueType::F64));
    }

    #[test]
    fn list_items_are_checked() {
        let list_ty = ValueType::List(Box::new(ValueType::String));
        assert!(Value::from(vec!["a", "b"].into_iter().map(String::from).collect::<Vec<_>>())
            .conforms_to(&list_ty));

        let mislabelled = Value::List {
            elem_type: ValueType::String,
            items: vec![Value::S32(3)],
        };
        assert!(!mislabelled.conforms_to(&list_ty));
    }

    #[test]
    fn empty_vec_keeps_element_type() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            Value::from(empty).infer_type(),
            ValueType::List(Box::new(ValueType::String))
        );
    }

    #[test]
    fn result_unit_fault_roundtrips_through_error_slot() {
        let fault = Fault::new("mock error");
        let value = Value::from(Err::<(), Fault>(fault.clone()));
        assert_eq!(value, Value::Error(Some(fault.clone())));
        assert_eq!(Result::<(), Fault>::try_from(value), Ok(Err(fault)));
        assert_eq!(Result::<(), Fault>::try_from(Value::no_error()), Ok(Ok(())));
    }

    #[test]
    fn mismatched_conversion_names_both_types() {
        let err = i32::try_from(Value::String("x".into())).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "s32".to_string(),
                got: "string".to_string()
            }
        );
    }

    #[test]
    fn display_uses_wit_names() {
        assert_eq!(
            ValueType::List(Box::new(ValueType::Option(Box::new(ValueType::U8)))).to_string(),
            "list<option<u8>>"
        );
        assert_eq!(
            ValueType::Tuple(vec![ValueType::S32, ValueType::Error]).to_string(),
            "tuple<s32, error>"
        );
    }
}
