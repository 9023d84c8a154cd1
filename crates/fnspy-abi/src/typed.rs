//! Bridges between Rust types and runtime type descriptors.
//!
//! Arguments and results cross the dynamic boundary as tuples: `(A, B, C)`
//! becomes `vec![a.into(), b.into(), c.into()]` and back. Tuples of up to
//! eight elements are supported.

use crate::{ConversionError, Fault, FromValue, Value, ValueType};

/// A Rust type with a fixed runtime descriptor.
pub trait Typed {
    fn value_type() -> ValueType;
}

/// A tuple whose element types are all [`Typed`].
pub trait TypeList {
    fn value_types() -> Vec<ValueType>;
}

/// A tuple that can be flattened into positional values.
pub trait IntoValues {
    fn into_values(self) -> Vec<Value>;
}

/// A tuple that can be rebuilt from positional values.
pub trait FromValues: Sized {
    fn from_values(values: Vec<Value>) -> Result<Self, ConversionError>;
}

macro_rules! impl_typed {
    ($($rust:ty => $variant:ident;)*) => {
        $(
            impl Typed for $rust {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }
            }
        )*
    };
}

impl_typed! {
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

impl<T: Typed> Typed for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }
}

impl<T: Typed> Typed for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Option(Box::new(T::value_type()))
    }
}

impl Typed for Result<(), Fault> {
    fn value_type() -> ValueType {
        ValueType::Error
    }
}

macro_rules! impl_tuple {
    ($len:expr; $($ty:ident => $var:ident),*) => {
        impl<$($ty: Typed),*> TypeList for ($($ty,)*) {
            fn value_types() -> Vec<ValueType> {
                vec![$($ty::value_type()),*]
            }
        }

        impl<$($ty: Into<Value>),*> IntoValues for ($($ty,)*) {
            fn into_values(self) -> Vec<Value> {
                let ($($var,)*) = self;
                vec![$($var.into()),*]
            }
        }

        impl<$($ty: FromValue),*> FromValues for ($($ty,)*) {
            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn from_values(values: Vec<Value>) -> Result<Self, ConversionError> {
                if values.len() != $len {
                    return Err(ConversionError::ArityMismatch {
                        expected: $len,
                        got: values.len(),
                    });
                }
                let mut index = 0usize;
                let mut iter = values.into_iter();
                $(
                    let $var = match iter.next() {
                        Some(value) => $ty::from_value(value)
                            .map_err(|e| ConversionError::IndexError(index, Box::new(e)))?,
                        None => {
                            return Err(ConversionError::ArityMismatch {
                                expected: $len,
                                got: index,
                            })
                        }
                    };
                    index += 1;
                )*
                Ok(($($var,)*))
            }
        }
    };
}

impl_tuple!(0;);
impl_tuple!(1; A => a);
impl_tuple!(2; A => a, B => b);
impl_tuple!(3; A => a, B => b, C => c);
impl_tuple!(4; A => a, B => b, C => c, D => d);
impl_tuple!(5; A => a, B => b, C => c, D => d, E => e);
impl_tuple!(6; A => a, B => b, C => c, D => d, E => e, F => f);
impl_tuple!(7; A => a, B => b, C => c, D => d, E => e, F => f, G => g);
impl_tuple!(8; A => a, B => b, C => c, D => d, E => e, F => f, G => g, H => h);

#[cfg(test)]
mod tests {
    use super::*;

    type Outputs = (String, i32, f64, bool, Result<(), Fault>);

    #[test]
    fn tuple_types_follow_declaration_order() {
        assert_eq!(
            <Outputs as TypeList>::value_types(),
            vec![
                ValueType::String,
                ValueType::S32,
                ValueType::F64,
                ValueType::Bool,
                ValueType::Error
            ]
        );
        assert!(<() as TypeList>::value_types().is_empty());
    }

    #[test]
    fn tuple_flattens_and_rebuilds() {
        let values = ("mock".to_string(), 1, 2.0, false, Err::<(), Fault>(Fault::new("mock error"))).into_values();
        assert_eq!(values.len(), 5);
        assert_eq!(values[4], Value::fault("mock error"));

        let rebuilt = <Outputs as FromValues>::from_values(values).expect("rebuild");
        assert_eq!(rebuilt.0, "mock");
        assert_eq!(rebuilt.4, Err(Fault::new("mock error")));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = <(String, i32)>::from_values(vec![Value::from("only one")]).unwrap_err();
        assert_eq!(err, ConversionError::ArityMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn wrong_element_reports_its_position() {
        let err = <(String, i32)>::from_values(vec![Value::from("ok"), Value::Bool(true)]).unwrap_err();
        assert!(matches!(err, ConversionError::IndexError(1, _)));
    }

    #[test]
    fn borrowed_str_flattens_to_string() {
        assert_eq!(
            ("test value", 101, true).into_values(),
            vec![Value::String("test value".into()), Value::S32(101), Value::Bool(true)]
        );
    }
}
