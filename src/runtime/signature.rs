//! Function signatures - the declared parameter and result types of a
//! function value, and the checks that values are assignable to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Mismatch;
use crate::abi::{hash_function, TypeHash, TypeList, Value, ValueType};

/// Ordered parameter and result types of a function value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
}

impl Signature {
    pub fn new(params: Vec<ValueType>, results: Vec<ValueType>) -> Self {
        Self { params, results }
    }

    /// Signature of a Rust function taking tuple `A` and returning tuple `R`.
    pub fn of<A: TypeList, R: TypeList>() -> Self {
        Self::new(A::value_types(), R::value_types())
    }

    /// Check that `args` can be passed to this function.
    pub fn check_args(&self, args: &[Value]) -> Result<(), Mismatch> {
        check_values(&self.params, args)
    }

    /// Check that `results` could have been returned by this function.
    pub fn check_results(&self, results: &[Value]) -> Result<(), Mismatch> {
        check_values(&self.results, results)
    }

    /// The zero value of every result position, in order.
    pub fn zero_results(&self) -> Vec<Value> {
        self.results.iter().map(ValueType::zero_value).collect()
    }

    /// Structural hash of the signature. Record names are ignored.
    pub fn fingerprint(&self) -> TypeHash {
        hash_function(&self.params, &self.results)
    }
}

fn check_values(expected: &[ValueType], values: &[Value]) -> Result<(), Mismatch> {
    if expected.len() != values.len() {
        return Err(Mismatch::Arity {
            expected: expected.len(),
            got: values.len(),
        });
    }

    for (position, (ty, value)) in expected.iter().zip(values).enumerate() {
        if !value.conforms_to(ty) {
            return Err(Mismatch::Type {
                position,
                expected: ty.clone(),
                got: value.infer_type(),
            });
        }
    }

    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[ValueType]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func(")?;
        write_list(f, &self.params)?;
        write!(f, ")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {}", single),
            many => {
                write!(f, " -> (")?;
                write_list(f, many)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Fault;

    fn sample() -> Signature {
        Signature::of::<(String, i32, bool), (String, i32, f64, bool, Result<(), Fault>)>()
    }

    #[test]
    fn display_matches_declaration() {
        assert_eq!(
            sample().to_string(),
            "func(string, s32, bool) -> (string, s32, f64, bool, error)"
        );
        assert_eq!(Signature::of::<(), ()>().to_string(), "func()");
        assert_eq!(Signature::of::<(u8,), (char,)>().to_string(), "func(u8) -> char");
    }

    #[test]
    fn results_arity_is_checked_first() {
        let err = sample()
            .check_results(&[Value::from("mock"), Value::S32(1)])
            .unwrap_err();
        assert_eq!(err, Mismatch::Arity { expected: 5, got: 2 });
    }

    #[test]
    fn results_report_first_bad_position() {
        let err = sample()
            .check_results(&[
                Value::S32(0),
                Value::S32(1),
                Value::F64(2.0),
                Value::Bool(false),
                Value::no_error(),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            Mismatch::Type {
                position: 0,
                expected: ValueType::String,
                got: ValueType::S32
            }
        );
    }

    #[test]
    fn zero_results_follow_result_types() {
        assert_eq!(
            sample().zero_results(),
            vec![
                Value::String(String::new()),
                Value::S32(0),
                Value::F64(0.0),
                Value::Bool(false),
                Value::Error(None),
            ]
        );
    }

    #[test]
    fn fingerprint_ignores_how_the_signature_was_built() {
        let dynamic = Signature::new(
            vec![ValueType::String, ValueType::S32, ValueType::Bool],
            vec![
                ValueType::String,
                ValueType::S32,
                ValueType::F64,
                ValueType::Bool,
                ValueType::Error,
            ],
        );
        assert_eq!(dynamic.fingerprint(), sample().fingerprint());
        assert_ne!(
            Signature::of::<(i32,), ()>().fingerprint(),
            Signature::of::<(i64,), ()>().fingerprint()
        );
    }
}
