//! fnspy-abi: runtime values and type descriptors
//!
//! Function values intercepted by `fnspy` have signatures that are only
//! known at runtime, so arguments and results travel as [`Value`]s and are
//! described by [`ValueType`]s. This crate holds that model together with
//! the conversions between Rust types and values:
//!
//! ```text
//!   Rust tuple ──IntoValues──▶ Vec<Value> ──FromValues──▶ Rust tuple
//!        │                         │
//!     TypeList                 infer_type / conforms_to
//!        ▼                         ▼
//!   Vec<ValueType>  ◀────────  ValueType
//! ```
//!
//! Types can also be hashed structurally (see [`hash`]), which gives a
//! cheap identity for whole function signatures.

pub mod hash;
mod typed;
mod value;

pub use hash::{hash_function, hash_type, TypeHash, TypeHasher};
pub use typed::{FromValues, IntoValues, TypeList, Typed};
pub use value::{FromValue, Value, ValueType};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting between [`Value`]s and Rust types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("expected {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("at index {0}: {1}")]
    IndexError(usize, Box<ConversionError>),

    #[error("expected list, got {0}")]
    ExpectedList(String),

    #[error("expected option, got {0}")]
    ExpectedOption(String),

    #[error("expected tuple, got {0}")]
    ExpectedTuple(String),
}

/// An error value that can be returned by an intercepted function.
///
/// Positions typed [`ValueType::Error`] hold `Option<Fault>`: `None` is the
/// "no error" value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[error("{message}")]
pub struct Fault {
    message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Fault::new(message)
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Fault::new(message)
    }
}
