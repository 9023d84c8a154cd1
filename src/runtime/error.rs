//! Error types for slots and spies.

use thiserror::Error;

use super::Signature;
use crate::abi::{ConversionError, ValueType};

/// How a list of values failed to match a list of declared types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mismatch {
    /// Wrong number of values.
    #[error("expected {expected} values, got {got}")]
    Arity { expected: usize, got: usize },

    /// A value whose type is not assignable to its declared position.
    #[error("value {position} has type {got}, expected {expected}")]
    Type {
        position: usize,
        expected: ValueType,
        got: ValueType,
    },
}

/// Errors from constructing or querying a [`Spy`](super::Spy).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpyError {
    /// The slot handed to a constructor does not currently hold a function.
    #[error("spy target must hold a function, found {found}")]
    InvalidTarget { found: ValueType },

    /// Explicit fake results do not fit the function's declared results.
    #[error("fake return values do not match {signature}: {mismatch}")]
    FakeReturnMismatch {
        signature: Signature,
        mismatch: Mismatch,
    },

    /// History lookup past the end of the call log.
    #[error("no call at index {index}: {count} calls recorded")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Errors from calling through a [`Slot`](super::Slot).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("slot holds {found}, not a function")]
    NotCallable { found: ValueType },

    #[error("invalid arguments for {signature}: {mismatch}")]
    Arguments {
        signature: Signature,
        mismatch: Mismatch,
    },

    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}
