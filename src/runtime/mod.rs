//! Runtime: slots, function values and the spies that intercept them.
//!
//! - [`Slot`] - a shared variable holding a function (or other) value
//! - [`FnValue`] - a callable with a runtime [`Signature`]
//! - [`CallInterceptor`] - hook that wraps a function value
//! - [`Spy`] - records calls through a slot and can fake its results

mod error;
pub mod interceptor;
mod signature;
mod slot;
mod spy;

pub use error::{CallError, Mismatch, SpyError};
pub use interceptor::{intercept, CallInterceptor};
pub use signature::Signature;
pub use slot::{Binding, FnValue, Slot};
pub use spy::{ArgList, CallList, Mode, Spy};
