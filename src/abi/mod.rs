//! Values passed to and returned from intercepted functions.
//!
//! Re-exports the `fnspy-abi` crate so callers only need one dependency.

pub use fnspy_abi::*;
