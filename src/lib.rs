//! fnspy: spy on, fake, and restore function values in tests
//!
//! A function under test often calls through a variable - a callback, a
//! hook, an injected dependency. `fnspy` models that variable as a [`Slot`]
//! and lets a test swap in an instrumented replacement for the duration of
//! a test.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 Spy                      │
//! │   validate ─▶ capture ─▶ install         │
//! │   call log (Mutex)     restore ──┐       │
//! ├──────────────────────────────────┼───────┤
//! │  Slot (RwLock<Binding>)  ◀───────┘       │
//! │  FnValue + Signature                     │
//! ├──────────────────────────────────────────┤
//! │  abi: Value / ValueType / typed tuples   │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Modes
//!
//! - [`Spy::on`] records calls and forwards them to the original.
//! - [`Spy::fake`] records calls and returns zero values.
//! - [`Spy::fake_with`] records calls and returns the given values.
//!
//! ```
//! use fnspy::abi::Fault;
//! use fnspy::{ArgList, Slot, Spy};
//!
//! type Out = (String, i32, f64, bool, Result<(), Fault>);
//!
//! let f = Slot::func(|(_s, _n, _b): (String, i32, bool)| -> Out {
//!     ("original".into(), 12345, 123.45, true, Err(Fault::new("some error")))
//! });
//!
//! let spy = Spy::fake_returning(&f, ("mock", 1, 2.0, false, Err::<(), _>(Fault::new("mock error")))).unwrap();
//! let out: Out = f.invoke(("x", 0, false)).unwrap();
//! assert_eq!(out.0, "mock");
//! assert_eq!(out.4, Err(Fault::new("mock error")));
//! assert_eq!(spy.args_for_call(0), ArgList::of(("x", 0, false)));
//!
//! spy.restore();
//! let out: Out = f.invoke(("x", 0, false)).unwrap();
//! assert_eq!(out.1, 12345);
//! assert_eq!(spy.call_count(), 1);
//! ```

pub mod abi;
pub mod runtime;

pub use runtime::{
    ArgList, Binding, CallError, CallInterceptor, CallList, FnValue, Mismatch, Mode, Signature,
    Slot, Spy, SpyError,
};
