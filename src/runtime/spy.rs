//! Spies: record every call made through a slot, optionally fake the
//! results, and put the original function back afterwards.
//!
//! # Example
//!
//! ```
//! use fnspy::{ArgList, Slot, Spy};
//!
//! let greet = Slot::func(|(name,): (String,)| (format!("hello {name}"),));
//! let spy = Spy::on(&greet).unwrap();
//!
//! let (out,): (String,) = greet.invoke(("world",)).unwrap();
//! assert_eq!(out, "hello world");
//! assert_eq!(spy.call_count(), 1);
//! assert_eq!(spy.args_for_call(0), ArgList::of(("world",)));
//!
//! spy.restore();
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::interceptor::{intercept, CallInterceptor};
use super::{Binding, FnValue, Signature, Slot, SpyError};
use crate::abi::{ConversionError, FromValues, IntoValues, Value};

/// Arguments of one recorded call, in parameter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgList(Vec<Value>);

/// Every recorded call, oldest first.
pub type CallList = Vec<ArgList>;

impl ArgList {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Build from a Rust tuple, e.g. `ArgList::of(("test value", 101, true))`.
    pub fn of<T: IntoValues>(args: T) -> Self {
        Self(args.into_values())
    }

    /// Convert back into a Rust tuple.
    pub fn decode<T: FromValues>(&self) -> Result<T, ConversionError> {
        T::from_values(self.0.clone())
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for ArgList {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for ArgList {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// What an installed spy does with a call once it has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Forward to the original function.
    Spy,
    /// Return canned results without running the original.
    Fake,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Spy => write!(f, "spy"),
            Mode::Fake => write!(f, "fake"),
        }
    }
}

#[derive(Debug, Default)]
struct Ledger {
    calls: CallList,
    restored: bool,
}

/// The interceptor installed by a spy. Shared between the [`Spy`] handle
/// and the replacement function living in the slot.
struct Recorder {
    ledger: Mutex<Ledger>,
    fake_results: Option<Vec<Value>>,
}

impl Recorder {
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        // Ledger updates are single pushes/clears; a poisoned lock still
        // holds a consistent log.
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CallInterceptor for Recorder {
    fn before_call(&self, args: &[Value]) -> Option<Vec<Value>> {
        {
            let mut ledger = self.lock();
            // A caller that grabbed the replacement before restore() ran
            // gets the original behaviour, unrecorded.
            if ledger.restored {
                return None;
            }
            ledger.calls.push(ArgList::new(args.to_vec()));
            trace!(index = ledger.calls.len() - 1, args = args.len(), "recorded call");
        }
        self.fake_results.clone()
    }
}

/// Records calls to the function held in a [`Slot`].
///
/// Constructing a spy installs a replacement function in the slot. The
/// replacement stays installed until [`Spy::restore`] is called; dropping
/// the spy does not restore the slot.
pub struct Spy {
    target: Slot,
    original: FnValue,
    replacement: FnValue,
    mode: Mode,
    recorder: Arc<Recorder>,
}

impl Spy {
    /// Observe calls without changing what the function returns.
    pub fn on(target: &Slot) -> Result<Self, SpyError> {
        Self::install(target, None)
    }

    /// Record calls and return the zero value of every result type.
    pub fn fake(target: &Slot) -> Result<Self, SpyError> {
        Self::install(target, Some(Vec::new()))
    }

    /// Record calls and return `results` every time.
    ///
    /// `results` must match the function's result types one for one. An
    /// empty list behaves like [`Spy::fake`].
    pub fn fake_with(target: &Slot, results: Vec<Value>) -> Result<Self, SpyError> {
        Self::install(target, Some(results))
    }

    /// Typed form of [`Spy::fake_with`].
    pub fn fake_returning<R: IntoValues>(target: &Slot, results: R) -> Result<Self, SpyError> {
        Self::fake_with(target, results.into_values())
    }

    fn install(target: &Slot, fakes: Option<Vec<Value>>) -> Result<Self, SpyError> {
        Self::try_install(target, fakes).inspect_err(|err| {
            warn!(error = %err, "spy construction rejected");
        })
    }

    // The write lock is held from validation to installation, so either the
    // replacement goes in or the slot is left exactly as it was.
    fn try_install(target: &Slot, fakes: Option<Vec<Value>>) -> Result<Self, SpyError> {
        let mut binding = target.write();

        let original = match &*binding {
            Binding::Func(func) => func.clone(),
            Binding::Data(value) => {
                return Err(SpyError::InvalidTarget {
                    found: value.infer_type(),
                })
            }
        };
        let signature = original.signature();

        let fake_results = match fakes {
            None => None,
            Some(values) if values.is_empty() => Some(signature.zero_results()),
            Some(values) => {
                signature
                    .check_results(&values)
                    .map_err(|mismatch| SpyError::FakeReturnMismatch {
                        signature: signature.clone(),
                        mismatch,
                    })?;
                Some(values)
            }
        };
        let mode = if fake_results.is_some() {
            Mode::Fake
        } else {
            Mode::Spy
        };

        let recorder = Arc::new(Recorder {
            ledger: Mutex::new(Ledger::default()),
            fake_results,
        });
        let replacement = intercept(&original, recorder.clone());
        *binding = Binding::Func(replacement.clone());
        drop(binding);

        debug!(%mode, signature = %original.signature(), "installed spy");

        Ok(Self {
            target: target.clone(),
            original,
            replacement,
            mode,
            recorder,
        })
    }

    /// Whether the function has been called since construction or the last reset.
    pub fn called(&self) -> bool {
        !self.recorder.lock().calls.is_empty()
    }

    pub fn call_count(&self) -> usize {
        self.recorder.lock().calls.len()
    }

    /// All recorded calls in order, or `None` if there are none.
    pub fn calls(&self) -> Option<CallList> {
        let ledger = self.recorder.lock();
        if ledger.calls.is_empty() {
            None
        } else {
            Some(ledger.calls.clone())
        }
    }

    /// Arguments of the `n`-th call (0-based).
    ///
    /// # Panics
    ///
    /// Panics if fewer than `n + 1` calls have been recorded. Use
    /// [`Spy::try_args_for_call`] to get an error instead.
    pub fn args_for_call(&self, n: usize) -> ArgList {
        match self.try_args_for_call(n) {
            Ok(args) => args,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_args_for_call(&self, n: usize) -> Result<ArgList, SpyError> {
        let ledger = self.recorder.lock();
        ledger
            .calls
            .get(n)
            .cloned()
            .ok_or(SpyError::IndexOutOfRange {
                index: n,
                count: ledger.calls.len(),
            })
    }

    /// Forget all recorded calls. The spy stays installed.
    pub fn reset(&self) {
        let mut ledger = self.recorder.lock();
        let cleared = ledger.calls.len();
        ledger.calls.clear();
        debug!(cleared, "reset spy");
    }

    /// Put the original function back in the slot.
    ///
    /// Recorded calls remain queryable; later calls are not recorded.
    /// Calling this more than once has no further effect.
    pub fn restore(&self) {
        let mut ledger = self.recorder.lock();
        if ledger.restored {
            return;
        }
        ledger.restored = true;
        self.target.set(self.original.clone());
        debug!(recorded = ledger.calls.len(), "restored original function");
    }

    pub fn is_restored(&self) -> bool {
        self.recorder.lock().restored
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn signature(&self) -> &Signature {
        self.original.signature()
    }

    /// The function that was in the slot when the spy was constructed.
    pub fn original(&self) -> &FnValue {
        &self.original
    }

    /// The function the spy installed in the slot.
    pub fn replacement(&self) -> &FnValue {
        &self.replacement
    }
}

impl fmt::Debug for Spy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ledger = self.recorder.lock();
        f.debug_struct("Spy")
            .field("mode", &self.mode)
            .field("signature", &self.original.signature().to_string())
            .field("calls", &ledger.calls.len())
            .field("restored", &ledger.restored)
            .finish()
    }
}
