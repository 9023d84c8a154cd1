//! Function values and the slots that hold them.
//!
//! A [`Slot`] stands in for a variable: every clone refers to the same
//! storage, so code that calls through a slot picks up whatever has been
//! installed in it most recently. This is what lets a spy swap a function
//! out from under its callers and later swap it back.
//!
//! # Example
//!
//! ```
//! use fnspy::Slot;
//!
//! let double = Slot::func(|(x,): (i64,)| (x * 2,));
//! let (y,): (i64,) = double.invoke((21i64,)).unwrap();
//! assert_eq!(y, 42);
//! ```

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CallError, Signature};
use crate::abi::{FromValues, IntoValues, TypeList, Value};

type Body = dyn Fn(Vec<Value>) -> Result<Vec<Value>, CallError> + Send + Sync;

/// A callable value with a runtime signature.
///
/// Cloning is cheap and clones share identity (see [`FnValue::ptr_eq`]).
#[derive(Clone)]
pub struct FnValue {
    signature: Signature,
    body: Arc<Body>,
}

impl FnValue {
    /// Build a function value from a signature and a body over raw values.
    ///
    /// The body only ever sees arguments that conform to `signature`.
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    {
        Self::from_body(
            signature,
            Arc::new(move |args: Vec<Value>| -> Result<Vec<Value>, CallError> { Ok(body(args)) }),
        )
    }

    /// Build a function value from a Rust closure over tuples.
    ///
    /// The signature is derived from the tuple types `A` and `R`.
    pub fn typed<A, R, F>(func: F) -> Self
    where
        A: FromValues + TypeList + 'static,
        R: IntoValues + TypeList + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::from_body(
            Signature::of::<A, R>(),
            Arc::new(move |args: Vec<Value>| -> Result<Vec<Value>, CallError> {
                let input = A::from_values(args)?;
                Ok(func(input).into_values())
            }),
        )
    }

    pub(crate) fn from_body(signature: Signature, body: Arc<Body>) -> Self {
        Self { signature, body }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call with arguments checked against the signature.
    pub fn call(&self, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        self.signature
            .check_args(&args)
            .map_err(|mismatch| CallError::Arguments {
                signature: self.signature.clone(),
                mismatch,
            })?;
        self.call_unchecked(args)
    }

    /// Call with arguments the caller has already checked.
    pub(crate) fn call_unchecked(&self, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        (self.body)(args)
    }

    /// Whether two values are clones of the same function.
    pub fn ptr_eq(&self, other: &FnValue) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.body) as *const (),
            Arc::as_ptr(&other.body) as *const (),
        )
    }
}

impl fmt::Debug for FnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValue")
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

/// What a slot currently holds.
#[derive(Debug, Clone)]
pub enum Binding {
    Func(FnValue),
    /// A non-function value. Slots like this cannot be called or spied on.
    Data(Value),
}

impl From<FnValue> for Binding {
    fn from(func: FnValue) -> Self {
        Binding::Func(func)
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Data(value)
    }
}

/// A shared, reassignable variable.
#[derive(Debug, Clone)]
pub struct Slot {
    inner: Arc<RwLock<Binding>>,
}

impl Slot {
    pub fn new(binding: impl Into<Binding>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(binding.into())),
        }
    }

    /// A slot holding a typed Rust closure. See [`FnValue::typed`].
    pub fn func<A, R, F>(func: F) -> Self
    where
        A: FromValues + TypeList + 'static,
        R: IntoValues + TypeList + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::new(FnValue::typed(func))
    }

    // A panic inside a function body never leaves a binding half-written,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Binding> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Binding> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current binding.
    pub fn get(&self) -> Binding {
        self.read().clone()
    }

    /// Replace the binding, returning the previous one.
    pub fn set(&self, binding: impl Into<Binding>) -> Binding {
        std::mem::replace(&mut *self.write(), binding.into())
    }

    /// The function currently installed, if the slot holds one.
    pub fn function(&self) -> Option<FnValue> {
        match &*self.read() {
            Binding::Func(func) => Some(func.clone()),
            Binding::Data(_) => None,
        }
    }

    pub fn signature(&self) -> Option<Signature> {
        self.function().map(|func| func.signature().clone())
    }

    /// Whether two slots are the same variable.
    pub fn same_slot(&self, other: &Slot) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Call whatever function the slot currently holds.
    ///
    /// The lock is released before the function runs, so a body may call
    /// back into the same slot.
    pub fn call(&self, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        let func = match &*self.read() {
            Binding::Func(func) => func.clone(),
            Binding::Data(value) => {
                return Err(CallError::NotCallable {
                    found: value.infer_type(),
                })
            }
        };
        func.call(args)
    }

    /// Typed call: tuple in, tuple out.
    pub fn invoke<A, R>(&self, args: A) -> Result<R, CallError>
    where
        A: IntoValues,
        R: FromValues,
    {
        let results = self.call(args.into_values())?;
        Ok(R::from_values(results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::ValueType;
    use crate::runtime::Mismatch;

    #[test]
    fn typed_closure_derives_signature() {
        let slot = Slot::func(|(name, n): (String, u32)| (name.repeat(n as usize),));
        assert_eq!(
            slot.signature(),
            Some(Signature::new(
                vec![ValueType::String, ValueType::U32],
                vec![ValueType::String]
            ))
        );
        let (out,): (String,) = slot.invoke(("ab".to_string(), 3u32)).expect("invoke");
        assert_eq!(out, "ababab");
    }

    #[test]
    fn dynamic_body_sees_checked_args() {
        let sig = Signature::new(vec![ValueType::S64], vec![ValueType::S64]);
        let slot = Slot::new(FnValue::new(sig, |args| args));
        assert_eq!(slot.call(vec![Value::S64(7)]), Ok(vec![Value::S64(7)]));

        let err = slot.call(vec![Value::S32(7)]).unwrap_err();
        assert!(matches!(
            err,
            CallError::Arguments {
                mismatch: Mismatch::Type { position: 0, .. },
                ..
            }
        ));
    }

    #[test]
    fn data_slot_is_not_callable() {
        let slot = Slot::new(Value::from("some random var"));
        assert_eq!(
            slot.call(vec![]),
            Err(CallError::NotCallable {
                found: ValueType::String
            })
        );
        assert!(slot.function().is_none());
    }

    #[test]
    fn clones_share_the_variable() {
        let slot = Slot::func(|(): ()| (1i32,));
        let alias = slot.clone();
        alias.set(FnValue::typed(|(): ()| (2i32,)));

        let (n,): (i32,) = slot.invoke(()).expect("invoke");
        assert_eq!(n, 2);
        assert!(slot.same_slot(&alias));
    }

    #[test]
    fn set_returns_previous_binding() {
        let first = FnValue::typed(|(): ()| ());
        let slot = Slot::new(first.clone());
        match slot.set(Value::Bool(true)) {
            Binding::Func(prev) => assert!(prev.ptr_eq(&first)),
            Binding::Data(_) => panic!("expected previous function"),
        }
    }

    #[test]
    fn body_may_reenter_its_slot() {
        let slot = Slot::new(Value::Bool(false));
        let inner = slot.clone();
        slot.set(FnValue::typed(move |(n,): (u64,)| {
            if n == 0 {
                (1u64,)
            } else {
                let (prev,): (u64,) = inner.invoke((n - 1,)).expect("recurse");
                (n * prev,)
            }
        }));
        let (fact,): (u64,) = slot.invoke((5u64,)).expect("invoke");
        assert_eq!(fact, 120);
    }
}
