//! Call Interceptor
//!
//! Wraps a function value so that every call passes through a
//! [`CallInterceptor`] first. The wrapper has exactly the signature of the
//! function it wraps, so it can be installed in the same slot.
//!
//! # Observing
//!
//! An observing interceptor returns `None` from `before_call` (allowing the
//! wrapped function to run) and may inspect the outcome in `after_call`.
//!
//! # Substituting
//!
//! A substituting interceptor returns `Some(results)` from `before_call`,
//! short-circuiting the wrapped function entirely.

use std::sync::Arc;

use super::{CallError, FnValue};
use crate::abi::Value;

/// Hook run around every call of an intercepted function.
///
/// Methods are synchronous and take `&self`: implementations that keep
/// state must synchronise it themselves, since calls may arrive from
/// several threads at once.
pub trait CallInterceptor: Send + Sync {
    /// Called before the wrapped function runs, with arguments already
    /// checked against its signature.
    ///
    /// Return `Some(results)` to skip the wrapped function.
    /// Return `None` to let it run.
    fn before_call(&self, args: &[Value]) -> Option<Vec<Value>>;

    /// Called after the wrapped function returns normally.
    fn after_call(&self, _args: &[Value], _results: &[Value]) {}
}

/// Build a function value that routes calls to `target` through `interceptor`.
pub fn intercept(target: &FnValue, interceptor: Arc<dyn CallInterceptor>) -> FnValue {
    let wrapped = target.clone();
    FnValue::from_body(
        target.signature().clone(),
        Arc::new(move |args: Vec<Value>| -> Result<Vec<Value>, CallError> {
            if let Some(results) = interceptor.before_call(&args) {
                return Ok(results);
            }
            let results = wrapped.call_unchecked(args.clone())?;
            interceptor.after_call(&args, &results);
            Ok(results)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Slot;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Tape {
        seen: Mutex<Vec<(Vec<Value>, Vec<Value>)>>,
    }

    impl CallInterceptor for Tape {
        fn before_call(&self, _args: &[Value]) -> Option<Vec<Value>> {
            None
        }

        fn after_call(&self, args: &[Value], results: &[Value]) {
            self.seen
                .lock()
                .unwrap()
                .push((args.to_vec(), results.to_vec()));
        }
    }

    struct Constant(i32);

    impl CallInterceptor for Constant {
        fn before_call(&self, _args: &[Value]) -> Option<Vec<Value>> {
            Some(vec![Value::S32(self.0)])
        }
    }

    #[test]
    fn passthrough_sees_inputs_and_outputs() {
        let add_one = FnValue::typed(|(n,): (i32,)| (n + 1,));
        let tape = Arc::new(Tape::default());
        let slot = Slot::new(intercept(&add_one, tape.clone()));

        let (out,): (i32,) = slot.invoke((41,)).expect("invoke");
        assert_eq!(out, 42);
        assert_eq!(
            *tape.seen.lock().unwrap(),
            vec![(vec![Value::S32(41)], vec![Value::S32(42)])]
        );
    }

    #[test]
    fn short_circuit_skips_target() {
        let never = FnValue::typed(|(_n,): (i32,)| -> (i32,) { panic!("target should not run") });
        let slot = Slot::new(intercept(&never, Arc::new(Constant(7))));

        let (out,): (i32,) = slot.invoke((1,)).expect("invoke");
        assert_eq!(out, 7);
    }

    #[test]
    fn wrapper_keeps_signature_but_not_identity() {
        let target = FnValue::typed(|(s,): (String,)| (s.len() as u64,));
        let wrapper = intercept(&target, Arc::new(Tape::default()));
        assert_eq!(wrapper.signature(), target.signature());
        assert!(!wrapper.ptr_eq(&target));
    }
}
