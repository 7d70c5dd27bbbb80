//! Message-handler bridge
//!
//! The native libraries report progress through a registered message
//! callback. The C surface gives that callback no user-data argument, so
//! handlers are routed through a process-wide registry keyed by the
//! native model address: each model gets its own entry and concurrent
//! models never share handler state. Entries are created when a proxy
//! registers a handler and removed by the guard the proxy holds, before
//! the native model itself is released.
//!
//! The trampolines marshal the native message payload (doubles, ints,
//! strings) into a [`MessageEvent`] and never let a panic cross back
//! into native code.

use std::collections::HashMap;
use std::os::raw::{c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

use crate::ffi::cbc::Cbc_Model;
use crate::ffi::clp::Clp_Simplex;
use crate::ffi::{CbcApi, ClpApi};
use crate::marshal;

/// One message from the native library, with its payload marshaled into
/// managed form.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub message_number: i32,
    pub doubles: Vec<f64>,
    pub ints: Vec<i32>,
    pub strings: Vec<String>,
}

/// Handler invoked for every message the native model emits.
pub type MessageHandler = Box<dyn FnMut(&MessageEvent)>;

struct HandlerState {
    handler: MessageHandler,
}

lazy_static! {
    /// Native model address -> handler state address.
    static ref HANDLERS: Mutex<HashMap<usize, usize>> = Mutex::new(HashMap::new());
}

/// Keeps a registered handler alive and deregisters it on drop. Held by
/// the model proxy, declared before the native handle so the native
/// callback is cleared while the model is still alive.
pub(crate) struct MessageGuard {
    model_key: usize,
    state: *mut HandlerState,
    clear: Option<Box<dyn FnOnce()>>,
}

impl Drop for MessageGuard {
    fn drop(&mut self) {
        if let Some(clear) = self.clear.take() {
            clear();
        }
        HANDLERS.lock().unwrap().remove(&self.model_key);
        // SAFETY: the registry entry is gone and the native callback is
        // cleared, so nothing can reach this state anymore.
        unsafe { drop(Box::from_raw(self.state)) };
    }
}

fn insert_handler(model_key: usize, handler: MessageHandler) -> *mut HandlerState {
    let state = Box::into_raw(Box::new(HandlerState { handler }));
    HANDLERS.lock().unwrap().insert(model_key, state as usize);
    state
}

/// Look up the handler for a model and run it. The registry lock is not
/// held while the handler executes, so handlers may call back into the
/// model freely.
fn dispatch(model_key: usize, event: &MessageEvent) {
    let state = HANDLERS.lock().unwrap().get(&model_key).copied();
    if let Some(state) = state {
        // SAFETY: the state outlives its registry entry; entries are
        // removed before the state is freed, and dispatch only runs from
        // within a native call on the model's own thread.
        let state = unsafe { &mut *(state as *mut HandlerState) };
        let _ = catch_unwind(AssertUnwindSafe(|| (state.handler)(event)));
    }
}

#[allow(clippy::too_many_arguments)]
fn build_event(
    message_number: c_int,
    n_double: c_int,
    v_double: *const f64,
    n_int: c_int,
    v_int: *const c_int,
    n_string: c_int,
    v_string: *mut *mut c_char,
) -> MessageEvent {
    // SAFETY: lengths come from the same native call as the arrays.
    unsafe {
        MessageEvent {
            message_number,
            doubles: marshal::copy_f64(v_double, n_double.max(0) as usize),
            ints: marshal::copy_i32(v_int, n_int.max(0) as usize),
            strings: marshal::copy_strings(v_string, n_string.max(0) as usize),
        }
    }
}

unsafe extern "C" fn clp_message_trampoline(
    model: *mut Clp_Simplex,
    message_number: c_int,
    n_double: c_int,
    v_double: *const f64,
    n_int: c_int,
    v_int: *const c_int,
    n_string: c_int,
    v_string: *mut *mut c_char,
) {
    let event = build_event(
        message_number,
        n_double,
        v_double,
        n_int,
        v_int,
        n_string,
        v_string,
    );
    dispatch(model as usize, &event);
}

unsafe extern "C" fn cbc_message_trampoline(
    model: *mut Cbc_Model,
    message_number: c_int,
    n_double: c_int,
    v_double: *const f64,
    n_int: c_int,
    v_int: *const c_int,
    n_string: c_int,
    v_string: *mut *mut c_char,
) {
    let event = build_event(
        message_number,
        n_double,
        v_double,
        n_int,
        v_int,
        n_string,
        v_string,
    );
    dispatch(model as usize, &event);
}

/// Register a handler on a Clp model.
pub(crate) fn register_clp(
    api: &Arc<ClpApi>,
    model: *mut Clp_Simplex,
    handler: MessageHandler,
) -> MessageGuard {
    let state = insert_handler(model as usize, handler);
    // SAFETY: model is a live Clp_Simplex owned by the calling proxy.
    unsafe { (api.register_call_back)(model, clp_message_trampoline) };

    let api = api.clone();
    MessageGuard {
        model_key: model as usize,
        state,
        clear: Some(Box::new(move || unsafe { (api.clear_call_back)(model) })),
    }
}

/// Register a handler on a Cbc model.
pub(crate) fn register_cbc(
    api: &Arc<CbcApi>,
    model: *mut Cbc_Model,
    handler: MessageHandler,
) -> MessageGuard {
    let state = insert_handler(model as usize, handler);
    // SAFETY: model is a live Cbc_Model owned by the calling proxy.
    unsafe { (api.register_call_back)(model, cbc_message_trampoline) };

    let api = api.clone();
    MessageGuard {
        model_key: model as usize,
        state,
        clear: Some(Box::new(move || unsafe { (api.clear_call_back)(model) })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_dispatch_reaches_the_registered_handler() {
        let seen = Arc::new(AtomicI32::new(0));
        let seen_in_handler = seen.clone();
        let key = 0x10_0001usize;

        let state = insert_handler(
            key,
            Box::new(move |event| {
                seen_in_handler.store(event.message_number, Ordering::SeqCst);
            }),
        );

        let event = MessageEvent {
            message_number: 42,
            doubles: vec![],
            ints: vec![],
            strings: vec![],
        };
        dispatch(key, &event);
        assert_eq!(seen.load(Ordering::SeqCst), 42);

        // Unknown keys are silently ignored.
        dispatch(key + 1, &event);

        HANDLERS.lock().unwrap().remove(&key);
        unsafe { drop(Box::from_raw(state)) };
    }

    #[test]
    fn test_dispatch_contains_a_panicking_handler() {
        let key = 0x10_0002usize;
        let state = insert_handler(key, Box::new(|_| panic!("handler blew up")));

        let event = MessageEvent {
            message_number: 1,
            doubles: vec![],
            ints: vec![],
            strings: vec![],
        };
        // Must not propagate the panic.
        dispatch(key, &event);

        HANDLERS.lock().unwrap().remove(&key);
        unsafe { drop(Box::from_raw(state)) };
    }

    #[test]
    fn test_build_event_marshals_the_full_payload() {
        let doubles = [0.5, 1.5];
        let ints = [7];
        let text = CString::new("Optimal").unwrap();
        let mut strings = [text.as_ptr() as *mut c_char];

        let event = build_event(
            3,
            doubles.len() as c_int,
            doubles.as_ptr(),
            ints.len() as c_int,
            ints.as_ptr(),
            strings.len() as c_int,
            strings.as_mut_ptr(),
        );

        assert_eq!(event.message_number, 3);
        assert_eq!(event.doubles, vec![0.5, 1.5]);
        assert_eq!(event.ints, vec![7]);
        assert_eq!(event.strings, vec!["Optimal".to_string()]);
    }

    #[test]
    fn test_guard_drop_removes_registry_entry() {
        let key = 0x10_0003usize;
        let state = insert_handler(key, Box::new(|_| {}));
        let guard = MessageGuard {
            model_key: key,
            state,
            clear: None,
        };
        assert!(HANDLERS.lock().unwrap().contains_key(&key));
        drop(guard);
        assert!(!HANDLERS.lock().unwrap().contains_key(&key));
    }
}
