//! Native-object ownership core
//!
//! Every typed proxy in this crate is built on [`NativeHandle`]: a native
//! reference plus a single `owns` flag deciding whether this proxy
//! releases the native object when it goes away. The rules are small but
//! load-bearing:
//!
//! - at most one owning handle exists per live native object,
//! - a non-owning handle never releases its reference,
//! - after [`NativeHandle::transfer`] the reference stays readable but
//!   is no longer released by this handle,
//! - disposal is idempotent and releases at most once.
//!
//! Release goes through the [`NativeClass`] marker of the wrapped native
//! type, so the handle itself never needs to know which library function
//! frees which class.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::error::{CoinError, Result};

/// Marker trait implemented by one zero-sized type per wrapped native
/// class.
pub trait NativeClass {
    /// Dispatch table needed to release an instance (the loaded api of
    /// the library the class belongs to).
    type Api;

    /// Native class name, used in diagnostics.
    const NAME: &'static str;

    /// Release one native instance.
    ///
    /// # Safety
    /// `ptr` must point to a live instance of this class obtained from
    /// `api`, and must not be used afterwards.
    unsafe fn release(api: &Self::Api, ptr: NonNull<c_void>);
}

/// A native reference plus ownership bookkeeping.
pub struct NativeHandle<C: NativeClass> {
    api: Arc<C::Api>,
    ptr: Option<NonNull<c_void>>,
    owns: bool,
}

impl<C: NativeClass> NativeHandle<C> {
    /// Wrap a freshly constructed native object; the handle owns it and
    /// will release it on disposal.
    pub fn owned(api: Arc<C::Api>, ptr: *mut c_void) -> Result<Self> {
        Self::with_flag(api, ptr, true)
    }

    /// Wrap a pre-existing native reference whose lifetime belongs to
    /// someone else (typically its native parent).
    pub fn borrowed(api: Arc<C::Api>, ptr: *mut c_void) -> Result<Self> {
        Self::with_flag(api, ptr, false)
    }

    fn with_flag(api: Arc<C::Api>, ptr: *mut c_void, owns: bool) -> Result<Self> {
        let ptr = NonNull::new(ptr).ok_or(CoinError::NativeConstruction { class: C::NAME })?;
        Ok(NativeHandle {
            api,
            ptr: Some(ptr),
            owns,
        })
    }

    /// The dispatch table the wrapped object was created from.
    pub fn api(&self) -> &Arc<C::Api> {
        &self.api
    }

    /// The current native reference, or `InvalidState` once released.
    pub fn as_raw(&self) -> Result<NonNull<c_void>> {
        self.ptr.ok_or(CoinError::InvalidState { class: C::NAME })
    }

    /// Whether this handle is currently responsible for releasing the
    /// native object.
    pub fn owns(&self) -> bool {
        self.owns
    }

    /// Hand responsibility for the native object to the caller (it is
    /// about to be embedded into a native container that manages its
    /// lifetime from now on). The reference remains readable through
    /// this handle; calling again returns the same reference without
    /// further state change.
    pub fn transfer(&mut self) -> Result<NonNull<c_void>> {
        let ptr = self.as_raw()?;
        self.owns = false;
        Ok(ptr)
    }

    /// Swap in a new native reference, releasing the current one if this
    /// handle owns it. Used when an operation reconstructs the
    /// underlying native object in place.
    pub fn replace(&mut self, ptr: *mut c_void, owns: bool) -> Result<()> {
        let ptr = NonNull::new(ptr).ok_or(CoinError::NativeConstruction { class: C::NAME })?;
        self.dispose();
        self.ptr = Some(ptr);
        self.owns = owns;
        Ok(())
    }

    /// Release the native object if (and only if) this handle still owns
    /// it. Safe to call repeatedly; only the first call has effect. The
    /// reference is nulled either way, so later operations report
    /// `InvalidState` instead of touching freed memory.
    pub fn dispose(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            if self.owns {
                // SAFETY: we hold the only owning reference and null it
                // before release, so no second release can follow.
                unsafe { C::release(&self.api, ptr) };
            }
        }
        self.owns = false;
    }
}

impl<C: NativeClass> Drop for NativeHandle<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<C: NativeClass> std::fmt::Debug for NativeHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeHandle")
            .field("class", &C::NAME)
            .field("ptr", &self.ptr)
            .field("owns", &self.owns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stand-in for a loaded api table: counts release calls.
    #[derive(Default)]
    struct MockApi {
        released: AtomicUsize,
    }

    struct MockClass;

    impl NativeClass for MockClass {
        type Api = MockApi;
        const NAME: &'static str = "MockNative";

        unsafe fn release(api: &MockApi, _ptr: NonNull<c_void>) {
            api.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fake_object() -> *mut c_void {
        // Any stable non-null address works; the mock never dereferences.
        Box::into_raw(Box::new(0u64)) as *mut c_void
    }

    fn free_fake(ptr: *mut c_void) {
        unsafe { drop(Box::from_raw(ptr as *mut u64)) };
    }

    #[test]
    fn test_fresh_handle_is_owning_and_non_null() {
        let api = Arc::new(MockApi::default());
        let ptr = fake_object();
        let handle = NativeHandle::<MockClass>::owned(api.clone(), ptr).unwrap();
        assert!(handle.owns());
        assert_eq!(handle.as_raw().unwrap().as_ptr(), ptr);
        drop(handle);
        assert_eq!(api.released.load(Ordering::SeqCst), 1);
        free_fake(ptr);
    }

    #[test]
    fn test_borrowed_handle_never_releases() {
        let api = Arc::new(MockApi::default());
        let ptr = fake_object();
        {
            let handle = NativeHandle::<MockClass>::borrowed(api.clone(), ptr).unwrap();
            assert!(!handle.owns());
        }
        assert_eq!(api.released.load(Ordering::SeqCst), 0);
        free_fake(ptr);
    }

    #[test]
    fn test_null_pointer_is_rejected_at_construction() {
        let api = Arc::new(MockApi::default());
        let err = NativeHandle::<MockClass>::owned(api, std::ptr::null_mut()).unwrap_err();
        assert!(matches!(err, CoinError::NativeConstruction { class } if class == "MockNative"));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let api = Arc::new(MockApi::default());
        let ptr = fake_object();
        let mut handle = NativeHandle::<MockClass>::owned(api.clone(), ptr).unwrap();
        handle.dispose();
        handle.dispose();
        handle.dispose();
        assert_eq!(api.released.load(Ordering::SeqCst), 1);
        assert!(matches!(
            handle.as_raw(),
            Err(CoinError::InvalidState { class: "MockNative" })
        ));
        // Drop after explicit disposal must not release again.
        drop(handle);
        assert_eq!(api.released.load(Ordering::SeqCst), 1);
        free_fake(ptr);
    }

    #[test]
    fn test_transfer_disarms_release_but_keeps_reference_readable() {
        let api = Arc::new(MockApi::default());
        let ptr = fake_object();
        let mut handle = NativeHandle::<MockClass>::owned(api.clone(), ptr).unwrap();

        let transferred = handle.transfer().unwrap();
        assert_eq!(transferred.as_ptr(), ptr);
        assert!(!handle.owns());

        // Second transfer: same reference, no further state change.
        assert_eq!(handle.transfer().unwrap().as_ptr(), ptr);

        // Still readable for call forwarding.
        assert_eq!(handle.as_raw().unwrap().as_ptr(), ptr);

        drop(handle);
        assert_eq!(api.released.load(Ordering::SeqCst), 0);
        free_fake(ptr);
    }

    #[test]
    fn test_transfer_after_dispose_reports_invalid_state() {
        let api = Arc::new(MockApi::default());
        let ptr = fake_object();
        let mut handle = NativeHandle::<MockClass>::owned(api, ptr).unwrap();
        handle.dispose();
        assert!(matches!(
            handle.transfer(),
            Err(CoinError::InvalidState { .. })
        ));
        free_fake(ptr);
    }

    #[test]
    fn test_replace_releases_the_owned_predecessor() {
        let api = Arc::new(MockApi::default());
        let first = fake_object();
        let second = fake_object();

        let mut handle = NativeHandle::<MockClass>::owned(api.clone(), first).unwrap();
        handle.replace(second, true).unwrap();
        assert_eq!(api.released.load(Ordering::SeqCst), 1);
        assert_eq!(handle.as_raw().unwrap().as_ptr(), second);
        assert!(handle.owns());

        drop(handle);
        assert_eq!(api.released.load(Ordering::SeqCst), 2);
        free_fake(first);
        free_fake(second);
    }

    #[test]
    fn test_replace_after_transfer_does_not_release_the_transferred_object() {
        let api = Arc::new(MockApi::default());
        let first = fake_object();
        let second = fake_object();

        let mut handle = NativeHandle::<MockClass>::owned(api.clone(), first).unwrap();
        handle.transfer().unwrap();
        handle.replace(second, true).unwrap();
        // The transferred object now belongs to someone else.
        assert_eq!(api.released.load(Ordering::SeqCst), 0);

        drop(handle);
        assert_eq!(api.released.load(Ordering::SeqCst), 1);
        free_fake(first);
        free_fake(second);
    }
}
