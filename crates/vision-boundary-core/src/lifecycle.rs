//! Process-wide SDK lifecycle.
//!
//! Vendor SDKs need an explicit init before first use and a terminate after
//! last use. [`SdkLifecycle`] is the singleton that holds the installed
//! backend and that state. There is no reference counting: the caller scopes
//! init/terminate itself.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::status::{Fault, SdkError, SdkResult};

pub(crate) const NOT_INSTALLED: &str = "no SDK backend installed";
pub(crate) const NOT_INITIALIZED: &str = "SDK not initialized";

struct State<B: ?Sized> {
    backend: Option<Arc<B>>,
    initialized: bool,
}

/// Installed backend plus its init state.
///
/// Declare one as a `static` per SDK seam.
pub struct SdkLifecycle<B: ?Sized> {
    state: Mutex<State<B>>,
}

impl<B: ?Sized> Default for SdkLifecycle<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized> SdkLifecycle<B> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(State {
                backend: None,
                initialized: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install `backend`, returning the previous one.
    ///
    /// The new backend starts uninitialized.
    pub fn install(&self, backend: Arc<B>) -> Option<Arc<B>> {
        let mut state = self.lock();
        state.initialized = false;
        state.backend.replace(backend)
    }

    /// Remove the installed backend without terminating it.
    pub fn uninstall(&self) -> Option<Arc<B>> {
        let mut state = self.lock();
        state.initialized = false;
        state.backend.take()
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Run the backend's init once. Initializing twice is a no-op.
    pub fn initialize(&self, init: impl FnOnce(&B) -> SdkResult<()>) -> Result<(), Fault> {
        let mut state = self.lock();
        if state.initialized {
            return Ok(());
        }
        let backend = state
            .backend
            .clone()
            .ok_or_else(|| SdkError::known(NOT_INSTALLED))?;
        init(backend.as_ref())?;
        state.initialized = true;
        Ok(())
    }

    /// Run the backend's terminate. Terminating an uninitialized SDK is a
    /// known SDK exception, as the wrapped SDKs report it. A failed
    /// terminate leaves the SDK initialized.
    pub fn terminate(&self, term: impl FnOnce(&B) -> SdkResult<()>) -> Result<(), Fault> {
        let mut state = self.lock();
        let backend = match (&state.backend, state.initialized) {
            (Some(backend), true) => backend.clone(),
            _ => return Err(SdkError::known(NOT_INITIALIZED).into()),
        };
        term(backend.as_ref())?;
        state.initialized = false;
        Ok(())
    }

    /// The initialized backend. The lock is released before returning.
    pub fn backend(&self) -> Result<Arc<B>, Fault> {
        let state = self.lock();
        match (&state.backend, state.initialized) {
            (Some(backend), true) => Ok(backend.clone()),
            _ => Err(SdkError::known(NOT_INITIALIZED).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        inits: AtomicUsize,
        terms: AtomicUsize,
    }

    fn init(b: &Counting) -> SdkResult<()> {
        b.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn term(b: &Counting) -> SdkResult<()> {
        b.terms.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    #[test]
    fn use_before_init_is_known_exception() {
        let lc = SdkLifecycle::<Counting>::new();
        lc.install(Arc::new(Counting::default()));
        assert_eq!(
            lc.backend().err(),
            Some(Fault::Sdk(SdkError::known(NOT_INITIALIZED)))
        );
    }

    #[test]
    fn init_without_backend_fails() {
        let lc = SdkLifecycle::<Counting>::new();
        assert_eq!(
            lc.initialize(init).unwrap_err(),
            Fault::Sdk(SdkError::known(NOT_INSTALLED))
        );
    }

    #[test]
    fn init_use_terminate() {
        let lc = SdkLifecycle::<Counting>::new();
        let backend = Arc::new(Counting::default());
        lc.install(backend.clone());

        lc.initialize(init).unwrap();
        lc.initialize(init).unwrap();
        assert_eq!(backend.inits.load(Ordering::SeqCst), 1);
        assert!(lc.backend().is_ok());

        lc.terminate(term).unwrap();
        assert_eq!(backend.terms.load(Ordering::SeqCst), 1);
        assert!(lc.backend().is_err());
        assert!(lc.terminate(term).is_err());
    }

    #[test]
    fn failed_init_leaves_sdk_uninitialized() {
        let lc = SdkLifecycle::<Counting>::new();
        lc.install(Arc::new(Counting::default()));
        let err = lc
            .initialize(|_| Err(SdkError::known("no transport layer")))
            .unwrap_err();
        assert_eq!(err.status(), crate::StatusCode::KnownException);
        assert!(!lc.is_initialized());
    }

    #[test]
    fn failed_terminate_keeps_sdk_initialized() {
        let lc = SdkLifecycle::<Counting>::new();
        lc.install(Arc::new(Counting::default()));
        lc.initialize(init).unwrap();
        assert!(lc.terminate(|_| Err(SdkError::Unknown)).is_err());
        assert!(lc.is_initialized());
        assert!(lc.backend().is_ok());
        lc.terminate(term).unwrap();
        assert!(!lc.is_initialized());
    }

    #[test]
    fn works_for_trait_objects() {
        trait Sdk: Send + Sync {
            fn version(&self) -> &'static str;
        }
        struct V;
        impl Sdk for V {
            fn version(&self) -> &'static str {
                "1.0"
            }
        }
        static LC: SdkLifecycle<dyn Sdk> = SdkLifecycle::new();
        LC.install(Arc::new(V));
        LC.initialize(|_| Ok(())).unwrap();
        assert_eq!(LC.backend().unwrap().version(), "1.0");
        LC.terminate(|_| Ok(())).unwrap();
    }
}
