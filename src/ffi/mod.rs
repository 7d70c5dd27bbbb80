//! Runtime binding to the native COIN-OR shared libraries
//!
//! The Clp and Cbc C interfaces are resolved dynamically with `libloading`
//! rather than linked at build time, so the crate compiles and its unit
//! tests run on machines without COIN-OR installed. A handful of entry
//! points only exist in newer COIN-OR releases; those are held as
//! `Option` and surface as [`CoinError::MissingSymbol`] when absent.
//!
//! Library search order per backend: an explicit path from the
//! environment (`COINBIND_CLP_LIB` / `COINBIND_CBC_LIB`), then the
//! platform soname candidates.

use std::sync::{Arc, Mutex, Weak};

use lazy_static::lazy_static;
use libloading::Library;

use crate::error::{CoinError, Result};

pub mod cbc;
pub mod clp;

pub use cbc::{Cbc_Model, CbcApi};
pub use clp::{Clp_Simplex, ClpApi};

/// Index type of the compressed-column arrays in the standard COIN-OR
/// build. 64-bit-index builds change this to `i64`; those are not
/// supported here.
pub type CoinBigIndex = i32;

/// Value treated as plus infinity by the native libraries.
pub const INFINITY: f64 = f64::MAX;

/// Resolve a required symbol, copying the raw function pointer out of the
/// library so the api table owns plain `fn` values.
///
/// # Safety
/// `T` must be the correct function-pointer type for the named symbol.
pub(crate) unsafe fn sym<T: Copy>(lib: &Library, name: &'static str) -> Result<T> {
    match unsafe { lib.get::<T>(name.as_bytes()) } {
        Ok(s) => Ok(*s),
        Err(e) => Err(CoinError::Library(format!("symbol {name} not found: {e}"))),
    }
}

/// Resolve an optional symbol (present only in newer COIN-OR releases).
///
/// # Safety
/// `T` must be the correct function-pointer type for the named symbol.
pub(crate) unsafe fn opt<T: Copy>(lib: &Library, name: &'static str) -> Option<T> {
    unsafe { lib.get::<T>(name.as_bytes()) }.ok().map(|s| *s)
}

/// Open the first loadable candidate, honoring the environment override.
pub(crate) fn open_library(env_var: &str, candidates: &[&str]) -> Result<Library> {
    let mut tried = Vec::new();

    if let Ok(path) = std::env::var(env_var) {
        // SAFETY: loading a shared library runs its initializers; the
        // COIN-OR libraries have no harmful ones.
        match unsafe { Library::new(&path) } {
            Ok(lib) => return Ok(lib),
            Err(e) => tried.push(format!("{path} ({e})")),
        }
    }

    for name in candidates {
        match unsafe { Library::new(name) } {
            Ok(lib) => return Ok(lib),
            Err(e) => tried.push(format!("{name} ({e})")),
        }
    }

    Err(CoinError::Library(format!(
        "no loadable library among: {}; set {env_var} to an explicit path",
        tried.join(", ")
    )))
}

/// The loaded solver libraries. Either backend may be absent; an
/// operation against a missing backend reports which library failed to
/// load and why.
pub struct CoinLibrary {
    clp: std::result::Result<Arc<ClpApi>, String>,
    cbc: std::result::Result<Arc<CbcApi>, String>,
}

impl CoinLibrary {
    /// Load (or reuse) the process-wide default libraries.
    ///
    /// Loaded libraries are shared through `Arc` and cached behind a weak
    /// reference, so repeated calls reuse the live instance instead of
    /// re-opening the shared objects.
    pub fn load_default() -> Result<Arc<CoinLibrary>> {
        let mut cached = DEFAULT_LIBRARY.lock().unwrap();
        if let Some(lib) = cached.upgrade() {
            return Ok(lib);
        }

        let lib = Arc::new(CoinLibrary::probe()?);
        *cached = Arc::downgrade(&lib);
        Ok(lib)
    }

    fn probe() -> Result<CoinLibrary> {
        let clp = ClpApi::load_default().map(Arc::new).map_err(|e| e.to_string());
        let cbc = CbcApi::load_default().map(Arc::new).map_err(|e| e.to_string());

        match (&clp, &cbc) {
            (Err(clp_err), Err(cbc_err)) => Err(CoinError::Library(format!(
                "neither backend loaded: Clp: {clp_err}; Cbc: {cbc_err}"
            ))),
            _ => Ok(CoinLibrary { clp, cbc }),
        }
    }

    /// The Clp api table, or why it is unavailable.
    pub fn clp(&self) -> Result<Arc<ClpApi>> {
        self.clp
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| CoinError::Library(e.clone()))
    }

    /// The Cbc api table, or why it is unavailable.
    pub fn cbc(&self) -> Result<Arc<CbcApi>> {
        self.cbc
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| CoinError::Library(e.clone()))
    }

    pub fn has_clp(&self) -> bool {
        self.clp.is_ok()
    }

    pub fn has_cbc(&self) -> bool {
        self.cbc.is_ok()
    }
}

lazy_static! {
    static ref DEFAULT_LIBRARY: Mutex<Weak<CoinLibrary>> = Mutex::new(Weak::new());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_library_reports_every_candidate() {
        let err = open_library("COINBIND_NO_SUCH_VAR", &["libcoinbind-nonexistent.so"])
            .expect_err("bogus library must not load");
        let text = err.to_string();
        assert!(text.contains("libcoinbind-nonexistent.so"));
        assert!(text.contains("COINBIND_NO_SUCH_VAR"));
    }
}
