//! Solver-interface views and runtime-type dispatch
//!
//! Native code hands back solver-interface pointers in a few places (the
//! cut callback's relaxation solver, [`crate::cbc::CbcModel::solver`]).
//! Those pointers arrive as an opaque base-class reference plus the
//! runtime type name the native layer guarantees for that call site.
//! [`downcast`] turns the pair into the most specific view we know,
//! falling back to the plain base view for unrecognized solver-interface
//! variants and failing for anything else.
//!
//! A view never owns its native reference: the solver belongs to its
//! native parent and stays valid only for the duration of the call that
//! produced it.

use std::ffi::c_void;
use std::sync::Arc;

use crate::error::{CoinError, Result};
use crate::ffi::CbcApi;
use crate::handle::{NativeClass, NativeHandle};
use crate::marshal;

/// Runtime type of a native solver-interface pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsiKind {
    /// `OsiClpSolverInterface` — the Clp simplex behind a model.
    Clp,
    /// `OsiCbcSolverInterface` — a branch-and-cut model posing as a
    /// solver interface.
    Cbc,
    /// Some other solver-interface variant; only base capabilities are
    /// available.
    Other(String),
}

impl OsiKind {
    /// Match a reported native runtime type name, most derived first.
    pub fn classify(type_name: &str) -> Result<OsiKind> {
        match type_name {
            "OsiCbcSolverInterface" => Ok(OsiKind::Cbc),
            "OsiClpSolverInterface" => Ok(OsiKind::Clp),
            name if name.starts_with("Osi") && name.ends_with("SolverInterface") => {
                Ok(OsiKind::Other(name.to_string()))
            }
            name => Err(CoinError::UnknownNativeType {
                type_name: name.to_string(),
            }),
        }
    }
}

pub(crate) struct OsiSolverClass;

impl NativeClass for OsiSolverClass {
    type Api = CbcApi;
    const NAME: &'static str = "OsiSolverInterface";

    unsafe fn release(_api: &CbcApi, _ptr: std::ptr::NonNull<c_void>) {
        // Views are always non-owning; the native parent releases the
        // solver. Nothing to do even if this were reached.
    }
}

/// Non-owning view over a native solver-interface pointer.
pub struct OsiSolverView {
    handle: NativeHandle<OsiSolverClass>,
    kind: OsiKind,
}

/// Construct the most specific view matching the reported runtime type.
pub fn downcast(api: Arc<CbcApi>, ptr: *mut c_void, type_name: &str) -> Result<OsiSolverView> {
    let kind = OsiKind::classify(type_name)?;
    Ok(OsiSolverView {
        handle: NativeHandle::borrowed(api, ptr)?,
        kind,
    })
}

impl OsiSolverView {
    pub fn kind(&self) -> &OsiKind {
        &self.kind
    }

    fn raw(&self) -> Result<*mut c_void> {
        Ok(self.handle.as_raw()?.as_ptr())
    }

    pub fn num_cols(&self) -> Result<usize> {
        let f = self.handle.api().osi_get_num_cols.ok_or(CoinError::MissingSymbol {
            symbol: "Osi_getNumCols",
        })?;
        Ok(unsafe { f(self.raw()?) } as usize)
    }

    pub fn num_rows(&self) -> Result<usize> {
        let f = self.handle.api().osi_get_num_rows.ok_or(CoinError::MissingSymbol {
            symbol: "Osi_getNumRows",
        })?;
        Ok(unsafe { f(self.raw()?) } as usize)
    }

    /// Current column solution, copied out.
    pub fn col_solution(&self) -> Result<Vec<f64>> {
        let f = self
            .handle
            .api()
            .osi_get_col_solution
            .ok_or(CoinError::MissingSymbol {
                symbol: "Osi_getColSolution",
            })?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64(f(self.raw()?), n) })
    }

    /// Raw pointer to the native column solution; valid only until the
    /// next call into the solver.
    pub fn col_solution_unsafe(&self) -> Result<*const f64> {
        let f = self
            .handle
            .api()
            .osi_get_col_solution
            .ok_or(CoinError::MissingSymbol {
                symbol: "Osi_getColSolution",
            })?;
        Ok(unsafe { f(self.raw()?) })
    }

    pub fn col_lower(&self) -> Result<Vec<f64>> {
        let f = self
            .handle
            .api()
            .osi_get_col_lower
            .ok_or(CoinError::MissingSymbol {
                symbol: "Osi_getColLower",
            })?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64(f(self.raw()?), n) })
    }

    pub fn col_upper(&self) -> Result<Vec<f64>> {
        let f = self
            .handle
            .api()
            .osi_get_col_upper
            .ok_or(CoinError::MissingSymbol {
                symbol: "Osi_getColUpper",
            })?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64(f(self.raw()?), n) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_matches_most_derived_type() {
        assert_eq!(OsiKind::classify("OsiClpSolverInterface").unwrap(), OsiKind::Clp);
        assert_eq!(OsiKind::classify("OsiCbcSolverInterface").unwrap(), OsiKind::Cbc);
    }

    #[test]
    fn test_classify_falls_back_to_base_for_unknown_variants() {
        let kind = OsiKind::classify("OsiGrbSolverInterface").unwrap();
        assert_eq!(kind, OsiKind::Other("OsiGrbSolverInterface".to_string()));
    }

    #[test]
    fn test_classify_rejects_foreign_types() {
        let err = OsiKind::classify("CoinPackedMatrix").unwrap_err();
        match err {
            CoinError::UnknownNativeType { type_name } => {
                assert_eq!(type_name, "CoinPackedMatrix");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
