//! `ClpSimplex` proxy — the linear-programming model and simplex solver
//!
//! Every method forwards to exactly one `Clp_*` entry point, marshaling
//! arguments on the way in and translating nonzero return codes into
//! [`CoinError::Native`] on the way out. Solution and bound arrays are
//! offered both as owned copies and as raw pointers into the live model
//! for zero-copy use; the raw variants are invalidated by the next call
//! into the model.

use std::ffi::c_void;
use std::os::raw::c_char;
use std::path::Path;
use std::ptr::NonNull;

use crate::error::{CoinError, Result};
use crate::ffi::clp::Clp_Simplex;
use crate::ffi::{ClpApi, CoinBigIndex, CoinLibrary};
use crate::handle::{NativeClass, NativeHandle};
use crate::marshal;
use crate::matrix::{PackedMatrix, PackedVector, ProblemData};
use crate::message::{MessageEvent, MessageGuard, register_clp};
use crate::warm_start::{BasisStatus, WarmStartBasis};

/// Final status of a simplex solve, decoded from the native code
/// (0 optimal, 1 primal infeasible, 2 dual infeasible, 3 stopped on
/// iterations or time, 4 stopped due to errors, 5 stopped by user).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClpStatus {
    NotSolved,
    Optimal,
    PrimalInfeasible,
    DualInfeasible,
    StoppedOnLimit,
    Errors,
    UserStopped,
    Unknown(i32),
}

impl ClpStatus {
    pub fn from_raw(raw: i32) -> ClpStatus {
        match raw {
            -1 => ClpStatus::NotSolved,
            0 => ClpStatus::Optimal,
            1 => ClpStatus::PrimalInfeasible,
            2 => ClpStatus::DualInfeasible,
            3 => ClpStatus::StoppedOnLimit,
            4 => ClpStatus::Errors,
            5 => ClpStatus::UserStopped,
            other => ClpStatus::Unknown(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            ClpStatus::NotSolved => -1,
            ClpStatus::Optimal => 0,
            ClpStatus::PrimalInfeasible => 1,
            ClpStatus::DualInfeasible => 2,
            ClpStatus::StoppedOnLimit => 3,
            ClpStatus::Errors => 4,
            ClpStatus::UserStopped => 5,
            ClpStatus::Unknown(raw) => *raw,
        }
    }
}

pub(crate) struct ClpSimplexClass;

impl NativeClass for ClpSimplexClass {
    type Api = ClpApi;
    const NAME: &'static str = "Clp_Simplex";

    unsafe fn release(api: &ClpApi, ptr: NonNull<c_void>) {
        unsafe { (api.delete_model)(ptr.as_ptr() as *mut Clp_Simplex) };
    }
}

/// Proxy over a native `Clp_Simplex` model.
pub struct ClpSimplex {
    // Declared before the handle so an installed message callback is
    // deregistered while the native model is still alive.
    message_handler: Option<MessageGuard>,
    handle: NativeHandle<ClpSimplexClass>,
}

impl ClpSimplex {
    /// Construct a fresh, empty native model; the proxy owns it.
    pub fn new(library: &CoinLibrary) -> Result<ClpSimplex> {
        let api = library.clp()?;
        // SAFETY: Clp_newModel takes no arguments; a null return is
        // caught by the handle constructor before the proxy exists.
        let ptr = unsafe { (api.new_model)() };
        Ok(ClpSimplex {
            message_handler: None,
            handle: NativeHandle::owned(api, ptr as *mut c_void)?,
        })
    }

    fn api(&self) -> &ClpApi {
        self.handle.api()
    }

    fn raw(&self) -> Result<*mut Clp_Simplex> {
        Ok(self.handle.as_raw()?.as_ptr() as *mut Clp_Simplex)
    }

    // ----- problem loading and file I/O -------------------------------

    /// Load a complete problem in compressed-column form, replacing any
    /// previously loaded one.
    pub fn load_problem(&mut self, data: &ProblemData) -> Result<()> {
        let matrix = data.matrix();
        let model = self.raw()?;
        // SAFETY: ProblemData validated all array shapes against the
        // matrix dimensions at construction.
        unsafe {
            (self.api().load_problem)(
                model,
                matrix.num_cols() as i32,
                matrix.num_rows() as i32,
                matrix.starts().as_ptr(),
                matrix.indices().as_ptr(),
                matrix.values().as_ptr(),
                data.col_lower().as_ptr(),
                data.col_upper().as_ptr(),
                data.objective().as_ptr(),
                data.row_lower().as_ptr(),
                data.row_upper().as_ptr(),
            );
        }
        Ok(())
    }

    /// Read a problem from an MPS file, keeping names and failing on any
    /// format error.
    pub fn read_mps(&mut self, path: &Path) -> Result<()> {
        self.read_mps_with(path, true, false)
    }

    pub fn read_mps_with(
        &mut self,
        path: &Path,
        keep_names: bool,
        ignore_errors: bool,
    ) -> Result<()> {
        let c_path = marshal::path_to_c_string(path)?;
        let model = self.raw()?;
        // SAFETY: c_path lives across the call; the native side copies
        // what it needs.
        let rc = unsafe {
            (self.api().read_mps)(model, c_path.as_ptr(), keep_names as i32, ignore_errors as i32)
        };
        if rc != 0 {
            return Err(CoinError::native(
                "Clp_Simplex",
                "readMps",
                format!("could not read {} (code {rc})", path.display()),
            ));
        }
        Ok(())
    }

    /// Write the model to an MPS file.
    pub fn write_mps(&self, path: &Path) -> Result<()> {
        let f = self.api().write_mps.ok_or(CoinError::MissingSymbol {
            symbol: "Clp_writeMps",
        })?;
        let c_path = marshal::path_to_c_string(path)?;
        let model = self.raw()?;
        let obj_sense = unsafe { (self.api().optimization_direction)(model) };
        let rc = unsafe { f(model, c_path.as_ptr(), 0, 2, obj_sense) };
        if rc != 0 {
            return Err(CoinError::native(
                "Clp_Simplex",
                "writeMps",
                format!("could not write {} (code {rc})", path.display()),
            ));
        }
        Ok(())
    }

    // ----- solving ----------------------------------------------------

    /// Solve the initial relaxation; blocks until the simplex finishes
    /// or hits a configured limit.
    pub fn initial_solve(&mut self) -> Result<ClpStatus> {
        let model = self.raw()?;
        let rc = unsafe { (self.api().initial_solve)(model) };
        Ok(ClpStatus::from_raw(rc))
    }

    /// Primal simplex. `values_pass` requests a values pass from the
    /// current solution.
    pub fn primal(&mut self, values_pass: bool) -> Result<ClpStatus> {
        let model = self.raw()?;
        let rc = unsafe { (self.api().primal)(model, values_pass as i32) };
        Ok(ClpStatus::from_raw(rc))
    }

    /// Dual simplex.
    pub fn dual(&mut self, values_pass: bool) -> Result<ClpStatus> {
        let model = self.raw()?;
        let rc = unsafe { (self.api().dual)(model, values_pass as i32) };
        Ok(ClpStatus::from_raw(rc))
    }

    pub fn status(&self) -> Result<ClpStatus> {
        Ok(ClpStatus::from_raw(self.raw_status()?))
    }

    /// The native status code, passed through unchanged.
    pub fn raw_status(&self) -> Result<i32> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().status)(model) })
    }

    pub fn number_iterations(&self) -> Result<i32> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().number_iterations)(model) })
    }

    // ----- dimensions and objective -----------------------------------

    pub fn num_rows(&self) -> Result<usize> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().number_rows)(model) } as usize)
    }

    pub fn num_cols(&self) -> Result<usize> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().number_columns)(model) } as usize)
    }

    pub fn num_elements(&self) -> Result<usize> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().get_num_elements)(model) } as usize)
    }

    pub fn objective_value(&self) -> Result<f64> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().objective_value)(model) })
    }

    pub fn objective_offset(&self) -> Result<f64> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().objective_offset)(model) })
    }

    pub fn set_objective_offset(&mut self, offset: f64) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().set_objective_offset)(model, offset) };
        Ok(())
    }

    /// Objective sense: 1 minimize, -1 maximize, 0 ignore (native
    /// encoding, passed through unchanged).
    pub fn optimization_direction(&self) -> Result<f64> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().optimization_direction)(model) })
    }

    pub fn set_optimization_direction(&mut self, direction: f64) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().set_optimization_direction)(model, direction) };
        Ok(())
    }

    // ----- solution access --------------------------------------------

    /// Primal column solution, copied out.
    pub fn primal_column_solution(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().primal_column_solution)(model), n) })
    }

    /// Raw pointer into the live solution array; invalidated by the next
    /// call into the model.
    pub fn primal_column_solution_unsafe(&self) -> Result<*const f64> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().primal_column_solution)(model) })
    }

    /// Row activity, copied out.
    pub fn primal_row_solution(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_rows()?;
        Ok(unsafe { marshal::copy_f64((self.api().primal_row_solution)(model), n) })
    }

    /// Row duals (prices), copied out.
    pub fn dual_row_solution(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_rows()?;
        Ok(unsafe { marshal::copy_f64((self.api().dual_row_solution)(model), n) })
    }

    /// Reduced costs, copied out.
    pub fn dual_column_solution(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().dual_column_solution)(model), n) })
    }

    // ----- bounds and objective arrays --------------------------------

    pub fn column_lower(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().column_lower)(model), n) })
    }

    pub fn column_upper(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().column_upper)(model), n) })
    }

    pub fn objective_coefficients(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().objective)(model), n) })
    }

    pub fn row_lower(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_rows()?;
        Ok(unsafe { marshal::copy_f64((self.api().row_lower)(model), n) })
    }

    pub fn row_upper(&self) -> Result<Vec<f64>> {
        let model = self.raw()?;
        let n = self.num_rows()?;
        Ok(unsafe { marshal::copy_f64((self.api().row_upper)(model), n) })
    }

    /// Replace all column lower bounds.
    pub fn chg_column_lower(&mut self, bounds: &[f64]) -> Result<()> {
        marshal::check_len("collb", self.num_cols()?, bounds.len())?;
        let model = self.raw()?;
        unsafe { (self.api().chg_column_lower)(model, bounds.as_ptr()) };
        Ok(())
    }

    /// Replace all column upper bounds.
    pub fn chg_column_upper(&mut self, bounds: &[f64]) -> Result<()> {
        marshal::check_len("colub", self.num_cols()?, bounds.len())?;
        let model = self.raw()?;
        unsafe { (self.api().chg_column_upper)(model, bounds.as_ptr()) };
        Ok(())
    }

    /// Replace all objective coefficients.
    pub fn chg_objective(&mut self, coefficients: &[f64]) -> Result<()> {
        marshal::check_len("obj", self.num_cols()?, coefficients.len())?;
        let model = self.raw()?;
        unsafe { (self.api().chg_obj_coefficients)(model, coefficients.as_ptr()) };
        Ok(())
    }

    /// Replace all row lower bounds.
    pub fn chg_row_lower(&mut self, bounds: &[f64]) -> Result<()> {
        marshal::check_len("rowlb", self.num_rows()?, bounds.len())?;
        let model = self.raw()?;
        unsafe { (self.api().chg_row_lower)(model, bounds.as_ptr()) };
        Ok(())
    }

    /// Replace all row upper bounds.
    pub fn chg_row_upper(&mut self, bounds: &[f64]) -> Result<()> {
        marshal::check_len("rowub", self.num_rows()?, bounds.len())?;
        let model = self.raw()?;
        unsafe { (self.api().chg_row_upper)(model, bounds.as_ptr()) };
        Ok(())
    }

    // ----- matrix and row/column editing ------------------------------

    /// Copy the constraint matrix back out of the native model.
    pub fn matrix(&self) -> Result<PackedMatrix> {
        let model = self.raw()?;
        let cols = self.num_cols()?;
        let rows = self.num_rows()?;
        let elements = self.num_elements()?;
        // SAFETY: array lengths are the model's own current dimensions.
        let (starts, indices, values) = unsafe {
            (
                marshal::copy_i32((self.api().get_vector_starts)(model), cols + 1),
                marshal::copy_i32((self.api().get_indices)(model), elements),
                marshal::copy_f64((self.api().get_elements)(model), elements),
            )
        };
        PackedMatrix::from_csc(rows, starts, indices, values)
    }

    /// Append one row with the given bounds.
    pub fn add_row(&mut self, row: PackedVector<'_>, lower: f64, upper: f64) -> Result<()> {
        let model = self.raw()?;
        let starts: [CoinBigIndex; 2] = [0, row.len() as CoinBigIndex];
        let lower = [lower];
        let upper = [upper];
        unsafe {
            (self.api().add_rows)(
                model,
                1,
                lower.as_ptr(),
                upper.as_ptr(),
                starts.as_ptr(),
                row.indices().as_ptr(),
                row.values().as_ptr(),
            );
        }
        Ok(())
    }

    /// Append one column with the given bounds and objective
    /// coefficient.
    pub fn add_column(
        &mut self,
        column: PackedVector<'_>,
        lower: f64,
        upper: f64,
        objective: f64,
    ) -> Result<()> {
        let model = self.raw()?;
        let starts: [CoinBigIndex; 2] = [0, column.len() as CoinBigIndex];
        let lower = [lower];
        let upper = [upper];
        let objective = [objective];
        unsafe {
            (self.api().add_columns)(
                model,
                1,
                lower.as_ptr(),
                upper.as_ptr(),
                objective.as_ptr(),
                starts.as_ptr(),
                column.indices().as_ptr(),
                column.values().as_ptr(),
            );
        }
        Ok(())
    }

    pub fn delete_rows(&mut self, which: &[i32]) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().delete_rows)(model, which.len() as i32, which.as_ptr()) };
        Ok(())
    }

    pub fn delete_columns(&mut self, which: &[i32]) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().delete_columns)(model, which.len() as i32, which.as_ptr()) };
        Ok(())
    }

    // ----- controls ---------------------------------------------------

    pub fn log_level(&self) -> Result<i32> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().log_level)(model) })
    }

    pub fn set_log_level(&mut self, level: i32) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().set_log_level)(model, level) };
        Ok(())
    }

    pub fn maximum_iterations(&self) -> Result<i32> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().maximum_iterations)(model) })
    }

    pub fn set_maximum_iterations(&mut self, limit: i32) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().set_maximum_iterations)(model, limit) };
        Ok(())
    }

    pub fn maximum_seconds(&self) -> Result<f64> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().maximum_seconds)(model) })
    }

    pub fn set_maximum_seconds(&mut self, limit: f64) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().set_maximum_seconds)(model, limit) };
        Ok(())
    }

    /// Scaling mode: 0 off, 1 equilibrium, 2 geometric, 3 auto.
    pub fn set_scaling(&mut self, mode: i32) -> Result<()> {
        let model = self.raw()?;
        unsafe { (self.api().scaling)(model, mode) };
        Ok(())
    }

    pub fn scaling_flag(&self) -> Result<i32> {
        let model = self.raw()?;
        Ok(unsafe { (self.api().scaling_flag)(model) })
    }

    pub fn problem_name(&self) -> Result<String> {
        let f = self.api().problem_name.ok_or(CoinError::MissingSymbol {
            symbol: "Clp_problemName",
        })?;
        let model = self.raw()?;
        let mut buffer = [0 as c_char; 256];
        unsafe { f(model, buffer.len() as i32, buffer.as_mut_ptr()) };
        Ok(marshal::string_from_buffer(&buffer))
    }

    pub fn set_problem_name(&mut self, name: &str) -> Result<()> {
        let f = self.api().set_problem_name.ok_or(CoinError::MissingSymbol {
            symbol: "Clp_setProblemName",
        })?;
        let c_name = marshal::to_c_string(name)?;
        let model = self.raw()?;
        let rc = unsafe { f(model, name.len() as i32, c_name.as_ptr()) };
        if rc != 0 {
            return Err(CoinError::native(
                "Clp_Simplex",
                "setProblemName",
                format!("rejected name {name:?} (code {rc})"),
            ));
        }
        Ok(())
    }

    // ----- message handler --------------------------------------------

    /// Install a handler receiving every message the model emits. Any
    /// previously installed handler is dropped first.
    pub fn set_message_handler<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&MessageEvent) + 'static,
    {
        self.clear_message_handler()?;
        let model = self.raw()?;
        self.message_handler = Some(register_clp(self.handle.api(), model, Box::new(handler)));
        Ok(())
    }

    pub fn clear_message_handler(&mut self) -> Result<()> {
        self.message_handler = None;
        Ok(())
    }

    // ----- warm start -------------------------------------------------

    /// Capture the current basis as a managed snapshot.
    pub fn warm_start(&self) -> Result<WarmStartBasis> {
        let get_col = self.api().get_column_status.ok_or(CoinError::MissingSymbol {
            symbol: "Clp_getColumnStatus",
        })?;
        let get_row = self.api().get_row_status.ok_or(CoinError::MissingSymbol {
            symbol: "Clp_getRowStatus",
        })?;
        let model = self.raw()?;

        let column_status = (0..self.num_cols()?)
            .map(|j| BasisStatus::from_raw(unsafe { get_col(model, j as i32) }))
            .collect();
        let row_status = (0..self.num_rows()?)
            .map(|i| BasisStatus::from_raw(unsafe { get_row(model, i as i32) }))
            .collect();
        Ok(WarmStartBasis::from_parts(column_status, row_status))
    }

    /// Apply a previously captured basis; the snapshot must match the
    /// model's current dimensions.
    pub fn set_warm_start(&mut self, basis: &WarmStartBasis) -> Result<()> {
        let set_col = self.api().set_column_status.ok_or(CoinError::MissingSymbol {
            symbol: "Clp_setColumnStatus",
        })?;
        let set_row = self.api().set_row_status.ok_or(CoinError::MissingSymbol {
            symbol: "Clp_setRowStatus",
        })?;
        marshal::check_len("column status", self.num_cols()?, basis.num_cols())?;
        marshal::check_len("row status", self.num_rows()?, basis.num_rows())?;
        let model = self.raw()?;

        for (j, status) in basis.column_status().iter().enumerate() {
            unsafe { set_col(model, j as i32, status.raw()) };
        }
        for (i, status) in basis.row_status().iter().enumerate() {
            unsafe { set_row(model, i as i32, status.raw()) };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for raw in -1..6 {
            assert_eq!(ClpStatus::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn test_unknown_status_passes_through() {
        assert_eq!(ClpStatus::from_raw(77), ClpStatus::Unknown(77));
        assert_eq!(ClpStatus::Unknown(77).raw(), 77);
    }
}
