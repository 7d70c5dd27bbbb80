//! `CbcModel` proxy — the mixed-integer model and branch-and-cut solver
//!
//! Besides plain call forwarding this module carries the two places where
//! control genuinely flows both ways across the boundary:
//!
//! - **cut generators**: a managed generator callback is handed to the
//!   native search together with a context pointer. Adding a generator
//!   transfers ownership of its boxed state into the model, which lists
//!   it and releases it when the model goes away.
//! - **solution events**: the native search reports every improved
//!   incumbent; the handler's return value is the action code handed
//!   back to native code (continue or stop at the next opportunity).
//!
//! Both trampolines re-wrap the invoking native pointer in a fresh
//! non-owning proxy for the duration of the callback and never let a
//! panic escape into native code.

use std::ffi::c_void;
use std::os::raw::{c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::error::{CoinError, Result};
use crate::ffi::cbc::Cbc_Model;
use crate::ffi::{CbcApi, CoinLibrary};
use crate::handle::{NativeClass, NativeHandle};
use crate::marshal;
use crate::matrix::{PackedMatrix, PackedVector, ProblemData};
use crate::message::{MessageEvent, MessageGuard, register_cbc};
use crate::osi::{OsiSolverView, downcast};

/// Final status of a branch-and-cut search, decoded from the native code
/// (-1 not started, 0 finished, 1 stopped on a limit, 2 difficulties).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CbcStatus {
    NotStarted,
    Finished,
    StoppedOnLimit,
    Difficulties,
    Unknown(i32),
}

impl CbcStatus {
    pub fn from_raw(raw: i32) -> CbcStatus {
        match raw {
            -1 => CbcStatus::NotStarted,
            0 => CbcStatus::Finished,
            1 => CbcStatus::StoppedOnLimit,
            2 => CbcStatus::Difficulties,
            other => CbcStatus::Unknown(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            CbcStatus::NotStarted => -1,
            CbcStatus::Finished => 0,
            CbcStatus::StoppedOnLimit => 1,
            CbcStatus::Difficulties => 2,
            CbcStatus::Unknown(raw) => *raw,
        }
    }
}

/// Sense of a row or row cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl RowSense {
    fn as_char(self) -> c_char {
        match self {
            RowSense::LessEqual => b'L' as c_char,
            RowSense::GreaterEqual => b'G' as c_char,
            RowSense::Equal => b'E' as c_char,
        }
    }
}

/// Action code a solution handler returns to native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveAction {
    /// Keep searching.
    Continue,
    /// Stop the search at the next opportunity.
    Stop,
}

impl SolveAction {
    fn raw(self) -> c_int {
        match self {
            SolveAction::Continue => 0,
            SolveAction::Stop => 1,
        }
    }
}

/// An improved incumbent reported by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionEvent {
    pub objective: f64,
    pub values: Vec<f64>,
    pub column_names: Vec<String>,
}

/// Scheduling of a cut generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutGeneratorSettings {
    pub name: String,
    /// How often the generator runs, in the native encoding passed
    /// through unchanged: 0 or 1 means every node, >1 every that many
    /// nodes, negative values are adaptive and may be switched off by
    /// the search, -99 means root node only.
    pub how_often: i32,
    /// Also invoke the generator when an integer solution is found.
    pub at_solution: bool,
}

impl CutGeneratorSettings {
    pub fn new(name: impl Into<String>) -> Self {
        CutGeneratorSettings {
            name: name.into(),
            how_often: 1,
            at_solution: false,
        }
    }
}

/// Built-in native cut generator families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutClass {
    Probing,
    Gomory,
    Knapsack,
    Clique,
    FlowCover,
    MixedIntegerRounding,
}

impl CutClass {
    fn parameter_name(self) -> &'static str {
        match self {
            CutClass::Probing => "probingCuts",
            CutClass::Gomory => "gomoryCuts",
            CutClass::Knapsack => "knapsackCuts",
            CutClass::Clique => "cliqueCuts",
            CutClass::FlowCover => "flowCoverCuts",
            CutClass::MixedIntegerRounding => "mixedIntegerRoundingCuts",
        }
    }
}

/// Scheduling of a built-in cut generator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutControl {
    Off,
    On,
    RootOnly,
    IfMove,
    ForceOn,
}

impl CutControl {
    fn parameter_value(self) -> &'static str {
        match self {
            CutControl::Off => "off",
            CutControl::On => "on",
            CutControl::RootOnly => "root",
            CutControl::IfMove => "ifmove",
            CutControl::ForceOn => "forceOn",
        }
    }
}

/// Search strategy knobs applied in one shot, replacing the native
/// strategy object hierarchy with a plain configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveStrategy {
    pub cuts_only_at_root: bool,
    pub number_strong: i32,
    pub number_before_trust: i32,
    pub print_level: i32,
}

impl Default for SolveStrategy {
    fn default() -> Self {
        SolveStrategy {
            cuts_only_at_root: true,
            number_strong: 5,
            number_before_trust: 0,
            print_level: 0,
        }
    }
}

/// Buffer the native search hands to cut generators; new cuts go in
/// here.
pub struct CutBuffer {
    api: Arc<CbcApi>,
    cuts: *mut c_void,
}

impl CutBuffer {
    pub fn add_row_cut(&mut self, cut: PackedVector<'_>, sense: RowSense, rhs: f64) -> Result<()> {
        let f = self.api.osi_cuts_add_row_cut.ok_or(CoinError::MissingSymbol {
            symbol: "OsiCuts_addRowCut",
        })?;
        // SAFETY: cuts is the live OsiCuts buffer of the current
        // callback invocation; the vector arrays outlive the call.
        unsafe {
            f(
                self.cuts,
                cut.len() as c_int,
                cut.indices().as_ptr(),
                cut.values().as_ptr(),
                sense.as_char(),
                rhs,
            );
        }
        Ok(())
    }
}

type CutCallbackFn = Box<dyn FnMut(&OsiSolverView, &mut CutBuffer)>;

struct CutState {
    api: Arc<CbcApi>,
    callback: CutCallbackFn,
}

pub(crate) struct CutStateClass;

impl NativeClass for CutStateClass {
    type Api = CbcApi;
    const NAME: &'static str = "CbcCutGeneratorState";

    unsafe fn release(_api: &CbcApi, ptr: NonNull<c_void>) {
        // The "native object" here is the boxed trampoline state the
        // model took ownership of.
        unsafe { drop(Box::from_raw(ptr.as_ptr() as *mut CutState)) };
    }
}

/// A managed cut generator, ready to be handed to a model. Adding it to
/// a model transfers ownership of its state; the generator value itself
/// is consumed.
pub struct CutGenerator {
    settings: CutGeneratorSettings,
    state: NativeHandle<CutStateClass>,
}

impl CutGenerator {
    pub fn new<F>(
        library: &CoinLibrary,
        settings: CutGeneratorSettings,
        generator: F,
    ) -> Result<CutGenerator>
    where
        F: FnMut(&OsiSolverView, &mut CutBuffer) + 'static,
    {
        let api = library.cbc()?;
        let state = Box::into_raw(Box::new(CutState {
            api: api.clone(),
            callback: Box::new(generator),
        }));
        Ok(CutGenerator {
            settings,
            state: NativeHandle::owned(api, state as *mut c_void)?,
        })
    }

    pub fn settings(&self) -> &CutGeneratorSettings {
        &self.settings
    }
}

unsafe extern "C" fn cut_trampoline(osi: *mut c_void, cuts: *mut c_void, app: *mut c_void) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: app is the CutState whose ownership the model holds;
        // the search only invokes the callback while the model is alive.
        let state = unsafe { &mut *(app as *mut CutState) };
        // The search hands cut generators the continuous relaxation,
        // which is a Clp solver interface. Wrap it fresh, non-owning.
        let Ok(view) = downcast(state.api.clone(), osi, "OsiClpSolverInterface") else {
            return;
        };
        let mut buffer = CutBuffer {
            api: state.api.clone(),
            cuts,
        };
        (state.callback)(&view, &mut buffer);
    }));
}

type SolutionHandlerFn = Box<dyn FnMut(&CbcModelView, &SolutionEvent) -> SolveAction>;

struct IncumbentState {
    api: Arc<CbcApi>,
    handler: SolutionHandlerFn,
}

pub(crate) struct IncumbentStateClass;

impl NativeClass for IncumbentStateClass {
    type Api = CbcApi;
    const NAME: &'static str = "CbcSolutionHandlerState";

    unsafe fn release(_api: &CbcApi, ptr: NonNull<c_void>) {
        unsafe { drop(Box::from_raw(ptr.as_ptr() as *mut IncumbentState)) };
    }
}

unsafe extern "C" fn incumbent_trampoline(
    model: *mut c_void,
    objective: f64,
    number_columns: c_int,
    column_names: *mut *mut c_char,
    values: *mut f64,
    app: *mut c_void,
) -> c_int {
    let action = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: app is the IncumbentState owned by the model.
        let state = unsafe { &mut *(app as *mut IncumbentState) };
        // The invoking model may be an internal clone of the one the
        // handler was registered on, so wrap it fresh for this call.
        let Ok(view) = CbcModelView::wrap(state.api.clone(), model as *mut Cbc_Model) else {
            return SolveAction::Continue.raw();
        };
        let n = number_columns.max(0) as usize;
        // SAFETY: lengths come from the same native call as the arrays.
        let event = unsafe {
            SolutionEvent {
                objective,
                values: marshal::copy_f64(values, n),
                column_names: marshal::copy_strings(column_names, n),
            }
        };
        (state.handler)(&view, &event).raw()
    }));
    action.unwrap_or(SolveAction::Continue.raw())
}

pub(crate) struct CbcModelClass;

impl NativeClass for CbcModelClass {
    type Api = CbcApi;
    const NAME: &'static str = "Cbc_Model";

    unsafe fn release(api: &CbcApi, ptr: NonNull<c_void>) {
        unsafe { (api.delete_model)(ptr.as_ptr() as *mut Cbc_Model) };
    }
}

/// Non-owning, read-only view of a native model, handed to solution
/// handlers.
pub struct CbcModelView {
    handle: NativeHandle<CbcModelClass>,
}

impl CbcModelView {
    fn wrap(api: Arc<CbcApi>, ptr: *mut Cbc_Model) -> Result<CbcModelView> {
        Ok(CbcModelView {
            handle: NativeHandle::borrowed(api, ptr as *mut c_void)?,
        })
    }

    fn raw(&self) -> Result<*mut Cbc_Model> {
        Ok(self.handle.as_raw()?.as_ptr() as *mut Cbc_Model)
    }

    pub fn num_cols(&self) -> Result<usize> {
        Ok(unsafe { (self.handle.api().get_num_cols)(self.raw()?) } as usize)
    }

    pub fn num_rows(&self) -> Result<usize> {
        Ok(unsafe { (self.handle.api().get_num_rows)(self.raw()?) } as usize)
    }

    pub fn obj_value(&self) -> Result<f64> {
        Ok(unsafe { (self.handle.api().get_obj_value)(self.raw()?) })
    }
}

struct RegisteredCutGenerator {
    settings: CutGeneratorSettings,
    // Owning handle over the boxed generator state; released when the
    // model goes away.
    _state: NativeHandle<CutStateClass>,
}

/// Proxy over a native `Cbc_Model`.
pub struct CbcModel {
    // Callback bookkeeping is declared before the handle so it is torn
    // down while the native model is still alive.
    message_handler: Option<MessageGuard>,
    incumbent_state: Option<NativeHandle<IncumbentStateClass>>,
    cut_generators: Vec<RegisteredCutGenerator>,
    handle: NativeHandle<CbcModelClass>,
}

impl CbcModel {
    /// Construct a fresh, empty native model; the proxy owns it.
    pub fn new(library: &CoinLibrary) -> Result<CbcModel> {
        let api = library.cbc()?;
        let ptr = unsafe { (api.new_model)() };
        Ok(CbcModel {
            message_handler: None,
            incumbent_state: None,
            cut_generators: Vec::new(),
            handle: NativeHandle::owned(api, ptr as *mut c_void)?,
        })
    }

    fn api(&self) -> &CbcApi {
        self.handle.api()
    }

    fn raw(&self) -> Result<*mut Cbc_Model> {
        Ok(self.handle.as_raw()?.as_ptr() as *mut Cbc_Model)
    }

    /// Throw away the loaded problem and all registered callbacks,
    /// swapping in a fresh native model.
    pub fn reset(&mut self) -> Result<()> {
        self.message_handler = None;
        self.incumbent_state = None;
        self.cut_generators.clear();
        let fresh = unsafe { (self.api().new_model)() };
        self.handle.replace(fresh as *mut c_void, true)
    }

    // ----- problem loading and file I/O -------------------------------

    /// Load a complete problem in compressed-column form. Columns start
    /// out continuous; mark integers afterwards.
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

    pub fn read_mps(&mut self, path: &Path) -> Result<()> {
        let c_path = marshal::path_to_c_string(path)?;
        let model = self.raw()?;
        let rc = unsafe { (self.api().read_mps)(model, c_path.as_ptr()) };
        if rc != 0 {
            return Err(CoinError::native(
                "Cbc_Model",
                "readMps",
                format!("could not read {} (code {rc})", path.display()),
            ));
        }
        Ok(())
    }

    pub fn write_mps(&self, path: &Path) -> Result<()> {
        let c_path = marshal::path_to_c_string(path)?;
        let model = self.raw()?;
        unsafe { (self.api().write_mps)(model, c_path.as_ptr()) };
        Ok(())
    }

    pub fn read_lp(&mut self, path: &Path) -> Result<()> {
        let f = self.api().read_lp.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_readLp",
        })?;
        let c_path = marshal::path_to_c_string(path)?;
        let model = self.raw()?;
        let rc = unsafe { f(model, c_path.as_ptr()) };
        if rc != 0 {
            return Err(CoinError::native(
                "Cbc_Model",
                "readLp",
                format!("could not read {} (code {rc})", path.display()),
            ));
        }
        Ok(())
    }

    pub fn write_lp(&self, path: &Path) -> Result<()> {
        let f = self.api().write_lp.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_writeLp",
        })?;
        let c_path = marshal::path_to_c_string(path)?;
        let model = self.raw()?;
        unsafe { f(model, c_path.as_ptr()) };
        Ok(())
    }

    // ----- column typing and editing ----------------------------------

    pub fn num_cols(&self) -> Result<usize> {
        Ok(unsafe { (self.api().get_num_cols)(self.raw()?) } as usize)
    }

    pub fn num_rows(&self) -> Result<usize> {
        Ok(unsafe { (self.api().get_num_rows)(self.raw()?) } as usize)
    }

    pub fn num_elements(&self) -> Result<usize> {
        Ok(unsafe { (self.api().get_num_elements)(self.raw()?) } as usize)
    }

    pub fn num_integers(&self) -> Result<usize> {
        Ok(unsafe { (self.api().get_num_integers)(self.raw()?) } as usize)
    }

    pub fn set_integer(&mut self, col: usize) -> Result<()> {
        marshal::check_index("column", self.num_cols()?, col)?;
        unsafe { (self.api().set_integer)(self.raw()?, col as c_int) };
        Ok(())
    }

    pub fn set_continuous(&mut self, col: usize) -> Result<()> {
        marshal::check_index("column", self.num_cols()?, col)?;
        unsafe { (self.api().set_continuous)(self.raw()?, col as c_int) };
        Ok(())
    }

    /// True if the column is integer (binary or general).
    pub fn is_integer(&self, col: usize) -> Result<bool> {
        marshal::check_index("column", self.num_cols()?, col)?;
        Ok(unsafe { (self.api().is_integer)(self.raw()?, col as c_int) } != 0)
    }

    pub fn set_col_lower(&mut self, col: usize, bound: f64) -> Result<()> {
        marshal::check_index("column", self.num_cols()?, col)?;
        unsafe { (self.api().set_col_lower)(self.raw()?, col as c_int, bound) };
        Ok(())
    }

    pub fn set_col_upper(&mut self, col: usize, bound: f64) -> Result<()> {
        marshal::check_index("column", self.num_cols()?, col)?;
        unsafe { (self.api().set_col_upper)(self.raw()?, col as c_int, bound) };
        Ok(())
    }

    pub fn set_obj_coeff(&mut self, col: usize, value: f64) -> Result<()> {
        marshal::check_index("column", self.num_cols()?, col)?;
        unsafe { (self.api().set_obj_coeff)(self.raw()?, col as c_int, value) };
        Ok(())
    }

    /// Append one row. Needs the 2.10-series builder entry points.
    pub fn add_row(
        &mut self,
        name: &str,
        row: PackedVector<'_>,
        sense: RowSense,
        rhs: f64,
    ) -> Result<()> {
        let f = self.api().add_row.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_addRow",
        })?;
        let c_name = marshal::to_c_string(name)?;
        let model = self.raw()?;
        unsafe {
            f(
                model,
                c_name.as_ptr(),
                row.len() as c_int,
                row.indices().as_ptr(),
                row.values().as_ptr(),
                sense.as_char(),
                rhs,
            );
        }
        Ok(())
    }

    /// Append one column. Needs the 2.10-series builder entry points.
    #[allow(clippy::too_many_arguments)]
    pub fn add_col(
        &mut self,
        name: &str,
        lower: f64,
        upper: f64,
        objective: f64,
        integer: bool,
        rows: PackedVector<'_>,
    ) -> Result<()> {
        let f = self.api().add_col.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_addCol",
        })?;
        let c_name = marshal::to_c_string(name)?;
        let model = self.raw()?;
        unsafe {
            f(
                model,
                c_name.as_ptr(),
                lower,
                upper,
                objective,
                integer as c_char,
                rows.len() as c_int,
                rows.indices().as_ptr(),
                rows.values().as_ptr(),
            );
        }
        Ok(())
    }

    // ----- names ------------------------------------------------------

    pub fn row_name(&self, row: usize) -> Result<String> {
        let f = self.api().get_row_name.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_getRowName",
        })?;
        marshal::check_index("row", self.num_rows()?, row)?;
        let model = self.raw()?;
        let mut buffer = [0 as c_char; 256];
        unsafe { f(model, row as c_int, buffer.as_mut_ptr(), buffer.len()) };
        Ok(marshal::string_from_buffer(&buffer))
    }

    pub fn col_name(&self, col: usize) -> Result<String> {
        let f = self.api().get_col_name.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_getColName",
        })?;
        marshal::check_index("column", self.num_cols()?, col)?;
        let model = self.raw()?;
        let mut buffer = [0 as c_char; 256];
        unsafe { f(model, col as c_int, buffer.as_mut_ptr(), buffer.len()) };
        Ok(marshal::string_from_buffer(&buffer))
    }

    pub fn set_row_name(&mut self, row: usize, name: &str) -> Result<()> {
        let f = self.api().set_row_name.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_setRowName",
        })?;
        marshal::check_index("row", self.num_rows()?, row)?;
        let c_name = marshal::to_c_string(name)?;
        unsafe { f(self.raw()?, row as c_int, c_name.as_ptr()) };
        Ok(())
    }

    pub fn set_col_name(&mut self, col: usize, name: &str) -> Result<()> {
        let f = self.api().set_col_name.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_setColName",
        })?;
        marshal::check_index("column", self.num_cols()?, col)?;
        let c_name = marshal::to_c_string(name)?;
        unsafe { f(self.raw()?, col as c_int, c_name.as_ptr()) };
        Ok(())
    }

    // ----- solving ----------------------------------------------------

    /// Run the branch-and-cut search. Blocks until the search finishes
    /// or hits a configured limit; a registered solution handler can
    /// request an early stop.
    pub fn solve(&mut self) -> Result<CbcStatus> {
        let model = self.raw()?;
        let rc = unsafe { (self.api().solve)(model) };
        Ok(CbcStatus::from_raw(rc))
    }

    pub fn status(&self) -> Result<CbcStatus> {
        Ok(CbcStatus::from_raw(self.raw_status()?))
    }

    /// The native status code, passed through unchanged (0 finished,
    /// 1 stopped on limit, 2 difficulties).
    pub fn raw_status(&self) -> Result<i32> {
        Ok(unsafe { (self.api().status)(self.raw()?) })
    }

    pub fn secondary_status(&self) -> Result<i32> {
        Ok(unsafe { (self.api().secondary_status)(self.raw()?) })
    }

    pub fn is_proven_optimal(&self) -> Result<bool> {
        Ok(unsafe { (self.api().is_proven_optimal)(self.raw()?) } != 0)
    }

    pub fn is_proven_infeasible(&self) -> Result<bool> {
        Ok(unsafe { (self.api().is_proven_infeasible)(self.raw()?) } != 0)
    }

    pub fn is_abandoned(&self) -> Result<bool> {
        Ok(unsafe { (self.api().is_abandoned)(self.raw()?) } != 0)
    }

    pub fn obj_value(&self) -> Result<f64> {
        Ok(unsafe { (self.api().get_obj_value)(self.raw()?) })
    }

    /// Objective sense: 1 minimize, -1 maximize (native encoding).
    pub fn obj_sense(&self) -> Result<f64> {
        Ok(unsafe { (self.api().get_obj_sense)(self.raw()?) })
    }

    pub fn set_obj_sense(&mut self, sense: f64) -> Result<()> {
        unsafe { (self.api().set_obj_sense)(self.raw()?, sense) };
        Ok(())
    }

    // ----- solution access --------------------------------------------

    /// Best column solution, copied out.
    pub fn col_solution(&self) -> Result<Vec<f64>> {
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_col_solution)(self.raw()?), n) })
    }

    /// Raw pointer into the native solution array; invalidated by the
    /// next call into the model.
    pub fn col_solution_unsafe(&self) -> Result<*const f64> {
        Ok(unsafe { (self.api().get_col_solution)(self.raw()?) })
    }

    pub fn row_activity(&self) -> Result<Vec<f64>> {
        let n = self.num_rows()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_row_activity)(self.raw()?), n) })
    }

    pub fn reduced_cost(&self) -> Result<Vec<f64>> {
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_reduced_cost)(self.raw()?), n) })
    }

    pub fn col_lower(&self) -> Result<Vec<f64>> {
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_col_lower)(self.raw()?), n) })
    }

    pub fn col_upper(&self) -> Result<Vec<f64>> {
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_col_upper)(self.raw()?), n) })
    }

    pub fn obj_coefficients(&self) -> Result<Vec<f64>> {
        let n = self.num_cols()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_obj_coefficients)(self.raw()?), n) })
    }

    pub fn row_lower(&self) -> Result<Vec<f64>> {
        let n = self.num_rows()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_row_lower)(self.raw()?), n) })
    }

    pub fn row_upper(&self) -> Result<Vec<f64>> {
        let n = self.num_rows()?;
        Ok(unsafe { marshal::copy_f64((self.api().get_row_upper)(self.raw()?), n) })
    }

    /// Copy the constraint matrix back out of the native model.
    pub fn matrix(&self) -> Result<PackedMatrix> {
        let model = self.raw()?;
        let cols = self.num_cols()?;
        let rows = self.num_rows()?;
        let elements = self.num_elements()?;
        let (starts, indices, values) = unsafe {
            (
                marshal::copy_i32((self.api().get_vector_starts)(model), cols + 1),
                marshal::copy_i32((self.api().get_indices)(model), elements),
                marshal::copy_f64((self.api().get_elements)(model), elements),
            )
        };
        PackedMatrix::from_csc(rows, starts, indices, values)
    }

    // ----- controls ---------------------------------------------------

    /// Set a named solver parameter, e.g. `("cuts", "root")`.
    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        let f = self.api().set_parameter.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_setParameter",
        })?;
        let c_name = marshal::to_c_string(name)?;
        let c_value = marshal::to_c_string(value)?;
        unsafe { f(self.raw()?, c_name.as_ptr(), c_value.as_ptr()) };
        Ok(())
    }

    /// Schedule one of the built-in cut generator families.
    pub fn set_cut_parameter(&mut self, class: CutClass, control: CutControl) -> Result<()> {
        self.set_parameter(class.parameter_name(), control.parameter_value())
    }

    /// Apply a search strategy in one shot.
    pub fn apply_strategy(&mut self, strategy: SolveStrategy) -> Result<()> {
        self.set_parameter("strong", &strategy.number_strong.to_string())?;
        self.set_parameter("trust", &strategy.number_before_trust.to_string())?;
        self.set_parameter("log", &strategy.print_level.to_string())?;
        self.set_parameter("cuts", if strategy.cuts_only_at_root { "root" } else { "on" })
    }

    pub fn set_maximum_seconds(&mut self, limit: f64) -> Result<()> {
        let f = self.api().set_maximum_seconds.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_setMaximumSeconds",
        })?;
        unsafe { f(self.raw()?, limit) };
        Ok(())
    }

    pub fn set_log_level(&mut self, level: i32) -> Result<()> {
        let f = self.api().set_log_level.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_setLogLevel",
        })?;
        unsafe { f(self.raw()?, level) };
        Ok(())
    }

    // ----- underlying solver ------------------------------------------

    /// Non-owning view of the continuous solver behind the model. The
    /// native model keeps ownership of the solver.
    pub fn solver(&self) -> Result<OsiSolverView> {
        let f = self.api().get_solver_ptr.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_getSolverPtr",
        })?;
        let ptr = unsafe { f(self.raw()?) };
        downcast(self.handle.api().clone(), ptr, "OsiClpSolverInterface")
    }

    // ----- cut generators ---------------------------------------------

    /// Hand a managed cut generator to the search. Ownership of the
    /// generator's state transfers into the model: the model lists it,
    /// invokes it during the search, and releases it when the model goes
    /// away.
    pub fn add_cut_generator(&mut self, mut generator: CutGenerator) -> Result<()> {
        let f = self.api().add_cut_callback.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_addCutCallback",
        })?;
        let c_name = marshal::to_c_string(&generator.settings.name)?;
        let model = self.raw()?;
        let state = generator.state.transfer()?;
        unsafe {
            f(
                model,
                cut_trampoline,
                c_name.as_ptr(),
                state.as_ptr(),
                generator.settings.how_often,
                generator.settings.at_solution as c_char,
            );
        }
        self.cut_generators.push(RegisteredCutGenerator {
            settings: generator.settings.clone(),
            _state: NativeHandle::owned(self.handle.api().clone(), state.as_ptr())?,
        });
        Ok(())
    }

    pub fn number_cut_generators(&self) -> usize {
        self.cut_generators.len()
    }

    /// Settings of the registered cut generators, in registration order.
    pub fn cut_generators(&self) -> Vec<&CutGeneratorSettings> {
        self.cut_generators.iter().map(|g| &g.settings).collect()
    }

    // ----- callbacks --------------------------------------------------

    /// Install a handler invoked for every improved solution the search
    /// finds; its return value decides whether the search continues.
    pub fn set_solution_handler<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&CbcModelView, &SolutionEvent) -> SolveAction + 'static,
    {
        let f = self.api().add_inc_callback.ok_or(CoinError::MissingSymbol {
            symbol: "Cbc_addIncCallback",
        })?;
        let api = self.handle.api().clone();
        let state = Box::into_raw(Box::new(IncumbentState {
            api: api.clone(),
            handler: Box::new(handler),
        }));
        let model = self.raw()?;
        unsafe { f(model, incumbent_trampoline, state as *mut c_void) };
        // Replacing an existing handler: the native side now points at
        // the new state, so the old one can be released.
        self.incumbent_state = Some(NativeHandle::owned(api, state as *mut c_void)?);
        Ok(())
    }

    /// Install a handler receiving every message the model emits.
    pub fn set_message_handler<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&MessageEvent) + 'static,
    {
        self.message_handler = None;
        let model = self.raw()?;
        self.message_handler = Some(register_cbc(self.handle.api(), model, Box::new(handler)));
        Ok(())
    }

    pub fn clear_message_handler(&mut self) -> Result<()> {
        self.message_handler = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for raw in -1..3 {
            assert_eq!(CbcStatus::from_raw(raw).raw(), raw);
        }
        assert_eq!(CbcStatus::from_raw(9), CbcStatus::Unknown(9));
    }

    #[test]
    fn test_row_sense_encoding() {
        assert_eq!(RowSense::LessEqual.as_char(), b'L' as c_char);
        assert_eq!(RowSense::GreaterEqual.as_char(), b'G' as c_char);
        assert_eq!(RowSense::Equal.as_char(), b'E' as c_char);
    }

    #[test]
    fn test_solve_action_codes() {
        assert_eq!(SolveAction::Continue.raw(), 0);
        assert_eq!(SolveAction::Stop.raw(), 1);
    }

    #[test]
    fn test_cut_generator_settings_defaults() {
        let settings = CutGeneratorSettings::new("lift-and-project");
        assert_eq!(settings.name, "lift-and-project");
        assert_eq!(settings.how_often, 1);
        assert!(!settings.at_solution);
    }

    #[test]
    fn test_cut_class_parameter_names() {
        assert_eq!(CutClass::Gomory.parameter_name(), "gomoryCuts");
        assert_eq!(CutControl::RootOnly.parameter_value(), "root");
    }
}
