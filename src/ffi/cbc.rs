//! Function table for the Cbc C interface (`Cbc_C_Interface.h`)
//!
//! Besides the `Cbc_*` model entry points this table carries the `Osi_*`
//! helpers operating on raw solver-interface pointers and the `OsiCuts_*`
//! helper used from cut callbacks. All of those arrived with the 2.10
//! series, so they are optional symbols.

use std::os::raw::{c_char, c_int, c_void};

use libloading::Library;

use super::{CoinBigIndex, open_library, opt, sym};
use crate::error::Result;

/// Opaque native model handle of the Cbc C interface.
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct Cbc_Model {
    _private: [u8; 0],
}

/// Message callback; same shape as the Clp one, no user-data argument.
pub type CbcMessageCallback = unsafe extern "C" fn(
    model: *mut Cbc_Model,
    message_number: c_int,
    n_double: c_int,
    v_double: *const f64,
    n_int: c_int,
    v_int: *const c_int,
    n_string: c_int,
    v_string: *mut *mut c_char,
);

/// Cut callback. `osi_solver` is the continuous relaxation at the current
/// node, `osi_cuts` the buffer new cuts go into, `app_data` the context
/// pointer registered together with the callback.
pub type CbcCutCallback = unsafe extern "C" fn(
    osi_solver: *mut c_void,
    osi_cuts: *mut c_void,
    app_data: *mut c_void,
);

/// Incumbent callback, invoked when the search finds an improved
/// solution. The return value is the action code handed back to native
/// code: zero continues the search, nonzero requests a stop at the next
/// opportunity.
pub type CbcIncumbentCallback = unsafe extern "C" fn(
    model: *mut c_void,
    objective: f64,
    number_columns: c_int,
    column_names: *mut *mut c_char,
    values: *mut f64,
    app_data: *mut c_void,
) -> c_int;

const CBC_CANDIDATES: &[&str] = &[
    "libCbcSolver.so.3",
    "libCbcSolver.so",
    "libCbcSolver.dylib",
    "CbcSolver.dll",
    "libCbcSolver-0.dll",
    "libCbc.so",
];

/// Entry points resolved from `libCbcSolver`.
pub struct CbcApi {
    pub new_model: unsafe extern "C" fn() -> *mut Cbc_Model,
    pub delete_model: unsafe extern "C" fn(*mut Cbc_Model),
    #[allow(clippy::type_complexity)]
    pub load_problem: unsafe extern "C" fn(
        *mut Cbc_Model,
        c_int,                // numcols
        c_int,                // numrows
        *const CoinBigIndex,  // start
        *const c_int,         // index
        *const f64,           // value
        *const f64,           // collb
        *const f64,           // colub
        *const f64,           // obj
        *const f64,           // rowlb
        *const f64,           // rowub
    ),
    pub read_mps: unsafe extern "C" fn(*mut Cbc_Model, *const c_char) -> c_int,
    pub write_mps: unsafe extern "C" fn(*mut Cbc_Model, *const c_char),

    pub solve: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub status: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub secondary_status: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub is_proven_optimal: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub is_proven_infeasible: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub is_abandoned: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,

    pub get_obj_value: unsafe extern "C" fn(*mut Cbc_Model) -> f64,
    pub get_obj_sense: unsafe extern "C" fn(*mut Cbc_Model) -> f64,
    pub set_obj_sense: unsafe extern "C" fn(*mut Cbc_Model, f64),
    pub get_col_solution: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,
    pub get_row_activity: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,
    pub get_reduced_cost: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,
    pub get_col_lower: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,
    pub get_col_upper: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,
    pub get_obj_coefficients: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,
    pub get_row_lower: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,
    pub get_row_upper: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,

    pub get_num_cols: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub get_num_rows: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub get_num_elements: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub get_num_integers: unsafe extern "C" fn(*mut Cbc_Model) -> c_int,
    pub get_vector_starts: unsafe extern "C" fn(*mut Cbc_Model) -> *const CoinBigIndex,
    pub get_indices: unsafe extern "C" fn(*mut Cbc_Model) -> *const c_int,
    pub get_elements: unsafe extern "C" fn(*mut Cbc_Model) -> *const f64,

    pub set_col_lower: unsafe extern "C" fn(*mut Cbc_Model, c_int, f64),
    pub set_col_upper: unsafe extern "C" fn(*mut Cbc_Model, c_int, f64),
    pub set_obj_coeff: unsafe extern "C" fn(*mut Cbc_Model, c_int, f64),
    pub set_continuous: unsafe extern "C" fn(*mut Cbc_Model, c_int),
    pub set_integer: unsafe extern "C" fn(*mut Cbc_Model, c_int),
    pub is_integer: unsafe extern "C" fn(*mut Cbc_Model, c_int) -> c_int,

    pub register_call_back: unsafe extern "C" fn(*mut Cbc_Model, CbcMessageCallback),
    pub clear_call_back: unsafe extern "C" fn(*mut Cbc_Model),

    // 2.10-series additions.
    pub read_lp: Option<unsafe extern "C" fn(*mut Cbc_Model, *const c_char) -> c_int>,
    pub write_lp: Option<unsafe extern "C" fn(*mut Cbc_Model, *const c_char)>,
    pub set_parameter:
        Option<unsafe extern "C" fn(*mut Cbc_Model, *const c_char, *const c_char)>,
    pub set_maximum_seconds: Option<unsafe extern "C" fn(*mut Cbc_Model, f64)>,
    pub set_log_level: Option<unsafe extern "C" fn(*mut Cbc_Model, c_int)>,
    #[allow(clippy::type_complexity)]
    pub add_cut_callback: Option<
        unsafe extern "C" fn(
            *mut Cbc_Model,
            CbcCutCallback,
            *const c_char, // name
            *mut c_void,   // appData
            c_int,         // howOften
            c_char,        // atSolution
        ),
    >,
    pub add_inc_callback:
        Option<unsafe extern "C" fn(*mut Cbc_Model, CbcIncumbentCallback, *mut c_void)>,
    pub get_solver_ptr: Option<unsafe extern "C" fn(*mut Cbc_Model) -> *mut c_void>,
    #[allow(clippy::type_complexity)]
    pub add_row: Option<
        unsafe extern "C" fn(
            *mut Cbc_Model,
            *const c_char, // name
            c_int,         // nz
            *const c_int,  // cols
            *const f64,    // coefs
            c_char,        // sense
            f64,           // rhs
        ),
    >,
    #[allow(clippy::type_complexity)]
    pub add_col: Option<
        unsafe extern "C" fn(
            *mut Cbc_Model,
            *const c_char, // name
            f64,           // lb
            f64,           // ub
            f64,           // obj
            c_char,        // isInteger
            c_int,         // nz
            *const c_int,  // rows
            *const f64,    // coefs
        ),
    >,
    pub get_row_name:
        Option<unsafe extern "C" fn(*mut Cbc_Model, c_int, *mut c_char, usize)>,
    pub get_col_name:
        Option<unsafe extern "C" fn(*mut Cbc_Model, c_int, *mut c_char, usize)>,
    pub set_row_name: Option<unsafe extern "C" fn(*mut Cbc_Model, c_int, *const c_char)>,
    pub set_col_name: Option<unsafe extern "C" fn(*mut Cbc_Model, c_int, *const c_char)>,

    pub osi_get_num_cols: Option<unsafe extern "C" fn(*mut c_void) -> c_int>,
    pub osi_get_num_rows: Option<unsafe extern "C" fn(*mut c_void) -> c_int>,
    pub osi_get_col_solution: Option<unsafe extern "C" fn(*mut c_void) -> *const f64>,
    pub osi_get_col_lower: Option<unsafe extern "C" fn(*mut c_void) -> *const f64>,
    pub osi_get_col_upper: Option<unsafe extern "C" fn(*mut c_void) -> *const f64>,
    #[allow(clippy::type_complexity)]
    pub osi_cuts_add_row_cut: Option<
        unsafe extern "C" fn(
            *mut c_void,  // osiCuts
            c_int,        // nz
            *const c_int, // idx
            *const f64,   // coef
            c_char,       // sense
            f64,          // rhs
        ),
    >,

    _lib: Library,
}

impl CbcApi {
    /// Probe the default locations for `libCbcSolver`.
    pub fn load_default() -> Result<CbcApi> {
        CbcApi::from_library(open_library("COINBIND_CBC_LIB", CBC_CANDIDATES)?)
    }

    fn from_library(lib: Library) -> Result<CbcApi> {
        // SAFETY: each symbol name is paired with the function-pointer
        // type of its declaration in Cbc_C_Interface.h.
        unsafe {
            Ok(CbcApi {
                new_model: sym(&lib, "Cbc_newModel")?,
                delete_model: sym(&lib, "Cbc_deleteModel")?,
                load_problem: sym(&lib, "Cbc_loadProblem")?,
                read_mps: sym(&lib, "Cbc_readMps")?,
                write_mps: sym(&lib, "Cbc_writeMps")?,
                solve: sym(&lib, "Cbc_solve")?,
                status: sym(&lib, "Cbc_status")?,
                secondary_status: sym(&lib, "Cbc_secondaryStatus")?,
                is_proven_optimal: sym(&lib, "Cbc_isProvenOptimal")?,
                is_proven_infeasible: sym(&lib, "Cbc_isProvenInfeasible")?,
                is_abandoned: sym(&lib, "Cbc_isAbandoned")?,
                get_obj_value: sym(&lib, "Cbc_getObjValue")?,
                get_obj_sense: sym(&lib, "Cbc_getObjSense")?,
                set_obj_sense: sym(&lib, "Cbc_setObjSense")?,
                get_col_solution: sym(&lib, "Cbc_getColSolution")?,
                get_row_activity: sym(&lib, "Cbc_getRowActivity")?,
                get_reduced_cost: sym(&lib, "Cbc_getReducedCost")?,
                get_col_lower: sym(&lib, "Cbc_getColLower")?,
                get_col_upper: sym(&lib, "Cbc_getColUpper")?,
                get_obj_coefficients: sym(&lib, "Cbc_getObjCoefficients")?,
                get_row_lower: sym(&lib, "Cbc_getRowLower")?,
                get_row_upper: sym(&lib, "Cbc_getRowUpper")?,
                get_num_cols: sym(&lib, "Cbc_getNumCols")?,
                get_num_rows: sym(&lib, "Cbc_getNumRows")?,
                get_num_elements: sym(&lib, "Cbc_getNumElements")?,
                get_num_integers: sym(&lib, "Cbc_getNumIntegers")?,
                get_vector_starts: sym(&lib, "Cbc_getVectorStarts")?,
                get_indices: sym(&lib, "Cbc_getIndices")?,
                get_elements: sym(&lib, "Cbc_getElements")?,
                set_col_lower: sym(&lib, "Cbc_setColLower")?,
                set_col_upper: sym(&lib, "Cbc_setColUpper")?,
                set_obj_coeff: sym(&lib, "Cbc_setObjCoeff")?,
                set_continuous: sym(&lib, "Cbc_setContinuous")?,
                set_integer: sym(&lib, "Cbc_setInteger")?,
                is_integer: sym(&lib, "Cbc_isInteger")?,
                register_call_back: sym(&lib, "Cbc_registerCallBack")?,
                clear_call_back: sym(&lib, "Cbc_clearCallBack")?,
                read_lp: opt(&lib, "Cbc_readLp"),
                write_lp: opt(&lib, "Cbc_writeLp"),
                set_parameter: opt(&lib, "Cbc_setParameter"),
                set_maximum_seconds: opt(&lib, "Cbc_setMaximumSeconds"),
                set_log_level: opt(&lib, "Cbc_setLogLevel"),
                add_cut_callback: opt(&lib, "Cbc_addCutCallback"),
                add_inc_callback: opt(&lib, "Cbc_addIncCallback"),
                get_solver_ptr: opt(&lib, "Cbc_getSolverPtr"),
                add_row: opt(&lib, "Cbc_addRow"),
                add_col: opt(&lib, "Cbc_addCol"),
                get_row_name: opt(&lib, "Cbc_getRowName"),
                get_col_name: opt(&lib, "Cbc_getColName"),
                set_row_name: opt(&lib, "Cbc_setRowName"),
                set_col_name: opt(&lib, "Cbc_setColName"),
                osi_get_num_cols: opt(&lib, "Osi_getNumCols"),
                osi_get_num_rows: opt(&lib, "Osi_getNumRows"),
                osi_get_col_solution: opt(&lib, "Osi_getColSolution"),
                osi_get_col_lower: opt(&lib, "Osi_getColLower"),
                osi_get_col_upper: opt(&lib, "Osi_getColUpper"),
                osi_cuts_add_row_cut: opt(&lib, "OsiCuts_addRowCut"),
                _lib: lib,
            })
        }
    }
}
