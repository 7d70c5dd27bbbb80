//! Function table for the Clp C interface (`Clp_C_Interface.h`)

use std::os::raw::{c_char, c_int};

use libloading::Library;

use super::{CoinBigIndex, open_library, opt, sym};
use crate::error::Result;

/// Opaque native model handle of the Clp C interface.
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct Clp_Simplex {
    _private: [u8; 0],
}

/// Message callback of the Clp C interface. The native side passes the
/// model that produced the message plus the message's doubles, ints and
/// strings; there is no user-data argument.
pub type ClpMessageCallback = unsafe extern "C" fn(
    model: *mut Clp_Simplex,
    message_number: c_int,
    n_double: c_int,
    v_double: *const f64,
    n_int: c_int,
    v_int: *const c_int,
    n_string: c_int,
    v_string: *mut *mut c_char,
);

const CLP_CANDIDATES: &[&str] = &[
    "libClp.so.1",
    "libClp.so",
    "libClp.dylib",
    "Clp.dll",
    "libClp-0.dll",
];

/// Entry points resolved from `libClp`. Field names drop the `Clp_`
/// prefix; each field forwards to exactly one native function.
pub struct ClpApi {
    pub new_model: unsafe extern "C" fn() -> *mut Clp_Simplex,
    pub delete_model: unsafe extern "C" fn(*mut Clp_Simplex),
    #[allow(clippy::type_complexity)]
    pub load_problem: unsafe extern "C" fn(
        *mut Clp_Simplex,
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
    pub read_mps: unsafe extern "C" fn(*mut Clp_Simplex, *const c_char, c_int, c_int) -> c_int,

    pub initial_solve: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,
    pub primal: unsafe extern "C" fn(*mut Clp_Simplex, c_int) -> c_int,
    pub dual: unsafe extern "C" fn(*mut Clp_Simplex, c_int) -> c_int,
    pub status: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,
    pub number_iterations: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,

    pub number_rows: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,
    pub number_columns: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,
    pub get_num_elements: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,
    pub objective_value: unsafe extern "C" fn(*mut Clp_Simplex) -> f64,
    pub objective_offset: unsafe extern "C" fn(*mut Clp_Simplex) -> f64,
    pub set_objective_offset: unsafe extern "C" fn(*mut Clp_Simplex, f64),
    pub optimization_direction: unsafe extern "C" fn(*mut Clp_Simplex) -> f64,
    pub set_optimization_direction: unsafe extern "C" fn(*mut Clp_Simplex, f64),

    // Live model arrays. The native side exposes these as mutable
    // pointers into the model's own storage.
    pub primal_column_solution: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub primal_row_solution: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub dual_row_solution: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub dual_column_solution: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub column_lower: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub column_upper: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub objective: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub row_lower: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,
    pub row_upper: unsafe extern "C" fn(*mut Clp_Simplex) -> *mut f64,

    pub chg_column_lower: unsafe extern "C" fn(*mut Clp_Simplex, *const f64),
    pub chg_column_upper: unsafe extern "C" fn(*mut Clp_Simplex, *const f64),
    pub chg_obj_coefficients: unsafe extern "C" fn(*mut Clp_Simplex, *const f64),
    pub chg_row_lower: unsafe extern "C" fn(*mut Clp_Simplex, *const f64),
    pub chg_row_upper: unsafe extern "C" fn(*mut Clp_Simplex, *const f64),

    pub get_vector_starts: unsafe extern "C" fn(*mut Clp_Simplex) -> *const CoinBigIndex,
    pub get_indices: unsafe extern "C" fn(*mut Clp_Simplex) -> *const c_int,
    pub get_elements: unsafe extern "C" fn(*mut Clp_Simplex) -> *const f64,

    #[allow(clippy::type_complexity)]
    pub add_rows: unsafe extern "C" fn(
        *mut Clp_Simplex,
        c_int,                // number
        *const f64,           // rowLower
        *const f64,           // rowUpper
        *const CoinBigIndex,  // rowStarts
        *const c_int,         // columns
        *const f64,           // elements
    ),
    #[allow(clippy::type_complexity)]
    pub add_columns: unsafe extern "C" fn(
        *mut Clp_Simplex,
        c_int,                // number
        *const f64,           // columnLower
        *const f64,           // columnUpper
        *const f64,           // objective
        *const CoinBigIndex,  // columnStarts
        *const c_int,         // rows
        *const f64,           // elements
    ),
    pub delete_rows: unsafe extern "C" fn(*mut Clp_Simplex, c_int, *const c_int),
    pub delete_columns: unsafe extern "C" fn(*mut Clp_Simplex, c_int, *const c_int),

    pub log_level: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,
    pub set_log_level: unsafe extern "C" fn(*mut Clp_Simplex, c_int),
    pub maximum_iterations: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,
    pub set_maximum_iterations: unsafe extern "C" fn(*mut Clp_Simplex, c_int),
    pub maximum_seconds: unsafe extern "C" fn(*mut Clp_Simplex) -> f64,
    pub set_maximum_seconds: unsafe extern "C" fn(*mut Clp_Simplex, f64),
    pub scaling: unsafe extern "C" fn(*mut Clp_Simplex, c_int),
    pub scaling_flag: unsafe extern "C" fn(*mut Clp_Simplex) -> c_int,

    pub register_call_back: unsafe extern "C" fn(*mut Clp_Simplex, ClpMessageCallback),
    pub clear_call_back: unsafe extern "C" fn(*mut Clp_Simplex),

    // Newer releases only.
    pub write_mps:
        Option<unsafe extern "C" fn(*mut Clp_Simplex, *const c_char, c_int, c_int, f64) -> c_int>,
    pub problem_name: Option<unsafe extern "C" fn(*mut Clp_Simplex, c_int, *mut c_char)>,
    pub set_problem_name:
        Option<unsafe extern "C" fn(*mut Clp_Simplex, c_int, *const c_char) -> c_int>,
    pub get_column_status: Option<unsafe extern "C" fn(*mut Clp_Simplex, c_int) -> c_int>,
    pub set_column_status: Option<unsafe extern "C" fn(*mut Clp_Simplex, c_int, c_int)>,
    pub get_row_status: Option<unsafe extern "C" fn(*mut Clp_Simplex, c_int) -> c_int>,
    pub set_row_status: Option<unsafe extern "C" fn(*mut Clp_Simplex, c_int, c_int)>,

    _lib: Library,
}

impl ClpApi {
    /// Probe the default locations for `libClp`.
    pub fn load_default() -> Result<ClpApi> {
        ClpApi::from_library(open_library("COINBIND_CLP_LIB", CLP_CANDIDATES)?)
    }

    fn from_library(lib: Library) -> Result<ClpApi> {
        // SAFETY: each symbol name is paired with the function-pointer
        // type of its declaration in Clp_C_Interface.h.
        unsafe {
            Ok(ClpApi {
                new_model: sym(&lib, "Clp_newModel")?,
                delete_model: sym(&lib, "Clp_deleteModel")?,
                load_problem: sym(&lib, "Clp_loadProblem")?,
                read_mps: sym(&lib, "Clp_readMps")?,
                initial_solve: sym(&lib, "Clp_initialSolve")?,
                primal: sym(&lib, "Clp_primal")?,
                dual: sym(&lib, "Clp_dual")?,
                status: sym(&lib, "Clp_status")?,
                number_iterations: sym(&lib, "Clp_numberIterations")?,
                number_rows: sym(&lib, "Clp_numberRows")?,
                number_columns: sym(&lib, "Clp_numberColumns")?,
                get_num_elements: sym(&lib, "Clp_getNumElements")?,
                objective_value: sym(&lib, "Clp_objectiveValue")?,
                objective_offset: sym(&lib, "Clp_objectiveOffset")?,
                set_objective_offset: sym(&lib, "Clp_setObjectiveOffset")?,
                optimization_direction: sym(&lib, "Clp_optimizationDirection")?,
                set_optimization_direction: sym(&lib, "Clp_setOptimizationDirection")?,
                primal_column_solution: sym(&lib, "Clp_primalColumnSolution")?,
                primal_row_solution: sym(&lib, "Clp_primalRowSolution")?,
                dual_row_solution: sym(&lib, "Clp_dualRowSolution")?,
                dual_column_solution: sym(&lib, "Clp_dualColumnSolution")?,
                column_lower: sym(&lib, "Clp_columnLower")?,
                column_upper: sym(&lib, "Clp_columnUpper")?,
                objective: sym(&lib, "Clp_objective")?,
                row_lower: sym(&lib, "Clp_rowLower")?,
                row_upper: sym(&lib, "Clp_rowUpper")?,
                chg_column_lower: sym(&lib, "Clp_chgColumnLower")?,
                chg_column_upper: sym(&lib, "Clp_chgColumnUpper")?,
                chg_obj_coefficients: sym(&lib, "Clp_chgObjCoefficients")?,
                chg_row_lower: sym(&lib, "Clp_chgRowLower")?,
                chg_row_upper: sym(&lib, "Clp_chgRowUpper")?,
                get_vector_starts: sym(&lib, "Clp_getVectorStarts")?,
                get_indices: sym(&lib, "Clp_getIndices")?,
                get_elements: sym(&lib, "Clp_getElements")?,
                add_rows: sym(&lib, "Clp_addRows")?,
                add_columns: sym(&lib, "Clp_addColumns")?,
                delete_rows: sym(&lib, "Clp_deleteRows")?,
                delete_columns: sym(&lib, "Clp_deleteColumns")?,
                log_level: sym(&lib, "Clp_logLevel")?,
                set_log_level: sym(&lib, "Clp_setLogLevel")?,
                maximum_iterations: sym(&lib, "Clp_maximumIterations")?,
                set_maximum_iterations: sym(&lib, "Clp_setMaximumIterations")?,
                maximum_seconds: sym(&lib, "Clp_maximumSeconds")?,
                set_maximum_seconds: sym(&lib, "Clp_setMaximumSeconds")?,
                scaling: sym(&lib, "Clp_scaling")?,
                scaling_flag: sym(&lib, "Clp_scalingFlag")?,
                register_call_back: sym(&lib, "Clp_registerCallBack")?,
                clear_call_back: sym(&lib, "Clp_clearCallBack")?,
                write_mps: opt(&lib, "Clp_writeMps"),
                problem_name: opt(&lib, "Clp_problemName"),
                set_problem_name: opt(&lib, "Clp_setProblemName"),
                get_column_status: opt(&lib, "Clp_getColumnStatus"),
                set_column_status: opt(&lib, "Clp_setColumnStatus"),
                get_row_status: opt(&lib, "Clp_getRowStatus"),
                set_row_status: opt(&lib, "Clp_setRowStatus"),
                _lib: lib,
            })
        }
    }
}
