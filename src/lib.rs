//! Safe bindings for the COIN-OR Clp and Cbc optimization solvers
//!
//! This crate wraps the native COIN-OR solver libraries behind typed
//! proxies. There is no algorithmic content here: the simplex method,
//! the branch-and-cut search, cut generation and the MPS/LP file
//! readers all live in the native libraries. The crate's job is
//! lifetime bookkeeping between managed and native objects, marshaling
//! of strings and arrays across the boundary, and translation of native
//! faults into typed errors.
//!
//! # Overview
//!
//! The native libraries are located and loaded at runtime
//! ([`CoinLibrary::load_default`]), so building this crate needs no
//! COIN-OR installation; using it does. Each native entity gets one
//! proxy type holding a reference to exactly one native object plus an
//! ownership flag deciding who releases it — see the [`handle`] module
//! for the rules.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use coinbind::{ClpSimplex, CoinLibrary, INFINITY, PackedMatrix, ProblemData};
//!
//! let library = CoinLibrary::load_default()?;
//! let mut model = ClpSimplex::new(&library)?;
//!
//! // maximize x0 + x1 subject to three <= 10 rows
//! let mut matrix = PackedMatrix::new(3);
//! matrix.add_column(&[(0, 1.0), (1, 1.0)])?;
//! matrix.add_column(&[(0, 1.0), (2, 1.0)])?;
//! let data = ProblemData::new(
//!     matrix,
//!     vec![0.0, 0.0],
//!     vec![INFINITY, INFINITY],
//!     vec![1.0, 1.0],
//!     vec![-INFINITY, -INFINITY, -INFINITY],
//!     vec![10.0, 10.0, 10.0],
//! )?;
//! model.load_problem(&data)?;
//! model.set_optimization_direction(-1.0)?;
//!
//! let status = model.initial_solve()?;
//! println!("{status:?}: {}", model.objective_value()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`handle`]**: the ownership core every proxy is built on
//! - **[`ffi`]**: runtime loading of `libClp` / `libCbcSolver` and the
//!   resolved C entry-point tables
//! - **[`clp`]**: the [`ClpSimplex`] proxy (linear programming)
//! - **[`cbc`]**: the [`CbcModel`] proxy (mixed-integer programming),
//!   cut generators and solve callbacks
//! - **[`osi`]**: non-owning solver-interface views and runtime-type
//!   dispatch for pointers coming back from native code
//! - **[`matrix`]**: compressed-column problem data with shape
//!   validation
//! - **[`message`]**: the message-handler bridge
//! - **[`warm_start`]**: simplex basis snapshots
//! - **[`cli`]**: the companion command-line front end
//!
//! # Thread safety
//!
//! All calls are synchronous pass-throughs into native code and may
//! block for as long as a solve takes. Model proxies are not `Send`:
//! a native model expects calls from one logical thread, and this layer
//! adds no locking. [`CoinLibrary`] itself is freely shareable.

use clap::Parser;

pub mod cbc;
pub mod cli;
pub mod clp;
pub mod error;
pub mod ffi;
pub mod handle;
mod marshal;
pub mod matrix;
pub mod message;
pub mod osi;
pub mod warm_start;

// Re-export the main types for easy access
pub use cbc::{
    CbcModel, CbcModelView, CbcStatus, CutBuffer, CutClass, CutControl, CutGenerator,
    CutGeneratorSettings, RowSense, SolutionEvent, SolveAction, SolveStrategy,
};
pub use cli::{ConvertArgs, SolveArgs, convert_main, solve_main};
pub use clp::{ClpSimplex, ClpStatus};
pub use error::{CoinError, Result};
pub use ffi::{CoinLibrary, INFINITY};
pub use matrix::{PackedMatrix, PackedVector, ProblemData};
pub use message::MessageEvent;
pub use osi::{OsiKind, OsiSolverView};
pub use warm_start::{BasisStatus, WarmStartBasis};

/// Command-line interface arguments for the solver front end.
#[derive(Debug, Parser)]
#[clap(
    name = "coinbind",
    about = "Solve and convert LP/MIP problem files with the COIN-OR Clp and Cbc solvers"
)]
pub enum CLIArguments {
    /// Read a problem file, solve it, and print the solution.
    Solve(SolveArgs),
    /// Convert a problem file between MPS and LP formats.
    Convert(ConvertArgs),
}
