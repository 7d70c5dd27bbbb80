//! Command-line front end
//!
//! A thin driver over the library: read a problem file, solve it with
//! the selected backend, print status and solution. The backend can be
//! forced with `--backend` or the `COINBIND_SOLVER` environment
//! variable; otherwise Cbc is preferred when its library loaded.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;

use crate::cbc::CbcModel;
use crate::clp::ClpSimplex;
use crate::error::CoinError;
use crate::ffi::CoinLibrary;

/// Available solver backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverBackend {
    /// Clp simplex (continuous problems).
    Clp,
    /// Cbc branch-and-cut (handles integer columns).
    Cbc,
}

impl SolverBackend {
    /// Pick a backend from the flag, the `COINBIND_SOLVER` environment
    /// variable, or whatever loaded.
    fn select(flag: Option<&str>, library: &CoinLibrary) -> Result<SolverBackend> {
        let requested = flag
            .map(str::to_string)
            .or_else(|| env::var("COINBIND_SOLVER").ok());

        if let Some(name) = requested {
            return match name.to_lowercase().as_str() {
                "clp" => Ok(SolverBackend::Clp),
                "cbc" | "coin_cbc" | "coin-cbc" => Ok(SolverBackend::Cbc),
                other => bail!("invalid solver '{other}'. Valid options: clp, cbc"),
            };
        }

        if library.has_cbc() {
            Ok(SolverBackend::Cbc)
        } else {
            Ok(SolverBackend::Clp)
        }
    }
}

#[derive(Debug, Args)]
pub struct SolveArgs {
    /// Problem file to read (MPS format unless --lp is given).
    pub file: PathBuf,
    /// Read the file as CPLEX LP format instead of MPS.
    #[clap(long)]
    pub lp: bool,
    /// Solver backend: clp or cbc.
    #[clap(long)]
    pub backend: Option<String>,
    /// Time limit in seconds.
    #[clap(short = 't', long)]
    pub seconds: Option<f64>,
    /// Native solver log level (0 silences the solver).
    #[clap(long, default_value_t = 0)]
    pub log_level: i32,
}

/// Solve a problem file and print status, objective and solution.
pub fn solve_main(args: SolveArgs) -> Result<()> {
    let library = CoinLibrary::load_default()?;

    match SolverBackend::select(args.backend.as_deref(), &library)? {
        SolverBackend::Cbc => solve_with_cbc(&library, &args),
        SolverBackend::Clp => solve_with_clp(&library, &args),
    }
}

fn solve_with_cbc(library: &CoinLibrary, args: &SolveArgs) -> Result<()> {
    let mut model = CbcModel::new(library)?;
    if args.lp {
        model.read_lp(&args.file)?;
    } else {
        model.read_mps(&args.file)?;
    }

    apply_if_supported(model.set_log_level(args.log_level))?;
    if let Some(seconds) = args.seconds {
        apply_if_supported(model.set_maximum_seconds(seconds))?;
    }

    let status = model.solve()?;
    println!("status: {status:?} (code {})", model.raw_status()?);
    if model.is_proven_optimal()? {
        println!("objective: {}", model.obj_value()?);
    }
    print_solution(&model.col_solution()?);
    Ok(())
}

fn solve_with_clp(library: &CoinLibrary, args: &SolveArgs) -> Result<()> {
    if args.lp {
        bail!("LP-format input requires the cbc backend");
    }

    let mut model = ClpSimplex::new(library)?;
    model.read_mps(&args.file)?;
    model.set_log_level(args.log_level)?;
    if let Some(seconds) = args.seconds {
        model.set_maximum_seconds(seconds)?;
    }

    let status = model.initial_solve()?;
    println!("status: {status:?} (code {})", model.raw_status()?);
    println!("objective: {}", model.objective_value()?);
    println!("iterations: {}", model.number_iterations()?);
    print_solution(&model.primal_column_solution()?);
    Ok(())
}

/// Tolerate limits that the loaded library is too old to support.
fn apply_if_supported(result: crate::error::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(CoinError::MissingSymbol { symbol }) => {
            eprintln!("warning: loaded library does not support {symbol}, ignoring");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_solution(values: &[f64]) {
    for (index, value) in values.iter().enumerate() {
        println!("x{index} = {value}");
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input problem file (.mps or .lp).
    pub input: PathBuf,
    /// Output problem file (.mps or .lp).
    pub output: PathBuf,
}

/// Convert between MPS and LP problem files via a Cbc model.
pub fn convert_main(args: ConvertArgs) -> Result<()> {
    let library = CoinLibrary::load_default()?;
    let mut model = CbcModel::new(&library)?;

    match extension(&args.input)? {
        Format::Mps => model.read_mps(&args.input)?,
        Format::Lp => model.read_lp(&args.input)?,
    }
    match extension(&args.output)? {
        Format::Mps => model.write_mps(&args.output)?,
        Format::Lp => model.write_lp(&args.output)?,
    }
    Ok(())
}

enum Format {
    Mps,
    Lp,
}

fn extension(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mps") => Ok(Format::Mps),
        Some("lp") => Ok(Format::Lp),
        _ => bail!(
            "cannot tell the format of {} (expected a .mps or .lp extension)",
            path.display()
        ),
    }
}
