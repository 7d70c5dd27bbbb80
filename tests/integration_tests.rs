//! End-to-end tests against the real COIN-OR shared libraries.
//!
//! Every test loads the libraries through the normal path and returns
//! early (with a notice on stderr) when they are not installed, so the
//! suite stays green on machines without COIN-OR. Operations that need
//! newer C-interface entry points additionally skip when the loaded
//! library predates them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use coinbind::{
    CbcModel, ClpSimplex, CoinError, CoinLibrary, CutGenerator, CutGeneratorSettings, INFINITY,
    PackedMatrix, ProblemData, SolveAction,
};
use tempfile::TempDir;

fn library() -> Option<Arc<CoinLibrary>> {
    match CoinLibrary::load_default() {
        Ok(lib) => Some(lib),
        Err(e) => {
            eprintln!("skipping: COIN-OR libraries unavailable: {e}");
            None
        }
    }
}

fn clp_library() -> Option<Arc<CoinLibrary>> {
    library().filter(|lib| lib.has_clp())
}

fn cbc_library() -> Option<Arc<CoinLibrary>> {
    library().filter(|lib| lib.has_cbc())
}

/// Two variables, three `<= 10` rows, minimize x0 + x1.
fn small_lp() -> ProblemData {
    let matrix = PackedMatrix::from_csc(
        3,
        vec![0, 2, 4],
        vec![0, 1, 0, 2],
        vec![1.0, 1.0, 1.0, 1.0],
    )
    .unwrap();
    ProblemData::new(
        matrix,
        vec![0.0, 0.0],
        vec![INFINITY, INFINITY],
        vec![1.0, 1.0],
        vec![-INFINITY, -INFINITY, -INFINITY],
        vec![10.0, 10.0, 10.0],
    )
    .unwrap()
}

fn skip_if_unsupported<T>(result: coinbind::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(CoinError::MissingSymbol { symbol }) => {
            eprintln!("skipping: loaded library does not export {symbol}");
            None
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
}

mod clp_tests {
    use super::*;

    #[test]
    fn test_relaxation_solve_reports_finished_and_feasible() {
        let Some(lib) = clp_library() else { return };
        let mut model = ClpSimplex::new(&lib).unwrap();
        model.set_log_level(0).unwrap();
        model.load_problem(&small_lp()).unwrap();

        model.initial_solve().unwrap();
        assert_eq!(model.raw_status().unwrap(), 0);

        let solution = model.primal_column_solution().unwrap();
        assert_eq!(solution.len(), 2);
        assert!(solution.iter().all(|&x| x >= -1e-9));

        let activity = model.primal_row_solution().unwrap();
        assert_eq!(activity.len(), 3);
        assert!(activity.iter().all(|&a| a <= 10.0 + 1e-9));
    }

    #[test]
    fn test_malformed_mps_path_surfaces_native_error() {
        let Some(lib) = clp_library() else { return };
        let mut model = ClpSimplex::new(&lib).unwrap();
        model.set_log_level(0).unwrap();

        let err = model
            .read_mps(std::path::Path::new("/nonexistent/coinbind/problem.mps"))
            .unwrap_err();
        match err {
            CoinError::Native { message, .. } => {
                assert!(message.contains("problem.mps"), "message: {message}");
            }
            other => panic!("expected a native error, got {other:?}"),
        }
    }

    #[test]
    fn test_matrix_read_back_round_trips() {
        let Some(lib) = clp_library() else { return };
        let mut model = ClpSimplex::new(&lib).unwrap();
        let data = small_lp();
        model.load_problem(&data).unwrap();

        // The native side keeps its own copy; reading it back must
        // reproduce the loaded arrays element-wise.
        let matrix = model.matrix().unwrap();
        assert_eq!(&matrix, data.matrix());
        assert_eq!(model.column_lower().unwrap(), data.col_lower());
        assert_eq!(model.row_upper().unwrap(), data.row_upper());
    }

    #[test]
    fn test_mps_write_read_round_trip() {
        let Some(lib) = clp_library() else { return };
        let mut model = ClpSimplex::new(&lib).unwrap();
        model.load_problem(&small_lp()).unwrap();

        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("round_trip.mps");
        if skip_if_unsupported(model.write_mps(&path)).is_none() {
            return;
        }

        let mut reread = ClpSimplex::new(&lib).unwrap();
        reread.set_log_level(0).unwrap();
        reread.read_mps(&path).unwrap();
        assert_eq!(reread.num_cols().unwrap(), 2);
        assert_eq!(reread.num_rows().unwrap(), 3);
        assert_eq!(reread.num_elements().unwrap(), 4);
    }

    #[test]
    fn test_bound_changes_are_visible_through_the_proxy() {
        let Some(lib) = clp_library() else { return };
        let mut model = ClpSimplex::new(&lib).unwrap();
        model.load_problem(&small_lp()).unwrap();

        model.chg_column_upper(&[5.0, 6.0]).unwrap();
        assert_eq!(model.column_upper().unwrap(), vec![5.0, 6.0]);

        // Shape mismatches are caught before the native call.
        let err = model.chg_column_upper(&[1.0]).unwrap_err();
        assert!(matches!(err, CoinError::ArgumentShape { .. }));
    }

    #[test]
    fn test_warm_start_capture_and_apply() {
        let Some(lib) = clp_library() else { return };
        let mut first = ClpSimplex::new(&lib).unwrap();
        first.set_log_level(0).unwrap();
        first.load_problem(&small_lp()).unwrap();
        first.initial_solve().unwrap();

        let Some(basis) = skip_if_unsupported(first.warm_start()) else {
            return;
        };
        assert_eq!(basis.num_cols(), 2);
        assert_eq!(basis.num_rows(), 3);

        let mut second = ClpSimplex::new(&lib).unwrap();
        second.set_log_level(0).unwrap();
        second.load_problem(&small_lp()).unwrap();
        if skip_if_unsupported(second.set_warm_start(&basis)).is_none() {
            return;
        }
        second.initial_solve().unwrap();
        assert_eq!(second.raw_status().unwrap(), 0);
    }

    #[test]
    fn test_message_handler_sees_solve_messages() {
        let Some(lib) = clp_library() else { return };
        let mut model = ClpSimplex::new(&lib).unwrap();
        model.load_problem(&small_lp()).unwrap();

        let messages = Arc::new(AtomicUsize::new(0));
        let counter = messages.clone();
        model
            .set_message_handler(move |_event| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        model.set_log_level(1).unwrap();
        model.initial_solve().unwrap();
        model.clear_message_handler().unwrap();

        // The handler must not have disturbed the solve itself.
        assert_eq!(model.raw_status().unwrap(), 0);
    }
}

mod cbc_tests {
    use super::*;

    /// maximize x0 + x1 with x0 + x1 <= 1.5 and both columns integer.
    fn load_small_mip(model: &mut CbcModel) {
        let mut matrix = PackedMatrix::new(1);
        matrix.add_column(&[(0, 1.0)]).unwrap();
        matrix.add_column(&[(0, 1.0)]).unwrap();
        let data = ProblemData::new(
            matrix,
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![-INFINITY],
            vec![1.5],
        )
        .unwrap();
        model.load_problem(&data).unwrap();
        model.set_obj_sense(-1.0).unwrap();
        model.set_integer(0).unwrap();
        model.set_integer(1).unwrap();
    }

    #[test]
    fn test_branch_and_cut_solves_small_mip() {
        let Some(lib) = cbc_library() else { return };
        let mut model = CbcModel::new(&lib).unwrap();
        let _ = skip_if_unsupported(model.set_log_level(0));
        load_small_mip(&mut model);

        model.solve().unwrap();
        assert_eq!(model.raw_status().unwrap(), 0);
        assert!(model.is_proven_optimal().unwrap());
        assert!((model.obj_value().unwrap() - 1.0).abs() < 1e-6);

        let solution = model.col_solution().unwrap();
        assert_eq!(solution.len(), 2);
        let rounded: f64 = solution.iter().map(|x| x.round()).sum();
        assert!((rounded - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cut_generator_ownership_transfer() {
        let Some(lib) = cbc_library() else { return };
        let mut model = CbcModel::new(&lib).unwrap();
        let _ = skip_if_unsupported(model.set_log_level(0));
        load_small_mip(&mut model);

        let mut settings = CutGeneratorSettings::new("observer");
        settings.how_often = -99; // root only
        let generator = CutGenerator::new(&lib, settings, |_solver, _cuts| {
            // Looks at the relaxation, adds nothing.
        })
        .unwrap();

        if skip_if_unsupported(model.add_cut_generator(generator)).is_none() {
            return;
        }

        // The model took ownership and lists the generator.
        assert_eq!(model.number_cut_generators(), 1);
        let listed = model.cut_generators();
        assert_eq!(listed[0].name, "observer");
        assert_eq!(listed[0].how_often, -99);

        model.solve().unwrap();
        assert_eq!(model.raw_status().unwrap(), 0);
        // Dropping the model releases the generator state exactly once.
    }

    #[test]
    fn test_solution_handler_receives_incumbents() {
        let Some(lib) = cbc_library() else { return };
        let mut model = CbcModel::new(&lib).unwrap();
        let _ = skip_if_unsupported(model.set_log_level(0));
        load_small_mip(&mut model);

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let installed = model.set_solution_handler(move |_model, event| {
            assert!(event.values.len() <= 2);
            counter.fetch_add(1, Ordering::SeqCst);
            SolveAction::Continue
        });
        if skip_if_unsupported(installed).is_none() {
            return;
        }

        model.solve().unwrap();
        assert_eq!(model.raw_status().unwrap(), 0);
    }

    #[test]
    fn test_reset_swaps_in_a_fresh_native_model() {
        let Some(lib) = cbc_library() else { return };
        let mut model = CbcModel::new(&lib).unwrap();
        load_small_mip(&mut model);
        assert_eq!(model.num_cols().unwrap(), 2);

        model.reset().unwrap();
        assert_eq!(model.num_cols().unwrap(), 0);
        assert_eq!(model.number_cut_generators(), 0);
    }

    #[test]
    fn test_malformed_mps_path_surfaces_native_error() {
        let Some(lib) = cbc_library() else { return };
        let mut model = CbcModel::new(&lib).unwrap();
        let err = model
            .read_mps(std::path::Path::new("/nonexistent/coinbind/problem.mps"))
            .unwrap_err();
        assert!(matches!(err, CoinError::Native { .. }));
    }

    #[test]
    fn test_solver_view_exposes_the_underlying_relaxation() {
        let Some(lib) = cbc_library() else { return };
        let mut model = CbcModel::new(&lib).unwrap();
        load_small_mip(&mut model);

        let Some(view) = skip_if_unsupported(model.solver()) else {
            return;
        };
        let Some(cols) = skip_if_unsupported(view.num_cols()) else {
            return;
        };
        assert_eq!(cols, 2);
    }
}
