//! Marshaling-side benchmarks: packed-matrix validation and problem
//! assembly, the managed work done before every native load call.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use coinbind::{INFINITY, PackedMatrix, ProblemData};

const COLS: usize = 1_000;
const ROWS: usize = 500;

/// Deterministic banded matrix with three entries per column.
fn banded_csc() -> (Vec<i32>, Vec<i32>, Vec<f64>) {
    let mut starts = Vec::with_capacity(COLS + 1);
    let mut indices = Vec::with_capacity(COLS * 3);
    let mut values = Vec::with_capacity(COLS * 3);

    starts.push(0);
    for col in 0..COLS {
        for band in 0..3 {
            indices.push(((col + band) % ROWS) as i32);
            values.push(1.0 + (col % 7) as f64);
        }
        starts.push(indices.len() as i32);
    }
    (starts, indices, values)
}

fn bench_matrix_validation(c: &mut Criterion) {
    let (starts, indices, values) = banded_csc();

    c.bench_function("packed_matrix_from_csc", |b| {
        b.iter(|| {
            PackedMatrix::from_csc(
                ROWS,
                black_box(starts.clone()),
                black_box(indices.clone()),
                black_box(values.clone()),
            )
            .unwrap()
        })
    });

    c.bench_function("packed_matrix_column_appends", |b| {
        b.iter(|| {
            let mut matrix = PackedMatrix::new(ROWS);
            for col in 0..COLS {
                let entries = [
                    ((col % ROWS) as i32, 1.0),
                    (((col + 1) % ROWS) as i32, 2.0),
                ];
                matrix.add_column(black_box(&entries)).unwrap();
            }
            matrix
        })
    });
}

fn bench_problem_assembly(c: &mut Criterion) {
    let (starts, indices, values) = banded_csc();
    let matrix = PackedMatrix::from_csc(ROWS, starts, indices, values).unwrap();

    c.bench_function("problem_data_cross_checks", |b| {
        b.iter(|| {
            ProblemData::new(
                black_box(matrix.clone()),
                vec![0.0; COLS],
                vec![INFINITY; COLS],
                vec![1.0; COLS],
                vec![-INFINITY; ROWS],
                vec![10.0; ROWS],
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_matrix_validation, bench_problem_assembly);
criterion_main!(benches);
