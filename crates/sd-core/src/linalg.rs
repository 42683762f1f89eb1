//! Dense linear algebra for small design matrices
//!
//! The regression routines only ever invert XᵗX, which is p×p with p the
//! number of parameters, so a closed form is used up to 3×3 and
//! Gauss-Jordan elimination with partial pivoting beyond that.

use ndarray::{Array1, Array2};

use crate::data::DataError;
use crate::error::{CoreError, Result};


/// Matrix type alias for 2D arrays
pub type Matrix = Array2<f64>;

/// Vector type alias for 1D arrays
pub type Vector = Array1<f64>;

/// Pivots and determinants below this magnitude are treated as zero
pub const SINGULARITY_TOLERANCE: f64 = 1e-10;

/// Transpose of a matrix
pub fn transpose(m: &Matrix) -> Matrix {
    m.t().to_owned()
}

/// Matrix product A·B
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    if a.ncols() != b.nrows() {
        return Err(DataError::DimensionMismatch {
            expected: format!("{} rows", a.ncols()),
            actual: format!("{} rows", b.nrows()),
        }
        .into());
    }
    Ok(a.dot(b))
}

/// Matrix-vector product A·v
pub fn multiply_vector(a: &Matrix, v: &Vector) -> Result<Vector> {
    if a.ncols() != v.len() {
        return Err(DataError::DimensionMismatch {
            expected: format!("length {}", a.ncols()),
            actual: format!("length {}", v.len()),
        }
        .into());
    }
    Ok(a.dot(v))
}

/// Inverse of a square matrix.
///
/// Fails with [`CoreError::SingularMatrix`] when the determinant (closed-form
/// sizes) or a selected pivot is below [`SINGULARITY_TOLERANCE`].
pub fn invert(a: &Matrix) -> Result<Matrix> {
    let (rows, cols) = a.dim();
    if rows != cols || rows == 0 {
        return Err(CoreError::NotSquare { rows, cols });
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(DataError::NonFinite("matrix to invert").into());
    }

    match rows {
        1 => invert_1x1(a),
        2 => invert_2x2(a),
        3 => invert_3x3(a),
        _ => gauss_jordan(a),
    }
}

fn invert_1x1(a: &Matrix) -> Result<Matrix> {
    let v = a[(0, 0)];
    if v.abs() < SINGULARITY_TOLERANCE {
        return Err(CoreError::SingularMatrix);
    }
    Ok(Matrix::from_elem((1, 1), 1.0 / v))
}

fn invert_2x2(a: &Matrix) -> Result<Matrix> {
    let (p, q, r, s) = (a[(0, 0)], a[(0, 1)], a[(1, 0)], a[(1, 1)]);
    let det = p * s - q * r;
    if det.abs() < SINGULARITY_TOLERANCE {
        return Err(CoreError::SingularMatrix);
    }

    let mut inv = Matrix::zeros((2, 2));
    inv[(0, 0)] = s / det;
    inv[(0, 1)] = -q / det;
    inv[(1, 0)] = -r / det;
    inv[(1, 1)] = p / det;
    Ok(inv)
}

fn invert_3x3(a: &Matrix) -> Result<Matrix> {
    // Cofactors of the first row double as the determinant expansion
    let c00 = a[(1, 1)] * a[(2, 2)] - a[(1, 2)] * a[(2, 1)];
    let c01 = a[(1, 2)] * a[(2, 0)] - a[(1, 0)] * a[(2, 2)];
    let c02 = a[(1, 0)] * a[(2, 1)] - a[(1, 1)] * a[(2, 0)];

    let det = a[(0, 0)] * c00 + a[(0, 1)] * c01 + a[(0, 2)] * c02;
    if det.abs() < SINGULARITY_TOLERANCE {
        return Err(CoreError::SingularMatrix);
    }

    let c10 = a[(0, 2)] * a[(2, 1)] - a[(0, 1)] * a[(2, 2)];
    let c11 = a[(0, 0)] * a[(2, 2)] - a[(0, 2)] * a[(2, 0)];
    let c12 = a[(0, 1)] * a[(2, 0)] - a[(0, 0)] * a[(2, 1)];
    let c20 = a[(0, 1)] * a[(1, 2)] - a[(0, 2)] * a[(1, 1)];
    let c21 = a[(0, 2)] * a[(1, 0)] - a[(0, 0)] * a[(1, 2)];
    let c22 = a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)];

    // Inverse = adjugate / det, adjugate = transposed cofactor matrix
    let adjugate = [[c00, c10, c20], [c01, c11, c21], [c02, c12, c22]];
    Ok(Matrix::from_shape_fn((3, 3), |(i, j)| adjugate[i][j] / det))
}

fn gauss_jordan(a: &Matrix) -> Result<Matrix> {
    let n = a.nrows();
    let mut work = a.clone();
    let mut inv = Matrix::eye(n);

    for col in 0..n {
        // Partial pivoting: largest magnitude in the remaining column
        let mut pivot_row = col;
        let mut pivot_abs = work[(col, col)].abs();
        for row in (col + 1)..n {
            let candidate = work[(row, col)].abs();
            if candidate > pivot_abs {
                pivot_row = row;
                pivot_abs = candidate;
            }
        }

        if pivot_abs < SINGULARITY_TOLERANCE {
            return Err(CoreError::SingularMatrix);
        }

        if pivot_row != col {
            swap_rows(&mut work, col, pivot_row);
            swap_rows(&mut inv, col, pivot_row);
        }

        let pivot = work[(col, col)];
        for j in 0..n {
            work[(col, j)] /= pivot;
            inv[(col, j)] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = work[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                work[(row, j)] -= factor * work[(col, j)];
                inv[(row, j)] -= factor * inv[(col, j)];
            }
        }
    }

    Ok(inv)
}

fn swap_rows(m: &mut Matrix, a: usize, b: usize) {
    for j in 0..m.ncols() {
        m.swap((a, j), (b, j));
    }
}

/// Prepend a column of ones to a design matrix
pub fn with_intercept(x: &Matrix) -> Matrix {
    let (n, p) = x.dim();
    Matrix::from_shape_fn((n, p + 1), |(i, j)| if j == 0 { 1.0 } else { x[(i, j - 1)] })
}
