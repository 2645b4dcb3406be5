//! Gaussian elimination with partial pivoting

use thiserror::Error;

/// Pivot magnitudes below this threshold signal a singular system.
const PIVOT_EPSILON: f64 = 1e-10;

/// Errors from the dense solver
#[derive(Debug, Error, PartialEq)]
pub enum LinearSolveError {
    #[error("system has no unique solution (singular matrix)")]
    Singular,

    #[error("dimension mismatch: matrix is {rows}x{cols}, rhs has {rhs_len} entries")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        rhs_len: usize,
    },
}

/// Solve `A x = b` for a square matrix `A`.
///
/// Eliminates column by column, swapping toward the largest-magnitude pivot
/// candidate each step. A pivot below 1e-10 after the swap means the system
/// is singular and `Singular` is returned instead of dividing by ~zero.
///
/// # Example
/// ```
/// use oligopoly_core_rs::math::solve;
///
/// let a = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
/// let x = solve(&a, &[90.0, 90.0]).unwrap();
/// assert!((x[0] - 30.0).abs() < 1e-12);
/// assert!((x[1] - 30.0).abs() < 1e-12);
/// ```
pub fn solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>, LinearSolveError> {
    let n = a.len();
    if b.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(LinearSolveError::DimensionMismatch {
            rows: n,
            cols: a.first().map_or(0, |row| row.len()),
            rhs_len: b.len(),
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    // Augmented working copy
    let mut m: Vec<Vec<f64>> = a.to_vec();
    let mut rhs: Vec<f64> = b.to_vec();

    // Forward elimination
    for col in 0..n {
        // Partial pivot: bring the largest-magnitude candidate into position
        let mut pivot_row = col;
        for row in (col + 1)..n {
            if m[row][col].abs() > m[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        if pivot_row != col {
            m.swap(col, pivot_row);
            rhs.swap(col, pivot_row);
        }

        let pivot = m[col][col];
        if pivot.abs() < PIVOT_EPSILON {
            return Err(LinearSolveError::Singular);
        }

        for row in (col + 1)..n {
            let factor = m[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back-substitution
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in (row + 1)..n {
            acc -= m[row][k] * x[k];
        }
        x[row] = acc / m[row][row];
    }

    Ok(x)
}

/// Invert a square matrix by solving against each unit column.
///
/// Used by the differentiated-Bertrand price system, which needs every
/// firm's own-price demand sensitivity (the diagonal of the inverse).
pub fn invert(m: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, LinearSolveError> {
    let n = m.len();
    let mut columns = Vec::with_capacity(n);
    for j in 0..n {
        let mut unit = vec![0.0; n];
        unit[j] = 1.0;
        columns.push(solve(m, &unit)?);
    }

    // columns[j][i] is entry (i, j) of the inverse; transpose into rows
    let mut inv = vec![vec![0.0; n]; n];
    for (j, col) in columns.iter().enumerate() {
        for (i, value) in col.iter().enumerate() {
            inv[i][j] = *value;
        }
    }
    Ok(inv)
}
