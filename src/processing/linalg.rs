// src/processing/linalg.rs
//! Small dense linear algebra for the unmixing kernel. Matrices are
//! row-major `Vec<Vec<f64>>`; everything here is allocation-explicit and
//! safe to call from parallel workers.

/// Dot product of two vectors.
#[inline]
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Matrix-vector multiply: y = A * x.
pub(crate) fn mat_vec(a: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
    a.iter().map(|row| dot(row, x)).collect()
}

/// Invert a small square matrix by Gauss-Jordan elimination with partial
/// pivoting. Returns `None` if singular.
pub(crate) fn invert(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    // augmented matrix [A | I]
    let mut aug: Vec<Vec<f64>> = Vec::with_capacity(n);
    for (i, row) in a.iter().enumerate() {
        let mut r = row.clone();
        r.resize(2 * n, 0.0);
        r[n + i] = 1.0;
        aug.push(r);
    }

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = aug[col][col].abs();
        for row in (col + 1)..n {
            let v = aug[row][col].abs();
            if v > max_val {
                max_val = v;
                max_row = row;
            }
        }
        if max_val < 1e-15 {
            return None;
        }
        aug.swap(col, max_row);

        let pivot = aug[col][col];
        for v in aug[col].iter_mut() {
            *v /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..(2 * n) {
                aug[row][j] -= factor * aug[col][j];
            }
        }
    }

    Some(aug.into_iter().map(|row| row[n..].to_vec()).collect())
}

/// Solve A x = b by inversion, with a tiny ridge on the diagonal to keep
/// near-singular normal equations workable. Returns `None` if A stays
/// singular even then.
pub(crate) fn solve_ridged(a: &mut [Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    for (i, row) in a.iter_mut().enumerate() {
        row[i] += 1e-10;
    }
    invert(a).map(|inv| mat_vec(&inv, b))
}
