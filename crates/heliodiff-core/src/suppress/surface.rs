use nalgebra::{DMatrix, DVector};

use super::blocks::Block;

/// Number of coefficients of a bicubic surface (degree 3 in both axes).
const N_COEFFS: usize = 16;

/// Smooth background surface fitted over one block's window.
///
/// z(u, v) = sum over i,j in 0..4 of c[i*4+j] * u^i * v^j, with (u, v) the
/// pixel coordinates normalized to the fitting window. Normalization keeps
/// the Vandermonde system well conditioned for 512-pixel windows.
#[derive(Clone, Debug)]
pub struct BicubicSurface {
    coeffs: DVector<f64>,
    row_origin: f64,
    row_scale: f64,
    col_origin: f64,
    col_scale: f64,
}

impl BicubicSurface {
    /// Least-squares fit to `(row, col, value)` samples taken from the
    /// block's fitting window. Returns `None` when there are fewer samples
    /// than coefficients; the caller decides the fallback.
    pub fn fit(block: &Block, samples: &[(usize, usize, f32)]) -> Option<Self> {
        if samples.len() < N_COEFFS {
            return None;
        }

        let row_origin = block.fit_rows.start as f64;
        let row_scale = (block.fit_rows.len().max(2) - 1) as f64;
        let col_origin = block.fit_cols.start as f64;
        let col_scale = (block.fit_cols.len().max(2) - 1) as f64;

        let mut a = DMatrix::<f64>::zeros(samples.len(), N_COEFFS);
        let mut b = DVector::<f64>::zeros(samples.len());
        for (k, &(row, col, value)) in samples.iter().enumerate() {
            let u = (row as f64 - row_origin) / row_scale;
            let v = (col as f64 - col_origin) / col_scale;
            for (term, basis) in basis_terms(u, v).into_iter().enumerate() {
                a[(k, term)] = basis;
            }
            b[k] = value as f64;
        }

        let coeffs = a.svd(true, true).solve(&b, 1e-12).ok()?;
        Some(Self {
            coeffs,
            row_origin,
            row_scale,
            col_origin,
            col_scale,
        })
    }

    /// Evaluate the surface at a pixel coordinate.
    pub fn eval(&self, row: usize, col: usize) -> f32 {
        let u = (row as f64 - self.row_origin) / self.row_scale;
        let v = (col as f64 - self.col_origin) / self.col_scale;
        basis_terms(u, v)
            .into_iter()
            .zip(self.coeffs.iter())
            .map(|(basis, c)| basis * c)
            .sum::<f64>() as f32
    }
}

fn basis_terms(u: f64, v: f64) -> [f64; N_COEFFS] {
    let us = [1.0, u, u * u, u * u * u];
    let vs = [1.0, v, v * v, v * v * v];
    let mut terms = [0.0; N_COEFFS];
    for i in 0..4 {
        for j in 0..4 {
            terms[i * 4 + j] = us[i] * vs[j];
        }
    }
    terms
}
