use serde::Serialize;

use crate::common::band_error::BandError;

/// Polynomial with coefficients in ascending power order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    pub coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }
}

/// Least squares polynomial fit of `y` on `x`.
///
/// Solves the Vandermonde system with Householder QR after scaling each
/// column to unit norm, which keeps orders up to ~15 well conditioned on
/// `x` in `[0, 1]`. Requires `order < x.len()` and distinct `x` values.
pub fn polyfit(x: &[f64], y: &[f64], order: usize) -> Result<Polynomial, BandError> {
    let n = x.len();
    let m = order + 1;
    if y.len() != n {
        return Err(BandError::InvalidParameter(format!(
            "x and y lengths differ: {} vs {}",
            n,
            y.len()
        )));
    }
    if m > n {
        return Err(BandError::InsufficientData {
            required: m,
            available: n,
        });
    }

    // Column-major Vandermonde matrix: cols[j][i] = x[i]^j
    let mut cols: Vec<Vec<f64>> = Vec::with_capacity(m);
    for j in 0..m {
        cols.push(x.iter().map(|&xi| xi.powi(j as i32)).collect());
    }

    let mut scale = vec![1.0; m];
    for (col, s) in cols.iter_mut().zip(scale.iter_mut()) {
        let norm = col.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(BandError::SingularFit { order });
        }
        col.iter_mut().for_each(|v| *v /= norm);
        *s = norm;
    }

    let mut rhs = y.to_vec();

    for k in 0..m {
        let norm = cols[k][k..].iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(BandError::SingularFit { order });
        }
        let alpha = if cols[k][k] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = cols[k][k..].to_vec();
        v[0] -= alpha;
        let v_norm2 = v.iter().map(|a| a * a).sum::<f64>();
        if v_norm2 == 0.0 {
            continue;
        }

        for col in cols[k..].iter_mut() {
            reflect(&v, v_norm2, &mut col[k..]);
        }
        reflect(&v, v_norm2, &mut rhs[k..]);
    }

    // Back substitution on R, where R[i][j] = cols[j][i]
    let mut coefficients = vec![0.0; m];
    for i in (0..m).rev() {
        let diag = cols[i][i];
        if diag.abs() <= f64::EPSILON * scale.len() as f64 {
            return Err(BandError::SingularFit { order });
        }
        let acc = ((i + 1)..m).fold(rhs[i], |acc, j| acc - cols[j][i] * coefficients[j]);
        coefficients[i] = acc / diag;
    }

    for (c, s) in coefficients.iter_mut().zip(scale.iter()) {
        *c /= s;
    }

    Ok(Polynomial { coefficients })
}

fn reflect(v: &[f64], v_norm2: f64, target: &mut [f64]) {
    let dot = v.iter().zip(target.iter()).map(|(a, b)| a * b).sum::<f64>();
    let factor = 2.0 * dot / v_norm2;
    for (t, a) in target.iter_mut().zip(v.iter()) {
        *t -= factor * a;
    }
}
