//! Shapiro-Wilk normality test
//!
//! Coefficients and p-value follow Royston's algorithm AS R94, valid for
//! 3 <= n <= 5000.

use crate::distributions::{normal_quantile, normal_sf};
use crate::helpers::{mean, poly, require_min_count, sorted};
use asva_core::AsvaError;
use serde::{Deserialize, Serialize};

/// Result of a Shapiro-Wilk test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapiroResult {
    pub w: f64,
    pub pval: f64,
}

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SMALL_GAMMA: [f64; 2] = [-2.273, 0.459];
const SMALL_MU: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SMALL_SIGMA: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const LARGE_MU: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const LARGE_SIGMA: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

/// Shapiro-Wilk W statistic and p-value.
///
/// A sample containing NaN yields NaN for both. A sample with zero range
/// is reported as W = 1, p = 1.
pub fn shapiro_wilk(data: &[f64]) -> Result<ShapiroResult, AsvaError> {
    require_min_count(data, 3, "shapiro_wilk")?;
    if data.iter().any(|x| x.is_nan()) {
        return Ok(ShapiroResult { w: f64::NAN, pval: f64::NAN });
    }

    let x = sorted(data);
    let n = x.len();
    if x[n - 1] - x[0] == 0.0 {
        return Ok(ShapiroResult { w: 1.0, pval: 1.0 });
    }

    if n == 3 {
        let a1 = 0.5f64.sqrt();
        let m = mean(&x);
        let ss: f64 = x.iter().map(|v| (v - m) * (v - m)).sum();
        let w = ((a1 * (x[2] - x[0])).powi(2) / ss).clamp(0.75, 1.0);
        let pval = 1.0 - 6.0 / std::f64::consts::PI * w.sqrt().acos();
        return Ok(ShapiroResult { w, pval: pval.clamp(0.0, 1.0) });
    }

    let a = coefficients(n);
    let b: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let m = mean(&x);
    let ss: f64 = x.iter().map(|v| (v - m) * (v - m)).sum();
    let w = (b * b / ss).min(1.0);

    Ok(ShapiroResult { w, pval: p_value(w, n) })
}

/// First half of the antisymmetric coefficient vector
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    let nf = n as f64;
    let m: Vec<f64> = (0..half)
        .map(|i| normal_quantile((i as f64 + 1.0 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    let (fac, start) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (fac, 2)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (fac, 1)
    };
    a[0] = a1;
    for i in start..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, n: usize) -> f64 {
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let mut y = w1.ln();
    let nf = n as f64;

    let (mu, sigma) = if n <= 11 {
        let gamma = poly(&SMALL_GAMMA, nf);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&SMALL_MU, nf), poly(&SMALL_SIGMA, nf).exp())
    } else {
        let ln_n = nf.ln();
        (poly(&LARGE_MU, ln_n), poly(&LARGE_SIGMA, ln_n).exp())
    };

    normal_sf((y - mu) / sigma)
}
