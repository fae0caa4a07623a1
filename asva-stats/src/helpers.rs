//! Helper functions shared by the statistical routines

use asva_core::AsvaError;

/// Require at least `min` observations
pub fn require_min_count(values: &[f64], min: usize, func: &str) -> Result<(), AsvaError> {
    if values.len() < min {
        return Err(AsvaError::domain_error(format!(
            "{}() requires at least {} observations, got {}",
            func,
            min,
            values.len()
        )));
    }
    Ok(())
}

/// Require at least `min` groups
pub fn require_groups(groups: &[Vec<f64>], min: usize, func: &str) -> Result<(), AsvaError> {
    if groups.len() < min {
        return Err(AsvaError::domain_error(format!(
            "{}() requires at least {} groups, got {}",
            func,
            min,
            groups.len()
        )));
    }
    Ok(())
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    sum(values) / values.len() as f64
}

/// Sample variance (n - 1 denominator)
pub fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    ss / (values.len() as f64 - 1.0)
}

/// Sum of squared deviations from the mean
pub fn sum_squares(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|x| (x - m) * (x - m)).sum()
}

/// Sort numbers (returns new sorted vector)
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub fn median(values: &[f64]) -> f64 {
    let s = sorted(values);
    let n = s.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        s[n / 2]
    } else {
        (s[n / 2 - 1] + s[n / 2]) / 2.0
    }
}

/// Percentile (0..=100) of already sorted values, linear interpolation
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if hi >= n {
        return sorted[n - 1];
    }
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Percentile (0..=100) using linear interpolation
pub fn percentile(values: &[f64], p: f64) -> f64 {
    percentile_sorted(&sorted(values), p)
}

/// Calculate ranks for a list (1-indexed, average for ties)
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<usize> = (0..n).collect();
    indexed.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut result = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && values[indexed[j]] == values[indexed[i]] {
            j += 1;
        }
        let avg_rank = (i + j + 1) as f64 / 2.0;
        for &idx in &indexed[i..j] {
            result[idx] = avg_rank;
        }
        i = j;
    }
    result
}

/// Tie term Σ(t³ - t) over groups of tied values
pub fn tie_term(values: &[f64]) -> f64 {
    let s = sorted(values);
    let mut total = 0.0;
    let mut i = 0;
    while i < s.len() {
        let mut j = i;
        while j < s.len() && s[j] == s[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        total += t * t * t - t;
        i = j;
    }
    total
}

pub fn has_ties(values: &[f64]) -> bool {
    sorted(values).windows(2).any(|w| w[0] == w[1])
}

/// Drop NaN observations
pub fn drop_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// Evaluate polynomial at x: c[0] + c[1]*x + c[2]*x^2 + ...
pub fn poly(coeffs: &[f64], x: f64) -> f64 {
    let mut result = 0.0;
    let mut x_pow = 1.0;
    for &c in coeffs {
        result += c * x_pow;
        x_pow *= x;
    }
    result
}
