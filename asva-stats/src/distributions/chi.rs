//! Chi-squared distribution

use super::t::gamma_ln;

/// Upper tail of the chi-squared distribution, P(X >= x)
pub fn chi_squared_sf(x: f64, df: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    let a = df / 2.0;
    let x = x / 2.0;
    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_cf(a, x)
    }
}

/// Lower regularized incomplete gamma P(a, x) by series
fn gamma_series(a: f64, x: f64) -> f64 {
    let gln = gamma_ln(a);
    let mut ap = a;
    let mut sum = 1.0 / a;
    let mut del = sum;

    for _ in 0..500 {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * 3e-15 {
            break;
        }
    }

    sum * (-x + a * x.ln() - gln).exp()
}

/// Upper regularized incomplete gamma Q(a, x) by continued fraction
fn gamma_cf(a: f64, x: f64) -> f64 {
    let gln = gamma_ln(a);
    let fpmin = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / fpmin;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..=500 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < fpmin {
            d = fpmin;
        }
        c = b + an / c;
        if c.abs() < fpmin {
            c = fpmin;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < 3e-15 {
            break;
        }
    }

    (-x + a * x.ln() - gln).exp() * h
}
