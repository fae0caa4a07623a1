//! Pairwise comparisons: two-sample t-test, Mann-Whitney U, Tukey HSD,
//! Games-Howell and Šidák-corrected rank-sum tests

use crate::distributions::{normal_sf, studentized_range_sf, t_two_sided_p};
use crate::helpers::{has_ties, mean, ranks, require_groups, require_min_count, tie_term, variance};
use crate::omnibus::Decomposition;
use asva_core::AsvaError;
use serde::{Deserialize, Serialize};

/// Result of a two-sample test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoSampleResult {
    pub statistic: f64,
    /// Degrees of freedom, `None` for rank tests
    pub df: Option<f64>,
    pub pval: f64,
}

/// One comparison between groups `left` and `right` (indices, left < right)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairStat {
    pub left: usize,
    pub right: usize,
    pub statistic: f64,
    pub pval: f64,
}

/// Exact Mann-Whitney distribution is used up to this smaller-sample size
pub const MWU_EXACT_MAX: usize = 8;

fn index_pairs(k: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..k).flat_map(move |i| ((i + 1)..k).map(move |j| (i, j)))
}

/// Welch-Satterthwaite degrees of freedom from per-group squared standard errors
fn welch_df(va: f64, vb: f64, na: f64, nb: f64) -> f64 {
    (va + vb).powi(2) / (va * va / (na - 1.0) + vb * vb / (nb - 1.0))
}

/// Two-sided two-sample t-test.
///
/// Student's pooled test when the group sizes match, Welch's test otherwise.
pub fn t_test(a: &[f64], b: &[f64]) -> Result<TwoSampleResult, AsvaError> {
    require_min_count(a, 2, "t_test")?;
    require_min_count(b, 2, "t_test")?;

    let na = a.len() as f64;
    let nb = b.len() as f64;
    let diff = mean(a) - mean(b);

    let (se, df) = if a.len() == b.len() {
        let df = na + nb - 2.0;
        let pooled = ((na - 1.0) * variance(a) + (nb - 1.0) * variance(b)) / df;
        ((pooled * (1.0 / na + 1.0 / nb)).sqrt(), df)
    } else {
        let va = variance(a) / na;
        let vb = variance(b) / nb;
        ((va + vb).sqrt(), welch_df(va, vb, na, nb))
    };
    if se == 0.0 {
        return Err(AsvaError::domain_error("t_test() both samples have zero variance"));
    }

    let t = diff / se;
    Ok(TwoSampleResult {
        statistic: t,
        df: Some(df),
        pval: t_two_sided_p(t, df),
    })
}

/// Two-sided Mann-Whitney U test. The statistic is U of the first sample.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<TwoSampleResult, AsvaError> {
    require_min_count(a, 1, "mann_whitney_u")?;
    require_min_count(b, 1, "mann_whitney_u")?;

    let n1 = a.len();
    let n2 = b.len();
    let all: Vec<f64> = a.iter().chain(b).copied().collect();
    let r = ranks(&all);
    let rank_sum: f64 = r[..n1].iter().sum();
    let u1 = rank_sum - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u_max = u1.max(u2);

    let exact = if n1.min(n2) <= MWU_EXACT_MAX && !has_ties(&all) {
        exact_upper_tail(u_max, n1, n2)
    } else {
        None
    };
    let pval = match exact {
        Some(tail) => 2.0 * tail,
        None => {
            let n = (n1 + n2) as f64;
            let nn = (n1 * n2) as f64;
            let sd = (nn / 12.0 * ((n + 1.0) - tie_term(&all) / (n * (n - 1.0)))).sqrt();
            if sd == 0.0 {
                return Err(AsvaError::domain_error("mann_whitney_u() all observations are identical"));
            }
            2.0 * normal_sf((u_max - nn / 2.0 - 0.5) / sd)
        }
    };

    Ok(TwoSampleResult {
        statistic: u1,
        df: None,
        pval: pval.clamp(0.0, 1.0),
    })
}

/// P(U >= u) under the null, from the exact frequency distribution of U.
///
/// Frequencies are exact integers; `None` when they do not fit in an `i128`.
fn exact_upper_tail(u: f64, n1: usize, n2: usize) -> Option<f64> {
    let (m, n) = if n1 <= n2 { (n1, n2) } else { (n2, n1) };
    let max_u = m * n;

    // Coefficients of the Gaussian binomial prod (1 - q^(n+i)) / (1 - q^i)
    let mut freq = vec![0i128; max_u + 1];
    freq[0] = 1;
    for i in 1..=m {
        let shift = n + i;
        for k in (shift..=max_u).rev() {
            freq[k] = freq[k].checked_sub(freq[k - shift])?;
        }
        for k in i..=max_u {
            freq[k] = freq[k].checked_add(freq[k - i])?;
        }
    }

    let start = (u.ceil().max(0.0) as usize).min(max_u + 1);
    let total = freq.iter().try_fold(0i128, |acc, &f| acc.checked_add(f))?;
    let upper = freq[start..].iter().try_fold(0i128, |acc, &f| acc.checked_add(f))?;
    Some(upper as f64 / total as f64)
}

/// Tukey HSD on all pairs, studentized range with k means and N - k df
pub fn tukey_hsd(groups: &[Vec<f64>]) -> Result<Vec<PairStat>, AsvaError> {
    let d = Decomposition::of(groups, "tukey_hsd")?;
    let ms_within = d.ms_within();
    if ms_within == 0.0 {
        return Err(AsvaError::domain_error("tukey_hsd() all groups have zero variance"));
    }
    let k = groups.len() as f64;

    Ok(index_pairs(groups.len())
        .map(|(i, j)| {
            let (a, b) = (&groups[i], &groups[j]);
            let se = (0.5 * ms_within * (1.0 / a.len() as f64 + 1.0 / b.len() as f64)).sqrt();
            let t = (mean(a) - mean(b)) / se;
            PairStat {
                left: i,
                right: j,
                statistic: t,
                pval: studentized_range_sf(t.abs(), k, d.df_within),
            }
        })
        .collect())
}

/// Games-Howell on all pairs, Welch df per pair
pub fn games_howell(groups: &[Vec<f64>]) -> Result<Vec<PairStat>, AsvaError> {
    require_groups(groups, 2, "games_howell")?;
    if groups.iter().any(|g| g.len() < 2) {
        return Err(AsvaError::domain_error("games_howell() requires at least 2 observations per group"));
    }
    let k = groups.len() as f64;

    let mut out = Vec::new();
    for (i, j) in index_pairs(groups.len()) {
        let (a, b) = (&groups[i], &groups[j]);
        let (na, nb) = (a.len() as f64, b.len() as f64);
        let va = variance(a) / na;
        let vb = variance(b) / nb;
        if va + vb == 0.0 {
            return Err(AsvaError::domain_error(format!(
                "games_howell() groups {} and {} have zero variance",
                i, j
            )));
        }
        let t = (mean(a) - mean(b)) / (0.5 * (va + vb)).sqrt();
        let df = welch_df(va, vb, na, nb);
        out.push(PairStat {
            left: i,
            right: j,
            statistic: t,
            pval: studentized_range_sf(t.abs(), k, df),
        });
    }
    Ok(out)
}

/// Šidák correction for `m` comparisons
pub fn sidak(p: f64, m: usize) -> f64 {
    (1.0 - (1.0 - p).powi(m as i32)).clamp(0.0, 1.0)
}

/// Mann-Whitney U on all pairs, Šidák-corrected over the number of pairs
pub fn pairwise_mann_whitney(groups: &[Vec<f64>]) -> Result<Vec<PairStat>, AsvaError> {
    require_groups(groups, 2, "pairwise_mann_whitney")?;
    let pairs: Vec<(usize, usize)> = index_pairs(groups.len()).collect();
    let m = pairs.len();

    pairs
        .into_iter()
        .map(|(i, j)| {
            let r = mann_whitney_u(&groups[i], &groups[j])?;
            Ok(PairStat {
                left: i,
                right: j,
                statistic: r.statistic,
                pval: sidak(r.pval, m),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::*;

    #[test]
    fn test_t_test_student() {
        let r = t_test(&group_a(), &group_b()).unwrap();
        assert!((r.statistic + 4.863444).abs() < 1e-5);
        assert_eq!(r.df, Some(18.0));
        assert!((r.pval - 1.24876e-4).abs() < 1e-8);
    }

    #[test]
    fn test_t_test_welch_for_unequal_sizes() {
        let a = group_a();
        let b = &group_w()[..6];
        let r = t_test(&a, b).unwrap();
        let df = r.df.unwrap();
        assert!(df < 14.0 && df.fract() != 0.0);
    }

    #[test]
    fn test_t_test_constant_samples() {
        assert!(t_test(&[1.0, 1.0], &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_mann_whitney_asymptotic_with_ties() {
        let r = mann_whitney_u(&group_a(), &group_b()).unwrap();
        assert!((r.statistic - 5.5).abs() < 1e-12);
        assert!((r.pval - 8.767981e-4).abs() < 1e-8);
    }

    #[test]
    fn test_mann_whitney_exact() {
        // Complete separation of 3 vs 3: P = 2 / C(6,3)
        let r = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!((r.pval - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_mann_whitney_exact_unequal_sizes() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.5];
        let b = [2.5, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let r = mann_whitney_u(&a, &b).unwrap();
        assert_eq!(r.statistic, 3.0);
        assert!((r.pval - 0.010878010878).abs() < 1e-10);
    }

    #[test]
    fn test_mann_whitney_exact_small_vs_large() {
        // 8 vs 1000, fully separated: P = 2 / C(1008, 8)
        let a: Vec<f64> = (10_000..10_008).map(f64::from).collect();
        let b: Vec<f64> = (0..1000).map(f64::from).collect();
        let r = mann_whitney_u(&a, &b).unwrap();
        assert_eq!(r.statistic, 8000.0);

        let total: f64 = (1..=8).map(|k| (1000 + k) as f64 / k as f64).product();
        let expected = 2.0 / total;
        assert!(r.pval > 0.0 && r.pval <= 1.0);
        assert!(((r.pval - expected) / expected).abs() < 1e-9);
    }

    #[test]
    fn test_mann_whitney_exact_symmetric() {
        let r = mann_whitney_u(&[1.0, 4.0], &[2.0, 3.0]).unwrap();
        assert!((r.pval - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tukey_hsd() {
        let pairs = tukey_hsd(&[group_a(), group_b(), group_c(), group_d()]).unwrap();
        assert_eq!(pairs.len(), 6);
        let expected = [
            (0, 1, -6.860818, 1.3427e-4),
            (0, 2, -3.430409, 0.0901945),
            (0, 3, -10.291227, 8.41e-8),
            (1, 2, 3.430409, 0.0901945),
            (1, 3, -3.430409, 0.0901945),
            (2, 3, -6.860818, 1.3427e-4),
        ];
        for (got, (i, j, t, p)) in pairs.iter().zip(expected) {
            assert_eq!((got.left, got.right), (i, j));
            assert!((got.statistic - t).abs() < 1e-5, "T for ({}, {})", i, j);
            assert!((got.pval - p).abs() < 1e-5, "p for ({}, {}): {}", i, j, got.pval);
        }
    }

    #[test]
    fn test_games_howell() {
        let pairs = games_howell(&[group_a(), group_b(), group_w()]).unwrap();
        let expected = [
            (0, 1, -6.877949, 3.504e-4),
            (0, 2, -7.995453, 6.7374e-4),
            (1, 2, -6.396362, 0.0032471),
        ];
        for (got, (i, j, t, p)) in pairs.iter().zip(expected) {
            assert_eq!((got.left, got.right), (i, j));
            assert!((got.statistic - t).abs() < 1e-5);
            assert!((got.pval - p).abs() < 1e-5, "p for ({}, {}): {}", i, j, got.pval);
        }
    }

    #[test]
    fn test_pairwise_mann_whitney_sidak() {
        let pairs = pairwise_mann_whitney(&[group_a(), group_b(), group_s()]).unwrap();
        let expected = [(5.5, 0.0026281), (97.0, 0.0012602), (100.0, 5.2082e-4)];
        for (got, (u, p)) in pairs.iter().zip(expected) {
            assert!((got.statistic - u).abs() < 1e-12);
            assert!((got.pval - p).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sidak() {
        assert!((sidak(0.05, 1) - 0.05).abs() < 1e-12);
        assert!((sidak(0.05, 3) - 0.142625).abs() < 1e-6);
        assert_eq!(sidak(1.0, 3), 1.0);
    }
}
