//! Omnibus tests across all groups: one-way ANOVA, Welch's ANOVA,
//! Kruskal-Wallis

use crate::distributions::{chi_squared_sf, f_sf};
use crate::helpers::{mean, ranks, require_groups, sum_squares, tie_term, variance};
use asva_core::AsvaError;
use serde::{Deserialize, Serialize};

/// Result of an omnibus test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OmnibusResult {
    pub statistic: f64,
    pub df1: f64,
    /// Denominator df; `None` for chi-squared based tests
    pub df2: Option<f64>,
    pub pval: f64,
}

fn require_non_empty_groups(groups: &[Vec<f64>], func: &str) -> Result<(), AsvaError> {
    if let Some(idx) = groups.iter().position(|g| g.is_empty()) {
        return Err(AsvaError::domain_error(format!("{}() group {} has no observations", func, idx)));
    }
    Ok(())
}

/// Between/within decomposition used by ANOVA and Tukey HSD
pub(crate) struct Decomposition {
    pub ss_between: f64,
    pub ss_within: f64,
    pub df_between: f64,
    pub df_within: f64,
}

impl Decomposition {
    pub fn of(groups: &[Vec<f64>], func: &str) -> Result<Self, AsvaError> {
        require_groups(groups, 2, func)?;
        require_non_empty_groups(groups, func)?;

        let total: usize = groups.iter().map(Vec::len).sum();
        let k = groups.len();
        if total <= k {
            return Err(AsvaError::domain_error(format!(
                "{}() needs more observations than groups",
                func
            )));
        }

        let grand_mean = groups.iter().flatten().sum::<f64>() / total as f64;
        let ss_between: f64 = groups
            .iter()
            .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
            .sum();
        let ss_within: f64 = groups.iter().map(|g| sum_squares(g)).sum();

        Ok(Self {
            ss_between,
            ss_within,
            df_between: (k - 1) as f64,
            df_within: (total - k) as f64,
        })
    }

    pub fn ms_within(&self) -> f64 {
        self.ss_within / self.df_within
    }
}

/// Classic one-way ANOVA, F = MS_between / MS_within
pub fn anova(groups: &[Vec<f64>]) -> Result<OmnibusResult, AsvaError> {
    let d = Decomposition::of(groups, "anova")?;
    if d.ss_within == 0.0 {
        return Err(AsvaError::domain_error("anova() all groups have zero variance"));
    }
    let f = (d.ss_between / d.df_between) / d.ms_within();
    Ok(OmnibusResult {
        statistic: f,
        df1: d.df_between,
        df2: Some(d.df_within),
        pval: f_sf(f, d.df_between, d.df_within),
    })
}

/// Welch's ANOVA for groups with unequal variances
pub fn welch_anova(groups: &[Vec<f64>]) -> Result<OmnibusResult, AsvaError> {
    require_groups(groups, 2, "welch_anova")?;
    if groups.iter().any(|g| g.len() < 2) {
        return Err(AsvaError::domain_error("welch_anova() requires at least 2 observations per group"));
    }

    let k = groups.len() as f64;
    let weights: Vec<f64> = groups.iter().map(|g| g.len() as f64 / variance(g)).collect();
    if weights.iter().any(|w| w.is_infinite()) {
        return Err(AsvaError::domain_error("welch_anova() a group has zero variance"));
    }
    let sum_w: f64 = weights.iter().sum();
    let means: Vec<f64> = groups.iter().map(|g| mean(g)).collect();
    let adj_mean = weights.iter().zip(&means).map(|(w, m)| w * m).sum::<f64>() / sum_w;

    let lambda: f64 = weights
        .iter()
        .zip(groups)
        .map(|(w, g)| (1.0 - w / sum_w).powi(2) / (g.len() as f64 - 1.0))
        .sum();
    let numerator = weights
        .iter()
        .zip(&means)
        .map(|(w, m)| w * (m - adj_mean).powi(2))
        .sum::<f64>()
        / (k - 1.0);
    let f = numerator / (1.0 + 2.0 * (k - 2.0) / (k * k - 1.0) * lambda);
    let df1 = k - 1.0;
    let df2 = (k * k - 1.0) / (3.0 * lambda);

    Ok(OmnibusResult {
        statistic: f,
        df1,
        df2: Some(df2),
        pval: f_sf(f, df1, df2),
    })
}

/// Kruskal-Wallis H test with tie correction
pub fn kruskal_wallis(groups: &[Vec<f64>]) -> Result<OmnibusResult, AsvaError> {
    require_groups(groups, 2, "kruskal_wallis")?;
    require_non_empty_groups(groups, "kruskal_wallis")?;

    let all: Vec<f64> = groups.iter().flatten().copied().collect();
    let n = all.len() as f64;
    let r = ranks(&all);

    let mut h = 0.0;
    let mut pos = 0;
    for g in groups {
        let rank_sum: f64 = r[pos..pos + g.len()].iter().sum();
        h += rank_sum * rank_sum / g.len() as f64;
        pos += g.len();
    }
    h = 12.0 / (n * (n + 1.0)) * h - 3.0 * (n + 1.0);

    let correction = 1.0 - tie_term(&all) / (n * n * n - n);
    if correction <= 0.0 {
        return Err(AsvaError::domain_error("kruskal_wallis() all observations are identical"));
    }
    h /= correction;

    let df1 = (groups.len() - 1) as f64;
    Ok(OmnibusResult {
        statistic: h,
        df1,
        df2: None,
        pval: chi_squared_sf(h, df1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::*;

    #[test]
    fn test_anova() {
        let r = anova(&[group_a(), group_b(), group_c(), group_d()]).unwrap();
        assert!((r.statistic - 19.612842).abs() < 1e-5);
        assert!((r.pval - 1.04681e-7).abs() < 1e-10);
        assert_eq!(r.df1, 3.0);
        assert_eq!(r.df2, Some(36.0));
    }

    #[test]
    fn test_anova_ms_within() {
        let d = Decomposition::of(&[group_a(), group_b(), group_c(), group_d()], "anova").unwrap();
        assert!((d.ms_within() - 0.849783).abs() < 1e-5);
    }

    #[test]
    fn test_anova_zero_variance() {
        let err = anova(&[vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap_err();
        assert_eq!(err.code, asva_core::codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_welch_anova() {
        let r = welch_anova(&[group_a(), group_b(), group_w()]).unwrap();
        assert!((r.statistic - 23.959754).abs() < 1e-5);
        assert!((r.df2.unwrap() - 16.144408).abs() < 1e-5);
        assert!((r.pval - 1.47248e-5).abs() < 1e-8);
    }

    #[test]
    fn test_kruskal_wallis() {
        let r = kruskal_wallis(&[group_a(), group_b(), group_s()]).unwrap();
        assert!((r.statistic - 23.724392).abs() < 1e-5);
        assert!((r.pval - 7.05202e-6).abs() < 1e-9);
        assert_eq!(r.df2, None);
    }

    #[test]
    fn test_kruskal_identical() {
        assert!(kruskal_wallis(&[vec![1.0, 1.0], vec![1.0]]).is_err());
    }

    #[test]
    fn test_empty_group() {
        assert!(anova(&[vec![1.0, 2.0], vec![]]).is_err());
        assert!(kruskal_wallis(&[vec![1.0, 2.0], vec![]]).is_err());
    }
}
