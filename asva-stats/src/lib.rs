//! ASVA Statistics
//!
//! The statistical routines behind test selection, on plain `f64` samples.
//! Every routine returns `Result<_, AsvaError>`; invalid input is a
//! `DOMAIN_ERROR`, never a panic.

pub mod helpers;
pub mod distributions;
pub mod normality;
pub mod variance;
pub mod omnibus;
pub mod pairwise;

pub use normality::{shapiro_wilk, ShapiroResult};
pub use variance::levene;
pub use omnibus::{anova, kruskal_wallis, welch_anova, OmnibusResult};
pub use pairwise::{
    games_howell, mann_whitney_u, pairwise_mann_whitney, sidak, t_test, tukey_hsd, PairStat,
    TwoSampleResult,
};

#[cfg(test)]
pub(crate) mod test_data {
    //! Shared samples. A, B, C and D are normal with equal spread, W has a
    //! wider spread, S is skewed by one large value.

    pub fn base() -> Vec<f64> {
        vec![-1.5, -1.0, -0.65, -0.35, -0.1, 0.1, 0.35, 0.65, 1.0, 1.5]
    }

    pub fn group_a() -> Vec<f64> {
        base().iter().map(|x| 10.0 + x).collect()
    }

    pub fn group_b() -> Vec<f64> {
        base().iter().map(|x| 12.0 + x).collect()
    }

    pub fn group_c() -> Vec<f64> {
        base().iter().map(|x| 11.0 + 1.1 * x).collect()
    }

    pub fn group_d() -> Vec<f64> {
        base().iter().map(|x| 13.0 + 0.9 * x).collect()
    }

    pub fn group_w() -> Vec<f64> {
        base().iter().map(|x| 20.0 + 6.0 * x).collect()
    }

    pub fn group_s() -> Vec<f64> {
        vec![2.0, 2.1, 2.2, 2.1, 2.3, 2.2, 2.1, 2.0, 2.2, 9.5]
    }
}
