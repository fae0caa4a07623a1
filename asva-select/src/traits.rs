//! Traits at the selection seams: test families, normality checks,
//! variance checks

use crate::{Decision, FamilyOutcome};
use asva_core::{AsvaError, GroupSamples};
use serde::Serialize;

/// Metadata for a test family
#[derive(Debug, Clone, Serialize)]
pub struct FamilyMeta {
    pub name: &'static str,
    /// Opening sentence of the narrative, stating the assumptions
    pub premise: &'static str,
    /// Omnibus test, `None` for two-group families
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omnibus: Option<&'static str>,
    pub post_hoc: &'static str,
}

/// An omnibus test plus its pairwise follow-up
pub trait TestFamily: Send + Sync {
    fn meta(&self) -> FamilyMeta;

    /// The decision this family handles
    fn decision(&self) -> Decision;

    /// Run on samples that are already free of NaN
    fn run(&self, samples: &GroupSamples) -> Result<FamilyOutcome, AsvaError>;
}

/// Per-group normality check
pub trait NormalityTest: Send + Sync {
    fn name(&self) -> &'static str;
    fn p_value(&self, sample: &[f64]) -> Result<f64, AsvaError>;
}

/// Homogeneity-of-variance check across all groups
pub trait VarianceTest: Send + Sync {
    fn name(&self) -> &'static str;
    fn p_value(&self, groups: &[Vec<f64>]) -> Result<f64, AsvaError>;
}

/// Shapiro-Wilk normality check
pub struct ShapiroWilk;

impl NormalityTest for ShapiroWilk {
    fn name(&self) -> &'static str {
        "Shapiro-Wilk"
    }

    fn p_value(&self, sample: &[f64]) -> Result<f64, AsvaError> {
        asva_stats::shapiro_wilk(sample).map(|r| r.pval)
    }
}

/// Median-centred Levene check
pub struct Levene;

impl VarianceTest for Levene {
    fn name(&self) -> &'static str {
        "Levene"
    }

    fn p_value(&self, groups: &[Vec<f64>]) -> Result<f64, AsvaError> {
        asva_stats::levene(groups).map(|r| r.pval)
    }
}
