//! The decision record: what the data looks like, and therefore which
//! family of tests applies

use asva_core::AsvaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Significance level for the normality and variance checks
pub const ALPHA: f64 = 0.05;

/// Normality verdict over all groups of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionVerdict {
    Parametric,
    Nonparametric,
}

impl DistributionVerdict {
    /// Nonparametric as soon as any group's p-value is below `ALPHA`.
    /// A NaN p-value does not count as a failure.
    pub fn from_p_values<'a>(p_values: impl IntoIterator<Item = &'a f64>) -> Self {
        if p_values.into_iter().any(|&p| p < ALPHA) {
            DistributionVerdict::Nonparametric
        } else {
            DistributionVerdict::Parametric
        }
    }
}

/// Homogeneity-of-variance verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceVerdict {
    EqualVariance,
    UnequalVariance,
}

impl VarianceVerdict {
    /// Equal when `p >= ALPHA`; a NaN p-value is unequal.
    pub fn from_p_value(p: f64) -> Self {
        if p >= ALPHA {
            VarianceVerdict::EqualVariance
        } else {
            VarianceVerdict::UnequalVariance
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCountClass {
    Two,
    Many,
}

impl GroupCountClass {
    pub fn from_count(count: usize) -> Result<Self, AsvaError> {
        match count {
            0 | 1 => Err(AsvaError::too_few_groups(count)),
            2 => Ok(GroupCountClass::Two),
            _ => Ok(GroupCountClass::Many),
        }
    }
}

/// Registry key: group count class, distribution and (for more than two
/// groups with normal data) the variance verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    pub group_count: GroupCountClass,
    pub distribution: DistributionVerdict,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub variance: Option<VarianceVerdict>,
}

impl Decision {
    pub const TWO_PARAMETRIC: Decision = Decision {
        group_count: GroupCountClass::Two,
        distribution: DistributionVerdict::Parametric,
        variance: None,
    };
    pub const TWO_NONPARAMETRIC: Decision = Decision {
        group_count: GroupCountClass::Two,
        distribution: DistributionVerdict::Nonparametric,
        variance: None,
    };
    pub const MANY_EQUAL_VARIANCE: Decision = Decision {
        group_count: GroupCountClass::Many,
        distribution: DistributionVerdict::Parametric,
        variance: Some(VarianceVerdict::EqualVariance),
    };
    pub const MANY_UNEQUAL_VARIANCE: Decision = Decision {
        group_count: GroupCountClass::Many,
        distribution: DistributionVerdict::Parametric,
        variance: Some(VarianceVerdict::UnequalVariance),
    };
    pub const MANY_NONPARAMETRIC: Decision = Decision {
        group_count: GroupCountClass::Many,
        distribution: DistributionVerdict::Nonparametric,
        variance: None,
    };

    /// Every decision the selector can reach
    pub const ALL: [Decision; 5] = [
        Decision::MANY_EQUAL_VARIANCE,
        Decision::MANY_UNEQUAL_VARIANCE,
        Decision::MANY_NONPARAMETRIC,
        Decision::TWO_PARAMETRIC,
        Decision::TWO_NONPARAMETRIC,
    ];

    /// True when the variance check has to run before this decision is complete
    pub fn needs_variance(group_count: GroupCountClass, distribution: DistributionVerdict) -> bool {
        group_count == GroupCountClass::Many && distribution == DistributionVerdict::Parametric
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = match self.group_count {
            GroupCountClass::Two => "two groups",
            GroupCountClass::Many => "more than two groups",
        };
        let dist = match self.distribution {
            DistributionVerdict::Parametric => "parametric",
            DistributionVerdict::Nonparametric => "nonparametric",
        };
        write!(f, "{}, {}", groups, dist)?;
        match self.variance {
            Some(VarianceVerdict::EqualVariance) => write!(f, ", equal variances"),
            Some(VarianceVerdict::UnequalVariance) => write!(f, ", unequal variances"),
            None => Ok(()),
        }
    }
}
