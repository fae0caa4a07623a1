//! Test results

use crate::Decision;
use asva_core::{GroupSet, PairwiseTable};
use asva_stats::OmnibusResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

const NOT_APPLICABLE: &str = "not applicable";

/// Omnibus p-value, or the two-group sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OmnibusP {
    Value(f64),
    NotApplicable,
}

impl OmnibusP {
    pub fn value(&self) -> Option<f64> {
        match self {
            OmnibusP::Value(p) => Some(*p),
            OmnibusP::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, OmnibusP::Value(_))
    }
}

impl fmt::Display for OmnibusP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OmnibusP::Value(p) => write!(f, "{:.3}", p),
            OmnibusP::NotApplicable => write!(f, "{}", NOT_APPLICABLE),
        }
    }
}

impl Serialize for OmnibusP {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OmnibusP::Value(p) => serializer.serialize_f64(*p),
            OmnibusP::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for OmnibusP {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(p) => Ok(OmnibusP::Value(p)),
            Repr::Text(s) if s == NOT_APPLICABLE => Ok(OmnibusP::NotApplicable),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "expected a p-value or \"{}\", got \"{}\"",
                NOT_APPLICABLE, s
            ))),
        }
    }
}

/// What one test family produced
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyOutcome {
    pub omnibus_p: OmnibusP,
    pub omnibus: Option<OmnibusResult>,
    pub pairwise: PairwiseTable,
}

/// Full result of test selection for one measurement column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub column: String,
    pub group_column: String,
    pub decision: Decision,
    /// Name of the chosen test family
    pub family: String,
    pub groups: GroupSet,
    /// Normality p-value per group label
    pub normality: BTreeMap<String, f64>,
    /// Variance-check p-value, when it was evaluated
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub variance_p: Option<f64>,
    pub omnibus_p: OmnibusP,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub omnibus: Option<OmnibusResult>,
    pub pairwise: PairwiseTable,
    pub narrative: String,
}
