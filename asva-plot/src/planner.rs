//! Annotation planner
//!
//! Picks the pairwise brackets drawn above a box plot of 2, 3 or 4 groups
//! and looks up the p-value each bracket shows.

use asva_core::{AsvaError, GroupSet, PairwiseTable};
use asva_select::OmnibusP;
use serde::Serialize;

/// Significance threshold for drawing and highlighting brackets
pub const SIGNIFICANCE: f64 = 0.05;

/// One entry of the static bracket layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketSpec {
    pub left: usize,
    pub right: usize,
    /// Vertical stacking tier, 0 is the topmost
    pub tier: usize,
    /// Horizontal extent in box-index units
    pub span: (f64, f64),
    /// Horizontal anchor of the p-value label
    pub label_x: f64,
}

const fn spec(left: usize, right: usize, tier: usize, span: (f64, f64), label_x: f64) -> BracketSpec {
    BracketSpec { left, right, tier, span, label_x }
}

static TWO_GROUPS: [BracketSpec; 1] = [spec(0, 1, 0, (0.0, 1.0), 0.15)];

static THREE_GROUPS: [BracketSpec; 3] = [
    spec(0, 2, 0, (0.0, 2.0), 0.5),
    spec(0, 1, 1, (0.0, 0.9), 0.0),
    spec(1, 2, 1, (1.1, 2.0), 1.1),
];

static FOUR_GROUPS: [BracketSpec; 6] = [
    spec(0, 3, 0, (0.0, 3.0), 1.0),
    spec(0, 2, 1, (0.0, 1.9), 0.45),
    spec(2, 3, 1, (2.1, 3.0), 2.05),
    spec(0, 1, 2, (0.0, 0.9), -0.05),
    spec(1, 3, 2, (1.1, 3.0), 1.55),
    spec(1, 2, 3, (1.0, 2.0), 1.0),
];

/// Static bracket layout for a group count
pub fn layout(group_count: usize) -> Result<&'static [BracketSpec], AsvaError> {
    match group_count {
        2 => Ok(&TWO_GROUPS),
        3 => Ok(&THREE_GROUPS),
        4 => Ok(&FOUR_GROUPS),
        n => Err(AsvaError::unsupported_group_count(n)),
    }
}

/// A bracket with its resolved p-value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub bracket: BracketSpec,
    pub group_left: String,
    pub group_right: String,
    pub pval: f64,
    pub significant: bool,
}

impl Annotation {
    pub fn label(&self) -> String {
        format!("p={:.3}", self.pval)
    }
}

/// Stateless planner; see `plan`
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationPlanner;

impl AnnotationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// p-value of the pair a bracket connects
    pub fn resolve(
        &self,
        bracket: &BracketSpec,
        groups: &GroupSet,
        pairwise: &PairwiseTable,
    ) -> Result<f64, AsvaError> {
        let (Some(a), Some(b)) = (groups.label(bracket.left), groups.label(bracket.right)) else {
            return Err(AsvaError::internal(format!(
                "bracket ({}, {}) out of range for {} groups",
                bracket.left,
                bracket.right,
                groups.len()
            )));
        };
        pairwise.lookup(a, b)
    }

    /// Brackets to draw.
    ///
    /// Two groups always get their single bracket. Three or four groups get
    /// brackets only when the omnibus p-value is below `SIGNIFICANCE`.
    pub fn plan(
        &self,
        groups: &GroupSet,
        pairwise: &PairwiseTable,
        omnibus_p: OmnibusP,
    ) -> Result<Vec<Annotation>, AsvaError> {
        let specs = layout(groups.len())?;

        let draw = groups.len() == 2 || matches!(omnibus_p, OmnibusP::Value(p) if p < SIGNIFICANCE);
        if !draw {
            return Ok(Vec::new());
        }

        specs
            .iter()
            .map(|bracket| {
                let pval = self.resolve(bracket, groups, pairwise)?;
                Ok(Annotation {
                    bracket: *bracket,
                    group_left: groups.label(bracket.left).unwrap_or_default().to_string(),
                    group_right: groups.label(bracket.right).unwrap_or_default().to_string(),
                    pval,
                    significant: pval < SIGNIFICANCE,
                })
            })
            .collect()
    }
}
