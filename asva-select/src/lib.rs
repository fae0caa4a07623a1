//! ASVA Test Selection
//!
//! Decides which statistical test fits a measurement column and runs it:
//! - `TestSelector`: normality and variance checks, then dispatch
//! - `Decision`: the record used as registry key
//! - `TestFamily` / `FamilyRegistry`: the five omnibus + pairwise families
//! - `TestResult`: omnibus p-value, pairwise table and narrative

mod decision;
mod families;
mod registry;
mod result;
mod selector;
mod traits;

pub use decision::{Decision, DistributionVerdict, GroupCountClass, VarianceVerdict, ALPHA};
pub use families::{narrative, AnovaTukey, KruskalSidak, TwoSampleMannWhitney, TwoSampleT, WelchGamesHowell};
pub use registry::FamilyRegistry;
pub use result::{FamilyOutcome, OmnibusP, TestResult};
pub use selector::{DistributionCheck, TestSelector, VarianceCheck};
pub use traits::{FamilyMeta, Levene, NormalityTest, ShapiroWilk, TestFamily, VarianceTest};

/// Re-export core types for callers
pub mod prelude {
    pub use crate::{Decision, OmnibusP, TestResult, TestSelector};
    pub use asva_core::prelude::*;
}
