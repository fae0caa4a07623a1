//! Test-family registry keyed by decision record

use crate::families::{AnovaTukey, KruskalSidak, TwoSampleMannWhitney, TwoSampleT, WelchGamesHowell};
use crate::{Decision, TestFamily};
use asva_core::AsvaError;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps each decision to the family that handles it
#[derive(Clone, Default)]
pub struct FamilyRegistry {
    families: HashMap<Decision, Arc<dyn TestFamily>>,
}

impl FamilyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the five standard families
    pub fn standard() -> Self {
        Self::new()
            .with_family(AnovaTukey)
            .with_family(WelchGamesHowell)
            .with_family(KruskalSidak)
            .with_family(TwoSampleT)
            .with_family(TwoSampleMannWhitney)
    }

    /// Register a family under its decision, replacing any previous one
    pub fn with_family<F: TestFamily + 'static>(mut self, family: F) -> Self {
        self.families.insert(family.decision(), Arc::new(family));
        self
    }

    pub fn get(&self, decision: &Decision) -> Option<&dyn TestFamily> {
        self.families.get(decision).map(|f| f.as_ref())
    }

    /// Family for the decision; a gap in the registry is an internal error
    pub fn dispatch(&self, decision: &Decision) -> Result<&dyn TestFamily, AsvaError> {
        self.get(decision).ok_or_else(|| {
            AsvaError::internal(format!("no test family registered for: {}", decision))
        })
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Names of registered families
    pub fn family_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.families.values().map(|f| f.meta().name).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_covers_every_decision() {
        let registry = FamilyRegistry::standard();
        assert_eq!(registry.len(), Decision::ALL.len());
        for decision in Decision::ALL {
            let family = registry.dispatch(&decision).unwrap();
            assert_eq!(family.decision(), decision);
        }
    }

    #[test]
    fn test_missing_family_is_internal_error() {
        let registry = FamilyRegistry::new().with_family(TwoSampleT);
        let err = registry.dispatch(&Decision::MANY_NONPARAMETRIC).err().unwrap();
        assert_eq!(err.code, asva_core::codes::INTERNAL);
    }

    #[test]
    fn test_family_names() {
        assert_eq!(
            FamilyRegistry::standard().family_names(),
            vec!["anova_tukey", "kruskal_sidak", "mann_whitney_u", "t_test", "welch_games_howell"]
        );
    }
}
