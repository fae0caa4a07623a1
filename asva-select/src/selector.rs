//! TestSelector: classify the data, then dispatch to a test family

use crate::families::narrative;
use crate::traits::{Levene, NormalityTest, ShapiroWilk, VarianceTest};
use crate::{Decision, DistributionVerdict, FamilyRegistry, GroupCountClass, TestResult, VarianceVerdict};
use asva_core::{AsvaError, Dataset, GroupSamples};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of the normality check over all groups
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionCheck {
    pub verdict: DistributionVerdict,
    /// p-value per group label
    pub p_values: BTreeMap<String, f64>,
}

/// Outcome of the variance check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceCheck {
    pub verdict: VarianceVerdict,
    pub p_value: f64,
}

/// Chooses and runs the statistically appropriate test family.
///
/// Holds no per-call state; one selector can serve any number of columns.
#[derive(Clone)]
pub struct TestSelector {
    normality: Arc<dyn NormalityTest>,
    variance: Arc<dyn VarianceTest>,
    registry: FamilyRegistry,
}

impl Default for TestSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSelector {
    /// Shapiro-Wilk, Levene and the standard families
    pub fn new() -> Self {
        Self {
            normality: Arc::new(ShapiroWilk),
            variance: Arc::new(Levene),
            registry: FamilyRegistry::standard(),
        }
    }

    pub fn with_normality_test<N: NormalityTest + 'static>(mut self, test: N) -> Self {
        self.normality = Arc::new(test);
        self
    }

    pub fn with_variance_test<V: VarianceTest + 'static>(mut self, test: V) -> Self {
        self.variance = Arc::new(test);
        self
    }

    pub fn with_registry(mut self, registry: FamilyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &FamilyRegistry {
        &self.registry
    }

    /// Normality check on each group's sample
    pub fn classify_distribution(&self, samples: &GroupSamples) -> Result<DistributionCheck, AsvaError> {
        let mut p_values = BTreeMap::new();
        for (label, sample) in samples.iter() {
            let p = self
                .normality
                .p_value(sample)
                .map_err(|e| e.with_note(format!("{} on group '{}'", self.normality.name(), label)))?;
            debug!(group = label, p, test = self.normality.name(), "normality");
            p_values.insert(label.to_string(), p);
        }
        Ok(DistributionCheck {
            verdict: DistributionVerdict::from_p_values(p_values.values()),
            p_values,
        })
    }

    /// Variance homogeneity check across all groups at once
    pub fn classify_variance(&self, samples: &GroupSamples) -> Result<VarianceCheck, AsvaError> {
        let p_value = self
            .variance
            .p_value(samples.samples())
            .map_err(|e| e.with_note(self.variance.name()))?;
        debug!(p = p_value, test = self.variance.name(), "variance");
        Ok(VarianceCheck {
            verdict: VarianceVerdict::from_p_value(p_value),
            p_value,
        })
    }

    /// Pick and run the test family for one measurement column
    pub fn determine_test(
        &self,
        dataset: &Dataset,
        group_column: &str,
        column: &str,
    ) -> Result<TestResult, AsvaError> {
        let samples = dataset.group_samples(group_column, column)?;
        self.determine_for_samples(group_column, column, &samples)
            .map_err(|e| e.in_column(column).grouped_by(group_column))
    }

    /// Pick and run the test family on samples already split by group
    pub fn determine_for_samples(
        &self,
        group_column: &str,
        column: &str,
        samples: &GroupSamples,
    ) -> Result<TestResult, AsvaError> {
        let group_count = GroupCountClass::from_count(samples.groups().len())?;
        let distribution = self.classify_distribution(samples)?;

        let variance = if Decision::needs_variance(group_count, distribution.verdict) {
            Some(self.classify_variance(samples)?)
        } else {
            None
        };

        let decision = Decision {
            group_count,
            distribution: distribution.verdict,
            variance: variance.map(|v| v.verdict),
        };
        let family = self.registry.dispatch(&decision)?;
        let meta = family.meta();

        let outcome = family.run(&samples.without_nan())?;
        let text = narrative(&meta, outcome.omnibus_p);
        info!(column, family = meta.name, narrative = %text, "test selected");

        Ok(TestResult {
            column: column.to_string(),
            group_column: group_column.to_string(),
            decision,
            family: meta.name.to_string(),
            groups: samples.groups().clone(),
            normality: distribution.p_values,
            variance_p: variance.map(|v| v.p_value),
            omnibus_p: outcome.omnibus_p,
            omnibus: outcome.omnibus,
            pairwise: outcome.pairwise,
            narrative: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OmnibusP;
    use asva_core::codes;
    use std::collections::HashMap;

    /// Normality stub: p-value looked up by the sample's first value
    struct FixedNormality(HashMap<u64, f64>, f64);

    impl FixedNormality {
        fn all(p: f64) -> Self {
            Self(HashMap::new(), p)
        }

        fn failing(first_value: f64, p: f64) -> Self {
            Self(HashMap::from([(first_value.to_bits(), p)]), 0.5)
        }
    }

    impl NormalityTest for FixedNormality {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn p_value(&self, sample: &[f64]) -> Result<f64, AsvaError> {
            let key = sample.first().map(|x| x.to_bits()).unwrap_or(0);
            Ok(self.0.get(&key).copied().unwrap_or(self.1))
        }
    }

    struct FixedVariance(f64);

    impl VarianceTest for FixedVariance {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn p_value(&self, _groups: &[Vec<f64>]) -> Result<f64, AsvaError> {
            Ok(self.0)
        }
    }

    fn base() -> Vec<f64> {
        vec![-1.5, -1.0, -0.65, -0.35, -0.1, 0.1, 0.35, 0.65, 1.0, 1.5]
    }

    fn dataset(groups: &[(&str, f64, f64)]) -> Dataset {
        let mut labels = Vec::new();
        let mut values = Vec::new();
        for &(label, center, scale) in groups {
            for x in base() {
                labels.push(label);
                values.push(center + scale * x);
            }
        }
        Dataset::new()
            .with_column("group", labels)
            .unwrap()
            .with_column("value", values)
            .unwrap()
    }

    #[test]
    fn test_too_few_groups() {
        let ds = dataset(&[("only", 1.0, 1.0)]);
        let err = TestSelector::new().determine_test(&ds, "group", "value").unwrap_err();
        assert_eq!(err.code, codes::TOO_FEW_GROUPS);
        assert_eq!(err.context.unwrap().column, Some("value".to_string()));
    }

    #[test]
    fn test_scenario_two_normal_groups() {
        let ds = dataset(&[("ctrl", 10.0, 1.0), ("treat", 12.0, 1.0)]);
        let selector = TestSelector::new().with_normality_test(FixedNormality::all(0.5));
        let result = selector.determine_test(&ds, "group", "value").unwrap();
        assert_eq!(result.omnibus_p, OmnibusP::NotApplicable);
        assert_eq!(result.decision, Decision::TWO_PARAMETRIC);
        assert_eq!(result.variance_p, None);
        assert_eq!(result.pairwise.len(), 1);
        assert_eq!(result.family, "t_test");
    }

    #[test]
    fn test_scenario_one_group_fails_normality() {
        let ds = dataset(&[("a", 10.0, 1.0), ("b", 12.0, 1.0), ("c", 20.0, 1.0)]);
        // group c starts at 20 - 1.5
        let selector = TestSelector::new()
            .with_normality_test(FixedNormality::failing(18.5, 0.02))
            .with_variance_test(FixedVariance(0.9));
        let result = selector.determine_test(&ds, "group", "value").unwrap();
        assert_eq!(result.decision, Decision::MANY_NONPARAMETRIC);
        assert_eq!(result.family, "kruskal_sidak");
        assert!(result.omnibus_p.is_applicable());
        assert_eq!(result.pairwise.len(), 3);
        assert_eq!(result.variance_p, None);
        assert_eq!(result.normality["c"], 0.02);
    }

    #[test]
    fn test_scenario_four_normal_equal_variance() {
        let ds = dataset(&[("a", 10.0, 1.0), ("b", 12.0, 1.0), ("c", 11.0, 1.1), ("d", 13.0, 0.9)]);
        let selector = TestSelector::new()
            .with_normality_test(FixedNormality::all(0.5))
            .with_variance_test(FixedVariance(0.60));
        let result = selector.determine_test(&ds, "group", "value").unwrap();
        assert_eq!(result.decision, Decision::MANY_EQUAL_VARIANCE);
        assert_eq!(result.family, "anova_tukey");
        assert_eq!(result.pairwise.len(), 6);
        assert!((result.omnibus_p.value().unwrap() - 1.04681e-7).abs() < 1e-10);
        assert!(result.narrative.starts_with("The data is normally distributed with equal variances. One-way ANOVA: p=0.000"));
    }

    #[test]
    fn test_six_groups_still_selects() {
        let ds = dataset(&[
            ("a", 10.0, 1.0),
            ("b", 11.0, 1.0),
            ("c", 12.0, 1.0),
            ("d", 13.0, 1.0),
            ("e", 14.0, 1.0),
            ("f", 15.0, 1.0),
        ]);
        let selector = TestSelector::new()
            .with_normality_test(FixedNormality::all(0.5))
            .with_variance_test(FixedVariance(0.60));
        let result = selector.determine_test(&ds, "group", "value").unwrap();
        assert_eq!(result.pairwise.len(), 15);
        assert_eq!(result.groups.len(), 6);
    }

    #[test]
    fn test_six_groups_nonparametric() {
        let ds = dataset(&[
            ("a", 10.0, 1.0),
            ("b", 11.0, 1.0),
            ("c", 12.0, 1.0),
            ("d", 13.0, 1.0),
            ("e", 14.0, 1.0),
            ("f", 15.0, 1.0),
        ]);
        // group f starts at 15 - 1.5
        let selector = TestSelector::new().with_normality_test(FixedNormality::failing(13.5, 0.02));
        let result = selector.determine_test(&ds, "group", "value").unwrap();
        assert_eq!(result.decision, Decision::MANY_NONPARAMETRIC);
        assert_eq!(result.family, "kruskal_sidak");
        assert_eq!(result.pairwise.len(), 15);
        assert!(result.omnibus_p.value().unwrap() < 0.05);
        for record in result.pairwise.iter() {
            assert!((0.0..=1.0).contains(&record.pval));
        }
    }

    #[test]
    fn test_real_checks_route_unequal_variance() {
        let ds = dataset(&[("a", 10.0, 1.0), ("b", 12.0, 1.0), ("w", 20.0, 6.0)]);
        let result = TestSelector::new().determine_test(&ds, "group", "value").unwrap();
        assert_eq!(result.decision, Decision::MANY_UNEQUAL_VARIANCE);
        assert!((result.variance_p.unwrap() - 1.32770e-4).abs() < 1e-8);
        assert!((result.omnibus_p.value().unwrap() - 1.47248e-5).abs() < 1e-8);
        assert_eq!(result.family, "welch_games_howell");
    }

    #[test]
    fn test_real_checks_route_equal_variance() {
        let ds = dataset(&[("a", 10.0, 1.0), ("b", 12.0, 1.0), ("c", 11.0, 1.1), ("d", 13.0, 0.9)]);
        let result = TestSelector::new().determine_test(&ds, "group", "value").unwrap();
        assert_eq!(result.decision, Decision::MANY_EQUAL_VARIANCE);
        assert!((result.variance_p.unwrap() - 0.943135).abs() < 1e-5);
        for p in result.normality.values() {
            assert!((p - 0.999810).abs() < 1e-4);
        }
    }

    #[test]
    fn test_missing_value_propagates_into_checks() {
        let ds = Dataset::new()
            .with_column("g", ["a", "a", "a", "a", "b", "b", "b", "b"])
            .unwrap()
            .with_column("v", [Some(1.0), Some(2.0), Some(3.5), None, Some(2.0), Some(3.0), Some(4.5), Some(5.0)])
            .unwrap();
        let result = TestSelector::new().determine_test(&ds, "g", "v").unwrap();
        assert!(result.normality["a"].is_nan());
        // NaN is not a normality failure
        assert_eq!(result.decision.distribution, DistributionVerdict::Parametric);
        assert_eq!(result.pairwise.len(), 1);
    }

    #[test]
    fn test_tiny_group_is_domain_error() {
        let ds = Dataset::new()
            .with_column("g", ["a", "a", "b", "b", "b"])
            .unwrap()
            .with_column("v", [1.0, 2.0, 3.0, 4.0, 6.0])
            .unwrap();
        let err = TestSelector::new().determine_test(&ds, "g", "v").unwrap_err();
        assert_eq!(err.code, codes::DOMAIN_ERROR);
    }
}
