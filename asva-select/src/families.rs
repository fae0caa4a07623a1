//! The five test families

use crate::{Decision, FamilyMeta, FamilyOutcome, OmnibusP, TestFamily};
use asva_core::{AsvaError, GroupSamples, PairwiseRecord, PairwiseTable};
use asva_stats::PairStat;

/// Label pairwise index results with group names
fn label_pairs(samples: &GroupSamples, pairs: &[PairStat]) -> Result<PairwiseTable, AsvaError> {
    let groups = samples.groups();
    let mut table = PairwiseTable::new();
    for pair in pairs {
        let (Some(a), Some(b)) = (groups.label(pair.left), groups.label(pair.right)) else {
            return Err(AsvaError::internal(format!(
                "pair ({}, {}) out of range for {} groups",
                pair.left,
                pair.right,
                groups.len()
            )));
        };
        table.push(PairwiseRecord::new(a, b, pair.statistic, pair.pval))?;
    }
    Ok(table)
}

/// The two samples of a two-group comparison, with their labels
fn two_samples(samples: &GroupSamples) -> Result<(&str, &[f64], &str, &[f64]), AsvaError> {
    let mut iter = samples.iter();
    match (iter.next(), iter.next(), iter.next()) {
        (Some((la, a)), Some((lb, b)), None) => Ok((la, a, lb, b)),
        _ => Err(AsvaError::internal(format!(
            "two-group family called with {} groups",
            samples.groups().len()
        ))),
    }
}

// ============ One-way ANOVA + Tukey HSD ============

pub struct AnovaTukey;

impl TestFamily for AnovaTukey {
    fn meta(&self) -> FamilyMeta {
        FamilyMeta {
            name: "anova_tukey",
            premise: "The data is normally distributed with equal variances.",
            omnibus: Some("One-way ANOVA"),
            post_hoc: "Tukey post hoc test",
        }
    }

    fn decision(&self) -> Decision {
        Decision::MANY_EQUAL_VARIANCE
    }

    fn run(&self, samples: &GroupSamples) -> Result<FamilyOutcome, AsvaError> {
        let omnibus = asva_stats::anova(samples.samples())?;
        let pairs = asva_stats::tukey_hsd(samples.samples())?;
        Ok(FamilyOutcome {
            omnibus_p: OmnibusP::Value(omnibus.pval),
            omnibus: Some(omnibus),
            pairwise: label_pairs(samples, &pairs)?,
        })
    }
}

// ============ Welch's ANOVA + Games-Howell ============

pub struct WelchGamesHowell;

impl TestFamily for WelchGamesHowell {
    fn meta(&self) -> FamilyMeta {
        FamilyMeta {
            name: "welch_games_howell",
            premise: "The data is normally distributed with unequal variances.",
            omnibus: Some("Welch's ANOVA"),
            post_hoc: "Games-Howell post hoc test",
        }
    }

    fn decision(&self) -> Decision {
        Decision::MANY_UNEQUAL_VARIANCE
    }

    fn run(&self, samples: &GroupSamples) -> Result<FamilyOutcome, AsvaError> {
        let omnibus = asva_stats::welch_anova(samples.samples())?;
        let pairs = asva_stats::games_howell(samples.samples())?;
        Ok(FamilyOutcome {
            omnibus_p: OmnibusP::Value(omnibus.pval),
            omnibus: Some(omnibus),
            pairwise: label_pairs(samples, &pairs)?,
        })
    }
}

// ============ Kruskal-Wallis + Šidák-corrected Mann-Whitney U ============

pub struct KruskalSidak;

impl TestFamily for KruskalSidak {
    fn meta(&self) -> FamilyMeta {
        FamilyMeta {
            name: "kruskal_sidak",
            premise: "The data is not normally distributed.",
            omnibus: Some("Kruskal-Wallis test"),
            post_hoc: "Mann-Whitney U test with Šidák multiple comparison correction",
        }
    }

    fn decision(&self) -> Decision {
        Decision::MANY_NONPARAMETRIC
    }

    fn run(&self, samples: &GroupSamples) -> Result<FamilyOutcome, AsvaError> {
        let omnibus = asva_stats::kruskal_wallis(samples.samples())?;
        let pairs = asva_stats::pairwise_mann_whitney(samples.samples())?;
        Ok(FamilyOutcome {
            omnibus_p: OmnibusP::Value(omnibus.pval),
            omnibus: Some(omnibus),
            pairwise: label_pairs(samples, &pairs)?,
        })
    }
}

// ============ Two groups: t-test ============

pub struct TwoSampleT;

impl TestFamily for TwoSampleT {
    fn meta(&self) -> FamilyMeta {
        FamilyMeta {
            name: "t_test",
            premise: "The data is normally distributed.",
            omnibus: None,
            post_hoc: "t-test",
        }
    }

    fn decision(&self) -> Decision {
        Decision::TWO_PARAMETRIC
    }

    fn run(&self, samples: &GroupSamples) -> Result<FamilyOutcome, AsvaError> {
        let (la, a, lb, b) = two_samples(samples)?;
        let r = asva_stats::t_test(a, b)?;
        let mut pairwise = PairwiseTable::new();
        pairwise.push(PairwiseRecord::new(la, lb, r.statistic, r.pval))?;
        Ok(FamilyOutcome {
            omnibus_p: OmnibusP::NotApplicable,
            omnibus: None,
            pairwise,
        })
    }
}

// ============ Two groups: Mann-Whitney U ============

pub struct TwoSampleMannWhitney;

impl TestFamily for TwoSampleMannWhitney {
    fn meta(&self) -> FamilyMeta {
        FamilyMeta {
            name: "mann_whitney_u",
            premise: "The data is not normally distributed.",
            omnibus: None,
            post_hoc: "Mann-Whitney U test",
        }
    }

    fn decision(&self) -> Decision {
        Decision::TWO_NONPARAMETRIC
    }

    fn run(&self, samples: &GroupSamples) -> Result<FamilyOutcome, AsvaError> {
        let (la, a, lb, b) = two_samples(samples)?;
        let r = asva_stats::mann_whitney_u(a, b)?;
        let mut pairwise = PairwiseTable::new();
        pairwise.push(PairwiseRecord::new(la, lb, r.statistic, r.pval))?;
        Ok(FamilyOutcome {
            omnibus_p: OmnibusP::NotApplicable,
            omnibus: None,
            pairwise,
        })
    }
}

/// One-line description of a family's outcome
pub fn narrative(meta: &FamilyMeta, omnibus_p: OmnibusP) -> String {
    match (meta.omnibus, omnibus_p.value()) {
        (Some(test), Some(p)) => format!("{} {}: p={:.3} --> {}", meta.premise, test, p, meta.post_hoc),
        _ => format!("{} --> {}", meta.premise, meta.post_hoc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Vec<f64> {
        vec![-1.5, -1.0, -0.65, -0.35, -0.1, 0.1, 0.35, 0.65, 1.0, 1.5]
    }

    fn shifted(center: f64, scale: f64) -> Vec<f64> {
        base().iter().map(|x| center + scale * x).collect()
    }

    #[test]
    fn test_anova_tukey_labels_pairs() {
        let samples = GroupSamples::from_pairs([
            ("a", shifted(10.0, 1.0)),
            ("b", shifted(12.0, 1.0)),
            ("c", shifted(11.0, 1.1)),
        ]);
        let outcome = AnovaTukey.run(&samples).unwrap();
        assert!(outcome.omnibus_p.is_applicable());
        assert_eq!(outcome.pairwise.len(), 3);
        let first = &outcome.pairwise.records()[0];
        assert_eq!((first.group_a.as_str(), first.group_b.as_str()), ("a", "b"));
    }

    #[test]
    fn test_two_sample_t_not_applicable() {
        let samples = GroupSamples::from_pairs([("x", shifted(10.0, 1.0)), ("y", shifted(12.0, 1.0))]);
        let outcome = TwoSampleT.run(&samples).unwrap();
        assert_eq!(outcome.omnibus_p, OmnibusP::NotApplicable);
        assert!((outcome.pairwise.lookup("y", "x").unwrap() - 1.24876e-4).abs() < 1e-8);
    }

    #[test]
    fn test_two_sample_family_rejects_three_groups() {
        let samples = GroupSamples::from_pairs([("a", vec![1.0]), ("b", vec![2.0]), ("c", vec![3.0])]);
        let err = TwoSampleMannWhitney.run(&samples).unwrap_err();
        assert_eq!(err.code, asva_core::codes::INTERNAL);
    }

    #[test]
    fn test_narrative() {
        let text = narrative(&AnovaTukey.meta(), OmnibusP::Value(0.0123));
        assert_eq!(
            text,
            "The data is normally distributed with equal variances. One-way ANOVA: p=0.012 --> Tukey post hoc test"
        );
        let text = narrative(&TwoSampleT.meta(), OmnibusP::NotApplicable);
        assert_eq!(text, "The data is normally distributed. --> t-test");
    }
}
