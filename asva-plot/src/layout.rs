//! Box-plot layout: y-limits, figure size, box statistics, quartile
//! markers and bracket geometry

use crate::planner::Annotation;
use asva_core::{AsvaError, Dataset, GroupSamples};
use asva_stats::helpers::{drop_nan, percentile_sorted, sorted};
use serde::Serialize;
use std::collections::BTreeMap;

/// Vertical position of the tier-0 bracket base, as a fraction of the y-range
const BRACKET_BASE: f64 = 0.900;
/// Fraction of the y-range between tiers
const TIER_STEP: f64 = 0.08;
const BRACKET_HEIGHT: f64 = 0.024;
const LABEL_BASE: f64 = 0.94;
/// Half-width of a quartile marker line around its box center
const MARKER_HALF_WIDTH: f64 = 0.4;

/// Figure size in inches for `k` groups
pub fn figure_size(k: usize) -> (f64, f64) {
    let k = k as f64;
    (2.5 + 0.5 * k, 8.0 + 0.5 * k)
}

/// y-axis limits from the column minimum and maximum
pub fn y_limits(min: f64, max: f64, k: usize) -> Result<(f64, f64), AsvaError> {
    if min.is_nan() || max.is_nan() {
        return Err(AsvaError::domain_error("no observations to plot"));
    }
    let top = max * (1.0 + 0.2 * k as f64);
    if min > 0.0 {
        Ok((min - 0.03 * (max * 1.5), top))
    } else if min == 0.0 {
        Ok((max - max * 1.05, top))
    } else {
        Err(AsvaError::negative_measurement(min))
    }
}

/// Box-and-whisker statistics of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// Observations for the strip overlay, NaN removed
    pub observations: Vec<f64>,
}

impl BoxStats {
    /// `None` when the sample has no non-NaN observation
    pub fn from_sample(label: &str, sample: &[f64]) -> Option<Self> {
        let observations = drop_nan(sample);
        if observations.is_empty() {
            return None;
        }
        let s = sorted(&observations);
        let q1 = percentile_sorted(&s, 25.0);
        let q3 = percentile_sorted(&s, 75.0);
        let fence = 1.5 * (q3 - q1);
        let whisker_low = s.iter().copied().find(|&x| x >= q1 - fence).unwrap_or(q1);
        let whisker_high = s.iter().rev().copied().find(|&x| x <= q3 + fence).unwrap_or(q3);

        Some(Self {
            label: label.to_string(),
            q1,
            median: percentile_sorted(&s, 50.0),
            q3,
            whisker_low,
            whisker_high,
            observations,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Horizontal 25th/75th percentile lines drawn across a box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuartileMarker {
    pub x: (f64, f64),
    pub q25: f64,
    pub q75: f64,
}

/// Bracket placed in data coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketGeometry {
    pub annotation: Annotation,
    pub x: (f64, f64),
    pub y_base: f64,
    pub y_top: f64,
    pub label_x: f64,
    pub label_y: f64,
}

/// Everything a renderer needs to draw one column's chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotLayout {
    pub column: String,
    pub figure_size: (f64, f64),
    pub ylim: (f64, f64),
    /// One box per group, in group order; position i is box i
    pub boxes: Vec<BoxStats>,
    pub quartile_markers: BTreeMap<String, QuartileMarker>,
    pub brackets: Vec<BracketGeometry>,
}

impl PlotLayout {
    /// Layout from the grouped samples alone; y-limits come from the samples
    pub fn build(column: &str, samples: &GroupSamples, annotations: &[Annotation]) -> Result<Self, AsvaError> {
        let extent = samples
            .values()
            .filter(|x| !x.is_nan())
            .fold((f64::NAN, f64::NAN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        Self::build_with_extent(column, samples, extent, annotations)
    }

    /// Layout of a dataset column. The y-limits use the whole column,
    /// including rows without a group label.
    pub fn for_dataset(
        dataset: &Dataset,
        group_column: &str,
        column: &str,
        annotations: &[Annotation],
    ) -> Result<Self, AsvaError> {
        let samples = dataset.group_samples(group_column, column)?;
        let extent = dataset.column_extent(column)?;
        Self::build_with_extent(column, &samples, extent, annotations)
    }

    fn build_with_extent(
        column: &str,
        samples: &GroupSamples,
        (min, max): (f64, f64),
        annotations: &[Annotation],
    ) -> Result<Self, AsvaError> {
        let k = samples.groups().len();
        let ylim = y_limits(min, max, k).map_err(|e| e.in_column(column))?;
        let range = ylim.1 - ylim.0;

        let mut boxes = Vec::with_capacity(k);
        let mut quartile_markers = BTreeMap::new();
        for (i, (label, sample)) in samples.iter().enumerate() {
            let Some(stats) = BoxStats::from_sample(label, sample) else {
                continue;
            };
            let center = i as f64;
            quartile_markers.insert(
                label.to_string(),
                QuartileMarker {
                    x: (center - MARKER_HALF_WIDTH, center + MARKER_HALF_WIDTH),
                    q25: stats.q1,
                    q75: stats.q3,
                },
            );
            boxes.push(stats);
        }

        let brackets = annotations
            .iter()
            .map(|a| {
                let tier = a.bracket.tier as f64;
                let base = BRACKET_BASE - TIER_STEP * tier;
                BracketGeometry {
                    annotation: a.clone(),
                    x: a.bracket.span,
                    y_base: ylim.0 + base * range,
                    y_top: ylim.0 + (base + BRACKET_HEIGHT) * range,
                    label_x: a.bracket.label_x,
                    label_y: ylim.0 + (LABEL_BASE - TIER_STEP * tier) * range,
                }
            })
            .collect();

        Ok(Self {
            column: column.to_string(),
            figure_size: figure_size(k),
            ylim,
            boxes,
            quartile_markers,
            brackets,
        })
    }

    /// Box position of a group label
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.boxes.iter().position(|b| b.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::AnnotationPlanner;
    use asva_core::{codes, PairwiseRecord, PairwiseTable};
    use asva_select::OmnibusP;

    #[test]
    fn test_figure_size() {
        assert_eq!(figure_size(2), (3.5, 9.0));
        assert_eq!(figure_size(4), (4.5, 10.0));
    }

    #[test]
    fn test_y_limits_positive() {
        let (lo, hi) = y_limits(2.0, 10.0, 3).unwrap();
        assert!((lo - (2.0 - 0.45)).abs() < 1e-12);
        assert!((hi - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_y_limits_zero_min() {
        let (lo, hi) = y_limits(0.0, 10.0, 2).unwrap();
        assert!((lo + 0.5).abs() < 1e-12);
        assert!((hi - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_y_limits_negative() {
        let err = y_limits(-0.1, 10.0, 2).unwrap_err();
        assert_eq!(err.code, codes::NEGATIVE_MEASUREMENT_VALUE);
    }

    #[test]
    fn test_box_stats_whiskers() {
        let stats = BoxStats::from_sample("g", &[1.0, 2.0, 3.0, 4.0, 100.0, f64::NAN]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.whisker_low, 1.0);
        // 100 lies beyond q3 + 1.5 * IQR
        assert_eq!(stats.whisker_high, 4.0);
        assert_eq!(stats.observations.len(), 5);
        assert!(BoxStats::from_sample("e", &[f64::NAN]).is_none());
    }

    #[test]
    fn test_layout_bracket_heights() {
        let samples = GroupSamples::from_pairs([("a", vec![1.0, 2.0, 3.0]), ("b", vec![4.0, 5.0, 10.0])]);
        let mut table = PairwiseTable::new();
        table.push(PairwiseRecord::new("a", "b", 0.0, 0.03)).unwrap();
        let plan = AnnotationPlanner.plan(samples.groups(), &table, OmnibusP::NotApplicable).unwrap();

        let layout = PlotLayout::build("v", &samples, &plan).unwrap();
        let (lo, hi) = layout.ylim;
        assert!((lo - (1.0 - 0.45)).abs() < 1e-12);
        assert!((hi - 14.0).abs() < 1e-12);

        let range = hi - lo;
        let b = &layout.brackets[0];
        assert!((b.y_base - (lo + 0.9 * range)).abs() < 1e-9);
        assert!((b.y_top - (lo + 0.924 * range)).abs() < 1e-9);
        assert!((b.label_y - (lo + 0.94 * range)).abs() < 1e-9);
        assert_eq!(b.x, (0.0, 1.0));

        let marker = layout.quartile_markers["b"];
        assert!((marker.x.0 - 0.6).abs() < 1e-12 && (marker.x.1 - 1.4).abs() < 1e-12);
        assert_eq!(marker.q25, 4.5);
        assert_eq!(marker.q75, 7.5);
        assert_eq!(layout.position_of("b"), Some(1));
    }

    #[test]
    fn test_layout_negative_values() {
        let samples = GroupSamples::from_pairs([("a", vec![-1.0, 2.0]), ("b", vec![4.0, 5.0])]);
        let err = PlotLayout::build("v", &samples, &[]).unwrap_err();
        assert_eq!(err.code, codes::NEGATIVE_MEASUREMENT_VALUE);
        assert_eq!(err.context.unwrap().column, Some("v".to_string()));
    }

    #[test]
    fn test_dataset_layout_sees_unlabelled_rows() {
        let ds = Dataset::new()
            .with_column("g", [Some("a"), Some("a"), None, Some("b"), Some("b")])
            .unwrap()
            .with_column("v", [1.0, 2.0, -3.0, 4.0, 5.0])
            .unwrap();
        let samples = ds.group_samples("g", "v").unwrap();
        assert!(PlotLayout::build("v", &samples, &[]).is_ok());

        let err = PlotLayout::for_dataset(&ds, "g", "v", &[]).unwrap_err();
        assert_eq!(err.code, codes::NEGATIVE_MEASUREMENT_VALUE);
    }
}
