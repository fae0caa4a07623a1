//! Levene's test for homogeneity of variance, median-centred
//! (Brown-Forsythe variant)

use crate::helpers::median;
use crate::omnibus::{anova, OmnibusResult};
use asva_core::AsvaError;

/// Levene's test: z = |x - median(group)|, then one-way ANOVA on z
pub fn levene(groups: &[Vec<f64>]) -> Result<OmnibusResult, AsvaError> {
    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let center = median(g);
            g.iter().map(|x| (x - center).abs()).collect()
        })
        .collect();
    anova(&deviations).map_err(|e| e.with_note("in levene()"))
}
