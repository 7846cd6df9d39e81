//! Evaluating rod distributions at individual sections and on uniform grids

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::results::ElementResult;

/// Upper bound on stations generated for a single rod
pub const MAX_STATIONS_PER_ROD: usize = 10_000;

/// Upper bound on stations generated by one [`sample_uniform`] call
pub const MAX_SAMPLES: usize = 200_000;

/// Values of a rod's distributions at one local coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionValues {
    pub rod_id: i64,
    /// Local coordinate from the left node
    pub x: f64,
    pub axial_force: f64,
    pub stress: f64,
    pub displacement: f64,
    /// |σ(x)| exceeds the allowable stress
    pub overstressed: bool,
}

/// A station produced by [`sample_uniform`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSample {
    #[serde(flatten)]
    pub values: SectionValues,
    /// Station sits on one of the rod ends
    pub is_boundary: bool,
}

impl ElementResult {
    /// Evaluate every distribution at `x`, which must lie within `[0, L]`
    pub fn section_at(&self, x: f64) -> AnalysisResult<SectionValues> {
        if !(x.is_finite() && (0.0..=self.length).contains(&x)) {
            return Err(AnalysisError::OutOfRange {
                rod: self.rod_id,
                x,
                length: self.length,
            });
        }
        Ok(self.values_at(x))
    }

    fn values_at(&self, x: f64) -> SectionValues {
        let stress = self.stress_at(x);
        SectionValues {
            rod_id: self.rod_id,
            x,
            axial_force: self.axial_force_at(x),
            stress,
            displacement: self.displacement_at(x),
            overstressed: stress.abs() > self.allowable_stress,
        }
    }
}

/// Number of grid points strictly inside `[0, length)`, at most one more than the
/// stations finally kept
fn grid_points(length: f64, step: f64) -> AnalysisResult<usize> {
    if !(step.is_finite() && step > 0.0) {
        return Err(AnalysisError::InvalidStep(step));
    }

    let count = (length / step).ceil();
    if !count.is_finite() || count > MAX_STATIONS_PER_ROD as f64 {
        return Err(AnalysisError::InvalidStep(step));
    }
    Ok(count as usize)
}

/// Local stations `0, step, 2·step, …` below `length`, followed by `length`
pub fn stations(length: f64, step: f64) -> AnalysisResult<Vec<f64>> {
    let count = grid_points(length, step)?;

    let mut xs: Vec<f64> = (0..count)
        .map(|k| k as f64 * step)
        .take_while(|&x| x < length)
        .collect();
    xs.push(length);
    Ok(xs)
}

/// Sample every rod on a uniform grid of local stations
///
/// Rods are visited in order; within a rod stations ascend and both ends are
/// always present. Fails with [`AnalysisError::InvalidStep`] when the grid
/// would exceed [`MAX_SAMPLES`] stations in total.
pub fn sample_uniform(elements: &[ElementResult], step: f64) -> AnalysisResult<Vec<SectionSample>> {
    let mut total = 0usize;
    for element in elements {
        total = total.saturating_add(grid_points(element.length, step)? + 1);
    }
    if total > MAX_SAMPLES {
        log::warn!("Sampling with step {} needs {} stations", step, total);
        return Err(AnalysisError::InvalidStep(step));
    }

    let mut samples = Vec::with_capacity(total);

    for element in elements {
        let xs = stations(element.length, step)?;
        let last = xs.len() - 1;
        samples.extend(xs.into_iter().enumerate().map(|(k, x)| SectionSample {
            values: element.values_at(x),
            is_boundary: k == 0 || k == last,
        }));
    }

    log::debug!(
        "Sampled {} stations over {} rods with step {}",
        samples.len(),
        elements.len(),
        step
    );

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Node, Rod};
    use crate::postprocess::element_result;
    use approx::assert_relative_eq;

    fn loaded_rod() -> ElementResult {
        let rod = Rod::new(4, 2.0, 1.0, 100.0, 5.0).with_distributed_load(6.0);
        element_result(&rod, Node::fixed(0), Node::fixed(1), 0.0, 0.0)
    }

    #[test]
    fn test_section_at_ends() {
        let e = loaded_rod();
        let left = e.section_at(0.0).unwrap();
        let right = e.section_at(2.0).unwrap();

        assert_relative_eq!(left.axial_force, 6.0);
        assert_relative_eq!(right.axial_force, -6.0);
        assert!(left.overstressed);
        assert_eq!(left.rod_id, 4);
        assert_relative_eq!(right.displacement, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_section_outside_rod() {
        let e = loaded_rod();
        assert!(matches!(
            e.section_at(2.5),
            Err(AnalysisError::OutOfRange { rod: 4, .. })
        ));
        assert!(e.section_at(-1e-9).is_err());
        assert!(e.section_at(f64::NAN).is_err());
    }

    #[test]
    fn test_stations_include_both_ends() {
        assert_eq!(stations(1.0, 0.25).unwrap(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(stations(1.0, 0.4).unwrap(), vec![0.0, 0.4, 0.8, 1.0]);
        assert_eq!(stations(1.0, 5.0).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_invalid_step() {
        assert_eq!(stations(1.0, 0.0), Err(AnalysisError::InvalidStep(0.0)));
        assert!(stations(1.0, -1.0).is_err());
        assert!(stations(1.0, f64::INFINITY).is_err());
        assert!(stations(1.0, 1e-9).is_err());
    }

    #[test]
    fn test_sample_uniform_boundaries() {
        let elements = vec![loaded_rod(), loaded_rod()];
        let samples = sample_uniform(&elements, 0.5).unwrap();

        assert_eq!(samples.len(), 10);
        let boundaries: Vec<bool> = samples.iter().map(|s| s.is_boundary).collect();
        assert_eq!(
            boundaries,
            vec![true, false, false, false, true, true, false, false, false, true]
        );
        assert_relative_eq!(samples[2].values.axial_force, 0.0);
    }

    #[test]
    fn test_sample_total_is_capped() {
        // 5000 stations per rod is fine alone, 50 rods together are not
        let elements = vec![loaded_rod(); 50];
        assert!(stations(2.0, 4e-4).is_ok());
        assert_eq!(
            sample_uniform(&elements, 4e-4),
            Err(AnalysisError::InvalidStep(4e-4))
        );
        assert!(sample_uniform(&elements[..2], 4e-4).is_ok());
    }
}
