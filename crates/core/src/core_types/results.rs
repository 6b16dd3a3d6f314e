//! Result records: per-stratum outcomes and the two full-run results
//! (spec.md §3 StratumOutcome / FireModelRunResult / FireModelResult).

use serde::{Deserialize, Serialize};

use super::flame::Flame;
use super::ignition::IgnitionPath;
use super::stratum::StratumLevel;
use crate::surface::SurfaceFireParameters;

fn max_flame_length(flames: &[Flame]) -> f64 {
    flames.iter().map(|f| f.length).fold(0.0, f64::max)
}

/// One stratum's plant-run and (optional) stratum-run outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumOutcome {
    pub stratum_level: StratumLevel,
    pub plant_paths: Vec<IgnitionPath>,
    pub plant_flames: Option<Vec<Flame>>,
    pub stratum_paths: Option<Vec<IgnitionPath>>,
    pub stratum_flames: Option<Vec<Flame>>,
}

impl StratumOutcome {
    #[must_use]
    pub fn non_ignition(stratum_level: StratumLevel, plant_paths: Vec<IgnitionPath>) -> Self {
        StratumOutcome {
            stratum_level,
            plant_paths,
            plant_flames: None,
            stratum_paths: None,
            stratum_flames: None,
        }
    }

    /// Picks plant-run or stratum-run flames, whichever the supplied
    /// comparator key ranks higher.
    #[must_use]
    pub fn largest_flame_series_by<F: Fn(&[Flame]) -> f64>(&self, key: F) -> Option<&[Flame]> {
        match (&self.plant_flames, &self.stratum_flames) {
            (Some(p), Some(s)) => {
                if key(s) > key(p) {
                    Some(s.as_slice())
                } else {
                    Some(p.as_slice())
                }
            }
            (Some(p), None) => Some(p.as_slice()),
            (None, Some(s)) => Some(s.as_slice()),
            (None, None) => None,
        }
    }

    /// The flame series with the greater `maxFlameLength` (spec.md §3:
    /// "flame series per stratum are derived by selecting ... the
    /// flame series with greater maxFlameLength").
    #[must_use]
    pub fn largest_flame_series(&self) -> Option<&[Flame]> {
        self.largest_flame_series_by(max_flame_length)
    }
}

/// The full result of one top-level run: surface fire parameters, every
/// stratum's outcome, and the combined flame series propagated to the
/// canopy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireModelRunResult {
    pub surface_params: SurfaceFireParameters,
    pub stratum_outcomes: Vec<StratumOutcome>,
    pub combined_flames: Vec<Flame>,
}

impl FireModelRunResult {
    #[must_use]
    pub fn new(surface_params: SurfaceFireParameters) -> Self {
        FireModelRunResult {
            surface_params,
            stratum_outcomes: Vec::new(),
            combined_flames: Vec::new(),
        }
    }

    /// Builds a result in one shot from a complete outcome list (used
    /// by the round-trip law in spec.md §8: this must equal the result
    /// of folding [`Self::with_outcome`] over the same list).
    #[must_use]
    pub fn from_outcomes(
        surface_params: SurfaceFireParameters,
        stratum_outcomes: Vec<StratumOutcome>,
        combined_flames: Vec<Flame>,
    ) -> Self {
        FireModelRunResult {
            surface_params,
            stratum_outcomes,
            combined_flames,
        }
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: StratumOutcome) -> Self {
        self.stratum_outcomes.push(outcome);
        self
    }

    #[must_use]
    pub fn with_combined_flames(mut self, combined_flames: Vec<Flame>) -> Self {
        self.combined_flames = combined_flames;
        self
    }

    #[must_use]
    pub fn outcome(&self, level: StratumLevel) -> Option<&StratumOutcome> {
        self.stratum_outcomes.iter().find(|o| o.stratum_level == level)
    }

    /// Convenience accessor for a stratum's derived flame series,
    /// implied by spec.md §3 ("flame series per stratum are derived")
    /// but not itself named as an operation there.
    #[must_use]
    pub fn stratum_flame_series(&self, level: StratumLevel) -> Option<&[Flame]> {
        self.outcome(level).and_then(StratumOutcome::largest_flame_series)
    }
}

/// The first (and optional second, canopy-excluded) run of the whole
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireModelResult {
    pub run1: FireModelRunResult,
    pub run2: Option<FireModelRunResult>,
}

impl FireModelResult {
    #[must_use]
    pub fn has_second_run(&self) -> bool {
        self.run2.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_params() -> SurfaceFireParameters {
        SurfaceFireParameters {
            flame_length: 1.0,
            flame_angle: super::super::units::Radians(1.0),
            flame_residence_time: 60.0,
            wind_speed_m_s: 2.0,
            temperature: 25.0,
        }
    }

    #[test]
    fn incremental_build_equals_one_shot_build() {
        let outcome_a = StratumOutcome::non_ignition(StratumLevel::NearSurface, vec![]);
        let outcome_b = StratumOutcome::non_ignition(StratumLevel::Elevated, vec![]);

        let incremental = FireModelRunResult::new(surface_params())
            .with_outcome(outcome_a.clone())
            .with_outcome(outcome_b.clone())
            .with_combined_flames(vec![]);

        let one_shot = FireModelRunResult::from_outcomes(
            surface_params(),
            vec![outcome_a, outcome_b],
            vec![],
        );

        assert_eq!(incremental, one_shot);
    }

    #[test]
    fn largest_flame_series_prefers_greater_max_length() {
        let flame = |length: f64| Flame {
            length,
            angle: super::super::units::Radians(0.0),
            origin: super::super::geometry::Coord::new(0.0, 0.0),
            depth_ignited: 0.1,
            delta_temperature: 400.0,
        };
        let outcome = StratumOutcome {
            stratum_level: StratumLevel::Elevated,
            plant_paths: vec![],
            plant_flames: Some(vec![flame(1.0)]),
            stratum_paths: None,
            stratum_flames: Some(vec![flame(3.0)]),
        };
        let series = outcome.largest_flame_series().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].length, 3.0);
    }
}
