//! Species model: per-plant-species leaf, clump, and crown derived
//! quantities (spec.md §3 Species, §4.2 flame length).

use serde::{Deserialize, Serialize};

use super::geometry::CrownPoly;
use super::stratum::StratumLevel;
use crate::error::ModelError;

/// Leaf shape, affecting the ignition-delay-time leaf factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafForm {
    Round,
    Flat,
    Dendritic,
}

impl LeafForm {
    /// `leafFactor` used by [`Species::ignition_delay_time`]: 4 for
    /// round leaves, 2 otherwise.
    fn leaf_factor(self) -> f64 {
        match self {
            LeafForm::Round => 4.0,
            LeafForm::Flat | LeafForm::Dendritic => 2.0,
        }
    }
}

/// How a species' ignition temperature was provided: directly, or
/// derived from its silica-free-ash proportion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum IgnitionTemperatureSource {
    Explicit(f64),
    SilicaFreeAsh(f64),
}

/// Immutable, fully-derived description of one plant species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub crown: CrownPoly,
    pub live_leaf_moisture: f64,
    pub dead_leaf_moisture: f64,
    pub proportion_dead: f64,
    pub leaf_form: LeafForm,
    pub leaf_thickness: f64,
    pub leaf_width: f64,
    pub leaf_length: f64,
    pub leaf_separation: f64,
    pub stem_order: f64,
    pub clump_diameter: f64,
    pub clump_separation: f64,
    ignition_temperature_source: IgnitionTemperatureSource,
}

#[allow(clippy::too_many_arguments)]
impl Species {
    /// # Errors
    /// Returns [`ModelError::InvalidInput`] when any invariant named in
    /// spec.md §7 is violated: blank name, negative moisture/length,
    /// `proportionDead` outside `[0, 1]`, or neither an ignition
    /// temperature nor a silica-free-ash proportion supplied.
    pub fn new(
        name: impl Into<String>,
        crown: CrownPoly,
        live_leaf_moisture: f64,
        dead_leaf_moisture: f64,
        proportion_dead: f64,
        leaf_form: LeafForm,
        leaf_thickness: f64,
        leaf_width: f64,
        leaf_length: f64,
        leaf_separation: f64,
        stem_order: f64,
        clump_diameter: f64,
        clump_separation: f64,
        ignition_temperature: Option<f64>,
        silica_free_ash_proportion: Option<f64>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::InvalidInput {
                field: "name".to_string(),
                reason: "species name must not be blank".to_string(),
            });
        }
        for (field, value) in [
            ("live_leaf_moisture", live_leaf_moisture),
            ("dead_leaf_moisture", dead_leaf_moisture),
            ("leaf_thickness", leaf_thickness),
            ("leaf_width", leaf_width),
            ("leaf_length", leaf_length),
            ("leaf_separation", leaf_separation),
            ("clump_diameter", clump_diameter),
            ("clump_separation", clump_separation),
        ] {
            if value < 0.0 {
                return Err(ModelError::InvalidInput {
                    field: field.to_string(),
                    reason: "must not be negative".to_string(),
                });
            }
        }
        if !(0.0..=1.0).contains(&proportion_dead) {
            return Err(ModelError::InvalidInput {
                field: "proportion_dead".to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        let ignition_temperature_source = match (ignition_temperature, silica_free_ash_proportion)
        {
            (Some(t), _) => IgnitionTemperatureSource::Explicit(t),
            (None, Some(p)) => IgnitionTemperatureSource::SilicaFreeAsh(p),
            (None, None) => {
                return Err(ModelError::InvalidInput {
                    field: "ignition_temperature".to_string(),
                    reason: "either an ignition temperature or a silica-free-ash proportion must be provided"
                        .to_string(),
                });
            }
        };

        Ok(Species {
            name,
            crown,
            live_leaf_moisture,
            dead_leaf_moisture,
            proportion_dead,
            leaf_form,
            leaf_thickness,
            leaf_width,
            leaf_length,
            leaf_separation,
            stem_order,
            clump_diameter,
            clump_separation,
            ignition_temperature_source,
        })
    }

    #[must_use]
    pub fn proportion_live(&self) -> f64 {
        1.0 - self.proportion_dead
    }

    #[must_use]
    pub fn leaf_area(&self) -> f64 {
        self.leaf_width * self.leaf_length / 2.0
    }

    #[must_use]
    pub fn leaf_moisture(&self) -> f64 {
        self.proportion_live() * self.live_leaf_moisture
            + self.proportion_dead * self.dead_leaf_moisture
    }

    /// Flame duration in seconds, floored at the computation interval.
    #[must_use]
    pub fn flame_duration(&self, computation_time_interval: f64) -> f64 {
        let raw = 1.37 * self.leaf_width * self.leaf_thickness * 1e6
            + 1.61 * self.leaf_moisture()
            - 0.027;
        raw.max(computation_time_interval)
    }

    /// The species' ignition temperature, either as supplied or derived
    /// from its silica-free-ash proportion.
    #[must_use]
    pub fn ignition_temperature(&self) -> f64 {
        match self.ignition_temperature_source {
            IgnitionTemperatureSource::Explicit(t) => t,
            IgnitionTemperatureSource::SilicaFreeAsh(p) => {
                let ln_p = (100.0 * p).ln();
                354.0 - 13.9 * ln_p - 2.91 * ln_p * ln_p
            }
        }
    }

    /// Leaf flame length, piecewise on leaf moisture.
    ///
    /// The distilled specification names this quantity without giving
    /// its breakpoints; absent the original source, this uses a
    /// monotonically decreasing three-band approximation (flame length
    /// falls as leaf moisture rises) consistent with the qualitative
    /// behaviour spec.md describes. See DESIGN.md for the Open Question
    /// this resolves.
    #[must_use]
    pub fn leaf_flame_length(&self) -> f64 {
        let m = self.leaf_moisture();
        if m < 0.3 {
            1.3 - 0.6 * m
        } else if m < 1.0 {
            1.12 - (m - 0.3) * (1.12 - 0.4) / 0.7
        } else {
            0.4
        }
    }

    #[must_use]
    pub fn leaves_per_clump(&self) -> f64 {
        0.88 * (self.clump_diameter * self.stem_order / self.leaf_separation).powf(1.18)
    }

    /// Per-species contribution to stratum leaf-area-index: leaf area
    /// carried per clump, spread over the clump's footprint.
    #[must_use]
    pub fn leaf_area_index(&self) -> f64 {
        let footprint = (self.clump_diameter + self.clump_separation).powi(2);
        if footprint <= 0.0 {
            return 0.0;
        }
        self.leaves_per_clump() * self.leaf_area() / footprint
    }

    /// Flame length as a function of ignited-segment length (Zylstra Eq.
    /// 5.76, spec.md §4.2).
    #[must_use]
    pub fn flame_length(&self, ignited_length: f64) -> f64 {
        if super::numerics::almost_zero(ignited_length) {
            return 0.0;
        }
        let denom = self.clump_diameter + self.clump_separation;
        let n_leaves = if super::numerics::almost_zero(denom) {
            0.0
        } else {
            self.leaves_per_clump() * ignited_length / denom
        };
        let term1 = (self.leaf_flame_length() * n_leaves.powf(0.4) + ignited_length).powi(4);
        let term2 = ignited_length.powi(4);
        ignited_length.max((term1 + term2).powf(0.25))
    }

    /// Ignition delay time (seconds) at plume temperature `t` (°C).
    #[must_use]
    pub fn ignition_delay_time(&self, t: f64) -> f64 {
        let leaf_factor = self.leaf_form.leaf_factor();
        let m_prime = 100.0 * self.leaf_moisture() * self.leaf_thickness * 1000.0 / leaf_factor;
        100_168.23 * t.powf(-2.11) * m_prime + 6_018_087.86 * t.powf(-2.39)
    }

    /// True iff this species qualifies as grass (spec.md §4.1 Grass
    /// rule): near-surface, mostly dead, and thin-leaved.
    #[must_use]
    pub fn is_grass(&self, level: StratumLevel) -> bool {
        level == StratumLevel::NearSurface && self.proportion_dead > 0.5 && self.leaf_thickness < 0.00035
    }
}
