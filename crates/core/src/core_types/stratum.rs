//! Stratum model: a horizontal vegetation layer composed of weighted
//! species components (spec.md §3 Stratum).

use serde::{Deserialize, Serialize};

use super::species::Species;
use crate::error::ModelError;

/// The four vegetation strata, totally ordered from the ground up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StratumLevel {
    NearSurface,
    Elevated,
    MidStorey,
    Canopy,
}

/// One species' weighted share of a stratum's composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesComponent {
    pub species: Species,
    pub weight: f64,
}

/// A vegetation stratum: a weighted mix of species at one height band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    pub level: StratumLevel,
    pub species_components: Vec<SpeciesComponent>,
    pub plant_separation: f64,
}

impl Stratum {
    /// # Errors
    /// Returns [`ModelError::InvalidInput`] if no species components are
    /// given, any weight is negative or zero, or `plant_separation` is
    /// negative. Weights are normalized to sum to 1.
    pub fn new(
        level: StratumLevel,
        components: Vec<(Species, f64)>,
        plant_separation: f64,
    ) -> Result<Self, ModelError> {
        if components.is_empty() {
            return Err(ModelError::InvalidInput {
                field: "species_components".to_string(),
                reason: "a stratum must have at least one species component".to_string(),
            });
        }
        if plant_separation < 0.0 {
            return Err(ModelError::InvalidInput {
                field: "plant_separation".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        let total: f64 = components.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(ModelError::InvalidInput {
                field: "species_components".to_string(),
                reason: "component weights must sum to a positive value".to_string(),
            });
        }
        for (_, w) in &components {
            if *w < 0.0 {
                return Err(ModelError::InvalidInput {
                    field: "species_components".to_string(),
                    reason: "component weight must not be negative".to_string(),
                });
            }
        }
        let species_components = components
            .into_iter()
            .map(|(species, weight)| SpeciesComponent {
                species,
                weight: weight / total,
            })
            .collect();
        Ok(Stratum {
            level,
            species_components,
            plant_separation,
        })
    }

    #[must_use]
    pub fn average_width(&self) -> f64 {
        self.species_components
            .iter()
            .map(|c| c.weight * c.species.crown.width())
            .sum()
    }

    #[must_use]
    pub fn average_top(&self) -> f64 {
        self.species_components
            .iter()
            .map(|c| c.weight * c.species.crown.top())
            .sum()
    }

    #[must_use]
    pub fn average_bottom(&self) -> f64 {
        self.species_components
            .iter()
            .map(|c| c.weight * c.species.crown.bottom())
            .sum()
    }

    #[must_use]
    pub fn average_mid_height(&self) -> f64 {
        self.species_components
            .iter()
            .map(|c| c.weight * (c.species.crown.bottom() + c.species.crown.top()) / 2.0)
            .sum()
    }

    /// `max(plantSep, averageWidth)` (spec.md §3).
    #[must_use]
    pub fn model_plant_sep(&self) -> f64 {
        self.plant_separation.max(self.average_width())
    }

    #[must_use]
    pub fn cover(&self) -> f64 {
        let model_sep = self.model_plant_sep();
        if super::numerics::almost_zero(model_sep) {
            return 0.0;
        }
        (self.average_width() / model_sep).powi(2)
    }

    #[must_use]
    pub fn leaf_area_index(&self) -> f64 {
        let weighted_sum: f64 = self
            .species_components
            .iter()
            .map(|c| c.weight * c.species.leaf_area_index())
            .sum();
        self.cover() * weighted_sum
    }
}
