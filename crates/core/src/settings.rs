//! Model constants, bundled into one settings record instead of module
//! globals (spec.md §9: "No global mutable state").

use serde::{Deserialize, Serialize};

/// Tunable constants governing the ignition-path simulator and stratum
/// orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// `ΔT`: the simulator's discrete time step, in seconds.
    pub computation_time_interval: f64,
    /// Number of equal subdivisions tested along each candidate
    /// ignition path per time step.
    pub num_penetration_steps: u32,
    /// Maximum number of time steps the simulator runs *after* the
    /// first ignition.
    pub max_ignition_time_steps: u32,
    /// Width of the artificial rectangular crown used for a stratum
    /// run.
    pub stratum_big_crown_width: f64,
    /// Flame residence time substituted for a canopy fire beyond the
    /// canopy heating distance.
    pub reduced_canopy_flame_residence_time: f64,
    /// Multiplier reducing ignition delay time for grass species.
    pub grass_idt_reduction: f64,
    /// `ΔT` (temperature rise) assigned to plant flames from grass
    /// species.
    pub grass_flame_delta_temperature: f64,
    /// `ΔT` assigned to plant flames from non-grass species.
    pub main_flame_delta_temperature: f64,
    /// Minimum plume temperature increase counted as meaningful canopy
    /// heating.
    pub min_temp_for_canopy_heating: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings {
            computation_time_interval: 1.0,
            num_penetration_steps: 10,
            max_ignition_time_steps: 20,
            stratum_big_crown_width: 100.0,
            reduced_canopy_flame_residence_time: 20.0,
            grass_idt_reduction: 0.05,
            grass_flame_delta_temperature: 700.0,
            main_flame_delta_temperature: 1100.0,
            min_temp_for_canopy_heating: 300.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_seed_scenario_constants() {
        let settings = ModelSettings::default();
        assert_eq!(settings.computation_time_interval, 1.0);
        assert_eq!(settings.num_penetration_steps, 10);
        assert_eq!(settings.max_ignition_time_steps, 20);
    }
}
