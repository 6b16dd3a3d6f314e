//! Surface parameters: a fixed surface flame series computed from
//! surface fuel and weather (spec.md §2 Surface parameters row).
//!
//! # References
//! - Rothermel, R.C. (1972). "A mathematical model for predicting fire
//!   spread in wildland fuels." USDA Forest Service Research Paper
//!   INT-115. (heat content, `18,622 kJ/kg` standard fuel value)
//! - Byram, G.M. (1959). "Combustion of forest fuels." In *Forest Fires:
//!   Control and Use* — fireline intensity `I = H·w·r` and flame length
//!   `L = 0.0775·I^0.46`.

use serde::{Deserialize, Serialize};

use crate::core_types::flame::{Flame, PreHeatingFlame};
use crate::core_types::geometry::Coord;
use crate::core_types::site::{SurfaceFuel, Weather};
use crate::core_types::stratum::StratumLevel;
use crate::core_types::units::Radians;

/// Standard wildland fuel heat content (Rothermel 1972).
const HEAT_CONTENT_KJ_PER_KG: f64 = 18_622.0;

/// Fixed surface fire behaviour derived from surface fuel and weather.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFireParameters {
    pub flame_length: f64,
    pub flame_angle: Radians,
    pub flame_residence_time: f64,
    pub wind_speed_m_s: f64,
    pub temperature: f64,
}

impl SurfaceFireParameters {
    /// Simplified rate of spread (m/s): increases with wind and fine
    /// fuel, decreases as dead-fuel moisture approaches its
    /// moisture-of-extinction.
    fn rate_of_spread(fuel: &SurfaceFuel, wind_m_s: f64) -> f64 {
        let moisture_factor = (1.0 - fuel.dead_fuel_moisture / 0.3).max(0.0);
        let fineness_factor = (1.0 + 50.0 * fuel.mean_fineness_leaves).min(3.0);
        0.01 * (1.0 + wind_m_s) * fineness_factor * moisture_factor
    }

    /// Byram's fireline intensity (kW/m): `I = H * w * r`, with fuel
    /// load `w` converted from tonnes/ha to kg/m^2.
    fn fireline_intensity(fuel: &SurfaceFuel, rate_of_spread: f64) -> f64 {
        let fuel_load_kg_m2 = fuel.fuel_load * 0.1;
        HEAT_CONTENT_KJ_PER_KG * fuel_load_kg_m2 * rate_of_spread
    }

    /// Computes the fixed surface flame parameters for a site's surface
    /// fuel and weather.
    #[must_use]
    pub fn compute(fuel: &SurfaceFuel, weather: &Weather) -> Self {
        let wind_speed_m_s = weather.wind_speed_m_s();
        let rate_of_spread = Self::rate_of_spread(fuel, wind_speed_m_s);
        let intensity = Self::fireline_intensity(fuel, rate_of_spread);
        let flame_length = 0.0775 * intensity.powf(0.46);
        let flame_angle = Flame::wind_effect_flame_angle(flame_length, wind_speed_m_s, fuel.slope);
        let flame_residence_time = 40.0 + 2000.0 * fuel.mean_fuel_diameter;

        SurfaceFireParameters {
            flame_length,
            flame_angle,
            flame_residence_time,
            wind_speed_m_s,
            temperature: weather.air_temperature,
        }
    }

    /// The single steady-state surface flame.
    #[must_use]
    pub fn flame(&self) -> Flame {
        let delta_temperature = (40.0 * self.flame_length.sqrt() * 100.0).min(1200.0);
        Flame::new(
            self.flame_length,
            self.flame_angle,
            Coord::new(0.0, 0.0),
            self.flame_length,
            delta_temperature,
        )
    }

    /// `steps` repetitions of the surface flame, to serve as the
    /// incident-flame series for the lowest stratum's plant run.
    #[must_use]
    pub fn flame_series(&self, steps: usize) -> Vec<Flame> {
        vec![self.flame(); steps]
    }

    /// The initial pre-heating flame fed to the stratum orchestrator,
    /// active for the surface fire's residence time.
    #[must_use]
    pub fn initial_pre_heating_flame(&self) -> PreHeatingFlame {
        PreHeatingFlame::new(
            self.flame(),
            StratumLevel::NearSurface,
            0.0,
            self.flame_residence_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuel() -> SurfaceFuel {
        SurfaceFuel {
            slope: Radians(0.0),
            mean_fuel_diameter: 0.005,
            mean_fineness_leaves: 0.002,
            fuel_load: 17.3,
            dead_fuel_moisture: 0.1,
        }
    }

    fn weather() -> Weather {
        Weather {
            air_temperature: 29.2,
            wind_speed_km_h: 10.0,
        }
    }

    #[test]
    fn surface_flame_has_positive_length_and_residence_time() {
        let params = SurfaceFireParameters::compute(&fuel(), &weather());
        assert!(params.flame_length > 0.0);
        assert!(params.flame_residence_time > 0.0);
    }

    #[test]
    fn flame_series_repeats_the_steady_flame() {
        let params = SurfaceFireParameters::compute(&fuel(), &weather());
        let series = params.flame_series(5);
        assert_eq!(series.len(), 5);
        assert!(series.iter().all(|f| f.length == series[0].length));
    }

    #[test]
    fn higher_wind_increases_flame_length() {
        let calm = SurfaceFireParameters::compute(
            &fuel(),
            &Weather {
                air_temperature: 29.2,
                wind_speed_km_h: 2.0,
            },
        );
        let windy = SurfaceFireParameters::compute(
            &fuel(),
            &Weather {
                air_temperature: 29.2,
                wind_speed_km_h: 40.0,
            },
        );
        assert!(windy.flame_length > calm.flame_length);
    }
}
