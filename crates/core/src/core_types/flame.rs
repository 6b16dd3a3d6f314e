//! Flame model: geometry, plume temperature queries, lateral merging,
//! wind-effect tilt, and flame-series combination (spec.md §3 Flame /
//! PreHeatingFlame).

use serde::{Deserialize, Serialize};

use super::geometry::Coord;
use super::numerics::almost_zero;
use super::stratum::StratumLevel;
use super::units::Radians;

/// Acceleration of gravity, used by the wind-tilt Froude-number model
/// below.
const GRAVITY: f64 = 9.81;

/// Plume temperature decay exponent beyond the flame tip. Matches the
/// qualitative buoyant-plume falloff used throughout the wildfire
/// literature (Heskestad-style `d^(-5/3)`); the distilled spec leaves
/// the exact exponent unstated, see DESIGN.md.
const PLUME_DECAY_EXPONENT: f64 = 5.0 / 3.0;

/// A flame's geometry and thermal signature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flame {
    pub length: f64,
    pub angle: Radians,
    pub origin: Coord,
    pub depth_ignited: f64,
    pub delta_temperature: f64,
}

impl Flame {
    #[must_use]
    pub fn new(length: f64, angle: Radians, origin: Coord, depth_ignited: f64, delta_temperature: f64) -> Self {
        Flame {
            length,
            angle,
            origin,
            depth_ignited,
            delta_temperature,
        }
    }

    /// The flame tip, `length` away from `origin` along `angle`.
    #[must_use]
    pub fn tip(&self) -> Coord {
        self.origin.translated(self.length, self.angle)
    }

    /// Plume temperature at distance `d` from the flame's origin, given
    /// `ambient` air temperature. Constant at `ambient + deltaT` inside
    /// the flame envelope (`d <= length`), decaying beyond the tip.
    #[must_use]
    pub fn plume_temperature(&self, d: f64, ambient: f64) -> f64 {
        if d <= self.length || almost_zero(self.length) {
            return ambient + self.delta_temperature;
        }
        ambient + self.delta_temperature * (self.length / d).powf(PLUME_DECAY_EXPONENT)
    }

    /// The distance from the origin at which the plume reaches
    /// `target_t`, or `None` if that temperature is never reached
    /// (hotter than the flame itself, or at/below ambient).
    #[must_use]
    pub fn distance_for_temperature(&self, target_t: f64, ambient: f64) -> Option<f64> {
        let excess = target_t - ambient;
        if excess <= 0.0 || excess > self.delta_temperature + 1e-9 {
            return None;
        }
        if almost_zero(excess - self.delta_temperature) || almost_zero(self.length) {
            return Some(self.length);
        }
        let ratio = self.delta_temperature / excess;
        Some(self.length * ratio.powf(1.0 / PLUME_DECAY_EXPONENT))
    }

    /// The flame's tilt angle given its own length, the wind speed
    /// acting on it, and terrain slope. Taller, calmer flames stand
    /// closer to vertical; higher wind tilts the flame towards
    /// horizontal, biased further by slope.
    #[must_use]
    pub fn wind_effect_flame_angle(length: f64, wind: f64, slope: Radians) -> Radians {
        let froude_scale = (GRAVITY * length.max(0.01)).sqrt();
        let tilt_from_vertical = (wind / froude_scale).atan();
        Radians(std::f64::consts::FRAC_PI_2 - tilt_from_vertical + slope.0)
    }

    /// Effective flame length once lateral merging between neighbouring
    /// plants along the fire line is accounted for. Denser plant cover
    /// and a longer fire line relative to plant spacing both increase
    /// the merged length, with diminishing returns.
    #[must_use]
    pub fn lateral_merged_flame_length(
        length: f64,
        fire_line_length: f64,
        plant_width: f64,
        plant_sep: f64,
    ) -> f64 {
        if plant_sep <= 0.0 {
            return length;
        }
        let coverage = (plant_width / plant_sep).min(1.0);
        let effective_plants = (fire_line_length / plant_sep).max(1.0);
        length * (1.0 + 0.1 * coverage * (effective_plants.sqrt() - 1.0))
    }

    /// Fuses two flame series — an `upper` stratum's flames propagating
    /// from a `lower` stratum's flames — into one combined series,
    /// stacking flame length and re-deriving the tilt angle from a
    /// weighted wind speed. The shorter series is extended by repeating
    /// its last flame so the combined series spans the longer one.
    #[must_use]
    pub fn combine_flames(
        upper: &[Flame],
        lower: &[Flame],
        weighted_wind: f64,
        slope: Radians,
        fire_line_length: f64,
    ) -> Vec<Flame> {
        let steps = upper.len().max(lower.len());
        let mut combined = Vec::with_capacity(steps);
        for i in 0..steps {
            let u = upper.get(i).or_else(|| upper.last());
            let l = lower.get(i).or_else(|| lower.last());
            let flame = match (u, l) {
                (Some(u), Some(l)) => {
                    let length = Self::lateral_merged_flame_length(
                        u.length + l.length,
                        fire_line_length,
                        l.depth_ignited.max(u.depth_ignited),
                        1.0,
                    );
                    Flame {
                        length,
                        angle: Self::wind_effect_flame_angle(length, weighted_wind, slope),
                        origin: l.origin,
                        depth_ignited: l.depth_ignited.max(u.depth_ignited),
                        delta_temperature: l.delta_temperature.max(u.delta_temperature),
                    }
                }
                (Some(only), None) | (None, Some(only)) => *only,
                (None, None) => continue,
            };
            combined.push(flame);
        }
        combined
    }
}

/// A flame whose thermal effect precedes the current stratum's
/// ignition: drying only, not direct heating, outside its active
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreHeatingFlame {
    pub flame: Flame,
    pub level: StratumLevel,
    pub window_start: f64,
    pub window_end: f64,
}

impl PreHeatingFlame {
    #[must_use]
    pub fn new(flame: Flame, level: StratumLevel, window_start: f64, window_end: f64) -> Self {
        PreHeatingFlame {
            flame,
            level,
            window_start,
            window_end,
        }
    }

    /// Effective exposure time up to `pre_heating_end_time`.
    #[must_use]
    pub fn duration(&self, pre_heating_end_time: f64) -> f64 {
        (pre_heating_end_time.min(self.window_end) - self.window_start).max(0.0)
    }
}
