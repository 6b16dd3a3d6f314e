//! Site model: vegetation strata, overlap relations, surface fuel and
//! weather inputs (spec.md §3 Vegetation/Site, §6 overlap naming).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::stratum::{Stratum, StratumLevel};
use super::units::Radians;
use crate::error::ModelError;

/// Whether two strata's flames are treated as connected, or left to be
/// decided geometrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StratumOverlapType {
    Overlapping,
    NotOverlapping,
    Undefined,
}

impl StratumOverlapType {
    /// Parses a free-form overlap-type name: case-insensitive, with
    /// whitespace and hyphens ignored (spec.md §6).
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidInput`] for any name other than
    /// `overlapped`, `not overlapped`, or `automatic` once normalized.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "overlapped" => Ok(StratumOverlapType::Overlapping),
            "notoverlapped" => Ok(StratumOverlapType::NotOverlapping),
            "automatic" => Ok(StratumOverlapType::Undefined),
            other => Err(ModelError::InvalidInput {
                field: "overlap_type".to_string(),
                reason: format!("unrecognized overlap type: `{other}`"),
            }),
        }
    }

    /// The normalized lowercase, spaceless form that re-parses to this
    /// same value.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            StratumOverlapType::Overlapping => "overlapped",
            StratumOverlapType::NotOverlapping => "notoverlapped",
            StratumOverlapType::Undefined => "automatic",
        }
    }
}

/// Surface fuel and terrain inputs (spec.md §3 Vegetation/Site).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFuel {
    pub slope: Radians,
    pub mean_fuel_diameter: f64,
    pub mean_fineness_leaves: f64,
    pub fuel_load: f64,
    pub dead_fuel_moisture: f64,
}

/// Weather inputs. Wind speed is stored as ingested, in km/h (spec.md
/// §6: "All inputs are in SI units except wind speed in km/h at
/// ingest").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub air_temperature: f64,
    pub wind_speed_km_h: f64,
}

impl Weather {
    #[must_use]
    pub fn wind_speed_m_s(&self) -> f64 {
        self.wind_speed_km_h / 3.6
    }
}

/// A site: its vegetation strata, their overlap relations, surface
/// fuel, weather, and fire-line length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    strata: Vec<Stratum>,
    overlaps: FxHashMap<(StratumLevel, StratumLevel), StratumOverlapType>,
    pub surface_fuel: SurfaceFuel,
    pub weather: Weather,
    pub fire_line_length: f64,
}

impl Site {
    /// # Errors
    /// Returns [`ModelError::InvalidInput`] if `fire_line_length` is not
    /// positive, or two strata share the same level.
    pub fn new(
        mut strata: Vec<Stratum>,
        overlaps: Vec<(StratumLevel, StratumLevel, StratumOverlapType)>,
        surface_fuel: SurfaceFuel,
        weather: Weather,
        fire_line_length: f64,
    ) -> Result<Self, ModelError> {
        if fire_line_length <= 0.0 {
            return Err(ModelError::InvalidInput {
                field: "fire_line_length".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        strata.sort_by_key(|s| s.level);
        for pair in strata.windows(2) {
            if pair[0].level == pair[1].level {
                return Err(ModelError::InvalidInput {
                    field: "strata".to_string(),
                    reason: "a site may not contain two strata at the same level".to_string(),
                });
            }
        }
        let overlaps = overlaps
            .into_iter()
            .map(|(a, b, kind)| ((a, b), kind))
            .collect();
        Ok(Site {
            strata,
            overlaps,
            surface_fuel,
            weather,
            fire_line_length,
        })
    }

    /// Strata in ascending level order (near surface first).
    #[must_use]
    pub fn strata(&self) -> &[Stratum] {
        &self.strata
    }

    #[must_use]
    pub fn stratum(&self, level: StratumLevel) -> Option<&Stratum> {
        self.strata.iter().find(|s| s.level == level)
    }

    /// Whether flames at `lower` are treated as connected to `upper`.
    /// Explicit overlap relations win; `Undefined` or unspecified pairs
    /// are decided geometrically by whether the strata's average crown
    /// heights actually overlap vertically.
    #[must_use]
    pub fn is_connected(&self, lower: StratumLevel, upper: StratumLevel) -> bool {
        match self.overlaps.get(&(lower, upper)) {
            Some(StratumOverlapType::Overlapping) => true,
            Some(StratumOverlapType::NotOverlapping) => false,
            Some(StratumOverlapType::Undefined) | None => {
                let (Some(lower_s), Some(upper_s)) = (self.stratum(lower), self.stratum(upper))
                else {
                    return false;
                };
                lower_s.average_top() > upper_s.average_bottom()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_name_round_trips() {
        for kind in [
            StratumOverlapType::Overlapping,
            StratumOverlapType::NotOverlapping,
            StratumOverlapType::Undefined,
        ] {
            assert_eq!(StratumOverlapType::parse(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn overlap_parsing_ignores_case_whitespace_and_hyphens() {
        assert_eq!(
            StratumOverlapType::parse("Not - Overlapped").unwrap(),
            StratumOverlapType::NotOverlapping
        );
        assert_eq!(
            StratumOverlapType::parse("notoverlapped").unwrap(),
            StratumOverlapType::NotOverlapping
        );
        assert_eq!(
            StratumOverlapType::parse("auto matic").unwrap(),
            StratumOverlapType::Undefined
        );
    }

    #[test]
    fn overlap_parsing_rejects_unknown_names() {
        assert!(StratumOverlapType::parse("weird").is_err());
    }

    #[test]
    fn wind_speed_converts_km_h_to_m_s() {
        let weather = Weather {
            air_temperature: 25.0,
            wind_speed_km_h: 36.0,
        };
        assert!((weather.wind_speed_m_s() - 10.0).abs() < 1e-9);
    }
}
