//! Semantic unit types for type-safe physical quantity handling.
//!
//! Newtype wrappers prevent accidentally mixing incompatible units (e.g.
//! km/h wind speed read straight from a parameter file with the m/s wind
//! speed the model computes internally). Each wraps `f64`: the ignition
//! delay time and drying factor formulas are sensitive enough over a
//! 20-step simulation that the model favors `f64` throughout, unlike
//! lower-precision grid work.
//!
//! # Usage
//! ```
//! use firemodel_core::core_types::units::{KmPerHour, MetersPerSecond};
//!
//! let wind = KmPerHour(10.0);
//! let ms: MetersPerSecond = wind.into();
//! assert!((ms.0 - 2.777_777_777_777_778).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Temperature in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(pub f64);

/// A temperature increase above ambient.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DeltaTemperature(pub f64);

/// Wind speed as ingested from a parameter file (spec.md §6: "wind speed
/// in km/h at ingest").
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KmPerHour(pub f64);

/// Wind speed as used internally by the model.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(pub f64);

impl From<KmPerHour> for MetersPerSecond {
    fn from(v: KmPerHour) -> Self {
        MetersPerSecond(v.0 / 3.6)
    }
}

impl From<MetersPerSecond> for KmPerHour {
    fn from(v: MetersPerSecond) -> Self {
        KmPerHour(v.0 * 3.6)
    }
}

/// An angle in radians, used for lines, rays, and flame angles.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl Radians {
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        Radians(degrees.to_radians())
    }

    #[must_use]
    pub fn to_degrees(self) -> f64 {
        self.0.to_degrees()
    }
}

/// A duration in seconds, matching the model's `ComputationTimeInterval`
/// granularity.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Seconds(pub f64);
