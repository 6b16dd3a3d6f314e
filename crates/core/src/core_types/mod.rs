//! Core types and utilities

pub mod flame;
pub mod geometry;
pub mod ignition;
pub mod numerics;
pub mod results;
pub mod site;
pub mod species;
pub mod stratum;
pub mod units;

pub use flame::{Flame, PreHeatingFlame};
pub use geometry::{Coord, CrownPoly, Line, Ray, Segment};
pub use ignition::{
    IgnitedSegment, IgnitionPath, IgnitionPathContext, IgnitionRunType, PreIgnitionData, PreIgnitionSummary,
};
pub use results::{FireModelResult, FireModelRunResult, StratumOutcome};
pub use site::{Site, StratumOverlapType, SurfaceFuel, Weather as SiteWeather};
pub use species::{LeafForm, Species};
pub use stratum::{SpeciesComponent, Stratum, StratumLevel};
