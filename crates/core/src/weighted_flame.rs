//! Weighted flame attributes: aggregates the best per-species ignition
//! paths in a stratum into one time-indexed flame series (spec.md
//! §4.3).

use crate::core_types::flame::Flame;
use crate::core_types::geometry::Coord;
use crate::core_types::ignition::IgnitionPath;
use crate::core_types::units::Radians;

/// One species' contribution to the weighted flame series: its weight
/// in the stratum composition and the flame it emitted at each time
/// step (indexed from its own ignition time).
pub struct WeightedPath<'a> {
    pub path: &'a IgnitionPath,
    pub weight: f64,
    pub flames: &'a [Flame],
}

/// `ignitionTime` (first time any species ignites) and
/// `timeToLongestFlame` (steps from ignition to the longest flame) for
/// a weighted flame series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameSeriesTiming {
    pub ignition_time: u32,
    pub time_to_longest_flame: u32,
}

/// Weighted mean across species at one time step: length, depth
/// ignited, origin (component-wise), and temperature increment, each
/// weighted by composition share.
fn weighted_flame_at(paths: &[WeightedPath], step: usize) -> Option<Flame> {
    let mut total_weight = 0.0;
    let mut length = 0.0;
    let mut depth_ignited = 0.0;
    let mut origin_x = 0.0;
    let mut origin_y = 0.0;
    let mut delta_temperature = 0.0;
    let mut angle = 0.0;
    let mut any = false;

    for wp in paths {
        let Some(flame) = wp.flames.get(step).or_else(|| wp.flames.last()) else {
            continue;
        };
        any = true;
        total_weight += wp.weight;
        length += wp.weight * flame.length;
        depth_ignited += wp.weight * flame.depth_ignited;
        origin_x += wp.weight * flame.origin.x;
        origin_y += wp.weight * flame.origin.y;
        delta_temperature += wp.weight * flame.delta_temperature;
        angle += wp.weight * flame.angle.0;
    }

    if !any || total_weight <= 0.0 {
        return None;
    }

    Some(Flame::new(
        length / total_weight,
        Radians(angle / total_weight),
        Coord::new(origin_x / total_weight, origin_y / total_weight),
        depth_ignited / total_weight,
        delta_temperature / total_weight,
    ))
}

/// Builds the stratum's weighted flame series from the best per-species
/// ignition paths and the flame series each one produced. An empty
/// input, or one in which no species ignited, yields the empty series.
#[must_use]
pub fn build_series(paths: &[WeightedPath]) -> Vec<Flame> {
    let steps = paths.iter().map(|p| p.flames.len()).max().unwrap_or(0);
    (0..steps).filter_map(|step| weighted_flame_at(paths, step)).collect()
}

/// `ignitionTime` and `timeToLongestFlame` for a stratum's ignited
/// paths, or `None` if nothing ignited.
#[must_use]
pub fn timing(paths: &[WeightedPath]) -> Option<FlameSeriesTiming> {
    let ignition_time = paths
        .iter()
        .filter_map(|p| p.path.ignition_time())
        .min()?;
    let series = build_series(paths);
    let longest_step = series
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.length.partial_cmp(&b.1.length).unwrap())
        .map(|(i, _)| i as u32)
        .unwrap_or(0);
    Some(FlameSeriesTiming {
        ignition_time,
        time_to_longest_flame: longest_step,
    })
}
