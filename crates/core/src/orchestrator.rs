//! Stratum orchestrator: drives the plant run and stratum run for each
//! vegetation layer from the ground up, composes incident and
//! pre-heating flames between layers, and combines flames across
//! strata connected to the canopy (spec.md §4.4).

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::core_types::flame::{Flame, PreHeatingFlame};
use crate::core_types::geometry::{Coord, CrownPoly, Line, Ray};
use crate::core_types::ignition::{IgnitedSegment, IgnitionPath, PreIgnitionData};
use crate::core_types::results::{FireModelRunResult, StratumOutcome};
use crate::core_types::site::Site;
use crate::core_types::species::Species;
use crate::core_types::stratum::{Stratum, StratumLevel};
use crate::core_types::units::Radians;
use crate::error::ModelError;
use crate::settings::ModelSettings;
use crate::simulator::{self, grass, SimulatorInputs};
use crate::surface::SurfaceFireParameters;
use crate::weighted_flame::{self, FlameSeriesTiming, WeightedPath};
use crate::wind;

/// Candidate start points spaced across a crown base, as fractions of
/// its half-width (spec.md §4.4 step 3).
const START_PROPORTIONS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Horizon (time steps) for the incident flame series fed into each
/// stratum's simulator runs.
fn incident_horizon(settings: &ModelSettings) -> usize {
    settings.max_ignition_time_steps as usize + 5
}

/// Rotates `p` about the origin by `angle`.
fn rotate_about_origin(p: Coord, angle: Radians) -> Coord {
    let (s, c) = angle.0.sin_cos();
    Coord::new(p.x * c - p.y * s, p.x * s + p.y * c)
}

/// Converts a flame from the site's global frame into the artificial
/// stratum-run crown's local frame: shifted so the crown sits at the
/// right downwind offset, then rotated by `-slope` so the flat
/// (axis-aligned) `CrownPoly` stands in for a crown tilted by the site
/// slope (spec.md §4.4 step 7).
fn to_local_flame(flame: Flame, shift: f64, slope: Radians) -> Flame {
    let shifted = Coord::new(flame.origin.x - shift, flame.origin.y);
    Flame {
        origin: rotate_about_origin(shifted, Radians(-slope.0)),
        angle: Radians(flame.angle.0 - slope.0),
        ..flame
    }
}

fn to_local_pre_heating(phf: PreHeatingFlame, shift: f64, slope: Radians) -> PreHeatingFlame {
    PreHeatingFlame {
        flame: to_local_flame(phf.flame, shift, slope),
        ..phf
    }
}

/// Inverse of [`to_local_flame`]'s position transform.
fn from_local_point(p: Coord, shift: f64, slope: Radians) -> Coord {
    let unrotated = rotate_about_origin(p, slope);
    Coord::new(unrotated.x + shift, unrotated.y)
}

fn from_local_flame(flame: Flame, shift: f64, slope: Radians) -> Flame {
    Flame {
        origin: from_local_point(flame.origin, shift, slope),
        angle: Radians(flame.angle.0 + slope.0),
        ..flame
    }
}

fn from_local_pre_ignition(data: PreIgnitionData, shift: f64, slope: Radians) -> PreIgnitionData {
    match data {
        PreIgnitionData::PreHeatingDrying {
            time,
            flame,
            dist,
            factor,
            temp,
            duration,
        } => PreIgnitionData::PreHeatingDrying {
            time,
            flame: from_local_flame(flame, shift, slope),
            dist,
            factor,
            temp,
            duration,
        },
        PreIgnitionData::IncidentDrying {
            time,
            flame,
            dist,
            factor,
            temp,
            idt,
        } => PreIgnitionData::IncidentDrying {
            time,
            flame: from_local_flame(flame, shift, slope),
            dist,
            factor,
            temp,
            idt,
        },
    }
}

/// Rebuilds `path` with every coordinate and flame moved back from the
/// artificial crown's local, slope-flattened frame into the site's
/// global frame.
fn from_local_path(path: IgnitionPath, shift: f64, slope: Radians) -> IgnitionPath {
    let mut translated = IgnitionPath::new(
        path.context,
        path.species.clone(),
        from_local_point(path.initial_point, shift, slope),
    );
    for record in path.pre_ignition_data() {
        translated
            .record_pre_ignition(from_local_pre_ignition(*record, shift, slope))
            .expect("translation preserves pre-ignition/ignition ordering");
    }
    for segment in path.segments() {
        let shifted = IgnitedSegment::new(
            segment.time_step,
            from_local_point(segment.start, shift, slope),
            from_local_point(segment.end, shift, slope),
        );
        translated
            .append_segment(shifted)
            .expect("translation preserves strictly increasing time steps");
    }
    translated
}

fn flame_delta_temperature(species: &Species, level: StratumLevel, settings: &ModelSettings) -> f64 {
    grass::flame_delta_temperature(
        species,
        level,
        settings.grass_flame_delta_temperature,
        settings.main_flame_delta_temperature,
    )
}

/// Builds a stratum's weighted flame series from ignition paths and the
/// species they belong to; `lateral_merge` applies spec.md §4.4 step 5's
/// lateral merging (the plant run), or is skipped for the stratum run
/// (step 8, "no lateral merging").
fn build_flame_series(
    stratum: &Stratum,
    site: &Site,
    wind_speed: f64,
    paths: &[IgnitionPath],
    settings: &ModelSettings,
    lateral_merge: bool,
) -> (Vec<Flame>, Option<FlameSeriesTiming>) {
    let slope = site.surface_fuel.slope;
    let mut owned_flames: Vec<Vec<Flame>> = Vec::with_capacity(paths.len());
    for (component, path) in stratum.species_components.iter().zip(paths) {
        let mut flames = Vec::with_capacity(path.segments().len());
        for segment in path.segments() {
            let length = component.species.flame_length(segment.length());
            let angle = Flame::wind_effect_flame_angle(length, wind_speed, slope);
            let delta_temperature = flame_delta_temperature(&component.species, stratum.level, settings);
            flames.push(Flame::new(length, angle, segment.end, segment.length(), delta_temperature));
        }
        owned_flames.push(flames);
    }

    let weighted_paths: Vec<WeightedPath> = stratum
        .species_components
        .iter()
        .zip(paths)
        .zip(owned_flames.iter())
        .map(|((component, path), flames)| WeightedPath {
            path,
            weight: component.weight,
            flames,
        })
        .collect();

    let timing = weighted_flame::timing(&weighted_paths);
    let raw_series = weighted_flame::build_series(&weighted_paths);
    if !lateral_merge {
        return (raw_series, timing);
    }

    let average_width = stratum.average_width();
    let model_sep = stratum.model_plant_sep();
    let series = raw_series
        .into_iter()
        .map(|f| {
            let merged_length =
                Flame::lateral_merged_flame_length(f.length, site.fire_line_length, average_width, model_sep);
            Flame {
                length: merged_length,
                angle: Flame::wind_effect_flame_angle(merged_length, wind_speed, slope),
                ..f
            }
        })
        .collect();
    (series, timing)
}

/// The per-species start point a plant run begins from: the crown's
/// lower-hull point at horizontal offset `x`, raised to the slope line
/// if the hull dips below it (spec.md §4.4 step 3).
fn plant_start_point(crown: &CrownPoly, x: f64, slope: Radians) -> Coord {
    let hull_point = crown.point_in_base(x);
    let surface_y = x * slope.0.tan();
    if hull_point.y < surface_y {
        Coord::new(x, surface_y)
    } else {
        hull_point
    }
}

/// Picks the better of two plant-run paths for the same species
/// (spec.md §4.4 step 3): ignition beats non-ignition; between two
/// ignitions the longer segment wins; between two non-ignitions the
/// hotter drying temperature wins.
fn select_best(a: IgnitionPath, b: IgnitionPath) -> IgnitionPath {
    match (a.has_ignition(), b.has_ignition()) {
        (true, false) => a,
        (false, true) => b,
        (true, true) => {
            if b.max_segment_length() > a.max_segment_length() {
                b
            } else {
                a
            }
        }
        (false, false) => {
            if b.max_drying_temperature() > a.max_drying_temperature() {
                b
            } else {
                a
            }
        }
    }
}

/// The lower canopy edge line `y = averageBottom + x*tan(slope)`, and
/// the maximum x at which a non-canopy flame series heats it past
/// `MinTempForCanopyHeating` (spec.md §4.4.1).
fn canopy_heating_distance(
    canopy: &Stratum,
    slope: Radians,
    lower_series: &[(StratumLevel, Vec<Flame>)],
    ambient: f64,
    min_temp: f64,
) -> f64 {
    let edge = Line::new(Coord::new(0.0, canopy.average_bottom()), slope);
    let mut max_x = 0.0_f64;
    for (_, series) in lower_series {
        let Some(longest) = series.iter().max_by(|a, b| a.length.partial_cmp(&b.length).unwrap()) else {
            continue;
        };
        let flame_line = Line::new(longest.origin, longest.angle);
        let point = flame_line.intersect(&edge).unwrap_or(longest.origin);
        let dist = longest.origin.distance_to(point);
        let temp = longest.plume_temperature(dist, ambient);
        if temp >= min_temp {
            max_x = max_x.max(point.x);
        }
    }
    max_x
}

/// Incident flames arriving at `stratum`: the surface series, folded
/// with every already-processed lower stratum connected to it (spec.md
/// §4.4 step 1).
fn build_incident_flames(
    site: &Site,
    stratum: &Stratum,
    surface_params: &SurfaceFireParameters,
    lower_series: &[(StratumLevel, Vec<Flame>)],
    include_canopy: bool,
    horizon: usize,
) -> Vec<Flame> {
    let mut incident = surface_params.flame_series(horizon);
    let mut weight_total = surface_params.flame_length;
    let mut wind_weighted = surface_params.flame_length * surface_params.wind_speed_m_s;

    for (level, series) in lower_series {
        if !site.is_connected(*level, stratum.level) || series.is_empty() {
            continue;
        }
        let avg_length = series.iter().map(|f| f.length).sum::<f64>() / series.len() as f64;
        let mid_height = site.stratum(*level).map(Stratum::average_mid_height).unwrap_or(0.0);
        let wind_here = wind::wind_speed_at_height(site, mid_height, include_canopy);
        weight_total += avg_length;
        wind_weighted += avg_length * wind_here;
        let weighted_wind = wind_weighted / weight_total.max(1e-9);
        incident = Flame::combine_flames(series, &incident, weighted_wind, site.surface_fuel.slope, site.fire_line_length);
    }
    incident
}

struct ProcessedStratum {
    outcome: StratumOutcome,
    timing: Option<FlameSeriesTiming>,
    connected: bool,
}

#[allow(clippy::too_many_arguments)]
fn process_stratum(
    site: &Site,
    stratum: &Stratum,
    settings: &ModelSettings,
    surface_params: &SurfaceFireParameters,
    include_canopy: bool,
    pre_heating_flames: &[PreHeatingFlame],
    pre_heating_end_time: f64,
    lower_series: &[(StratumLevel, Vec<Flame>)],
) -> Result<ProcessedStratum, ModelError> {
    let slope = site.surface_fuel.slope;
    let ambient = site.weather.air_temperature;
    let horizon = incident_horizon(settings);
    let masked_pre_heating_end_time = pre_heating_end_time.max(0.0);

    let incident = build_incident_flames(site, stratum, surface_params, lower_series, include_canopy, horizon);
    let wind_at_mid_height = wind::wind_speed_at_height(site, stratum.average_mid_height(), include_canopy);

    let mut plant_paths: Vec<IgnitionPath> = Vec::with_capacity(stratum.species_components.len());
    for component in &stratum.species_components {
        let mut best: Option<IgnitionPath> = None;
        for prop in START_PROPORTIONS {
            let x = prop * component.species.crown.width() / 2.0;
            let start = plant_start_point(&component.species.crown, x, slope);
            let inputs = SimulatorInputs {
                run_type: crate::core_types::ignition::IgnitionRunType::PlantRun,
                stratum_level: stratum.level,
                species: &component.species,
                crown: &component.species.crown,
                incident_flames: &incident,
                pre_heating_flames,
                pre_heating_end_time: masked_pre_heating_end_time,
                canopy_heating_distance: 0.0,
                stratum_wind_speed: wind_at_mid_height,
                initial_point: start,
                ambient_temperature: ambient,
                slope,
                settings,
            };
            let path = simulator::run(&inputs)?;
            best = Some(match best {
                None => path,
                Some(current) => select_best(current, path),
            });
        }
        plant_paths.push(best.expect("five start points were attempted"));
    }

    if !plant_paths.iter().any(IgnitionPath::has_ignition) {
        return Ok(ProcessedStratum {
            outcome: StratumOutcome::non_ignition(stratum.level, plant_paths),
            timing: None,
            connected: false,
        });
    }

    let (plant_flames, plant_timing) =
        build_flame_series(stratum, site, wind_at_mid_height, &plant_paths, settings, true);

    let canopy_distance = if stratum.level == StratumLevel::Canopy {
        canopy_heating_distance(stratum, slope, lower_series, ambient, settings.min_temp_for_canopy_heating)
    } else {
        0.0
    };

    let connected = plant_paths.iter().zip(&stratum.species_components).any(|(path, component)| {
        path.segments().iter().any(|segment| {
            let length = component.species.flame_length(segment.length());
            let angle = Flame::wind_effect_flame_angle(length, wind_at_mid_height, slope);
            let tip_x = segment.start.x + length * angle.0.cos();
            tip_x > component.species.crown.width() / 2.0
        })
    });

    let (stratum_paths, stratum_flames, stratum_timing) = run_stratum_pass(
        site,
        stratum,
        settings,
        &incident,
        pre_heating_flames,
        masked_pre_heating_end_time,
        canopy_distance,
        wind_at_mid_height,
        &plant_flames,
    )?;

    let timing = match (&plant_flames, &stratum_flames) {
        (p, Some(s)) if max_length(s) > max_length(p) => stratum_timing,
        _ => plant_timing,
    };

    let outcome = StratumOutcome {
        stratum_level: stratum.level,
        plant_paths,
        plant_flames: Some(plant_flames),
        stratum_paths,
        stratum_flames,
    };

    Ok(ProcessedStratum {
        outcome,
        timing,
        connected,
    })
}

fn max_length(flames: &[Flame]) -> f64 {
    flames.iter().map(|f| f.length).fold(0.0, f64::max)
}

#[allow(clippy::too_many_arguments)]
fn run_stratum_pass(
    site: &Site,
    stratum: &Stratum,
    settings: &ModelSettings,
    incident: &[Flame],
    pre_heating_flames: &[PreHeatingFlame],
    pre_heating_end_time: f64,
    canopy_distance: f64,
    wind_at_mid_height: f64,
    plant_flames: &[Flame],
) -> Result<(Option<Vec<IgnitionPath>>, Option<Vec<Flame>>, Option<FlameSeriesTiming>), ModelError> {
    let Some(reference_flame) = plant_flames.first().copied() else {
        return Ok((None, None, None));
    };

    let slope = site.surface_fuel.slope;
    // The crown's near edge sits at `modelPlantSep - averageWidth/2`
    // (spec.md §4.4 step 7). `CrownPoly::new` always builds a hexagon
    // centred on its own local x = 0, so the local frame's origin has to
    // sit a further half-width downwind of that offset to put the
    // crown's near edge (rather than its centre) there — otherwise the
    // reference flame's origin lands inside the crown and a ray cast
    // from inside a convex polygon only ever produces one forward hit,
    // so `intersection` always returns `None`.
    let near_edge = stratum.model_plant_sep() - stratum.average_width() / 2.0;
    let shift = near_edge + settings.stratum_big_crown_width / 2.0;
    let big_crown = CrownPoly::new(
        stratum.average_bottom(),
        stratum.average_bottom(),
        stratum.average_top(),
        stratum.average_top(),
        settings.stratum_big_crown_width,
    )?;

    let local_reference = to_local_flame(reference_flame, shift, slope);
    let ray = Ray::new(local_reference.origin, local_reference.angle);
    let Some(entry_segment) = big_crown.intersection(ray) else {
        return Ok((None, None, None));
    };
    let local_start = entry_segment.start;

    let local_incident: Vec<Flame> = incident.iter().map(|f| to_local_flame(*f, shift, slope)).collect();
    let local_pre_heating: Vec<PreHeatingFlame> = pre_heating_flames
        .iter()
        .map(|p| to_local_pre_heating(*p, shift, slope))
        .collect();
    let local_canopy_distance = canopy_distance - shift;

    let mut paths: Vec<IgnitionPath> = Vec::with_capacity(stratum.species_components.len());
    for component in &stratum.species_components {
        let sp = &component.species;
        let proxy_clump_separation = sp.clump_separation.max(stratum.model_plant_sep() - stratum.average_width());
        let proxy = Species::new(
            format!("{} (stratum proxy)", sp.name),
            big_crown,
            sp.live_leaf_moisture,
            sp.dead_leaf_moisture,
            sp.proportion_dead,
            sp.leaf_form,
            sp.leaf_thickness,
            sp.leaf_width,
            sp.leaf_length,
            sp.leaf_separation,
            sp.stem_order,
            sp.crown.width(),
            proxy_clump_separation,
            Some(sp.ignition_temperature()),
            None,
        )?;

        let inputs = SimulatorInputs {
            run_type: crate::core_types::ignition::IgnitionRunType::StratumRun,
            stratum_level: stratum.level,
            species: &proxy,
            crown: &big_crown,
            incident_flames: &local_incident,
            pre_heating_flames: &local_pre_heating,
            pre_heating_end_time,
            canopy_heating_distance: local_canopy_distance,
            stratum_wind_speed: wind_at_mid_height,
            initial_point: local_start,
            ambient_temperature: site.weather.air_temperature,
            // The local frame is already rotated by `-slope` to flatten
            // the tilted crown, so within it the ground is flat.
            slope: Radians(0.0),
            settings,
        };
        let local_path = simulator::run(&inputs)?;
        paths.push(from_local_path(local_path, shift, slope));
    }

    if !paths.iter().any(IgnitionPath::has_ignition) {
        return Ok((Some(paths), None, None));
    }

    let (series, timing) = build_flame_series(stratum, site, wind_at_mid_height, &paths, settings, false);
    Ok((Some(paths), Some(series), timing))
}

fn derive_pre_heating_flame(
    outcome: &StratumOutcome,
    timing: Option<FlameSeriesTiming>,
    pre_heating_end_time: f64,
    delta_t: f64,
) -> Option<PreHeatingFlame> {
    let series = outcome.largest_flame_series()?;
    let timing = timing?;
    let representative = series.iter().max_by(|a, b| a.length.partial_cmp(&b.length).unwrap())?;
    let start = pre_heating_end_time.max(0.0)
        + f64::from(timing.ignition_time) * delta_t
        + f64::from(timing.time_to_longest_flame) * delta_t;
    let end = start + series.len() as f64 * delta_t;
    Some(PreHeatingFlame::new(*representative, outcome.stratum_level, start, end))
}

fn compute_combined_flames(
    site: &Site,
    result: &FireModelRunResult,
    connections: &FxHashSet<StratumLevel>,
    include_canopy: bool,
) -> Vec<Flame> {
    let mut contributors: Vec<&StratumOutcome> = result
        .stratum_outcomes
        .iter()
        .filter(|o| o.stratum_level == StratumLevel::Canopy || connections.contains(&o.stratum_level))
        .collect();
    contributors.sort_by_key(|o| o.stratum_level);

    let mut combined: Vec<Flame> = Vec::new();
    for outcome in contributors {
        let Some(series) = outcome.largest_flame_series() else {
            continue;
        };
        if combined.is_empty() {
            combined = series.to_vec();
            continue;
        }
        let mid_height = site
            .stratum(outcome.stratum_level)
            .map(Stratum::average_mid_height)
            .unwrap_or(0.0);
        let wind_here = wind::wind_speed_at_height(site, mid_height, include_canopy);
        combined = Flame::combine_flames(series, &combined, wind_here, site.surface_fuel.slope, site.fire_line_length);
    }
    combined
}

/// Runs the whole bottom-to-top stratum pass once, with `include_canopy`
/// governing whether canopy wind attenuation is applied.
pub fn run_pass(
    site: &Site,
    settings: &ModelSettings,
    surface_params: &SurfaceFireParameters,
    include_canopy: bool,
) -> Result<FireModelRunResult, ModelError> {
    info!(include_canopy, strata = site.strata().len(), "starting stratum pass");
    let delta_t = settings.computation_time_interval;
    let mut result = FireModelRunResult::new(*surface_params);
    let mut pre_heating_flames = vec![surface_params.initial_pre_heating_flame()];
    let mut pre_heating_end_time = -1.0_f64;
    let mut lower_series: Vec<(StratumLevel, Vec<Flame>)> = Vec::new();
    let mut connections: FxHashSet<StratumLevel> = FxHashSet::default();

    for stratum in site.strata() {
        debug!(level = ?stratum.level, "processing stratum");
        let processed = process_stratum(
            site,
            stratum,
            settings,
            surface_params,
            include_canopy,
            &pre_heating_flames,
            pre_heating_end_time,
            &lower_series,
        )?;

        if processed.connected {
            connections.insert(stratum.level);
        }
        if let Some(series) = processed.outcome.largest_flame_series() {
            debug!(level = ?stratum.level, steps = series.len(), "stratum produced a flame series");
            lower_series.push((stratum.level, series.to_vec()));
        } else {
            debug!(level = ?stratum.level, "stratum did not ignite");
        }
        if let Some(phf) = derive_pre_heating_flame(&processed.outcome, processed.timing, pre_heating_end_time, delta_t) {
            pre_heating_end_time = phf.window_end;
            pre_heating_flames.push(phf);
        }

        result = result.with_outcome(processed.outcome);
    }

    let combined = compute_combined_flames(site, &result, &connections, include_canopy);
    info!(combined_steps = combined.len(), "stratum pass complete");
    Ok(result.with_combined_flames(combined))
}

/// Runs the complete two-pass pipeline (spec.md §4.4 "Second run"): the
/// second pass, with the canopy excluded from the wind model, only runs
/// if the first pass produced a canopy flame series.
pub fn run(site: &Site, settings: &ModelSettings) -> Result<crate::core_types::results::FireModelResult, ModelError> {
    let surface_params = SurfaceFireParameters::compute(&site.surface_fuel, &site.weather);
    let run1 = run_pass(site, settings, &surface_params, true)?;
    let canopy_ignited = run1
        .outcome(StratumLevel::Canopy)
        .map(StratumOutcome::largest_flame_series)
        .map_or(false, |series| series.is_some());
    let run2 = if canopy_ignited {
        info!("canopy flame series present, running second pass with canopy excluded from wind");
        Some(run_pass(site, settings, &surface_params, false)?)
    } else {
        debug!("no canopy flame series in run 1, skipping second pass");
        None
    };
    Ok(crate::core_types::results::FireModelResult { run1, run2 })
}
