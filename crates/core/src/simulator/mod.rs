//! Ignition-path simulator: a time-stepped geometric/thermal state
//! machine that propagates ignition through a crown under incident,
//! pre-heating, and self-generated plant flames (spec.md §4.1).

mod drying;
pub(crate) mod grass;

use tracing::trace;

use crate::core_types::flame::{Flame, PreHeatingFlame};
use crate::core_types::geometry::{Coord, CrownPoly};
use crate::core_types::ignition::{IgnitedSegment, IgnitionPath, IgnitionPathContext, IgnitionRunType};
use crate::core_types::numerics::almost_zero;
use crate::core_types::species::Species;
use crate::core_types::stratum::StratumLevel;
use crate::core_types::units::Radians;
use crate::error::ModelError;
use crate::settings::ModelSettings;

use drying::{compute_drying, DryingParams};

/// Everything one simulator run needs: which crown it runs inside,
/// what's heating it, and where it starts.
pub struct SimulatorInputs<'a> {
    pub run_type: IgnitionRunType,
    pub stratum_level: StratumLevel,
    pub species: &'a Species,
    pub crown: &'a CrownPoly,
    pub incident_flames: &'a [Flame],
    pub pre_heating_flames: &'a [PreHeatingFlame],
    pub pre_heating_end_time: f64,
    pub canopy_heating_distance: f64,
    pub stratum_wind_speed: f64,
    pub initial_point: Coord,
    pub ambient_temperature: f64,
    pub slope: Radians,
    pub settings: &'a ModelSettings,
}

/// A candidate path length and the angle it runs along.
type Candidate = (f64, Radians);

fn candidate_path_length(
    crown: &CrownPoly,
    cur_point: Coord,
    flame: Flame,
    ignition_temp: f64,
    ambient: f64,
) -> Candidate {
    let exit = crown.distance_to_boundary(cur_point, flame.angle).unwrap_or(0.0);
    let reach = flame.distance_for_temperature(ignition_temp, ambient).unwrap_or(0.0);
    (exit.min(reach), flame.angle)
}

fn modified_wind_speed(inputs: &SimulatorInputs, path: &IgnitionPath, delta_t: f64) -> f64 {
    if inputs.run_type != IgnitionRunType::StratumRun || !path.has_ignition() {
        return inputs.stratum_wind_speed;
    }
    let segments = path.segments();
    let delta_x = if segments.len() == 1 {
        segments[0].end.x - inputs.initial_point.x
    } else {
        let last = segments[segments.len() - 1];
        last.end.x - last.start.x
    };
    (inputs.stratum_wind_speed - delta_x.max(0.0) / delta_t).max(0.0)
}

fn flame_duration_steps(inputs: &SimulatorInputs, cur_point: Coord, delta_t: f64) -> usize {
    let use_reduced = inputs.run_type == IgnitionRunType::StratumRun
        && inputs.stratum_level == StratumLevel::Canopy
        && cur_point.x > inputs.canopy_heating_distance;
    let duration = if use_reduced {
        inputs.settings.reduced_canopy_flame_residence_time
    } else {
        inputs.species.flame_duration(delta_t)
    };
    (duration / delta_t).ceil().max(1.0) as usize
}

/// Runs the ignition-path simulator to completion, returning the
/// resulting path — possibly with no ignited segments at all.
///
/// # Errors
/// Returns [`ModelError::GeometryFailure`] if a flame's effective origin
/// cannot be located during drying computation, or [`ModelError::Internal`]
/// if the simulator itself violates an `IgnitionPath` invariant.
pub fn run(inputs: &SimulatorInputs) -> Result<IgnitionPath, ModelError> {
    let context = IgnitionPathContext {
        run_type: inputs.run_type,
        stratum_level: inputs.stratum_level,
    };
    let mut path = IgnitionPath::new(context, inputs.species.clone(), inputs.initial_point);
    let mut cur_point = inputs.initial_point;
    let mut plant_flames: Vec<Flame> = Vec::new();
    let delta_t = inputs.settings.computation_time_interval;
    let ignition_temp = inputs.species.ignition_temperature();
    let ambient = inputs.ambient_temperature;

    let mut t: u32 = 0;
    let mut post_ignition_steps: u32 = 0;

    loop {
        t += 1;
        if path.has_ignition() {
            post_ignition_steps += 1;
            if post_ignition_steps > inputs.settings.max_ignition_time_steps {
                break;
            }
        }

        let modified_wind = modified_wind_speed(inputs, &path, delta_t);

        let plant_flame = plant_flames.last().copied();
        let incident_flame = inputs.incident_flames.get((t - 1) as usize).copied();
        if plant_flame.is_none() && incident_flame.is_none() {
            break;
        }

        let plant_candidate = plant_flame
            .map(|f| candidate_path_length(inputs.crown, cur_point, f, ignition_temp, ambient))
            .unwrap_or((0.0, Radians(0.0)));
        let incident_candidate = incident_flame
            .map(|f| candidate_path_length(inputs.crown, cur_point, f, ignition_temp, ambient))
            .unwrap_or((0.0, Radians(0.0)));

        let (path_length, path_angle) = if incident_candidate.0 > plant_candidate.0 {
            incident_candidate
        } else {
            plant_candidate
        };
        if path_length <= 0.0 {
            break;
        }

        let drying_params = DryingParams {
            run_type: inputs.run_type,
            species: inputs.species,
            pre_heating_flames: inputs.pre_heating_flames,
            incident_flames: inputs.incident_flames,
            plant_flames: &plant_flames,
            ambient_temperature: ambient,
            pre_heating_end_time: inputs.pre_heating_end_time,
            slope: inputs.slope,
            settings: inputs.settings,
        };

        let steps = inputs.settings.num_penetration_steps.max(1);
        let mut next_ignitable_point: Option<Coord> = None;
        for i in 1..=steps {
            let s = path_length * f64::from(i) / f64::from(steps);
            let test_point = cur_point.translated(s, path_angle);
            let (drying_factor, records) = compute_drying(&drying_params, cur_point, test_point, t)?;

            if !path.has_ignition() {
                for record in records {
                    path.record_pre_ignition(record)?;
                }
            }

            let mut max_temp = ambient;
            if let Some(f) = incident_flame {
                let origin = drying::incident_origin(&f, cur_point, inputs.run_type, inputs.slope)?;
                max_temp = max_temp.max(f.plume_temperature(origin.distance_to(test_point), ambient));
            }
            if let Some(f) = plant_flame {
                max_temp = max_temp.max(f.plume_temperature(f.origin.distance_to(test_point), ambient));
            }

            let idt = grass::effective_idt(
                inputs.species,
                inputs.stratum_level,
                max_temp,
                inputs.settings.grass_idt_reduction,
            );
            let accepted = max_temp >= ignition_temp && drying_factor * idt <= delta_t;
            if accepted {
                next_ignitable_point = Some(test_point);
            } else {
                break;
            }
        }

        let Some(next_point) = next_ignitable_point else {
            break;
        };

        if !path.has_ignition() {
            let segment = IgnitedSegment::new(t, cur_point, next_point);
            trace!(step = t, x = segment.end.x, "first ignited segment");
            append_plant_flame(inputs, &mut path, &mut plant_flames, segment, modified_wind)?;
        } else {
            let lookback = flame_duration_steps(inputs, cur_point, delta_t);
            let seg_start = if path.segments().len() < lookback {
                path.segments()[0].start
            } else {
                path.segments()[path.segments().len() - lookback].end
            };
            if almost_zero(seg_start.distance_to(next_point)) {
                trace!(step = t, "no progress from last ignitable point, stopping");
                break;
            }
            let segment = IgnitedSegment::new(t, seg_start, next_point);
            trace!(step = t, x = segment.end.x, "ignited segment");
            append_plant_flame(inputs, &mut path, &mut plant_flames, segment, modified_wind)?;
        }

        cur_point = next_point;
    }

    trace!(segments = path.segments().len(), "ignition path run complete");
    Ok(path)
}

fn append_plant_flame(
    inputs: &SimulatorInputs,
    path: &mut IgnitionPath,
    plant_flames: &mut Vec<Flame>,
    segment: IgnitedSegment,
    modified_wind: f64,
) -> Result<(), ModelError> {
    path.append_segment(segment)?;
    let length = inputs.species.flame_length(segment.length());
    let angle = Flame::wind_effect_flame_angle(length, modified_wind, inputs.slope);
    let delta_temperature = grass::flame_delta_temperature(
        inputs.species,
        inputs.stratum_level,
        inputs.settings.grass_flame_delta_temperature,
        inputs.settings.main_flame_delta_temperature,
    );
    plant_flames.push(Flame::new(length, angle, segment.end, segment.length(), delta_temperature));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geometry::CrownPoly;
    use crate::core_types::species::LeafForm;

    fn species() -> Species {
        Species::new(
            "Test",
            CrownPoly::new(0.0, 0.2, 1.8, 2.0, 2.0).unwrap(),
            1.0,
            0.3,
            0.3,
            LeafForm::Flat,
            0.0008,
            0.015,
            0.06,
            0.02,
            2.0,
            0.3,
            0.1,
            Some(60.0),
            None,
        )
        .unwrap()
    }

    fn hot_flame(origin: Coord) -> Flame {
        Flame::new(5.0, Radians(std::f64::consts::FRAC_PI_2), origin, 5.0, 900.0)
    }

    #[test]
    fn empty_flame_sequences_terminate_immediately_with_no_segments() {
        let species = species();
        let crown = species.crown;
        let settings = ModelSettings::default();
        let inputs = SimulatorInputs {
            run_type: IgnitionRunType::PlantRun,
            stratum_level: StratumLevel::Elevated,
            species: &species,
            crown: &crown,
            incident_flames: &[],
            pre_heating_flames: &[],
            pre_heating_end_time: 0.0,
            canopy_heating_distance: 0.0,
            stratum_wind_speed: 2.0,
            initial_point: Coord::new(0.0, 0.1),
            ambient_temperature: 25.0,
            slope: Radians(0.0),
            settings: &settings,
        };
        let path = run(&inputs).unwrap();
        assert!(!path.has_ignition());
        assert!(path.segments().is_empty());
    }

    #[test]
    fn a_sustained_hot_incident_flame_eventually_ignites() {
        let species = species();
        let crown = species.crown;
        let settings = ModelSettings::default();
        let incident: Vec<Flame> = std::iter::repeat(hot_flame(Coord::new(0.0, 0.1)))
            .take(30)
            .collect();
        let inputs = SimulatorInputs {
            run_type: IgnitionRunType::PlantRun,
            stratum_level: StratumLevel::Elevated,
            species: &species,
            crown: &crown,
            incident_flames: &incident,
            pre_heating_flames: &[],
            pre_heating_end_time: 0.0,
            canopy_heating_distance: 0.0,
            stratum_wind_speed: 2.0,
            initial_point: Coord::new(0.0, 0.1),
            ambient_temperature: 25.0,
            slope: Radians(0.0),
            settings: &settings,
        };
        let path = run(&inputs).unwrap();
        assert!(path.has_ignition());
        assert!(path.ignition_time().is_some());
    }

    #[test]
    fn segment_time_steps_are_strictly_increasing() {
        let species = species();
        let crown = species.crown;
        let settings = ModelSettings::default();
        let incident: Vec<Flame> = std::iter::repeat(hot_flame(Coord::new(0.0, 0.1)))
            .take(30)
            .collect();
        let inputs = SimulatorInputs {
            run_type: IgnitionRunType::PlantRun,
            stratum_level: StratumLevel::Elevated,
            species: &species,
            crown: &crown,
            incident_flames: &incident,
            pre_heating_flames: &[],
            pre_heating_end_time: 0.0,
            canopy_heating_distance: 0.0,
            stratum_wind_speed: 2.0,
            initial_point: Coord::new(0.0, 0.1),
            ambient_temperature: 25.0,
            slope: Radians(0.0),
            settings: &settings,
        };
        let path = run(&inputs).unwrap();
        let steps: Vec<u32> = path.segments().iter().map(|s| s.time_step).collect();
        for w in steps.windows(2) {
            assert!(w[1] > w[0]);
        }
    }
}
