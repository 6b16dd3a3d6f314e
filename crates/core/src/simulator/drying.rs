//! Drying-factor model: the multiplicative reduction of ignition delay
//! time from prior heat exposure, and the pre-ignition records it
//! produces (spec.md §4.1.1, §4.1.2).

use crate::core_types::flame::{Flame, PreHeatingFlame};
use crate::core_types::geometry::{Coord, Line};
use crate::core_types::ignition::{IgnitionRunType, PreIgnitionData};
use crate::core_types::species::Species;
use crate::core_types::units::Radians;
use crate::error::ModelError;
use crate::settings::ModelSettings;

/// Everything the drying-factor computation needs to read. Borrowed
/// from the simulator's per-run state; none of it is owned here.
pub struct DryingParams<'a> {
    pub run_type: IgnitionRunType,
    pub species: &'a Species,
    pub pre_heating_flames: &'a [PreHeatingFlame],
    pub incident_flames: &'a [Flame],
    pub plant_flames: &'a [Flame],
    pub ambient_temperature: f64,
    pub pre_heating_end_time: f64,
    pub slope: Radians,
    pub settings: &'a ModelSettings,
}

pub(crate) fn incident_origin(
    flame: &Flame,
    cur_point: Coord,
    run_type: IgnitionRunType,
    slope: Radians,
) -> Result<Coord, ModelError> {
    match run_type {
        IgnitionRunType::PlantRun => Line::new(cur_point, slope).origin_on_line(flame.origin, flame.angle),
        IgnitionRunType::StratumRun => Ok(flame.origin),
    }
}

/// Computes the drying factor at `test_point` for time step `t`, along
/// with every finite-valued contribution it found, tagged for
/// [`crate::core_types::ignition::IgnitionPath::record_pre_ignition`].
///
/// Origins for pre-heating and incident flames are projected through
/// `cur_point` (the step's current point, not the moving `test_point`);
/// only the resulting plume distance is evaluated at `test_point`.
///
/// # Errors
/// Returns [`ModelError::GeometryFailure`] if a flame's effective origin
/// cannot be located (its angle runs parallel to the surface line).
pub fn compute_drying(
    params: &DryingParams,
    cur_point: Coord,
    test_point: Coord,
    t: u32,
) -> Result<(f64, Vec<PreIgnitionData>), ModelError> {
    let mut factor = 1.0_f64;
    let mut records = Vec::new();
    let ambient = params.ambient_temperature;

    if params.pre_heating_flames.len() >= 2 {
        let usable = &params.pre_heating_flames[..params.pre_heating_flames.len() - 1];
        for phf in usable {
            let origin = Line::new(cur_point, params.slope).origin_on_line(phf.flame.origin, phf.flame.angle)?;
            let dist = origin.distance_to(test_point);
            let temp = phf.flame.plume_temperature(dist, ambient);
            let idt = params.species.ignition_delay_time(temp);
            let duration = phf.duration(params.pre_heating_end_time);
            if idt.is_finite() && idt > 0.0 {
                let contribution = (1.0 - duration / idt).max(0.0);
                factor *= contribution;
                records.push(PreIgnitionData::PreHeatingDrying {
                    time: t,
                    flame: phf.flame,
                    dist,
                    factor: contribution,
                    temp,
                    duration,
                });
            }
            if factor == 0.0 {
                return Ok((0.0, records));
            }
        }
    }

    let available = (t.saturating_sub(1) as usize).min(params.incident_flames.len());
    for i in 1..=available {
        let flame = &params.incident_flames[i - 1];
        let origin = incident_origin(flame, cur_point, params.run_type, params.slope)?;
        let dist = origin.distance_to(test_point);
        let temp = flame.plume_temperature(dist, ambient);
        let idt = params.species.ignition_delay_time(temp);
        if idt.is_finite() && idt > 0.0 {
            let contribution = (1.0 - params.settings.computation_time_interval / idt).max(0.0);
            factor *= contribution;
            records.push(PreIgnitionData::IncidentDrying {
                time: t,
                flame: *flame,
                dist,
                factor: contribution,
                temp,
                idt,
            });
        }
        if factor == 0.0 {
            return Ok((0.0, records));
        }
    }

    for flame in params.plant_flames {
        let dist = flame.origin.distance_to(test_point);
        let temp = flame.plume_temperature(dist, ambient);
        let idt = params.species.ignition_delay_time(temp);
        if idt.is_finite() && idt > 0.0 {
            let contribution = (1.0 - params.settings.computation_time_interval / idt).max(0.0);
            factor *= contribution;
            records.push(PreIgnitionData::IncidentDrying {
                time: t,
                flame: *flame,
                dist,
                factor: contribution,
                temp,
                idt,
            });
        }
        if factor == 0.0 {
            return Ok((0.0, records));
        }
    }

    Ok((factor, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geometry::CrownPoly;
    use crate::core_types::species::LeafForm;
    use crate::core_types::units::Radians;

    fn species() -> Species {
        Species::new(
            "Test",
            CrownPoly::new(1.0, 1.5, 2.5, 3.0, 2.0).unwrap(),
            1.0,
            0.3,
            0.3,
            LeafForm::Flat,
            0.001,
            0.01,
            0.05,
            0.02,
            2.0,
            0.3,
            0.1,
            Some(300.0),
            None,
        )
        .unwrap()
    }

    #[test]
    fn no_flames_at_all_gives_full_factor() {
        let species = species();
        let settings = ModelSettings::default();
        let params = DryingParams {
            run_type: IgnitionRunType::PlantRun,
            species: &species,
            pre_heating_flames: &[],
            incident_flames: &[],
            plant_flames: &[],
            ambient_temperature: 25.0,
            pre_heating_end_time: 0.0,
            slope: Radians(0.0),
            settings: &settings,
        };
        let (factor, records) =
            compute_drying(&params, Coord::new(0.0, 1.0), Coord::new(0.1, 1.0), 1).unwrap();
        assert_eq!(factor, 1.0);
        assert!(records.is_empty());
    }

    #[test]
    fn hot_nearby_incident_flame_lowers_the_factor() {
        let species = species();
        let settings = ModelSettings::default();
        let flame = Flame::new(3.0, Radians(0.0), Coord::new(0.0, 1.0), 3.0, 900.0);
        let incident = vec![flame, flame];
        let params = DryingParams {
            run_type: IgnitionRunType::StratumRun,
            species: &species,
            pre_heating_flames: &[],
            incident_flames: &incident,
            plant_flames: &[],
            ambient_temperature: 25.0,
            pre_heating_end_time: 0.0,
            slope: Radians(0.0),
            settings: &settings,
        };
        let (factor, records) =
            compute_drying(&params, Coord::new(0.0, 1.0), Coord::new(0.2, 1.0), 2).unwrap();
        assert!(factor < 1.0);
        assert!(!records.is_empty());
    }
}
