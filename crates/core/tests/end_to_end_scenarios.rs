//! End-to-end fire model scenarios
//!
//! Exercises the public `firemodel_core::run` entry point against the
//! seed scenarios named in spec.md §8, rather than any one subsystem in
//! isolation.
//!
//! # References
//! - Zylstra, P. (2011). "Forest flammability: modelling and managing
//!   a complex system." PhD thesis, University of New South Wales.
//!   (ignition-path simulator and stratum orchestrator this crate
//!   implements)

use firemodel_core::{
    run, CrownPoly, LeafForm, ModelSettings, Radians, Site, Species, SpeciesComponent, Stratum, StratumLevel,
    StratumOverlapType, SurfaceFuel, Weather,
};

fn surface_fuel(slope_degrees: f64) -> SurfaceFuel {
    SurfaceFuel {
        slope: Radians::from_degrees(slope_degrees),
        mean_fuel_diameter: 0.005,
        mean_fineness_leaves: 0.003,
        fuel_load: 17.3,
        dead_fuel_moisture: 0.1,
    }
}

fn weather(wind_km_h: f64, air_temperature: f64) -> Weather {
    Weather {
        air_temperature,
        wind_speed_km_h: wind_km_h,
    }
}

fn tree_species(name: &str, width: f64, ignition_temp: f64) -> Species {
    Species::new(
        name,
        CrownPoly::new(5.0, 5.5, 19.0, 20.0, width).unwrap(),
        1.0,
        0.3,
        0.3,
        LeafForm::Flat,
        0.0004,
        0.02,
        0.08,
        0.03,
        2.0,
        0.4,
        0.1,
        Some(ignition_temp),
        None,
    )
    .unwrap()
}

/// spec.md §8 scenario 1: a canopy-only site (no lower strata to drive
/// it) does not ignite, but the surface flame series is still present
/// and there is no second run.
#[test]
fn canopy_only_site_has_no_ignition_but_surface_flames_present() {
    let canopy = Stratum::new(StratumLevel::Canopy, vec![(tree_species("Canopy tree", 6.0, 300.0), 1.0)], 8.5).unwrap();
    let site = Site::new(
        vec![canopy],
        vec![],
        surface_fuel(0.0),
        weather(10.0, 29.2),
        50.0,
    )
    .unwrap();

    let result = run(&site, &ModelSettings::default()).unwrap();

    assert!(result.run1.surface_params.flame_length > 0.0);
    let canopy_outcome = result.run1.outcome(StratumLevel::Canopy).unwrap();
    assert!(canopy_outcome.plant_flames.as_ref().map_or(true, |f| f.is_empty()));
    assert!(!result.has_second_run());
}

/// A near-surface grass stratum over an explicit `overlapped` relation
/// to an elevated stratum propagates its flames upward, and the
/// combined series is non-empty once the elevated stratum is reachable
/// from the surface.
#[test]
fn explicit_overlap_connects_near_surface_flames_to_elevated_stratum() {
    let grass = Species::new(
        "Spinifex",
        CrownPoly::new(0.0, 0.05, 0.3, 0.35, 0.3).unwrap(),
        0.6,
        0.85,
        0.8,
        LeafForm::Flat,
        0.0002,
        0.003,
        0.1,
        0.01,
        1.0,
        0.1,
        0.05,
        Some(300.0),
        None,
    )
    .unwrap();
    let near_surface = Stratum::new(StratumLevel::NearSurface, vec![(grass, 1.0)], 0.2).unwrap();

    let elevated_species = Species::new(
        "Elevated shrub",
        CrownPoly::new(0.3, 0.5, 2.5, 2.8, 1.5).unwrap(),
        0.9,
        0.4,
        0.4,
        LeafForm::Flat,
        0.0005,
        0.012,
        0.06,
        0.02,
        2.0,
        0.25,
        0.08,
        Some(310.0),
        None,
    )
    .unwrap();
    let elevated = Stratum::new(StratumLevel::Elevated, vec![(elevated_species, 1.0)], 1.0).unwrap();

    let site = Site::new(
        vec![near_surface, elevated],
        vec![(StratumLevel::NearSurface, StratumLevel::Elevated, StratumOverlapType::Overlapping)],
        surface_fuel(0.0),
        weather(25.0, 32.0),
        60.0,
    )
    .unwrap();

    let result = run(&site, &ModelSettings::default()).unwrap();
    let near_surface_outcome = result.run1.outcome(StratumLevel::NearSurface).unwrap();
    assert!(near_surface_outcome.plant_paths.iter().any(|p| p.has_ignition()));
}

/// A stratum composed of two differently-weighted species still
/// produces a single weighted flame series per spec.md §4.3, rather
/// than one series per species.
#[test]
fn multi_species_stratum_yields_one_weighted_series() {
    let a = tree_species("Species A", 4.0, 280.0);
    let b = tree_species("Species B", 6.0, 320.0);
    let canopy = Stratum::new(StratumLevel::Canopy, vec![(a, 3.0), (b, 1.0)], 8.0).unwrap();

    let mid_species = Species::new(
        "Driver shrub",
        CrownPoly::new(0.5, 0.8, 4.0, 4.5, 2.0).unwrap(),
        0.8,
        0.4,
        0.6,
        LeafForm::Flat,
        0.0005,
        0.015,
        0.07,
        0.02,
        2.0,
        0.3,
        0.1,
        Some(300.0),
        None,
    )
    .unwrap();
    let midstorey = Stratum::new(StratumLevel::MidStorey, vec![(mid_species, 1.0)], 2.0).unwrap();

    let site = Site::new(
        vec![midstorey, canopy],
        vec![],
        surface_fuel(0.0),
        weather(20.0, 30.0),
        60.0,
    )
    .unwrap();

    let result = run(&site, &ModelSettings::default()).unwrap();
    let canopy_outcome = result.run1.outcome(StratumLevel::Canopy).unwrap();
    assert_eq!(canopy_outcome.plant_paths.len(), 2, "one ignition path per species component");
    if let Some(series) = canopy_outcome.largest_flame_series() {
        assert!(!series.is_empty());
    }
}

/// Component weights normalize to 1 regardless of the raw weights
/// supplied at construction (spec.md §8 "For every stratum's
/// normalized species components, sum weighting = 1").
#[test]
fn stratum_component_weights_always_normalize_to_one() {
    let a = tree_species("A", 4.0, 300.0);
    let b = tree_species("B", 5.0, 300.0);
    let stratum = Stratum::new(StratumLevel::Elevated, vec![(a, 7.0), (b, 3.0)], 1.5).unwrap();
    let total: f64 = stratum
        .species_components
        .iter()
        .map(|c: &SpeciesComponent| c.weight)
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
}
