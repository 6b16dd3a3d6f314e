//! Wind model: wind speed at a given height inside layered vegetation
//! (spec.md §2 Wind model, §4.4 step 2).
//!
//! Wind entering from above is attenuated by every stratum canopy it
//! must pass through to reach the query height, in proportion to that
//! stratum's leaf-area-index — the same Beer-Lambert-style attenuation
//! used for canopy wind profiles in the wildfire literature (Cionco
//! 1965's within-canopy wind decay is the qualitative model followed
//! here; the distilled spec names the contract, not the coefficient,
//! see DESIGN.md).

use crate::core_types::site::Site;
use crate::core_types::stratum::StratumLevel;

/// Extinction coefficient for wind attenuation through one stratum's
/// canopy, applied as `exp(-k * leafAreaIndex)`.
const EXTINCTION_COEFFICIENT: f64 = 0.5;

/// Wind speed (m/s) at `height` above the surface, attenuated by every
/// stratum canopy above that height. When `include_canopy` is `false`
/// the canopy stratum's attenuation is ignored entirely — used for the
/// second top-level run (spec.md §4.4 "Second run").
#[must_use]
pub fn wind_speed_at_height(site: &Site, height: f64, include_canopy: bool) -> f64 {
    let mut wind = site.weather.wind_speed_m_s();
    let mut strata: Vec<&crate::core_types::stratum::Stratum> = site.strata().iter().collect();
    strata.sort_by(|a, b| b.level.cmp(&a.level));
    for stratum in strata {
        if !include_canopy && stratum.level == StratumLevel::Canopy {
            continue;
        }
        if stratum.average_bottom() <= height {
            continue;
        }
        wind *= (-EXTINCTION_COEFFICIENT * stratum.leaf_area_index()).exp();
    }
    wind.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geometry::CrownPoly;
    use crate::core_types::site::{SurfaceFuel, Weather};
    use crate::core_types::species::LeafForm;
    use crate::core_types::species::Species;
    use crate::core_types::stratum::Stratum;
    use crate::core_types::units::Radians;

    fn species(width: f64) -> Species {
        Species::new(
            "Canopy species",
            CrownPoly::new(10.0, 10.5, 18.0, 19.0, width).unwrap(),
            1.0,
            0.3,
            0.3,
            LeafForm::Flat,
            0.0003,
            0.02,
            0.08,
            0.03,
            2.0,
            0.4,
            0.1,
            Some(300.0),
            None,
        )
        .unwrap()
    }

    fn site_with_canopy() -> Site {
        let canopy = Stratum::new(StratumLevel::Canopy, vec![(species(6.0), 1.0)], 8.0).unwrap();
        Site::new(
            vec![canopy],
            vec![],
            SurfaceFuel {
                slope: Radians(0.0),
                mean_fuel_diameter: 0.005,
                mean_fineness_leaves: 0.002,
                fuel_load: 17.3,
                dead_fuel_moisture: 0.1,
            },
            Weather {
                air_temperature: 29.2,
                wind_speed_km_h: 30.0,
            },
            50.0,
        )
        .unwrap()
    }

    #[test]
    fn excluding_canopy_increases_wind_below_it() {
        let site = site_with_canopy();
        let with_canopy = wind_speed_at_height(&site, 5.0, true);
        let without_canopy = wind_speed_at_height(&site, 5.0, false);
        assert!(without_canopy > with_canopy);
    }

    #[test]
    fn wind_above_all_strata_is_unattenuated() {
        let site = site_with_canopy();
        let wind = wind_speed_at_height(&site, 100.0, true);
        assert!((wind - site.weather.wind_speed_m_s()).abs() < 1e-9);
    }
}
