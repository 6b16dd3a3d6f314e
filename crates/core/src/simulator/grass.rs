//! Grass rule: species classification and the ignition-delay-time
//! reduction it implies (spec.md §4.1 "Grass rule").

use crate::core_types::species::Species;
use crate::core_types::stratum::StratumLevel;

/// Ignition delay time at `temp`, reduced by `grass_idt_reduction` when
/// `species` qualifies as grass at `level`.
#[must_use]
pub fn effective_idt(species: &Species, level: StratumLevel, temp: f64, grass_idt_reduction: f64) -> f64 {
    let idt = species.ignition_delay_time(temp);
    if species.is_grass(level) {
        idt * grass_idt_reduction
    } else {
        idt
    }
}

/// `ΔT` assigned to a newly emitted plant flame, grass or not.
#[must_use]
pub fn flame_delta_temperature(
    species: &Species,
    level: StratumLevel,
    grass_delta: f64,
    main_delta: f64,
) -> f64 {
    if species.is_grass(level) {
        grass_delta
    } else {
        main_delta
    }
}
