//! Ignition path record: the time-ordered trace of one species'
//! ignition (or non-ignition) inside a crown for one simulator run
//! (spec.md §3 IgnitedSegment / PreIgnitionData / IgnitionPath).

use serde::{Deserialize, Serialize};

use super::flame::Flame;
use super::geometry::Coord;
use super::species::Species;
use super::stratum::StratumLevel;
use crate::error::ModelError;

/// Simulator mode: a real per-species crown, or an artificial
/// "pseudo-canopy" crown used for the stratum run (spec.md Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionRunType {
    PlantRun,
    StratumRun,
}

/// One ignited segment of the crown: a position interval ignited at a
/// given time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IgnitedSegment {
    pub time_step: u32,
    pub start: Coord,
    pub end: Coord,
}

impl IgnitedSegment {
    #[must_use]
    pub fn new(time_step: u32, start: Coord, end: Coord) -> Self {
        IgnitedSegment { time_step, start, end }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }
}

/// A drying event recorded before ignition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PreIgnitionData {
    PreHeatingDrying {
        time: u32,
        flame: Flame,
        dist: f64,
        factor: f64,
        temp: f64,
        duration: f64,
    },
    IncidentDrying {
        time: u32,
        flame: Flame,
        dist: f64,
        factor: f64,
        temp: f64,
        idt: f64,
    },
}

impl PreIgnitionData {
    #[must_use]
    pub fn temp(&self) -> f64 {
        match self {
            PreIgnitionData::PreHeatingDrying { temp, .. }
            | PreIgnitionData::IncidentDrying { temp, .. } => *temp,
        }
    }

    #[must_use]
    pub fn time(&self) -> u32 {
        match self {
            PreIgnitionData::PreHeatingDrying { time, .. }
            | PreIgnitionData::IncidentDrying { time, .. } => *time,
        }
    }
}

/// Counts of pre-ignition drying records by variant, for diagnostic
/// consumption by the (out-of-scope) result formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreIgnitionSummary {
    pub pre_heating_events: usize,
    pub incident_events: usize,
}

/// The context a simulator run executes under: its mode and the
/// stratum level it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnitionPathContext {
    pub run_type: IgnitionRunType,
    pub stratum_level: StratumLevel,
}

/// The full record of one species' ignition attempt: where it started,
/// what dried it before ignition, and the segments it ignited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnitionPath {
    pub context: IgnitionPathContext,
    pub species: Species,
    pub initial_point: Coord,
    pre_ignition_data: Vec<PreIgnitionData>,
    segments: Vec<IgnitedSegment>,
}

impl IgnitionPath {
    #[must_use]
    pub fn new(context: IgnitionPathContext, species: Species, initial_point: Coord) -> Self {
        IgnitionPath {
            context,
            species,
            initial_point,
            pre_ignition_data: Vec::new(),
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[IgnitedSegment] {
        &self.segments
    }

    #[must_use]
    pub fn pre_ignition_data(&self) -> &[PreIgnitionData] {
        &self.pre_ignition_data
    }

    /// Records a pre-ignition drying event.
    ///
    /// # Errors
    /// Returns [`ModelError::Internal`] if ignition has already occurred
    /// (spec.md §4.1.2: pre-ignition data may not follow a segment).
    pub fn record_pre_ignition(&mut self, data: PreIgnitionData) -> Result<(), ModelError> {
        if self.has_ignition() {
            return Err(ModelError::Internal {
                detail: "pre-ignition data recorded after ignition".to_string(),
            });
        }
        self.pre_ignition_data.push(data);
        Ok(())
    }

    /// Appends a newly ignited segment.
    ///
    /// # Errors
    /// Returns [`ModelError::Internal`] if `segment`'s time step is not
    /// strictly greater than the previous segment's.
    pub fn append_segment(&mut self, segment: IgnitedSegment) -> Result<(), ModelError> {
        if let Some(last) = self.segments.last() {
            if segment.time_step <= last.time_step {
                return Err(ModelError::Internal {
                    detail: format!(
                        "segment time step {} did not strictly increase past {}",
                        segment.time_step, last.time_step
                    ),
                });
            }
        }
        self.segments.push(segment);
        Ok(())
    }

    #[must_use]
    pub fn has_ignition(&self) -> bool {
        !self.segments.is_empty()
    }

    #[must_use]
    pub fn ignition_time(&self) -> Option<u32> {
        self.segments.first().map(|s| s.time_step)
    }

    #[must_use]
    pub fn max_segment_length(&self) -> f64 {
        self.segments
            .iter()
            .map(IgnitedSegment::length)
            .fold(0.0, f64::max)
    }

    /// Groups this path's pre-ignition drying records by variant, for
    /// diagnostic consumption (spec.md §3 `IgnitionPath`; grouping
    /// pattern grounded in the teacher's `CombustionPhase` diagnostic
    /// state, `physics/smoldering.rs`).
    #[must_use]
    pub fn pre_ignition_summary(&self) -> PreIgnitionSummary {
        let mut summary = PreIgnitionSummary::default();
        for record in &self.pre_ignition_data {
            match record {
                PreIgnitionData::PreHeatingDrying { .. } => summary.pre_heating_events += 1,
                PreIgnitionData::IncidentDrying { .. } => summary.incident_events += 1,
            }
        }
        summary
    }

    #[must_use]
    pub fn max_drying_temperature(&self) -> f64 {
        self.pre_ignition_data
            .iter()
            .map(PreIgnitionData::temp)
            .fold(0.0, f64::max)
    }

    /// Segments ordered by descending length, ties broken by ascending
    /// time step — the ordering the stratum orchestrator uses to pick
    /// a representative segment.
    #[must_use]
    pub fn segments_by_length_and_time(&self) -> Vec<&IgnitedSegment> {
        let mut sorted: Vec<&IgnitedSegment> = self.segments.iter().collect();
        sorted.sort_by(|a, b| {
            b.length()
                .partial_cmp(&a.length())
                .unwrap()
                .then(a.time_step.cmp(&b.time_step))
        });
        sorted
    }
}
