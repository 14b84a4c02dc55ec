//! Engine configuration.
//!
//! Typically built by the application (or deserialized with the `serde`
//! feature) and handed by reference to every component.

use std::time::Duration;

use crate::Time;

/// How per-driver results are reduced to one objective value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Objective {
    /// Sum of exit times.
    #[default]
    TotalExitTime,
    /// Sum of (exit − departure).
    TotalTravelTime,
    /// Latest exit time.
    Makespan,
}

impl Objective {
    /// Reduce `(departure, exit)` pairs of finished drivers.
    pub fn reduce<I>(self, finished: I) -> Time
    where
        I: IntoIterator<Item = (Time, Time)>,
    {
        let it = finished.into_iter();
        match self {
            Objective::TotalExitTime => it.map(|(_, exit)| exit).sum(),
            Objective::TotalTravelTime => it.map(|(dep, exit)| exit - dep).sum(),
            Objective::Makespan => it.map(|(_, exit)| exit).fold(0.0, Time::max),
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Upper bound on simulated time.  Intervals are clipped to
    /// `[0, horizon]`; a simulation whose next event lies beyond it stops
    /// with `Status::Timeout`.
    pub horizon: u64,

    /// Wall-clock budget for simulations and searches.  `None` = unlimited.
    pub time_budget: Option<Duration>,

    /// Number of expansions/steps between wall-clock checks.
    pub check_interval: u64,

    /// Edge length used when an endpoint has no position.
    pub default_distance: f64,

    /// Lane count for edges added without one.
    pub default_lanes: u32,

    /// Flow-limit threshold for edges added without one.
    pub default_flow_limit: u32,

    /// Reduction used by `EventSimulator::value`.
    pub objective: Objective,
}

impl EngineConfig {
    /// Config with the given horizon and defaults everywhere else.
    pub fn with_horizon(horizon: u64) -> Self {
        Self { horizon, ..Self::default() }
    }

    /// The horizon as a simulated time.
    #[inline]
    pub fn horizon_time(&self) -> Time {
        self.horizon as Time
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon:            10_000,
            time_budget:        None,
            check_interval:     64,
            default_distance:   1.0,
            default_lanes:      1,
            default_flow_limit: u32::MAX,
            objective:          Objective::TotalExitTime,
        }
    }
}
