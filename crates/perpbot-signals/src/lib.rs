//! Signal detection over indicator series.
//!
//! A [`StrategyProfile`] selects one crossover trigger and a set of
//! independently togglable filters; the [`SignalDetector`] evaluates the
//! latest bars of a series against that profile and emits at most one
//! directional signal per evaluation.

mod detector;
mod profile;

pub use detector::SignalDetector;
pub use profile::{
    AdxFilter, FreshnessFilter, StrategyProfile, SuperTrendFilter, TriggerKind, VolatilityFilter,
    VolatilityFloor,
};
