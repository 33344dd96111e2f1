//! Decision engine: position policy, cooldown tracking and the cycle
//! runner that drives them on a fixed cadence.

pub mod cooldown;
pub mod logging;
pub mod policy;
pub mod runner;

pub use cooldown::CooldownTracker;
pub use logging::setup_logging;
pub use policy::{CycleAction, PositionPolicy, SymbolRuntime};
pub use runner::EngineRunner;
