//! Bracket order planning.
//!
//! Given an entry price, side and volatility measure, the planner sizes
//! take-profit and stop-loss trigger prices and assembles the three-leg
//! order plan. It is pure: the caller submits the legs.

mod bracket;

pub use bracket::{
    BracketOrderPlanner, BracketPlan, SizingMode, VolatilityBucket, VolatilityTiers,
};
