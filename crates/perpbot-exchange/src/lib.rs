//! Execution-venue collaborators.
//!
//! The live venue is an external system consumed through the
//! [`perpbot_core::Exchange`] trait; this crate provides the paper
//! implementation used for dry runs and policy tests, plus a canned
//! market-data source.

mod history;
mod paper;

pub use history::StaticMarketData;
pub use paper::PaperExchange;
