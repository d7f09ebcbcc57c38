//! Digit occurrence statistics over a lottery draw history.
//!
//! [`counter::count`] is the primitive: per digit, how many periods of a
//! window drew it at least once. The [`aggregate`] functions run it over
//! chains, multiplier families, heatmap spans and growing windows, and
//! [`table`] turns the results into display tables.

pub mod aggregate;
pub mod config;
pub mod counter;
pub mod error;
pub mod table;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
