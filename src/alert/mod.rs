//! Judgements made on aggregated telemetry.
//!
//! - `thresholds`: flow status classification.
//! - `staleness`: age checks on the newest sample.

pub mod staleness;
pub mod thresholds;
