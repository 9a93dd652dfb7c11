/// Data organization utilities for the river conditions service.
///
/// Turns the flat per-source reports produced by `ingest` into the
/// per-river series the aggregation engine publishes.
///
/// Submodules:
/// - `merge`: flow history merge and temperature selection.

pub mod merge;
