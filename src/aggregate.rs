//! Aggregation engine.
//!
//! Resolves a river, fetches every feed configured for it in parallel,
//! merges the results, and classifies the current flow. Nothing here
//! returns an error: a missing river, a failed feed, or an empty series
//! just leaves the corresponding record fields absent.

use std::thread;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::alert::staleness::{DEFAULT_STALE_AFTER_MINUTES, age_minutes_at, is_stale_at};
use crate::alert::thresholds::classify_optional;
use crate::analysis::merge::{latest_temperature, merge_flow_history};
use crate::ingest::TelemetrySource;
use crate::logging::log_aggregation_summary;
use crate::model::{FlowThresholds, RiverRecord, SourceKind, SourceReport};
use crate::stations::{StationFeed, find_river};

pub struct Aggregator {
    sources: Vec<Box<dyn TelemetrySource>>,
    stale_after_minutes: i64,
}

impl Aggregator {
    pub fn new(sources: Vec<Box<dyn TelemetrySource>>) -> Self {
        Self {
            sources,
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
        }
    }

    /// Warn when the newest flow sample is older than this.
    pub fn with_stale_after(mut self, minutes: i64) -> Self {
        self.stale_after_minutes = minutes;
        self
    }

    pub fn stale_after_minutes(&self) -> i64 {
        self.stale_after_minutes
    }

    /// Age in minutes of the record's newest flow sample, when that sample
    /// is past the staleness threshold at `now`.
    pub fn stale_flow_age(&self, record: &RiverRecord, now: DateTime<Utc>) -> Option<i64> {
        let last = record.flow_history.last()?;
        is_stale_at(last, self.stale_after_minutes, now).then(|| age_minutes_at(last, now))
    }

    fn source_for(&self, kind: SourceKind) -> Option<&dyn TelemetrySource> {
        self.sources.iter().find(|s| s.kind() == kind).map(|s| s.as_ref())
    }

    /// Build the record for `river_id` (case-insensitive).
    pub fn aggregate(&self, river_id: &str) -> RiverRecord {
        let profile = find_river(river_id);
        let id = match profile {
            Some(p) => p.id.to_string(),
            None => {
                info!(river = river_id, "unknown river; returning an empty record");
                river_id.trim().to_ascii_lowercase()
            }
        };
        let feeds: &[StationFeed] = profile.map(|p| p.feeds).unwrap_or(&[]);
        let thresholds = profile.map(|p| p.thresholds);

        let reports = self.fetch_all(feeds);
        let failed = reports.iter().filter(|r| r.is_failed()).count();
        if !feeds.is_empty() {
            log_aggregation_summary(&id, reports.len(), reports.len() - failed, failed);
        }

        let record = build_record(id, &reports, thresholds);
        if let Some(age) = self.stale_flow_age(&record, Utc::now()) {
            warn!(river = %record.river_id, age_minutes = age, "newest flow sample is stale");
        }
        record
    }

    /// Run every feed on its own thread and wait for all of them.
    ///
    /// A feed whose adapter is not registered, or whose thread panics,
    /// becomes a failed report like any other failure.
    pub fn fetch_all(&self, feeds: &[StationFeed]) -> Vec<SourceReport> {
        thread::scope(|scope| {
            let handles: Vec<_> = feeds
                .iter()
                .map(|feed| {
                    let source = self.source_for(feed.source());
                    let handle = scope.spawn(move || match source {
                        Some(s) => s.fetch(feed),
                        None => SourceReport::failed(feed.source(), feed.station_id(), "no adapter registered"),
                    });
                    (feed, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(feed, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| SourceReport::failed(feed.source(), feed.station_id(), "adapter panicked"))
                })
                .collect()
        })
    }
}

/// Assemble a record from already-fetched reports.
pub fn build_record(river_id: String, reports: &[SourceReport], thresholds: Option<FlowThresholds>) -> RiverRecord {
    let flow_history = merge_flow_history(reports);
    let current_flow_cfs = flow_history.last().map(|s| s.value);
    let flow_status = classify_optional(current_flow_cfs, thresholds.as_ref());

    RiverRecord {
        river_id,
        flow_history,
        current_flow_cfs,
        current_temp_f: latest_temperature(reports),
        flow_status,
        thresholds: flow_status.and(thresholds),
    }
}
