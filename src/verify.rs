//! Feed Verification Module
//!
//! Runs every feed in the river registry through its live adapter and
//! reports which ones are returning data. Use this after editing the
//! registry, or when a river's record comes back emptier than expected.

use chrono::Utc;
use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::model::{FetchStatus, SourceKind, SourceReport};
use crate::stations::{River, StationFeed};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedVerification {
    pub river: String,
    pub source: SourceKind,
    pub station: String,
    pub status: VerificationStatus,
    pub discharge_samples: usize,
    pub temperature_samples: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub feeds: Vec<FeedVerification>,
    pub summary: VerificationSummary,
}

// ============================================================================
// Verification
// ============================================================================

/// Judge one feed from the report its adapter produced.
pub fn verify_feed(river_id: &str, feed: &StationFeed, report: &SourceReport) -> FeedVerification {
    let (status, error_message) = match &report.status {
        FetchStatus::Complete => (VerificationStatus::Success, None),
        FetchStatus::Partial => (VerificationStatus::PartialSuccess, None),
        FetchStatus::Failed(msg) => (VerificationStatus::Failed, Some(msg.clone())),
    };

    FeedVerification {
        river: river_id.to_string(),
        source: feed.source(),
        station: feed.station_id().to_string(),
        status,
        discharge_samples: report.discharge.len(),
        temperature_samples: report.temperature_f.len(),
        error_message,
    }
}

/// Fetch and judge every feed of one river.
pub fn verify_river(aggregator: &Aggregator, river: River) -> Vec<FeedVerification> {
    let profile = river.profile();
    let reports = aggregator.fetch_all(profile.feeds);
    profile
        .feeds
        .iter()
        .zip(reports.iter())
        .map(|(feed, report)| verify_feed(profile.id, feed, report))
        .collect()
}

/// Summarize a set of feed checks. Partial successes count as working.
pub fn summarize(feeds: Vec<FeedVerification>) -> VerificationReport {
    let failed = feeds
        .iter()
        .filter(|f| f.status == VerificationStatus::Failed)
        .count();

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        summary: VerificationSummary {
            total: feeds.len(),
            working: feeds.len() - failed,
            failed,
        },
        feeds,
    }
}

pub fn run_full_verification(aggregator: &Aggregator) -> VerificationReport {
    let feeds = River::ALL
        .iter()
        .flat_map(|river| verify_river(aggregator, *river))
        .collect();
    summarize(feeds)
}

pub fn print_summary(report: &VerificationReport) {
    println!("═══════════════════════════════════════════════════════════");
    println!("📊 FEED VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    for feed in &report.feeds {
        let mark = match feed.status {
            VerificationStatus::Success => "✓ OK",
            VerificationStatus::PartialSuccess => "⚠ Partial",
            VerificationStatus::Failed => "✗ FAILED",
        };
        println!(
            "  {:<18} {:?} {:<9} {} (flow {}, temp {}){}",
            feed.river,
            feed.source,
            feed.station,
            mark,
            feed.discharge_samples,
            feed.temperature_samples,
            feed.error_message
                .as_deref()
                .map(|e| format!(": {}", e))
                .unwrap_or_default()
        );
    }
    println!();
    println!(
        "Feeds: {}/{} working  ({} failed)",
        report.summary.working, report.summary.total, report.summary.failed
    );
    println!("═══════════════════════════════════════════════════════════");
}
