/// Merging of per-source reports into one river's series.
///
/// Reports are taken in the order their fetches finished. Later reports
/// win whenever two sources disagree: on a shared flow timestamp, and on
/// which source's temperature is current.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::model::{Sample, SourceReport};

/// Reports ordered by completion time; ties keep their input order.
fn in_fetch_order(reports: &[SourceReport]) -> Vec<&SourceReport> {
    let mut ordered: Vec<&SourceReport> = reports.iter().collect();
    ordered.sort_by_key(|r| r.fetched_at);
    ordered
}

/// Merge discharge from every report into one strictly ascending series.
///
/// Samples sharing a timestamp collapse to the last one seen.
pub fn merge_flow_history(reports: &[SourceReport]) -> Vec<Sample> {
    let mut by_time: BTreeMap<DateTime<FixedOffset>, Sample> = BTreeMap::new();
    for report in in_fetch_order(reports) {
        for sample in &report.discharge {
            by_time.insert(sample.time, sample.clone());
        }
    }
    by_time.into_values().collect()
}

/// Latest temperature (°F) from the most recently fetched report that has one.
pub fn latest_temperature(reports: &[SourceReport]) -> Option<f64> {
    in_fetch_order(reports)
        .into_iter()
        .filter_map(|r| r.temperature_f.iter().max_by_key(|s| s.time))
        .last()
        .map(|s| s.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_timestamp;
    use crate::model::{FetchStatus, SourceKind};
    use chrono::{Duration, TimeZone, Utc};

    fn sample(time: &str, value: f64) -> Sample {
        Sample::new(parse_timestamp(time).unwrap(), value)
    }

    fn report(source: SourceKind, finished_secs: i64, discharge: Vec<Sample>, temperature_f: Vec<Sample>) -> SourceReport {
        SourceReport {
            source,
            station: "TEST".to_string(),
            discharge,
            temperature_f,
            status: FetchStatus::Complete,
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap() + Duration::seconds(finished_secs),
        }
    }

    #[test]
    fn test_merge_sorts_and_dedupes_across_reports() {
        let a = report(
            SourceKind::Usgs,
            0,
            vec![sample("2024-05-01T12:30:00Z", 3.0), sample("2024-05-01T12:00:00Z", 1.0)],
            vec![],
        );
        let b = report(
            SourceKind::Nwrfc,
            1,
            vec![sample("2024-05-01T12:15:00Z", 2.0), sample("2024-05-01T12:30:00Z", 30.0)],
            vec![],
        );

        let merged = merge_flow_history(&[a, b]);
        let values: Vec<f64> = merged.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 30.0]);
        assert!(merged.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_same_instant_in_different_offsets_is_a_duplicate() {
        let a = report(SourceKind::Usgs, 0, vec![sample("2024-05-01T05:00:00-07:00", 1.0)], vec![]);
        let b = report(SourceKind::Nwrfc, 1, vec![sample("2024-05-01T12:00:00Z", 2.0)], vec![]);

        let merged = merge_flow_history(&[a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, 2.0);
    }

    #[test]
    fn test_merge_is_independent_of_report_input_order() {
        let a = report(SourceKind::Usgs, 0, vec![sample("2024-05-01T12:00:00Z", 1.0)], vec![]);
        let b = report(SourceKind::Nwrfc, 5, vec![sample("2024-05-01T12:00:00Z", 2.0)], vec![]);

        let forward = merge_flow_history(&[a.clone(), b.clone()]);
        let backward = merge_flow_history(&[b, a]);
        assert_eq!(forward, backward);
        assert_eq!(forward[0].value, 2.0);
    }

    #[test]
    fn test_latest_temperature_prefers_last_fetched_report() {
        let early = report(SourceKind::Usgs, 0, vec![], vec![sample("2024-05-01T12:00:00Z", 50.0)]);
        let late = report(SourceKind::Nwrfc, 3, vec![], vec![sample("2024-05-01T11:00:00Z", 48.0)]);
        let none = report(SourceKind::Usgs, 9, vec![], vec![]);

        assert_eq!(latest_temperature(&[late, none, early]), Some(48.0));
    }

    #[test]
    fn test_latest_temperature_uses_newest_sample_within_report() {
        let r = report(
            SourceKind::Usgs,
            0,
            vec![],
            vec![sample("2024-05-01T12:15:00Z", 47.0), sample("2024-05-01T12:00:00Z", 46.0)],
        );
        assert_eq!(latest_temperature(&[r]), Some(47.0));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_flow_history(&[]).is_empty());
        assert_eq!(latest_temperature(&[]), None);
    }
}
