//! Flow status classification.
//!
//! Compares a current discharge against a river's thresholds. The checks
//! run in a fixed order: `low` and `high` use strict inequalities and win
//! first, then the inclusive optimal band, and everything else is `fair`.
//! A flow sitting exactly on `low` or `high` is therefore `fair`.

use crate::model::{FlowStatus, FlowThresholds};

/// Classify a discharge (cfs) against `thresholds`.
pub fn classify_flow(flow_cfs: f64, thresholds: &FlowThresholds) -> FlowStatus {
    if flow_cfs < thresholds.low {
        FlowStatus::Low
    } else if flow_cfs > thresholds.high {
        FlowStatus::High
    } else if flow_cfs >= thresholds.optimal_low && flow_cfs <= thresholds.optimal_high {
        FlowStatus::Optimal
    } else {
        FlowStatus::Fair
    }
}

/// Classify when both inputs are available.
pub fn classify_optional(flow_cfs: Option<f64>, thresholds: Option<&FlowThresholds>) -> Option<FlowStatus> {
    Some(classify_flow(flow_cfs?, thresholds?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MCKENZIE: FlowThresholds = FlowThresholds {
        low: 900.0,
        optimal_low: 1000.0,
        optimal_high: 2500.0,
        high: 3000.0,
    };

    #[test]
    fn test_optimal_band() {
        assert_eq!(classify_flow(1500.0, &MCKENZIE), FlowStatus::Optimal);
        assert_eq!(classify_flow(1000.0, &MCKENZIE), FlowStatus::Optimal);
        assert_eq!(classify_flow(2500.0, &MCKENZIE), FlowStatus::Optimal);
    }

    #[test]
    fn test_exact_low_and_high_are_fair() {
        assert_eq!(classify_flow(3000.0, &MCKENZIE), FlowStatus::Fair);
        assert_eq!(classify_flow(900.0, &MCKENZIE), FlowStatus::Fair);
    }

    #[test]
    fn test_outside_bounds() {
        assert_eq!(classify_flow(899.9, &MCKENZIE), FlowStatus::Low);
        assert_eq!(classify_flow(0.0, &MCKENZIE), FlowStatus::Low);
        assert_eq!(classify_flow(3000.1, &MCKENZIE), FlowStatus::High);
    }

    #[test]
    fn test_between_bands_is_fair() {
        assert_eq!(classify_flow(950.0, &MCKENZIE), FlowStatus::Fair);
        assert_eq!(classify_flow(2750.0, &MCKENZIE), FlowStatus::Fair);
    }

    #[test]
    fn test_partition_is_consistent_across_range() {
        // Sweep the line in 10 cfs steps: each value lands in exactly the
        // bucket the precedence order predicts.
        let mut flow = 0.0;
        while flow <= 4000.0 {
            let expected = if flow < 900.0 {
                FlowStatus::Low
            } else if flow > 3000.0 {
                FlowStatus::High
            } else if (1000.0..=2500.0).contains(&flow) {
                FlowStatus::Optimal
            } else {
                FlowStatus::Fair
            };
            assert_eq!(classify_flow(flow, &MCKENZIE), expected, "flow {}", flow);
            flow += 10.0;
        }
    }

    #[test]
    fn test_classify_optional_requires_both_inputs() {
        assert_eq!(classify_optional(None, Some(&MCKENZIE)), None);
        assert_eq!(classify_optional(Some(1500.0), None), None);
        assert_eq!(classify_optional(Some(1500.0), Some(&MCKENZIE)), Some(FlowStatus::Optimal));
    }
}
