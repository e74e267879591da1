use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Summary of every API request recorded in a message log
///
/// Rebuilt from scratch on each aggregation. Provider and model maps keep
/// first-encounter order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_tokens_in: f64,
    pub total_tokens_out: f64,
    /// Absent until some request reports cache writes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cache_writes: Option<f64>,
    /// Absent until some request reports cache reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cache_reads: Option<f64>,
    pub total_cost: f64,
    /// Combined tokens of the most recent request that reported any
    pub context_tokens: f64,
    pub total_duration: f64,
    pub request_count: u64,
    pub average_duration: f64,
    pub requests_by_provider: IndexMap<String, u64>,
    pub duration_by_provider: IndexMap<String, f64>,
    pub requests_by_model: IndexMap<String, u64>,
    pub duration_by_model: IndexMap<String, f64>,
    pub performance_history: Vec<PerformanceEntry>,
}

/// One timed request, in log order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    pub timestamp: i64,
    pub duration: f64,
    pub tokens_in: f64,
    pub tokens_out: f64,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
}

/// Sum that saturates at `±f64::MAX` so totals always serialize as numbers.
pub fn add_finite(total: f64, value: f64) -> f64 {
    let sum = total + value;
    if sum.is_finite() {
        sum
    } else if sum.is_nan() {
        total
    } else {
        f64::MAX.copysign(sum)
    }
}

/// Adds `value` to an accumulator that stays `None` until the first contribution.
pub fn accumulate_optional(total: &mut Option<f64>, value: Option<f64>) {
    if let Some(value) = value {
        *total = Some(add_finite(total.unwrap_or(0.0), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_accumulator_stays_unset_without_contributions() {
        let mut total = None;
        accumulate_optional(&mut total, None);
        assert_eq!(total, None);
    }

    #[test]
    fn optional_accumulator_upgrades_then_adds() {
        let mut total = None;
        accumulate_optional(&mut total, Some(0.0));
        assert_eq!(total, Some(0.0));

        accumulate_optional(&mut total, Some(7.0));
        accumulate_optional(&mut total, None);
        accumulate_optional(&mut total, Some(-2.5));
        assert_eq!(total, Some(4.5));
    }

    #[test]
    fn add_finite_saturates_instead_of_overflowing() {
        assert_eq!(add_finite(1.5, 2.0), 3.5);
        assert_eq!(add_finite(f64::MAX, f64::MAX), f64::MAX);
        assert_eq!(add_finite(-f64::MAX, -f64::MAX), -f64::MAX);
    }

    #[test]
    fn summary_serializes_camel_case_and_omits_unset_cache_totals() {
        let summary = MetricsSummary::default();
        let json = serde_json::to_value(&summary).expect("serialize");

        assert_eq!(json["totalTokensIn"], 0.0);
        assert_eq!(json["averageDuration"], 0.0);
        assert!(json.get("totalCacheWrites").is_none());
        assert!(json.get("totalCacheReads").is_none());
        assert!(json["performanceHistory"]
            .as_array()
            .expect("history array")
            .is_empty());
    }
}
