//! Row views over a [`MetricsSummary`] for the provider, model and
//! response-time consumers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{MetricsSummary, PerformanceEntry};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreakdownRow {
    pub name: String,
    pub requests: u64,
    pub total_duration: f64,
    pub average_duration: f64,
}

/// One row per provider, in first-encounter order
pub fn provider_rows(summary: &MetricsSummary) -> Vec<BreakdownRow> {
    rows_from(&summary.requests_by_provider, &summary.duration_by_provider)
}

/// One row per model, in first-encounter order
pub fn model_rows(summary: &MetricsSummary) -> Vec<BreakdownRow> {
    rows_from(&summary.requests_by_model, &summary.duration_by_model)
}

/// History sorted by timestamp; entries with equal timestamps keep log order.
pub fn history_by_timestamp(summary: &MetricsSummary) -> Vec<PerformanceEntry> {
    let mut history = summary.performance_history.clone();
    history.sort_by_key(|entry| entry.timestamp);
    history
}

/// Longest request in the history, the earliest one on ties
pub fn slowest_request(summary: &MetricsSummary) -> Option<&PerformanceEntry> {
    summary
        .performance_history
        .iter()
        .fold(None, |slowest: Option<&PerformanceEntry>, entry| match slowest {
            Some(current) if current.duration >= entry.duration => Some(current),
            _ => Some(entry),
        })
}

fn rows_from(requests: &IndexMap<String, u64>, durations: &IndexMap<String, f64>) -> Vec<BreakdownRow> {
    requests
        .iter()
        .map(|(name, &count)| {
            let total_duration = durations.get(name).copied().unwrap_or(0.0);
            BreakdownRow {
                name: name.clone(),
                requests: count,
                total_duration,
                average_duration: if count > 0 {
                    total_duration / count as f64
                } else {
                    0.0
                },
            }
        })
        .collect()
}
