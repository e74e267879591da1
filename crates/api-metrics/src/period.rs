use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{add_finite, PerformanceEntry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Some(Self::Day),
            "week" | "weekly" => Some(Self::Week),
            "month" | "monthly" => Some(Self::Month),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodMetrics {
    pub label: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub request_count: u64,
    pub total_duration: f64,
    pub average_duration: f64,
    pub total_tokens_in: f64,
    pub total_tokens_out: f64,
    pub model_breakdown: IndexMap<String, u64>,
}

/// Buckets timed requests by UTC day, Monday-based week, or calendar month.
pub fn aggregate_history(history: &[PerformanceEntry], period: Period) -> Vec<PeriodMetrics> {
    match period {
        Period::Day => aggregate_by_period(history, |date| date),
        Period::Week => aggregate_by_period(history, start_of_week),
        Period::Month => aggregate_by_period(history, start_of_month),
    }
}

fn aggregate_by_period<F>(history: &[PerformanceEntry], period_start_resolver: F) -> Vec<PeriodMetrics>
where
    F: Fn(NaiveDate) -> NaiveDate,
{
    let mut buckets: HashMap<NaiveDate, PeriodMetrics> = HashMap::new();

    for entry in history {
        let Some(date) = entry_date(entry) else {
            log::warn!("skipping history entry with out-of-range timestamp {}", entry.timestamp);
            continue;
        };
        let period_start = period_start_resolver(date);

        let bucket = buckets
            .entry(period_start)
            .or_insert_with(|| PeriodMetrics {
                label: period_start.to_string(),
                period_start,
                period_end: period_start,
                request_count: 0,
                total_duration: 0.0,
                average_duration: 0.0,
                total_tokens_in: 0.0,
                total_tokens_out: 0.0,
                model_breakdown: IndexMap::new(),
            });

        if date > bucket.period_end {
            bucket.period_end = date;
        }

        bucket.request_count += 1;
        bucket.total_duration = add_finite(bucket.total_duration, entry.duration);
        bucket.total_tokens_in = add_finite(bucket.total_tokens_in, entry.tokens_in);
        bucket.total_tokens_out = add_finite(bucket.total_tokens_out, entry.tokens_out);

        if let Some(model) = entry.model_id.as_deref().filter(|name| !name.is_empty()) {
            *bucket.model_breakdown.entry(model.to_string()).or_insert(0) += 1;
        }
    }

    let mut periods: Vec<PeriodMetrics> = buckets.into_values().collect();
    periods.sort_by_key(|period| period.period_start);

    for period in &mut periods {
        period.label = format_period_label(period.period_start, period.period_end);
        if period.request_count > 0 {
            period.average_duration = period.total_duration / period.request_count as f64;
        }
    }

    periods
}

fn entry_date(entry: &PerformanceEntry) -> Option<NaiveDate> {
    Utc.timestamp_millis_opt(entry.timestamp)
        .single()
        .map(|moment| moment.date_naive())
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn format_period_label(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}..{}", start, end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{aggregate_history, Period};
    use crate::types::PerformanceEntry;

    fn entry_on(year: i32, month: u32, day: u32, duration: f64, model: Option<&str>) -> PerformanceEntry {
        let timestamp = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("valid timestamp")
            .timestamp_millis();
        PerformanceEntry {
            timestamp,
            duration,
            tokens_in: 10.0,
            tokens_out: 5.0,
            provider: Some("openai".to_string()),
            model_id: model.map(str::to_string),
        }
    }

    #[test]
    fn weekly_buckets_start_on_monday() {
        // 2026-02-09 is a Monday
        let history = vec![
            entry_on(2026, 2, 9, 100.0, Some("gpt-4")),
            entry_on(2026, 2, 11, 300.0, Some("gpt-4")),
            entry_on(2026, 2, 16, 50.0, None),
        ];

        let result = aggregate_history(&history, Period::Week);

        assert_eq!(result.len(), 2);
        assert_eq!(
            result[0].period_start,
            NaiveDate::from_ymd_opt(2026, 2, 9).expect("valid date")
        );
        assert_eq!(result[0].label, "2026-02-09..2026-02-11");
        assert_eq!(result[0].request_count, 2);
        assert_eq!(result[0].average_duration, 200.0);
        assert_eq!(result[0].total_tokens_in, 20.0);
        assert_eq!(result[0].model_breakdown.get("gpt-4"), Some(&2));
        assert_eq!(result[1].label, "2026-02-16");
        assert!(result[1].model_breakdown.is_empty());
    }

    #[test]
    fn monthly_buckets_start_on_day_one() {
        let history = vec![
            entry_on(2026, 2, 1, 10.0, None),
            entry_on(2026, 1, 31, 20.0, None),
        ];

        let result = aggregate_history(&history, Period::Month);

        assert_eq!(result.len(), 2);
        assert_eq!(
            result[0].period_start,
            NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")
        );
        assert_eq!(
            result[1].period_start,
            NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date")
        );
    }

    #[test]
    fn daily_buckets_group_same_day() {
        let history = vec![
            entry_on(2026, 3, 4, 10.0, None),
            entry_on(2026, 3, 4, 30.0, None),
        ];

        let result = aggregate_history(&history, Period::Day);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_duration, 40.0);
        assert_eq!(result[0].label, "2026-03-04");
    }

    #[test]
    fn period_parse_accepts_aliases() {
        assert_eq!(Period::parse("Weekly"), Some(Period::Week));
        assert_eq!(Period::parse(" day "), Some(Period::Day));
        assert_eq!(Period::parse("month"), Some(Period::Month));
        assert_eq!(Period::parse("year"), None);
        assert_eq!(Period::Week.as_str(), "week");
    }
}
