use crate::message::SessionMessage;
use crate::payload::ApiRequestInfo;
use crate::types::{accumulate_optional, add_finite, MetricsSummary, PerformanceEntry};

/// Combined token count of a message's payload, 0 when it has none or it does not parse.
pub fn combined_tokens(message: &SessionMessage) -> f64 {
    message
        .payload()
        .and_then(|text| ApiRequestInfo::parse(text).ok())
        .map_or(0.0, |info| info.combined_tokens())
}

/// Folds a session message log into a [`MetricsSummary`].
///
/// Only `api_req_started` messages contribute. Payloads that fail to parse
/// are logged and skipped; this never fails and never mutates `messages`.
pub fn aggregate(messages: &[SessionMessage]) -> MetricsSummary {
    // Position, not value: identical payloads may appear more than once.
    let context_index = messages
        .iter()
        .rposition(|message| message.is_api_request_started() && combined_tokens(message) > 0.0);

    let mut summary = MetricsSummary::default();

    for (index, message) in messages.iter().enumerate() {
        if !message.is_api_request_started() {
            continue;
        }
        let Some(text) = message.payload() else {
            continue;
        };

        let info = match ApiRequestInfo::parse(text) {
            Ok(info) => info,
            Err(error) => {
                log::warn!(
                    "skipping api request payload at ts {}: {}",
                    message.ts,
                    error
                );
                continue;
            }
        };

        record_request(&mut summary, message.ts, &info);

        if context_index == Some(index) {
            summary.context_tokens = info.combined_tokens();
        }
    }

    if summary.request_count > 0 && summary.total_duration > 0.0 {
        summary.average_duration = summary.total_duration / summary.request_count as f64;
    }

    log::debug!(
        "aggregated {} api requests from {} messages ({} timed)",
        summary.request_count,
        messages.len(),
        summary.performance_history.len()
    );

    summary
}

fn record_request(summary: &mut MetricsSummary, ts: i64, info: &ApiRequestInfo) {
    summary.total_tokens_in = add_finite(summary.total_tokens_in, info.tokens_in.unwrap_or(0.0));
    summary.total_tokens_out = add_finite(summary.total_tokens_out, info.tokens_out.unwrap_or(0.0));
    accumulate_optional(&mut summary.total_cache_writes, info.cache_writes);
    accumulate_optional(&mut summary.total_cache_reads, info.cache_reads);
    summary.total_cost = add_finite(summary.total_cost, info.cost.unwrap_or(0.0));
    summary.request_count += 1;

    let duration = info.request_duration();
    if duration <= 0.0 {
        return;
    }

    summary.total_duration = add_finite(summary.total_duration, duration);
    summary.performance_history.push(PerformanceEntry {
        timestamp: ts,
        duration,
        tokens_in: info.tokens_in.unwrap_or(0.0),
        tokens_out: info.tokens_out.unwrap_or(0.0),
        provider: info.provider.clone(),
        model_id: info.model_id.clone(),
    });

    if let Some(provider) = info.provider.as_deref().filter(|name| !name.is_empty()) {
        *summary
            .requests_by_provider
            .entry(provider.to_string())
            .or_insert(0) += 1;
        let total = summary
            .duration_by_provider
            .entry(provider.to_string())
            .or_insert(0.0);
        *total = add_finite(*total, duration);
    }

    if let Some(model) = info.model_id.as_deref().filter(|name| !name.is_empty()) {
        *summary.requests_by_model.entry(model.to_string()).or_insert(0) += 1;
        let total = summary
            .duration_by_model
            .entry(model.to_string())
            .or_insert(0.0);
        *total = add_finite(*total, duration);
    }
}
