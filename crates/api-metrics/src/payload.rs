use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PayloadError;
use crate::types::add_finite;

/// Decoded payload of an `api_req_started` message
///
/// Every field is optional. A field holding the wrong JSON type is treated
/// as absent instead of rejecting the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestInfo {
    pub tokens_in: Option<f64>,
    pub tokens_out: Option<f64>,
    pub cache_writes: Option<f64>,
    pub cache_reads: Option<f64>,
    pub cost: Option<f64>,
    /// Milliseconds
    pub duration: Option<f64>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub provider: Option<String>,
    pub model_id: Option<String>,
}

impl ApiRequestInfo {
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self::from_object(&map)),
            _ => Err(PayloadError::NotAnObject),
        }
    }

    pub fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            tokens_in: number_field(map, "tokensIn"),
            tokens_out: number_field(map, "tokensOut"),
            cache_writes: number_field(map, "cacheWrites"),
            cache_reads: number_field(map, "cacheReads"),
            cost: number_field(map, "cost"),
            duration: number_field(map, "duration"),
            start_time: number_field(map, "startTime"),
            end_time: number_field(map, "endTime"),
            provider: string_field(map, "provider"),
            model_id: string_field(map, "modelId"),
        }
    }

    /// Input, output, cache-write and cache-read tokens; missing counts as 0
    pub fn combined_tokens(&self) -> f64 {
        [
            self.tokens_in,
            self.tokens_out,
            self.cache_writes,
            self.cache_reads,
        ]
        .into_iter()
        .flatten()
        .fold(0.0, add_finite)
    }

    /// Explicit `duration` wins; otherwise `endTime - startTime`; otherwise 0.
    /// The result may be zero or negative, callers treat both as "no duration".
    pub fn request_duration(&self) -> f64 {
        if let Some(duration) = self.duration {
            return duration;
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => add_finite(end, -start),
            _ => 0.0,
        }
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}
