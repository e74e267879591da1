//! api-metrics - LLM API request metrics over a session message log
//!
//! - `message` - the host's message log entries
//! - `payload` - tolerant decoding of `api_req_started` payloads
//! - `aggregator` - the single-pass fold into a `MetricsSummary`
//! - `breakdown` / `period` - views consumed by charts and tables

pub mod aggregator;
pub mod breakdown;
pub mod error;
pub mod loader;
pub mod message;
pub mod payload;
pub mod period;
pub mod types;

pub use aggregator::{aggregate, combined_tokens};
pub use breakdown::{history_by_timestamp, model_rows, provider_rows, slowest_request, BreakdownRow};
pub use error::{MetricsError, MetricsResult, PayloadError};
pub use loader::{load_messages, parse_messages};
pub use message::{MessageKind, SessionMessage, API_REQ_STARTED};
pub use payload::ApiRequestInfo;
pub use period::{aggregate_history, Period, PeriodMetrics};
pub use types::{MetricsSummary, PerformanceEntry};
