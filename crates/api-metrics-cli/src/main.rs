mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use api_metrics::{
    aggregate, aggregate_history, history_by_timestamp, load_messages, model_rows, provider_rows,
    slowest_request, BreakdownRow, MetricsSummary, Period,
};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::CliConfig;
use crate::logging::init_logging;

#[derive(Parser)]
#[command(name = "api-metrics")]
#[command(about = "Summarize LLM API request metrics from a session message log")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// Config file (TOML); defaults to ~/.api-metrics/config.json or ./config.toml
    #[arg(long, env = "API_METRICS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals, request count and timing
    Summary {
        /// Message log (JSON array)
        log: Option<PathBuf>,
        /// Print the full summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Requests and response time per provider
    Providers {
        /// Message log (JSON array)
        log: Option<PathBuf>,
    },
    /// Requests and response time per model
    Models {
        /// Message log (JSON array)
        log: Option<PathBuf>,
    },
    /// Response-time history, optionally bucketed by period
    History {
        /// Message log (JSON array)
        log: Option<PathBuf>,
        /// day, week or month
        #[arg(long, value_parser = parse_period)]
        period: Option<Period>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = CliConfig::load(cli.config.as_deref())?;
    log::debug!("config: {:?}", config);

    match cli.command {
        Commands::Summary { log, json } => {
            let summary = summarize(log, &config)?;
            if json || config.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        Commands::Providers { log } => {
            let summary = summarize(log, &config)?;
            print_rows("Provider", &provider_rows(&summary));
        }
        Commands::Models { log } => {
            let summary = summarize(log, &config)?;
            print_rows("Model", &model_rows(&summary));
        }
        Commands::History { log, period } => {
            let summary = summarize(log, &config)?;
            match period.or(config.period) {
                Some(period) => print_periods(&summary, period),
                None => print_history(&summary),
            }
        }
    }

    Ok(())
}

fn parse_period(value: &str) -> Result<Period, String> {
    Period::parse(value).ok_or_else(|| format!("unknown period {value:?}, expected day, week or month"))
}

fn summarize(log: Option<PathBuf>, config: &CliConfig) -> anyhow::Result<MetricsSummary> {
    let path = log
        .or_else(|| config.log_path.clone())
        .ok_or_else(|| anyhow!("no message log given and none configured (API_METRICS_LOG)"))?;

    let messages = load_messages(&path)
        .with_context(|| format!("failed to load message log {}", path.display()))?;
    Ok(aggregate(&messages))
}

fn print_summary(summary: &MetricsSummary) {
    println!("{}", "API request metrics".bold().cyan());
    println!("  Requests:          {}", summary.request_count);
    println!("  Tokens in / out:   {} / {}", summary.total_tokens_in, summary.total_tokens_out);
    println!(
        "  Cache writes/reads: {} / {}",
        format_optional(summary.total_cache_writes),
        format_optional(summary.total_cache_reads)
    );
    println!("  Context tokens:    {}", summary.context_tokens);
    println!("  Total cost:        ${:.4}", summary.total_cost);
    println!("  Total duration:    {}", format_duration(summary.total_duration));
    println!("  Average duration:  {}", format_duration(summary.average_duration));

    if let Some(slowest) = slowest_request(summary) {
        println!(
            "  Slowest request:   {} ({})",
            format_duration(slowest.duration),
            slowest.model_id.as_deref().unwrap_or("unknown model")
        );
    }
}

fn print_rows(label: &str, rows: &[BreakdownRow]) {
    if rows.is_empty() {
        println!("{}", "No timed requests".yellow());
        return;
    }

    println!(
        "{}",
        format!("{:<32} {:>8} {:>12} {:>12}", label, "Requests", "Total", "Average").bold()
    );
    for row in rows {
        println!(
            "{:<32} {:>8} {:>12} {:>12}",
            row.name,
            row.requests,
            format_duration(row.total_duration),
            format_duration(row.average_duration)
        );
    }
}

fn print_history(summary: &MetricsSummary) {
    let history = history_by_timestamp(summary);
    if history.is_empty() {
        println!("{}", "No timed requests".yellow());
        return;
    }

    for entry in history {
        println!(
            "{}  {:>10}  {:>7} in {:>7} out  {}",
            format_timestamp(entry.timestamp).dimmed(),
            format_duration(entry.duration),
            entry.tokens_in,
            entry.tokens_out,
            entry.model_id.as_deref().unwrap_or("-")
        );
    }
}

fn print_periods(summary: &MetricsSummary, period: Period) {
    let periods = aggregate_history(&summary.performance_history, period);
    if periods.is_empty() {
        println!("{}", "No timed requests".yellow());
        return;
    }

    println!(
        "{}",
        format!("{:<24} {:>8} {:>12} {:>12}", period.as_str(), "Requests", "Total", "Average").bold()
    );
    for bucket in periods {
        println!(
            "{:<24} {:>8} {:>12} {:>12}",
            bucket.label,
            bucket.request_count,
            format_duration(bucket.total_duration),
            format_duration(bucket.average_duration)
        );
    }
}

fn format_duration(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{:.0}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

fn format_timestamp(ts: i64) -> String {
    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|moment| moment.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}
