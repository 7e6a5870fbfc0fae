//! Response Time Analytics
//!
//! Turns resolved assistance requests into the resolution-time report:
//! average and median duration, SLA compliance, a fixed duration histogram,
//! per-table rollups and a recent weekly trend.
//!
//! Unresolved requests and rows resolved before they were created (a storage
//! integrity issue) are excluded from every figure here - excluded, not
//! clamped to zero.

use crate::config::EngineConfig;
use crate::models::AssistanceRequest;
use crate::time_range::week_start;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

struct BucketSpec {
    min_minutes: i64,
    max_minutes: Option<i64>,
    label: &'static str,
}

/// Fixed, ordered, half-open duration ranges. Disjoint by construction.
const BUCKET_SPECS: [BucketSpec; 6] = [
    BucketSpec { min_minutes: 0, max_minutes: Some(15), label: "<15 min" },
    BucketSpec { min_minutes: 15, max_minutes: Some(30), label: "15-30 min" },
    BucketSpec { min_minutes: 30, max_minutes: Some(60), label: "30-60 min" },
    BucketSpec { min_minutes: 60, max_minutes: Some(120), label: "1-2 hours" },
    BucketSpec { min_minutes: 120, max_minutes: Some(240), label: "2-4 hours" },
    BucketSpec { min_minutes: 240, max_minutes: None, label: ">4 hours" },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBucket {
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResponseStats {
    #[serde(rename = "tableNumber")]
    pub table_number: String,
    #[serde(rename = "avgMs")]
    pub avg_ms: f64,
    #[serde(rename = "slaCompliancePct")]
    pub sla_compliance_pct: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyResponseStats {
    #[serde(rename = "weekStart")]
    pub week_start: NaiveDate,
    #[serde(rename = "avgMs")]
    pub avg_ms: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseTimeReport {
    #[serde(rename = "avgMs")]
    pub avg_ms: Option<f64>,
    #[serde(rename = "medianMs")]
    pub median_ms: Option<f64>,
    #[serde(rename = "slaCompliancePct")]
    pub sla_compliance_pct: Option<f64>,
    pub buckets: Vec<DurationBucket>,
    #[serde(rename = "perTable")]
    pub per_table: Vec<TableResponseStats>,
    #[serde(rename = "weeklyTrend")]
    pub weekly_trend: Vec<WeeklyResponseStats>,
}

/// Weeks of history kept in the weekly trend.
const WEEKLY_TREND_WEEKS: usize = 8;

pub fn analyze(requests: &[AssistanceRequest], config: &EngineConfig) -> ResponseTimeReport {
    // Only requests with a usable duration participate.
    let resolved: Vec<(&AssistanceRequest, f64)> = requests
        .iter()
        .filter_map(|r| {
            let ms = r.resolution_duration()?.num_milliseconds() as f64;
            Some((r, ms))
        })
        .collect();

    debug!(
        total = requests.len(),
        usable = resolved.len(),
        "Analyzing resolution times"
    );

    let durations: Vec<f64> = resolved.iter().map(|(_, ms)| *ms).collect();
    let sla_ms = (config.sla_target_minutes * 60 * 1000) as f64;

    ResponseTimeReport {
        avg_ms: mean(&durations),
        median_ms: median(&durations),
        sla_compliance_pct: sla_compliance(&durations, sla_ms),
        buckets: bucket_histogram(&durations),
        per_table: per_table(&resolved, sla_ms),
        weekly_trend: weekly_trend(&resolved),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard median: mean of the two middle values for even counts.
fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn sla_compliance(durations: &[f64], sla_ms: f64) -> Option<f64> {
    if durations.is_empty() {
        return None;
    }
    let within = durations.iter().filter(|&&ms| ms <= sla_ms).count();
    Some(within as f64 / durations.len() as f64 * 100.0)
}

fn bucket_histogram(durations: &[f64]) -> Vec<DurationBucket> {
    let total = durations.len();
    BUCKET_SPECS
        .iter()
        .map(|spec| {
            let min_ms = (spec.min_minutes * 60 * 1000) as f64;
            let max_ms = spec.max_minutes.map(|m| (m * 60 * 1000) as f64);
            let count = durations
                .iter()
                .filter(|&&ms| ms >= min_ms && max_ms.map_or(true, |max| ms < max))
                .count();
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            DurationBucket {
                label: spec.label,
                count,
                percentage,
            }
        })
        .collect()
}

/// Per-table averages and compliance, fastest tables first.
fn per_table(resolved: &[(&AssistanceRequest, f64)], sla_ms: f64) -> Vec<TableResponseStats> {
    let mut by_table: HashMap<&str, Vec<f64>> = HashMap::new();
    for (request, ms) in resolved {
        by_table
            .entry(request.table_number.as_str())
            .or_default()
            .push(*ms);
    }

    let mut stats: Vec<TableResponseStats> = by_table
        .into_iter()
        .map(|(table, durations)| {
            let avg = durations.iter().sum::<f64>() / durations.len() as f64;
            let within = durations.iter().filter(|&&ms| ms <= sla_ms).count();
            TableResponseStats {
                table_number: table.to_string(),
                avg_ms: avg,
                sla_compliance_pct: within as f64 / durations.len() as f64 * 100.0,
                count: durations.len(),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        a.avg_ms
            .partial_cmp(&b.avg_ms)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
}

/// Chronological per-week averages, grouped by Sunday week start and capped
/// to the most recent weeks.
fn weekly_trend(resolved: &[(&AssistanceRequest, f64)]) -> Vec<WeeklyResponseStats> {
    let mut by_week: HashMap<NaiveDate, Vec<f64>> = HashMap::new();
    for (request, ms) in resolved {
        let week = week_start(request.created_at).date_naive();
        by_week.entry(week).or_default().push(*ms);
    }

    let mut weeks: Vec<WeeklyResponseStats> = by_week
        .into_iter()
        .map(|(week_start, durations)| WeeklyResponseStats {
            week_start,
            avg_ms: durations.iter().sum::<f64>() / durations.len() as f64,
            count: durations.len(),
        })
        .collect();

    weeks.sort_by_key(|w| w.week_start);
    if weeks.len() > WEEKLY_TREND_WEEKS {
        weeks.drain(..weeks.len() - WEEKLY_TREND_WEEKS);
    }
    weeks
}
