//! Output Formatting and Display Management
//!
//! Renders the engine's derived values for the terminal: a colored
//! human-readable layout for interactive use, and structured JSON (behind
//! `--json`) for dashboard tooling. All rendering is read-only over the
//! engine's plain-data outputs; nothing here computes metrics.

use crate::activity::{self, ActivityReport, DAY_NAMES};
use crate::alerts::{classify, AlertCategory, TabCounts};
use crate::models::{ExternalRatingSummary, FeedbackSession, RatingSource, VenueMetrics};
use crate::response_time::ResponseTimeReport;
use crate::trend::{SnapshotTrends, TrendDirection, TrendResult};
use colored::Colorize;
use std::collections::BTreeMap;

pub struct DisplayManager;

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self
    }

    pub fn display_summary(
        &self,
        metrics: &VenueMetrics,
        trends: Option<&SnapshotTrends>,
        json_output: bool,
    ) {
        if json_output {
            let output = serde_json::json!({
                "snapshot": &metrics.snapshot,
                "breakdowns": &metrics.breakdowns,
                "trends": trends,
            });
            print_json(&output);
            return;
        }

        self.print_header("Venue Feedback Summary");

        let snapshot = &metrics.snapshot;
        println!(
            "\n{} {} sessions • {} active alerts • activity: {}\n",
            "📊".bright_yellow(),
            snapshot.session_count.to_string().bright_white().bold(),
            snapshot.active_alert_count.to_string().bright_red().bold(),
            snapshot.activity_level.label().bright_cyan()
        );

        println!(
            "   Satisfaction: {}{}",
            format_rating(snapshot.avg_satisfaction).bright_green().bold(),
            trend_suffix(trends.and_then(|t| t.satisfaction.as_ref()))
        );
        println!(
            "   Avg response: {}{}",
            format_duration_ms(snapshot.avg_response_time_ms)
                .bright_white()
                .bold(),
            trend_suffix(trends.and_then(|t| t.response_time.as_ref()))
        );
        println!(
            "   Completion:   {}{}",
            format_pct(snapshot.completion_rate_pct).bright_white().bold(),
            trend_suffix(trends.and_then(|t| t.completion.as_ref()))
        );
        if let Some(label) = &snapshot.peak_hour_label {
            println!("   Peak hour:    {}", label.bright_cyan());
        }

        if !metrics.breakdowns.is_empty() {
            println!(
                "\n{} Per-venue breakdown ({} venues):",
                "🏠".bright_blue(),
                metrics.breakdowns.len().to_string().bright_white().bold()
            );
            for (venue_id, slice) in &metrics.breakdowns {
                println!(
                    "   {}: {} sessions, {} satisfaction, {} alerts",
                    venue_id.bright_cyan(),
                    slice.session_count.to_string().bright_white(),
                    format_rating(slice.avg_satisfaction).bright_green(),
                    slice.active_alert_count.to_string().bright_red()
                );
            }
        }
    }

    pub fn display_alerts(
        &self,
        sessions: &[&FeedbackSession],
        counts: &TabCounts,
        json_output: bool,
    ) {
        if json_output {
            let output = serde_json::json!({
                "counts": counts,
                "sessions": sessions,
            });
            print_json(&output);
            return;
        }

        self.print_header("Feedback Triage");

        println!(
            "\n{} {} alerts • {} actioned • {} expired • {} total\n",
            "🔔".bright_yellow(),
            counts.alerts.to_string().bright_red().bold(),
            counts.actioned.to_string().bright_green().bold(),
            counts.expired.to_string().bright_yellow().bold(),
            counts.all.to_string().bright_white().bold()
        );

        for session in sessions {
            let category = match classify(session) {
                AlertCategory::Alerts => "ALERT".bright_red().bold(),
                AlertCategory::Actioned => "actioned".bright_green(),
                AlertCategory::Expired => "expired".bright_yellow(),
                AlertCategory::None => "ok".bright_white(),
            };
            println!(
                "   {} {} — {} ({} items, {})",
                "📋".bright_blue(),
                session.session_id.bright_white().bold(),
                format_rating(session.avg_rating).bright_green(),
                session.items.len().to_string().bright_white(),
                category
            );
        }
    }

    pub fn display_response_times(&self, report: &ResponseTimeReport, json_output: bool) {
        if json_output {
            print_json(&serde_json::json!({ "responseTimes": report }));
            return;
        }

        self.print_header("Assistance Response Times");

        println!(
            "\n{} avg {} • median {} • SLA {}\n",
            "⏱️".bright_yellow(),
            format_duration_ms(report.avg_ms).bright_white().bold(),
            format_duration_ms(report.median_ms).bright_white().bold(),
            format_pct(report.sla_compliance_pct).bright_green().bold()
        );

        for bucket in &report.buckets {
            println!(
                "   {:>9}: {} ({}%)",
                bucket.label.bright_cyan(),
                bucket.count.to_string().bright_white().bold(),
                format!("{:.0}", bucket.percentage).bright_yellow()
            );
        }

        if !report.per_table.is_empty() {
            println!("\n{} Fastest tables:", "🏆".bright_blue());
            for table in report.per_table.iter().take(5) {
                println!(
                    "   Table {}: {} avg ({} requests)",
                    table.table_number.bright_white().bold(),
                    format_duration_ms(Some(table.avg_ms)).bright_green(),
                    table.count.to_string().bright_white()
                );
            }
        }

        if !report.weekly_trend.is_empty() {
            println!("\n{} Recent weeks:", "📅".bright_blue());
            for week in &report.weekly_trend {
                println!(
                    "   week of {}: {} avg ({} requests)",
                    week.week_start.to_string().bright_white().bold(),
                    format_duration_ms(Some(week.avg_ms)).bright_green(),
                    week.count.to_string().bright_white()
                );
            }
        }
    }

    pub fn display_peaks(&self, report: &ActivityReport, json_output: bool) {
        if json_output {
            print_json(&serde_json::json!({ "activity": report }));
            return;
        }

        self.print_header("Peak Activity");

        match (report.peak_hour, report.peak_day) {
            (Some(hour), Some(day)) => println!(
                "\n{} Busiest: {} on {}\n",
                "🔥".bright_yellow(),
                activity::hour_label(hour).bright_white().bold(),
                DAY_NAMES[day].bright_white().bold()
            ),
            _ => println!("\n{} No activity in this window\n", "💤".bright_yellow()),
        }

        println!("{} By day of week:", "📅".bright_blue());
        for (idx, bucket) in report.weekly.iter().enumerate() {
            if bucket.count == 0 {
                continue;
            }
            println!(
                "   {:>9}: {} ({} avg rating)",
                DAY_NAMES[idx].bright_cyan(),
                bucket.count.to_string().bright_white().bold(),
                format_rating(bucket.avg_rating).bright_green()
            );
        }
    }

    pub fn display_fleet(
        &self,
        metrics: &VenueMetrics,
        external: &BTreeMap<RatingSource, ExternalRatingSummary>,
        json_output: bool,
    ) {
        if json_output {
            let output = serde_json::json!({
                "snapshot": &metrics.snapshot,
                "breakdowns": &metrics.breakdowns,
                "externalRatings": external,
            });
            print_json(&output);
            return;
        }

        self.display_summary(metrics, None, false);

        if !external.is_empty() {
            println!("\n{} External ratings:", "🌐".bright_blue());
            for (source, summary) in external {
                let name = match source {
                    RatingSource::Google => "Google",
                    RatingSource::Tripadvisor => "Tripadvisor",
                };
                println!(
                    "   {}: {} across {} reviews ({} venues)",
                    name.bright_cyan(),
                    format_rating(summary.rating).bright_green().bold(),
                    summary.ratings_count.to_string().bright_white(),
                    summary.venue_count.to_string().bright_white()
                );
            }
        }
    }

    fn print_header(&self, title: &str) {
        println!("\n{}", "=".repeat(80).bright_cyan());
        println!("{}", title.bright_white().bold());
        println!("{}", "=".repeat(80).bright_cyan());
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json_str) => println!("{}", json_str),
        Err(e) => eprintln!("Error serializing output to JSON: {}", e),
    }
}

/// "N/A" placeholders instead of blanks: sparse data must render, not crash.
fn format_rating(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "N/A".to_string(),
    }
}

fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}%", v),
        None => "--".to_string(),
    }
}

fn format_duration_ms(value: Option<f64>) -> String {
    match value {
        Some(ms) => {
            let minutes = ms / 60_000.0;
            if minutes >= 60.0 {
                format!("{:.1}h", minutes / 60.0)
            } else {
                format!("{:.0}m", minutes)
            }
        }
        None => "--".to_string(),
    }
}

fn trend_suffix(trend: Option<&TrendResult>) -> String {
    match trend {
        Some(t) => {
            let arrow = match t.direction {
                TrendDirection::Up => "▲",
                TrendDirection::Down => "▼",
                TrendDirection::Neutral => "▬",
            };
            let rendered = format!(" {} {}", arrow, t.display_value);
            if t.direction == TrendDirection::Neutral {
                rendered.bright_white().to_string()
            } else if t.positive {
                rendered.bright_green().to_string()
            } else {
                rendered.bright_red().to_string()
            }
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_for_missing_values() {
        assert_eq!(format_rating(None), "N/A");
        assert_eq!(format_pct(None), "--");
        assert_eq!(format_duration_ms(None), "--");
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration_ms(Some(90_000.0)), "2m");
        assert_eq!(format_duration_ms(Some(5_400_000.0)), "1.5h");
    }
}
