use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use table_pulse::alerts::{tab_counts, AlertTab};
use table_pulse::config::get_config;
use table_pulse::display::DisplayManager;
use table_pulse::logging::init_logging;
use table_pulse::models::TimeRange;
use table_pulse::sessions::group_sessions;
use table_pulse::snapshot::StorageSnapshot;
use table_pulse::time_range::{resolve, RangeQuery};
use table_pulse::timestamp::TimestampParser;
use table_pulse::trend::compare_snapshots;
use table_pulse::{activity, response_time, venue};

#[derive(Parser)]
#[command(name = "table-pulse")]
#[command(about = "Feedback session and metrics aggregation for per-table venue feedback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every report.
#[derive(Args)]
struct CommonArgs {
    /// Storage snapshot JSON file (feedback, assistance, externalRatings)
    #[arg(long)]
    input: PathBuf,
    /// Time range preset (today, yesterday, thisWeek, last7, last14, last30, ytd, all, custom)
    #[arg(long, default_value = "all")]
    range: String,
    /// Custom range start (YYYY-MM-DD), with --range custom
    #[arg(long)]
    from: Option<String>,
    /// Custom range end (YYYY-MM-DD), with --range custom
    #[arg(long)]
    to: Option<String>,
    /// Reference instant for expiry and ranges (RFC 3339); defaults to now
    #[arg(long)]
    now: Option<String>,
    /// Restrict to these venue ids (repeatable)
    #[arg(long = "venue")]
    venues: Vec<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the metrics snapshot with optional period-over-period trends
    Summary {
        #[command(flatten)]
        common: CommonArgs,
        /// Also compare against the preceding window of equal length
        #[arg(long)]
        compare: bool,
    },
    /// Show the triage view with per-tab badge counts
    Alerts {
        #[command(flatten)]
        common: CommonArgs,
        /// Tab to display (alerts, actioned, expired, all)
        #[arg(long, default_value = "alerts")]
        tab: String,
    },
    /// Show resolution-time analytics for assistance requests
    ResponseTimes {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Show hour-of-day and day-of-week activity heatmaps
    Peaks {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Show the multi-venue rollup with per-venue breakdowns
    Fleet {
        #[command(flatten)]
        common: CommonArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let json = match &cli.command {
        Commands::Summary { common, .. }
        | Commands::Alerts { common, .. }
        | Commands::ResponseTimes { common }
        | Commands::Peaks { common }
        | Commands::Fleet { common } => common.json,
    };

    match run(cli) {
        Ok(()) => Ok(()),
        Err(e) => handle_error(e, json),
    }
}

/// The loaded inputs every report starts from.
struct ReportContext {
    snapshot: StorageSnapshot,
    range: TimeRange,
    now: DateTime<Utc>,
    venues: Vec<String>,
    json: bool,
}

fn run(cli: Cli) -> Result<()> {
    let config = get_config();
    let engine = &config.engine;
    let display = DisplayManager::new();

    match cli.command {
        Commands::Summary { common, compare } => {
            let ctx = load_context(&common)?;
            let metrics = venue::aggregate(
                &ctx.snapshot.feedback,
                &ctx.snapshot.assistance,
                &ctx.venues,
                ctx.range,
                ctx.now,
                engine,
            );
            let trends = if compare {
                let previous = preceding_range(ctx.range);
                let baseline = venue::aggregate(
                    &ctx.snapshot.feedback,
                    &ctx.snapshot.assistance,
                    &ctx.venues,
                    previous,
                    ctx.now,
                    engine,
                );
                Some(compare_snapshots(&metrics.snapshot, &baseline.snapshot))
            } else {
                None
            };
            display.display_summary(&metrics, trends.as_ref(), ctx.json);
        }
        Commands::Alerts { common, tab } => {
            let ctx = load_context(&common)?;
            let rows: Vec<_> = ctx
                .snapshot
                .feedback
                .iter()
                .filter(|f| ctx.range.contains(f.created_at))
                .filter(|f| ctx.venues.is_empty() || ctx.venues.contains(&f.venue_id))
                .cloned()
                .collect();
            let sessions = group_sessions(&rows, ctx.now, engine);
            let counts = tab_counts(&sessions);
            let visible = AlertTab::parse(&tab).filter(&sessions);
            display.display_alerts(&visible, &counts, ctx.json);
        }
        Commands::ResponseTimes { common } => {
            let ctx = load_context(&common)?;
            let rows: Vec<_> = ctx
                .snapshot
                .assistance
                .iter()
                .filter(|a| ctx.range.contains(a.created_at))
                .filter(|a| ctx.venues.is_empty() || ctx.venues.contains(&a.venue_id))
                .cloned()
                .collect();
            let report = response_time::analyze(&rows, engine);
            display.display_response_times(&report, ctx.json);
        }
        Commands::Peaks { common } => {
            let ctx = load_context(&common)?;
            let rows: Vec<_> = ctx
                .snapshot
                .feedback
                .iter()
                .filter(|f| ctx.range.contains(f.created_at))
                .filter(|f| ctx.venues.is_empty() || ctx.venues.contains(&f.venue_id))
                .cloned()
                .collect();
            let report = activity::analyze(&rows);
            display.display_peaks(&report, ctx.json);
        }
        Commands::Fleet { common } => {
            let ctx = load_context(&common)?;
            // Fleet mode defaults to every venue in the snapshot so empty
            // venues still show up in the breakdown list.
            let venues = if ctx.venues.is_empty() {
                ctx.snapshot.venue_ids()
            } else {
                ctx.venues.clone()
            };
            let metrics = venue::aggregate(
                &ctx.snapshot.feedback,
                &ctx.snapshot.assistance,
                &venues,
                ctx.range,
                ctx.now,
                engine,
            );
            let external = venue::rollup_external(&ctx.snapshot.external_ratings);
            display.display_fleet(&metrics, &external, ctx.json);
        }
    }

    Ok(())
}

fn load_context(common: &CommonArgs) -> Result<ReportContext> {
    let snapshot = StorageSnapshot::load(&common.input)?;

    let now = match &common.now {
        Some(value) => TimestampParser::parse(value)?,
        None => Utc::now(),
    };

    let query = RangeQuery {
        preset: Some(common.range.clone()),
        from: common.from.clone(),
        to: common.to.clone(),
    };
    let range = resolve(&query, now, get_config().engine.all_lookback_months)?;

    Ok(ReportContext {
        snapshot,
        range,
        now,
        venues: common.venues.clone(),
        json: common.json,
    })
}

/// The window of equal length immediately before `range`, for
/// period-over-period trends.
fn preceding_range(range: TimeRange) -> TimeRange {
    let duration = range.end - range.start;
    TimeRange {
        start: range.start - duration - chrono::Duration::milliseconds(1),
        end: range.start - chrono::Duration::milliseconds(1),
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<(), anyhow::Error> {
    if json {
        println!("{{\"error\": \"{}\"}}", e);
    } else {
        eprintln!("Error: {}", e);
    }
    process::exit(1);
}
