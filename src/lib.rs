//! Table Pulse
//!
//! A feedback session and metrics aggregation engine for hospitality venues.
//! Customers leave per-table ratings, staff triage and resolve them, and the
//! dashboard needs those raw timestamped rows turned into sessions, alert
//! tabs, trends and time-windowed analytics. This crate is that engine: pure,
//! synchronous functions over rows the surrounding application has already
//! fetched, plus a thin CLI that runs the reports over a storage snapshot
//! file.
//!
//! ## Pipeline
//!
//! 1. [`time_range`] resolves a dashboard range token to concrete bounds
//! 2. [`sessions`] groups feedback rows into [`models::FeedbackSession`]s
//!    with derived status flags
//! 3. [`alerts`], [`response_time`] and [`activity`] derive triage
//!    categories, resolution-time analytics and peak heatmaps
//! 4. [`venue`] assembles a [`models::MetricSnapshot`] per venue and a
//!    session-weighted fleet rollup
//! 5. [`trend`] compares two snapshots into the up/down/neutral indicators
//!    the dashboard tiles show
//!
//! ## Design constraints
//!
//! - Every function takes `now` explicitly; nothing reads the wall clock, so
//!   results are deterministic and testable.
//! - Engine computations are total: corrupt rows are filtered, empty inputs
//!   yield `None` metrics, and percentages are division-guarded. A sparse
//!   window renders as "no data", never as a crash or a `NaN`.
//! - Nothing is cached or mutated: derived flags like session expiry depend
//!   on `now` and are recomputed on every read.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use table_pulse::config::EngineConfig;
//! use table_pulse::sessions::group_sessions;
//! use table_pulse::alerts::tab_counts;
//!
//! let config = EngineConfig::default();
//! let now = Utc::now();
//! let sessions = group_sessions(&[], now, &config);
//! let counts = tab_counts(&sessions);
//! assert_eq!(counts.all, 0);
//! ```

pub mod activity;
pub mod alerts;
pub mod config;
pub mod display;
pub mod logging;
pub mod models;
pub mod response_time;
pub mod sessions;
pub mod snapshot;
pub mod time_range;
pub mod timestamp;
pub mod trend;
pub mod venue;

pub use models::*;
