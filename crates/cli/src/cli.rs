// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clap::{Parser, Subcommand};
use metricache_api::SeriesOrder;
use metricache_domain::{MetricKind, PeriodKey};
use metricache_persistence::CacheSettings;
use std::path::PathBuf;

/// metricache - periodic metric cache for ERP dashboards
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// JSON file holding the source records. If not provided, the source is empty.
    #[arg(short, long, global = true)]
    pub fixtures: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read one metric
    Get {
        /// Metric kind (invoiced_totals, external_hours, sales_order_totals, utilization)
        kind: MetricKind,
        /// Month as YYYY-MM
        period: PeriodKey,
        /// Employee id, for utilization
        #[arg(long)]
        entity: Option<i64>,
        /// Recompute even if the month is closed and cached
        #[arg(long)]
        force: bool,
    },
    /// Read a time series
    Series {
        kind: MetricKind,
        /// First month as YYYY-MM
        start: PeriodKey,
        /// Last month as YYYY-MM
        end: PeriodKey,
        #[arg(long)]
        entity: Option<i64>,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: SeriesOrder,
    },
    /// Recompute every month of a range
    Refresh {
        start: PeriodKey,
        end: PeriodKey,
        /// Only this kind; every kind when omitted
        #[arg(long)]
        kind: Option<MetricKind>,
        /// Employee ids for utilization; defaults to every employee in the fixtures
        #[arg(long = "entity")]
        entities: Vec<i64>,
        /// Keep cached closed months instead of recomputing them
        #[arg(long)]
        no_force: bool,
    },
    /// Delete the cached snapshots of one month
    Purge { kind: MetricKind, period: PeriodKey },
    /// Show or change engine settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

impl Command {
    /// Name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Get { .. } => "get",
            Self::Series { .. } => "series",
            Self::Refresh { .. } => "refresh",
            Self::Purge { .. } => "purge",
            Self::Settings { .. } => "settings",
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// Print the stored settings
    Show,
    /// Change individual settings
    Set(SettingsChanges),
}

/// Settings to change; anything not given keeps its stored value.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsChanges {
    #[arg(long)]
    pub invoiced_chunk_size: Option<u32>,
    #[arg(long)]
    pub external_hours_chunk_size: Option<u32>,
    #[arg(long)]
    pub sales_order_chunk_size: Option<u32>,
    #[arg(long)]
    pub utilization_chunk_size: Option<u32>,
    /// Longest series a request may span
    #[arg(long)]
    pub max_series_periods: Option<u32>,
    /// Remove the series cap
    #[arg(long, conflicts_with = "max_series_periods")]
    pub no_series_cap: bool,
    #[arg(long)]
    pub refresh_concurrency: Option<u32>,
    /// Serve the last snapshot, flagged stale, when the source fails
    #[arg(long)]
    pub serve_stale: Option<bool>,
    /// Partner id excluded from invoiced and sales totals
    #[arg(long)]
    pub internal_partner: Option<i64>,
    #[arg(long, conflicts_with = "internal_partner")]
    pub no_internal_partner: bool,
    /// Hours east of UTC used to decide the current month
    #[arg(long, allow_negative_numbers = true)]
    pub utc_offset: Option<i8>,
}

impl SettingsChanges {
    /// Applies the changes to `settings`.
    pub fn apply(&self, settings: &mut CacheSettings) {
        if let Some(value) = self.invoiced_chunk_size {
            settings.invoiced_chunk_size = value;
        }
        if let Some(value) = self.external_hours_chunk_size {
            settings.external_hours_chunk_size = value;
        }
        if let Some(value) = self.sales_order_chunk_size {
            settings.sales_order_chunk_size = value;
        }
        if let Some(value) = self.utilization_chunk_size {
            settings.utilization_chunk_size = value;
        }
        if self.no_series_cap {
            settings.max_series_periods = None;
        } else if let Some(value) = self.max_series_periods {
            settings.max_series_periods = Some(value);
        }
        if let Some(value) = self.refresh_concurrency {
            settings.refresh_concurrency = value;
        }
        if let Some(value) = self.serve_stale {
            settings.serve_stale_on_failure = value;
        }
        if self.no_internal_partner {
            settings.internal_partner_id = None;
        } else if let Some(value) = self.internal_partner {
            settings.internal_partner_id = Some(value);
        }
        if let Some(value) = self.utc_offset {
            settings.utc_offset_hours = value;
        }
    }
}
