//! Dataset type definitions

use crate::attribution::DateRange;
use crate::types::ChannelName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column names tried, in order, when no target column is given
pub const TARGET_CANDIDATES: [&str; 5] = ["revenue", "sales", "conversions", "kpi", "target"];

/// Column selection for dataset preparation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    /// Date column, ISO `YYYY-MM-DD` (default: "date")
    pub date_column: String,

    /// Target KPI column; guessed from `target_candidates` when absent
    pub target_column: Option<String>,

    /// Candidate target names, in priority order
    pub target_candidates: Vec<String>,

    /// Channel spend columns; every other numeric column when empty
    pub channel_columns: Vec<String>,

    /// Control variables carried alongside the channels
    pub control_columns: Vec<String>,
}

fn default_target_candidates() -> Vec<String> {
    TARGET_CANDIDATES.iter().map(|s| s.to_string()).collect()
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            target_column: None,
            target_candidates: default_target_candidates(),
            channel_columns: Vec::new(),
            control_columns: Vec::new(),
        }
    }
}

/// Period-aligned marketing data, sorted by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingDataset {
    pub dates: Vec<NaiveDate>,
    pub target_column: String,
    pub target: Vec<f64>,

    /// Spend per channel, one value per date
    pub channels: BTreeMap<ChannelName, Vec<f64>>,

    #[serde(default)]
    pub controls: BTreeMap<String, Vec<f64>>,
}

/// Summary of a prepared dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub date_range: Option<DateRange>,
    pub target_column: String,
    pub channel_columns: Vec<ChannelName>,
    pub control_columns: Vec<String>,
    pub row_count: usize,
}

impl MarketingDataset {
    /// Number of reporting periods
    pub fn period_count(&self) -> usize {
        self.dates.len()
    }

    /// First and last date, if any rows exist
    pub fn date_range(&self) -> Option<DateRange> {
        match (self.dates.first(), self.dates.last()) {
            (Some(start), Some(end)) => Some(DateRange::new(*start, *end)),
            _ => None,
        }
    }

    pub fn channel_spend(&self, channel: &str) -> Option<&[f64]> {
        self.channels.get(channel).map(|v| v.as_slice())
    }

    /// Total spend per channel over the whole range
    pub fn total_spend(&self) -> BTreeMap<ChannelName, f64> {
        self.channels
            .iter()
            .map(|(name, spend)| (name.clone(), spend.iter().sum()))
            .collect()
    }

    pub fn metadata(&self) -> DatasetMetadata {
        DatasetMetadata {
            date_range: self.date_range(),
            target_column: self.target_column.clone(),
            channel_columns: self.channels.keys().cloned().collect(),
            control_columns: self.controls.keys().cloned().collect(),
            row_count: self.period_count(),
        }
    }
}
