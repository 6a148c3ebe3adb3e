//! Attribution type definitions

use crate::types::{ChannelName, ChannelSeries, RoiEstimate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upstream model output for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInput {
    /// Modeled contribution per reporting period
    pub contribution: ChannelSeries,

    /// ROI posterior summary
    pub roi: RoiEstimate,
}

impl ChannelInput {
    pub fn new(contribution: impl Into<ChannelSeries>, roi: RoiEstimate) -> Self {
        Self {
            contribution: contribution.into(),
            roi,
        }
    }
}

/// Derived reporting metrics for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPerformance {
    /// ROI mean
    pub roi: f64,
    pub roi_lower: f64,
    pub roi_upper: f64,

    /// Sum of the channel's contribution series
    pub total_contribution: f64,

    /// Share of the grand total (0.0 when the grand total is zero)
    pub contribution_percentage: f64,
}

/// Inclusive reporting period range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Calendar days covered, inclusive of both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Model-fit summary passed through from the upstream fit unchanged
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelFitSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    /// Accuracy metrics keyed by name (e.g. `r_squared`, `mape`)
    #[serde(default)]
    pub accuracy: BTreeMap<String, f64>,
}

/// Complete output of an upstream model fit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelFit {
    pub channels: BTreeMap<ChannelName, ChannelInput>,

    #[serde(default)]
    pub model_fit: ModelFitSummary,
}

/// Aggregated performance plus the pass-through fit summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub channels: BTreeMap<ChannelName, ChannelPerformance>,
    pub grand_total: f64,
    pub model_fit: ModelFitSummary,
}

impl PerformanceSummary {
    /// Channels ordered by total contribution, largest first
    pub fn ranked(&self) -> Vec<(&ChannelName, &ChannelPerformance)> {
        let mut ranked: Vec<_> = self.channels.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.total_contribution
                .total_cmp(&a.1.total_contribution)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_days() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert_eq!(range.days(), 31);
    }

    #[test]
    fn test_model_fit_json_shape() {
        let json = r#"{
            "channels": {
                "Search": {
                    "contribution": [1.0, 2.0],
                    "roi": {"mean": 2.0, "std": 0.2, "lower_bound": 1.6, "upper_bound": 2.4}
                }
            },
            "model_fit": {
                "date_range": {"start": "2024-01-01", "end": "2024-01-14"},
                "accuracy": {"r_squared": 0.91}
            }
        }"#;
        let fit: ModelFit = serde_json::from_str(json).unwrap();
        assert_eq!(fit.channels["Search"].contribution.len(), 2);
        assert_eq!(fit.model_fit.accuracy["r_squared"], 0.91);
        assert_eq!(fit.model_fit.date_range.unwrap().days(), 14);
    }

    #[test]
    fn test_model_fit_summary_optional() {
        let fit: ModelFit = serde_json::from_str(r#"{"channels": {}}"#).unwrap();
        assert!(fit.model_fit.date_range.is_none());
        assert!(fit.model_fit.accuracy.is_empty());
    }
}
