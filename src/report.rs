//! Report assembly
//!
//! Bundles a performance summary and an optional allocation plan into a
//! serializable document with a plain-text rendering.

use crate::attribution::PerformanceSummary;
use crate::budget::AllocationPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use uuid::Uuid;

/// Marketing-mix report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixReport {
    pub id: Uuid,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub summary: PerformanceSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<AllocationPlan>,
}

impl MixReport {
    pub fn new(title: impl Into<String>, summary: PerformanceSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            generated_at: Utc::now(),
            summary,
            allocation: None,
        }
    }

    /// Attach an allocation plan
    pub fn with_allocation(mut self, plan: AllocationPlan) -> Self {
        self.allocation = Some(plan);
        self
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering for terminals and logs
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{}", self.title)?;
        writeln!(out, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"))?;

        if let Some(range) = self.summary.model_fit.date_range {
            writeln!(out, "Period:    {} to {} ({} days)", range.start, range.end, range.days())?;
        }
        for (metric, value) in &self.summary.model_fit.accuracy {
            writeln!(out, "{:<10} {:.4}", format!("{}:", metric), value)?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "{:<20} {:>14} {:>8} {:>8} {:>18}",
            "Channel", "Contribution", "Share", "ROI", "ROI interval"
        )?;
        for (name, perf) in self.summary.ranked() {
            writeln!(
                out,
                "{:<20} {:>14.2} {:>7.1}% {:>8.2} {:>8.2} - {:<7.2}",
                name,
                perf.total_contribution,
                perf.contribution_percentage * 100.0,
                perf.roi,
                perf.roi_lower,
                perf.roi_upper
            )?;
        }
        writeln!(out, "{:<20} {:>14.2}", "Total", self.summary.grand_total)?;

        if let Some(plan) = &self.allocation {
            writeln!(out)?;
            writeln!(
                out,
                "Budget allocation ({:?}, {} round(s))",
                plan.policy, plan.allocation.iterations
            )?;
            for (name, spend) in plan.allocation.iter() {
                let share = plan.shares.get(name).copied().unwrap_or(0.0);
                writeln!(out, "{:<20} {:>14.2} {:>7.1}%", name, spend, share * 100.0)?;
            }
            writeln!(out, "{:<20} {:>14.2}", "Budget", plan.total_budget)?;
            writeln!(out, "{:<20} {:>14.2}", "Expected return", plan.expected_return)?;
            writeln!(out, "{:<20} {:>14.2}", "Blended ROI", plan.blended_roi())?;
        }

        Ok(())
    }
}
