//! Channel attribution
//! Aggregates model-fit outputs into a performance summary, plus simple
//! positional attribution rules

pub mod aggregator;
pub mod rules;
pub mod types;

pub use aggregator::{aggregate, roi_means, summarize};
pub use rules::{AttributionRule, RuleAttribution};
pub use types::{
    ChannelInput, ChannelPerformance, DateRange, ModelFit, ModelFitSummary, PerformanceSummary,
};
