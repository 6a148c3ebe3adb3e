//! Attribution aggregation
//!
//! Turns per-channel contribution series and ROI estimates into a
//! performance summary. Pure: no randomness, no I/O, no retained state.

use crate::attribution::types::{
    ChannelInput, ChannelPerformance, ModelFit, PerformanceSummary,
};
use crate::errors::{MixError, Result};
use crate::types::ChannelName;
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregate channel outputs into per-channel performance
///
/// Every series must have the length of the first channel (in name order);
/// otherwise all mismatched channels are reported and nothing is returned.
///
/// `contribution_percentage = total_contribution / grand_total`, or exactly
/// `0.0` for every channel when the grand total is zero.
pub fn aggregate(
    channels: &BTreeMap<ChannelName, ChannelInput>,
) -> Result<BTreeMap<ChannelName, ChannelPerformance>> {
    check_alignment(channels)?;

    for (name, input) in channels {
        input.roi.validate(name)?;
        if !input.contribution.is_finite() {
            return Err(MixError::InvalidInput(format!(
                "contribution series for {} has non-finite values",
                name
            )));
        }
    }

    let totals: BTreeMap<&ChannelName, f64> = channels
        .iter()
        .map(|(name, input)| (name, input.contribution.total()))
        .collect();
    let grand_total: f64 = totals.values().sum();

    debug!(
        channels = channels.len(),
        grand_total, "aggregating channel contributions"
    );

    let performance = channels
        .iter()
        .map(|(name, input)| {
            let total_contribution = totals[name];
            let contribution_percentage = if grand_total != 0.0 {
                total_contribution / grand_total
            } else {
                0.0
            };

            (
                name.clone(),
                ChannelPerformance {
                    roi: input.roi.mean,
                    roi_lower: input.roi.lower_bound,
                    roi_upper: input.roi.upper_bound,
                    total_contribution,
                    contribution_percentage,
                },
            )
        })
        .collect();

    Ok(performance)
}

/// Aggregate a full fit and attach its pass-through summary
pub fn summarize(fit: &ModelFit) -> Result<PerformanceSummary> {
    let channels = aggregate(&fit.channels)?;
    let grand_total = channels.values().map(|p| p.total_contribution).sum();

    Ok(PerformanceSummary {
        channels,
        grand_total,
        model_fit: fit.model_fit.clone(),
    })
}

/// ROI means keyed by channel, the allocator's weight input
pub fn roi_means(
    performance: &BTreeMap<ChannelName, ChannelPerformance>,
) -> BTreeMap<ChannelName, f64> {
    performance
        .iter()
        .map(|(name, p)| (name.clone(), p.roi))
        .collect()
}

fn check_alignment(channels: &BTreeMap<ChannelName, ChannelInput>) -> Result<()> {
    let mut iter = channels.iter();
    let (reference, first) = match iter.next() {
        Some(entry) => entry,
        None => return Ok(()),
    };
    let expected = first.contribution.len();

    let mismatched: Vec<String> = iter
        .filter(|(_, input)| input.contribution.len() != expected)
        .map(|(name, _)| name.clone())
        .collect();

    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(MixError::MisalignedSeries {
            reference: reference.clone(),
            expected,
            channels: mismatched,
        })
    }
}
