//! Seeded stand-in for an upstream model fit
//!
//! Produces plausible contribution series and ROI estimates from a
//! dataset so the reporting pipeline can be exercised without a real
//! Bayesian fit. Never used by `aggregate` or `allocate`.

use crate::attribution::{ChannelInput, ModelFit, ModelFitSummary};
use crate::dataset::MarketingDataset;
use crate::types::RoiEstimate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// z-score for a two-sided 95% interval
const Z_95: f64 = 1.96;

/// Seeded synthetic fit generator
#[derive(Debug, Clone)]
pub struct SyntheticFit {
    seed: u64,
}

impl SyntheticFit {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generate a fit for every channel of `dataset`
    ///
    /// The same seed and dataset always yield the same fit.
    pub fn fit(&self, dataset: &MarketingDataset) -> ModelFit {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let channels = dataset
            .channels
            .iter()
            .map(|(name, spend)| {
                let mean: f64 = rng.gen_range(0.5..5.0);
                let std = mean * rng.gen_range(0.1..0.3);
                let roi = RoiEstimate::new(mean, std, mean - Z_95 * std, mean + Z_95 * std);

                let contribution: Vec<f64> = spend
                    .iter()
                    .map(|s| s * mean * rng.gen_range(0.8..1.2))
                    .collect();

                (name.clone(), ChannelInput::new(contribution, roi))
            })
            .collect::<BTreeMap<_, _>>();

        let mut accuracy = BTreeMap::new();
        accuracy.insert("r_squared".to_string(), rng.gen_range(0.7..0.95));
        accuracy.insert("mape".to_string(), rng.gen_range(0.05..0.2));

        ModelFit {
            channels,
            model_fit: ModelFitSummary {
                date_range: dataset.date_range(),
                accuracy,
            },
        }
    }
}
