//! Peak purity and detector saturation.
//!
//! A peak is pure when the shape of its wavelength profile stays the same
//! across the elution window. Profiles are sampled at fixed fractions of the
//! way from the apex to either boundary and compared with the apex profile.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::algorithm::similarity::spectral_similarity;
use crate::peak::Peak;

/// Thresholds of the purity check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurityConfig {
    /// Minimum similarity of every sampled profile to the apex profile (default: 0.99)
    pub purity_threshold: f64,
    /// Channels below this fraction of the apex maximum are ignored (default: 0.05)
    pub wavelength_filter_fraction: f64,
    /// Positions whose summed intensity is below this fraction of the apex are skipped (default: 0.1)
    pub data_filter_fraction: f64,
    /// Fractions of the apex-to-boundary distance at which profiles are sampled
    pub edge_fractions: Vec<f64>,
}

impl Default for PurityConfig {
    fn default() -> Self {
        PurityConfig {
            purity_threshold: 0.99,
            wavelength_filter_fraction: 0.05,
            data_filter_fraction: 0.1,
            edge_fractions: vec![0.25, 0.5, 0.75],
        }
    }
}

/// Per-call switches of [`Peak::check_peak`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurityOptions {
    /// Log the purity report at info level
    pub show_analytics: bool,
    pub wavelength_filter: bool,
    pub data_filter: bool,
}

impl Default for PurityOptions {
    fn default() -> Self {
        PurityOptions {
            show_analytics: false,
            wavelength_filter: true,
            data_filter: true,
        }
    }
}

/// Outcome of a purity check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurityReport {
    /// Time indices whose profiles were compared with the apex
    pub positions: Vec<usize>,
    /// Similarity to the apex profile, one per position
    pub similarities: Vec<f64>,
    /// Wavelength channels used in the comparison
    pub channels: usize,
    /// 1.0 when no position was compared
    pub min_similarity: f64,
    /// Highest sample inside the peak window
    pub max_intensity: f64,
    pub pure: bool,
    pub saturated: bool,
}

impl<'a> Peak<'a> {
    /// Checks purity and saturation with the default [`PurityConfig`].
    ///
    /// Arguments:
    ///
    /// * `detector_limit` - intensity at or above which the detector is saturated
    /// * `options` - analytics logging and filter switches
    ///
    /// Returns:
    ///
    /// * `PurityReport` - the sampled positions and similarities with both flags;
    ///   the flags are also stored on the peak
    pub fn check_peak(&mut self, detector_limit: f64, options: PurityOptions) -> PurityReport {
        self.check_peak_with(detector_limit, options, &PurityConfig::default())
    }

    pub fn check_peak_with(
        &mut self,
        detector_limit: f64,
        options: PurityOptions,
        config: &PurityConfig,
    ) -> PurityReport {
        let window = self.dataset.window(self.left, self.right);
        let max_intensity = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let saturated = max_intensity >= detector_limit;

        let apex = &self.spectra;
        let channels = if options.wavelength_filter {
            select_channels(apex, config.wavelength_filter_fraction)
        } else {
            (0..apex.len()).collect()
        };

        let mut positions = self.sample_positions(&config.edge_fractions);
        if options.data_filter {
            let apex_total: f64 = apex.iter().sum();
            let min_total = config.data_filter_fraction * apex_total;
            positions.retain(|&t| {
                window.column(t - self.left).sum() >= min_total
            });
        }

        let apex_profile: Vec<f64> = channels.iter().map(|&w| apex[w]).collect();
        let similarities: Vec<f64> = positions
            .iter()
            .map(|&t| {
                let profile: Vec<f64> = channels
                    .iter()
                    .map(|&w| window[(w, t - self.left)])
                    .collect();
                spectral_similarity(&apex_profile, &profile)
            })
            .collect();

        let min_similarity = similarities.iter().copied().fold(1.0, f64::min);
        let pure = min_similarity >= config.purity_threshold;

        self.pure = Some(pure);
        self.saturation = Some(saturated);

        let report = PurityReport {
            positions,
            similarities,
            channels: channels.len(),
            min_similarity,
            max_intensity,
            pure,
            saturated,
        };

        if saturated {
            log::warn!(
                "peak [{}, {}] is saturated (max {} >= limit {})",
                self.left,
                self.right,
                max_intensity,
                detector_limit
            );
        }
        if options.show_analytics {
            log::info!(
                "purity of peak [{}, {}]: positions {:?}, similarities {:?}, {} channels, min {:.6} -> pure: {}",
                self.left,
                self.right,
                report.positions,
                report.similarities,
                report.channels,
                report.min_similarity,
                report.pure
            );
        }
        report
    }

    /// Time indices between the apex and the boundaries at the given fractions, apex excluded.
    fn sample_positions(&self, fractions: &[f64]) -> Vec<usize> {
        let to_left = (self.maximum - self.left) as f64;
        let to_right = (self.right - self.maximum) as f64;

        let mut positions = BTreeSet::new();
        for &f in fractions.iter().filter(|f| (0.0..=1.0).contains(*f)) {
            positions.insert(self.maximum - (f * to_left).round() as usize);
            positions.insert(self.maximum + (f * to_right).round() as usize);
        }
        positions.remove(&self.maximum);
        positions.into_iter().collect()
    }
}

/// Channels reaching `fraction` of the profile maximum, or all channels if fewer than 3 do.
fn select_channels(profile: &[f64], fraction: f64) -> Vec<usize> {
    let max = profile.iter().copied().fold(0.0, f64::max);
    let selected: Vec<usize> = profile
        .iter()
        .enumerate()
        .filter(|(_, v)| **v >= fraction * max)
        .map(|(w, _)| w)
        .collect();
    if selected.len() < 3 {
        (0..profile.len()).collect()
    } else {
        selected
    }
}
