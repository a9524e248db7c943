use serde::{Deserialize, Serialize};

use crate::algorithm::utility::{robust_baseline_noise, smooth_vector_gaussian};
use crate::peak::Peak;

/// Stopping rule of the boundary expansion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Gaussian smoothing of the summed trace in samples, 0.0 disables smoothing (default: 1.0)
    pub smoothing_sigma: f64,
    /// Kernel cutoff in sigmas (default: 3.0)
    pub truncate: f64,
    /// Noise floor in units of the robust noise estimate (default: 3.0)
    pub noise_multiplier: f64,
    /// Minimum floor as a fraction of the apex height (default: 1e-3)
    pub relative_tolerance: f64,
    /// Smallest per-sample drop, as a fraction of the apex height, that still counts as descending (default: 1e-4)
    pub slope_tolerance: f64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        ExpansionConfig {
            smoothing_sigma: 1.0,
            truncate: 3.0,
            noise_multiplier: 3.0,
            relative_tolerance: 1e-3,
            slope_tolerance: 1e-4,
        }
    }
}

impl<'a> Peak<'a> {
    /// Widens the peak window to the start and end of elution with the default [`ExpansionConfig`].
    pub fn expand_peak(&mut self) -> (usize, usize) {
        self.expand_peak_with(&ExpansionConfig::default())
    }

    /// Widens the peak window to the start and end of elution.
    ///
    /// Works on the wavelength-summed trace of the whole recording. Each
    /// boundary walks outward while the signal at the boundary is above the
    /// noise floor and the next sample is still clearly lower. The window
    /// never shrinks and never leaves the time axis.
    ///
    /// Arguments:
    ///
    /// * `config` - smoothing and stopping thresholds
    ///
    /// Returns:
    ///
    /// * `(usize, usize)` - the new `(left, right)` bounds, also stored on the peak
    pub fn expand_peak_with(&mut self, config: &ExpansionConfig) -> (usize, usize) {
        let trace = smooth_vector_gaussian(
            &self.dataset.summed_trace(),
            config.smoothing_sigma,
            config.truncate,
        );
        let (baseline, noise) = robust_baseline_noise(&trace);
        let height = (trace[self.maximum] - baseline).max(0.0);
        let floor = baseline + (config.noise_multiplier * noise).max(config.relative_tolerance * height);
        let min_drop = config.slope_tolerance * height;

        // still descending away from the apex
        let descends = |current: usize, next: usize| {
            let (c, n) = (trace[current], trace[next]);
            c > floor && n < c && c - n >= min_drop
        };

        let (old_left, old_right) = (self.left, self.right);
        while self.left > 0 && descends(self.left, self.left - 1) {
            self.left -= 1;
        }
        while self.right + 1 < trace.len() && descends(self.right, self.right + 1) {
            self.right += 1;
        }

        log::debug!(
            "expanded peak [{}, {}] -> [{}, {}] (baseline {:.3e}, floor {:.3e})",
            old_left,
            old_right,
            self.left,
            self.right,
            baseline,
            floor
        );
        (self.left, self.right)
    }
}
