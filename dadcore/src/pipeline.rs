//! Staged analysis of candidate peaks.
//!
//! Each peak is expanded to its elution window, integrated, checked for
//! purity and saturation, identified against the reference spectra and,
//! when calibration data is available, quantified.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::algorithm::similarity::UNKNOWN_COMPOUND;
use crate::config::PeakAnalysisConfig;
use crate::database::component::ComponentDatabase;
use crate::database::quantification::QuantificationDatabase;
use crate::error::DadResult;
use crate::peak::{Peak, PurityOptions, PurityReport};

/// Snapshot of an analysed peak.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakReport {
    pub left: usize,
    pub right: usize,
    pub maximum: usize,
    pub integral: Option<f64>,
    pub pure: Option<bool>,
    pub saturation: Option<bool>,
    pub compound_id: Option<String>,
    pub concentration: Option<f64>,
    pub purity: Option<PurityReport>,
}

impl From<&Peak<'_>> for PeakReport {
    fn from(peak: &Peak<'_>) -> Self {
        PeakReport {
            left: peak.left(),
            right: peak.right(),
            maximum: peak.maximum(),
            integral: peak.integral(),
            pure: peak.pure(),
            saturation: peak.saturation(),
            compound_id: peak.compound_id().map(str::to_string),
            concentration: peak.concentration(),
            purity: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PeakPipeline {
    config: PeakAnalysisConfig,
}

impl PeakPipeline {
    pub fn new(config: PeakAnalysisConfig) -> Self {
        PeakPipeline { config }
    }

    pub fn config(&self) -> &PeakAnalysisConfig {
        &self.config
    }

    /// Runs all stages on a single peak.
    ///
    /// Arguments:
    ///
    /// * `peak` - candidate peak, updated in place
    /// * `components` - reference spectra for identification
    /// * `calibration` - calibration data, quantification is skipped when `None`
    ///
    /// Returns:
    ///
    /// * `PeakReport` - bounds and results after all stages
    pub fn process(
        &self,
        peak: &mut Peak<'_>,
        components: &ComponentDatabase<'_>,
        calibration: Option<&QuantificationDatabase>,
    ) -> DadResult<PeakReport> {
        peak.expand_peak_with(&self.config.expansion);
        peak.integrate_peak();
        let purity = peak.check_peak_with(
            self.config.detector_limit,
            PurityOptions::default(),
            &self.config.purity,
        );
        let compound = peak
            .set_compound_id(components, self.config.identification.similarity_threshold)
            .to_string();

        match calibration {
            Some(database) if compound != UNKNOWN_COMPOUND => {
                peak.quantify_peak(database)?;
            }
            _ => log::debug!("skipping quantification of peak at {} ({})", peak.maximum(), compound),
        }

        let mut report = PeakReport::from(&*peak);
        report.purity = Some(purity);
        Ok(report)
    }

    /// Runs all stages on every peak in parallel, using `num_threads` worker threads.
    ///
    /// Reports are returned in the order of `peaks`. The first failing peak aborts the batch.
    pub fn process_all(
        &self,
        peaks: &mut [Peak<'_>],
        components: &ComponentDatabase<'_>,
        calibration: Option<&QuantificationDatabase>,
    ) -> DadResult<Vec<PeakReport>> {
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()?;

        let reports: DadResult<Vec<PeakReport>> = thread_pool.install(|| {
            peaks
                .par_iter_mut()
                .map(|peak| self.process(peak, components, calibration))
                .collect()
        });

        if let Ok(reports) = &reports {
            let identified = reports
                .iter()
                .filter(|r| r.compound_id.as_deref().is_some_and(|c| c != UNKNOWN_COMPOUND))
                .count();
            log::info!("analysed {} peaks, {} identified", reports.len(), identified);
        }
        reports
    }
}
