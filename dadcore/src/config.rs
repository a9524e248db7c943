//! Analysis configuration.
//!
//! Groups the thresholds of every pipeline stage into one serde-backed
//! structure that can be loaded from JSON. Missing fields fall back to
//! their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithm::similarity::DEFAULT_SIMILARITY_THRESHOLD;
use crate::error::DadResult;
use crate::peak::{ExpansionConfig, PurityConfig};

/// Identification settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationConfig {
    /// Minimum spectral similarity for a reference to be considered a match (default: 0.999)
    pub similarity_threshold: f64,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        IdentificationConfig {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Configuration of the full peak analysis pipeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakAnalysisConfig {
    /// Intensity at or above which the detector is considered saturated (default: 10.0)
    pub detector_limit: f64,
    pub purity: PurityConfig,
    pub expansion: ExpansionConfig,
    pub identification: IdentificationConfig,
    /// Threads used for batch analysis (default: 4)
    pub num_threads: usize,
}

impl Default for PeakAnalysisConfig {
    fn default() -> Self {
        PeakAnalysisConfig {
            detector_limit: 10.0,
            purity: PurityConfig::default(),
            expansion: ExpansionConfig::default(),
            identification: IdentificationConfig::default(),
            num_threads: 4,
        }
    }
}

impl PeakAnalysisConfig {
    /// Tighter purity and identification thresholds.
    pub fn strict() -> Self {
        Self {
            purity: PurityConfig {
                purity_threshold: 0.995,
                ..PurityConfig::default()
            },
            identification: IdentificationConfig {
                similarity_threshold: 0.9995,
            },
            ..Self::default()
        }
    }

    /// Looser thresholds for noisy recordings.
    pub fn permissive() -> Self {
        Self {
            purity: PurityConfig {
                purity_threshold: 0.95,
                ..PurityConfig::default()
            },
            expansion: ExpansionConfig {
                smoothing_sigma: 2.0,
                ..ExpansionConfig::default()
            },
            identification: IdentificationConfig {
                similarity_threshold: 0.99,
            },
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> DadResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> DadResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::debug!("loaded analysis configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> DadResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
