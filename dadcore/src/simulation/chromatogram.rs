use nalgebra::DMatrix;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

use crate::data::dataset::DadDataset;
use crate::error::{DadError, DadResult};

/// A compound injected into a simulated run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatedCompound {
    /// Absorption spectrum, normalized to unit area
    pub spectrum: Vec<f64>,
    pub concentration: f64,
    /// Apex of the elution profile (time index units)
    pub elution_time: f64,
    /// Standard deviation of the Gaussian elution profile (time index units)
    pub elution_width: f64,
}

impl SimulatedCompound {
    pub fn new(spectrum: Vec<f64>, concentration: f64, elution_time: f64, elution_width: f64) -> Self {
        SimulatedCompound { spectrum, concentration, elution_time, elution_width }
    }
}

/// Generates synthetic DAD chromatograms.
///
/// Every compound contributes `concentration * spectrum[w] * pdf(t)`, with
/// `pdf` the normal density of its elution profile. Spectra have unit area
/// and the profile integrates to one, so the total signal mass of a compound
/// equals its concentration. Gaussian noise is added per sample and the
/// result is clipped at zero.
#[derive(Clone, Debug)]
pub struct ChromatogramSimulator {
    num_times: usize,
    num_wavelengths: usize,
    compounds: Vec<SimulatedCompound>,
    noise_level: f64,
    seed: u64,
}

impl ChromatogramSimulator {
    pub fn new(num_times: usize, num_wavelengths: usize) -> Self {
        ChromatogramSimulator {
            num_times,
            num_wavelengths,
            compounds: Vec::new(),
            noise_level: 0.0,
            seed: 42,
        }
    }

    pub fn with_compound(mut self, compound: SimulatedCompound) -> Self {
        self.compounds.push(compound);
        self
    }

    /// Standard deviation of the additive noise per sample, 0.0 for a noise-free run.
    pub fn with_noise(mut self, noise_level: f64) -> Self {
        self.noise_level = noise_level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(&self) -> DadResult<DadDataset> {
        let mut data = DMatrix::<f64>::zeros(self.num_wavelengths, self.num_times);

        for (index, compound) in self.compounds.iter().enumerate() {
            if compound.spectrum.len() != self.num_wavelengths {
                return Err(DadError::Simulation(format!(
                    "compound {} has {} spectrum channels, expected {}",
                    index,
                    compound.spectrum.len(),
                    self.num_wavelengths
                )));
            }
            if compound.concentration == 0.0 {
                continue;
            }
            let profile = Normal::new(compound.elution_time, compound.elution_width)
                .map_err(|e| DadError::Simulation(format!("compound {}: {}", index, e)))?;

            for t in 0..self.num_times {
                let elution = compound.concentration * profile.pdf(t as f64);
                for (w, absorbance) in compound.spectrum.iter().enumerate() {
                    data[(w, t)] += absorbance * elution;
                }
            }
        }

        if self.noise_level > 0.0 {
            let mut rng = StdRng::seed_from_u64(self.seed);
            let noise = Normal::new(0.0, self.noise_level)
                .map_err(|e| DadError::Simulation(e.to_string()))?;
            for v in data.iter_mut() {
                *v += noise.sample(&mut rng);
            }
        }
        data.iter_mut().for_each(|v| *v = v.max(0.0));

        log::debug!(
            "simulated chromatogram: {} wavelengths x {} times, {} compounds, noise {}",
            self.num_wavelengths,
            self.num_times,
            self.compounds.len(),
            self.noise_level
        );

        DadDataset::new(data)
    }
}

/// Single Gaussian absorption band normalized to unit area.
pub fn gaussian_band(num_wavelengths: usize, center: f64, width: f64) -> Vec<f64> {
    let band: Vec<f64> = (0..num_wavelengths)
        .map(|w| (-(w as f64 - center).powi(2) / (2.0 * width * width)).exp())
        .collect();
    normalize_area(band)
}

/// Deterministic library of `count` distinct reference spectra.
///
/// Each spectrum has a main absorption band, spread evenly across the
/// wavelength axis, and a broader secondary band at 35% relative height.
pub fn reference_spectra(num_wavelengths: usize, count: usize) -> Vec<Vec<f64>> {
    let nw = num_wavelengths as f64;
    let width = nw / (2.5 * count as f64) + 1.0;

    (0..count)
        .map(|k| {
            let center = (k as f64 + 0.5) * nw / count as f64;
            let secondary = (center + 0.37 * nw) % nw;
            let spectrum: Vec<f64> = (0..num_wavelengths)
                .map(|w| {
                    let x = w as f64;
                    (-(x - center).powi(2) / (2.0 * width * width)).exp()
                        + 0.35 * (-(x - secondary).powi(2) / (8.0 * width * width)).exp()
                })
                .collect();
            normalize_area(spectrum)
        })
        .collect()
}

fn normalize_area(mut v: Vec<f64>) -> Vec<f64> {
    let sum: f64 = v.iter().sum();
    if sum > 0.0 {
        v.iter_mut().for_each(|x| *x /= sum);
    }
    v
}
