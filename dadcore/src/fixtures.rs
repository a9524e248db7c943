//! Simulated recordings shared by the unit tests.

use crate::data::dataset::DadDataset;
use crate::simulation::chromatogram::{reference_spectra, ChromatogramSimulator, SimulatedCompound};

pub const NUM_TIMES: usize = 1000;
pub const NUM_WAVELENGTHS: usize = 50;
pub const SEED: u64 = 7;

/// Elution apex and width of the ten compounds in [`ten_compound_dataset`].
pub const ELUTION: [(f64, f64); 10] = [
    (100.0, 5.0),
    (150.0, 10.0),
    (200.0, 5.0),
    (250.0, 5.0),
    (300.0, 3.0),
    (400.0, 10.0),
    (500.0, 3.0),
    (700.0, 6.0),
    (800.0, 15.0),
    (850.0, 15.0),
];

/// Ten well separated unit-area compounds, each with its own reference spectrum.
pub fn ten_compound_dataset(noise: f64) -> DadDataset {
    let spectra = reference_spectra(NUM_WAVELENGTHS, ELUTION.len());
    ELUTION
        .iter()
        .zip(spectra)
        .fold(
            ChromatogramSimulator::new(NUM_TIMES, NUM_WAVELENGTHS),
            |sim, (&(time, width), spectrum)| {
                sim.with_compound(SimulatedCompound::new(spectrum, 1.0, time, width))
            },
        )
        .with_noise(noise)
        .with_seed(SEED)
        .build()
        .unwrap()
}

pub fn single_compound_dataset(spectrum: Vec<f64>, concentration: f64, time: f64, width: f64) -> DadDataset {
    mixture_dataset(&[(spectrum, concentration, time, width)], 0.0)
}

/// Overlapping compounds given as `(spectrum, concentration, time, width)`.
pub fn mixture_dataset(compounds: &[(Vec<f64>, f64, f64, f64)], noise: f64) -> DadDataset {
    compounds
        .iter()
        .fold(
            ChromatogramSimulator::new(NUM_TIMES, NUM_WAVELENGTHS),
            |sim, (spectrum, concentration, time, width)| {
                sim.with_compound(SimulatedCompound::new(spectrum.clone(), *concentration, *time, *width))
            },
        )
        .with_noise(noise)
        .with_seed(SEED)
        .build()
        .unwrap()
}
