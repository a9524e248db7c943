use nalgebra::DMatrix;

use crate::error::{DadError, DadResult};

/// Read access to a diode-array detector recording.
///
/// The grid is indexed by (wavelength channel, time index); time indices are
/// zero based and sampled at a regular, implicit rate. Only `num_wavelengths`,
/// `num_times` and `intensity` are required, the remaining methods have
/// default implementations built on top of them.
pub trait DadData: Send + Sync {
    /// Number of wavelength channels.
    fn num_wavelengths(&self) -> usize;
    /// Number of time samples.
    fn num_times(&self) -> usize;
    /// Intensity of a single sample.
    fn intensity(&self, wavelength: usize, time: usize) -> f64;

    /// Wavelength profile recorded at `time`.
    fn spectrum_at(&self, time: usize) -> Vec<f64> {
        (0..self.num_wavelengths())
            .map(|wavelength| self.intensity(wavelength, time))
            .collect()
    }

    /// Grid slice for the closed time interval `[left, right]`.
    ///
    /// Rows are wavelength channels, columns are time samples starting at `left`.
    fn window(&self, left: usize, right: usize) -> DMatrix<f64> {
        let cols = right.saturating_sub(left) + 1;
        DMatrix::from_fn(self.num_wavelengths(), cols, |wavelength, offset| {
            self.intensity(wavelength, left + offset)
        })
    }

    /// Intensity summed over all wavelength channels, for every time sample.
    fn summed_trace(&self) -> Vec<f64> {
        (0..self.num_times())
            .map(|time| {
                (0..self.num_wavelengths())
                    .map(|wavelength| self.intensity(wavelength, time))
                    .sum()
            })
            .collect()
    }
}

/// In-memory DAD recording, rows are wavelength channels and columns are time samples.
#[derive(Clone, Debug)]
pub struct DadDataset {
    data: DMatrix<f64>,
}

impl DadDataset {
    /// Wraps an intensity matrix.
    ///
    /// # Arguments
    ///
    /// * `data` - matrix of shape (wavelength channels, time samples)
    ///
    /// # Errors
    ///
    /// Fails with `InvalidDataset` for an empty matrix or for negative / non-finite samples.
    pub fn new(data: DMatrix<f64>) -> DadResult<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(DadError::InvalidDataset(format!(
                "empty grid ({} wavelengths x {} times)",
                data.nrows(),
                data.ncols()
            )));
        }
        if let Some(bad) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(DadError::InvalidDataset(format!(
                "samples must be finite and non-negative, found {}",
                bad
            )));
        }
        Ok(DadDataset { data })
    }

    /// Builds a dataset from one wavelength profile per time sample.
    pub fn from_spectra(spectra: &[Vec<f64>]) -> DadResult<Self> {
        let num_wavelengths = spectra.first().map(|s| s.len()).unwrap_or(0);
        if spectra.iter().any(|s| s.len() != num_wavelengths) {
            return Err(DadError::InvalidDataset(
                "all spectra must have the same number of wavelength channels".to_string(),
            ));
        }
        let data = DMatrix::from_fn(num_wavelengths, spectra.len(), |wavelength, time| {
            spectra[time][wavelength]
        });
        DadDataset::new(data)
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

impl DadData for DadDataset {
    fn num_wavelengths(&self) -> usize {
        self.data.nrows()
    }

    fn num_times(&self) -> usize {
        self.data.ncols()
    }

    fn intensity(&self, wavelength: usize, time: usize) -> f64 {
        self.data[(wavelength, time)]
    }

    fn spectrum_at(&self, time: usize) -> Vec<f64> {
        self.data.column(time).iter().copied().collect()
    }

    fn window(&self, left: usize, right: usize) -> DMatrix<f64> {
        self.data.columns(left, right - left + 1).into_owned()
    }

    fn summed_trace(&self) -> Vec<f64> {
        self.data.row_sum().iter().copied().collect()
    }
}
