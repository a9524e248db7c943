pub mod expansion;
pub mod purity;

pub use expansion::ExpansionConfig;
pub use purity::{PurityConfig, PurityOptions, PurityReport};

use std::fmt;
use std::fmt::Formatter;

use crate::algorithm::regression::LinearFit;
use crate::algorithm::similarity::{best_match, UNKNOWN_COMPOUND};
use crate::algorithm::utility::trapezoid_area;
use crate::data::dataset::DadData;
use crate::database::component::ComponentDatabase;
use crate::database::quantification::QuantificationDatabase;
use crate::error::{DadError, DadResult};

/// A bounded elution region of a DAD recording and the measurements derived from it.
///
/// The peak borrows its dataset, so any number of peaks can share one
/// recording. Derived values start out unset and are filled in by the
/// analysis stages in order: integration, purity check, identification,
/// quantification.
#[derive(Clone)]
pub struct Peak<'a> {
    left: usize,
    right: usize,
    maximum: usize,
    dataset: &'a dyn DadData,
    spectra: Vec<f64>,
    integral: Option<f64>,
    pure: Option<bool>,
    saturation: Option<bool>,
    compound_id: Option<String>,
    concentration: Option<f64>,
}

impl<'a> Peak<'a> {
    /// Creates a peak over the closed time window `[left, right]` with its apex at `maximum`.
    ///
    /// The wavelength profile at the apex is captured as the spectral fingerprint.
    ///
    /// # Errors
    ///
    /// `InvalidBounds` unless `left < right`, `left <= maximum <= right` and
    /// `right` lies on the dataset's time axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use dadcore::data::dataset::DadDataset;
    /// use dadcore::peak::Peak;
    ///
    /// let dataset = DadDataset::from_spectra(&[vec![0.0, 0.1], vec![1.0, 2.0], vec![0.0, 0.1]]).unwrap();
    /// let peak = Peak::new(0, 2, 1, &dataset).unwrap();
    /// assert_eq!(peak.spectra(), &[1.0, 2.0]);
    /// assert!(Peak::new(2, 0, 1, &dataset).is_err());
    /// ```
    pub fn new(left: usize, right: usize, maximum: usize, dataset: &'a dyn DadData) -> DadResult<Self> {
        let num_times = dataset.num_times();
        if left >= right || maximum < left || maximum > right || right >= num_times {
            return Err(DadError::InvalidBounds { left, maximum, right, num_times });
        }
        Ok(Peak {
            left,
            right,
            maximum,
            dataset,
            spectra: dataset.spectrum_at(maximum),
            integral: None,
            pure: None,
            saturation: None,
            compound_id: None,
            concentration: None,
        })
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn right(&self) -> usize {
        self.right
    }

    pub fn maximum(&self) -> usize {
        self.maximum
    }

    pub fn dataset(&self) -> &'a dyn DadData {
        self.dataset
    }

    /// Apex wavelength profile, the peak's spectral fingerprint.
    pub fn spectra(&self) -> &[f64] {
        &self.spectra
    }

    pub fn integral(&self) -> Option<f64> {
        self.integral
    }

    pub fn pure(&self) -> Option<bool> {
        self.pure
    }

    pub fn saturation(&self) -> Option<bool> {
        self.saturation
    }

    pub fn compound_id(&self) -> Option<&str> {
        self.compound_id.as_deref()
    }

    pub fn concentration(&self) -> Option<f64> {
        self.concentration
    }

    /// True if both peaks borrow the very same dataset instance.
    pub fn same_dataset(&self, other: &Peak<'_>) -> bool {
        std::ptr::addr_eq(
            self.dataset as *const dyn DadData,
            other.dataset as *const dyn DadData,
        )
    }

    fn ensure_same_dataset(&self, other: &Peak<'_>) -> DadResult<()> {
        if self.same_dataset(other) {
            Ok(())
        } else {
            Err(DadError::CrossDataset)
        }
    }

    /// Whether the closed windows of both peaks share at least one time index.
    pub fn peak_overlap(&self, other: &Peak<'_>) -> DadResult<bool> {
        self.ensure_same_dataset(other)?;
        Ok(self.left <= other.right && other.left <= self.right)
    }

    /// Number of time samples between the two apexes.
    pub fn distance_to(&self, other: &Peak<'_>) -> DadResult<usize> {
        self.ensure_same_dataset(other)?;
        Ok(self.maximum.abs_diff(other.maximum))
    }

    /// Integrated peak area.
    ///
    /// Intensities are summed over all wavelength channels for every time
    /// index of the window, and the summed trace is integrated with the
    /// trapezoidal rule at unit spacing.
    pub fn integrate_peak(&mut self) -> f64 {
        let window = self.dataset.window(self.left, self.right);
        let trace: Vec<f64> = window.column_iter().map(|column| column.sum()).collect();
        let integral = trapezoid_area(&trace);
        log::debug!("integrated peak [{}, {}]: {}", self.left, self.right, integral);
        self.integral = Some(integral);
        integral
    }

    /// Name of the reference whose fingerprint matches best at or above `threshold`,
    /// or `"Unknown"`. Does not modify the peak.
    pub fn check_database(&self, database: &ComponentDatabase<'_>, threshold: f64) -> String {
        let candidates = database.iter().map(|(name, reference)| (name, reference.spectra()));
        match best_match(&self.spectra, candidates, threshold) {
            Some(found) => {
                log::debug!(
                    "peak at {} matches '{}' (similarity {:.6})",
                    self.maximum,
                    found.name,
                    found.similarity
                );
                found.name
            }
            None => UNKNOWN_COMPOUND.to_string(),
        }
    }

    /// Runs [`Peak::check_database`] and stores the result as the compound id.
    pub fn set_compound_id(&mut self, database: &ComponentDatabase<'_>, threshold: f64) -> &str {
        let name = self.check_database(database, threshold);
        self.compound_id.insert(name).as_str()
    }

    /// Converts the integral into a concentration through the compound's calibration curve.
    ///
    /// The curve `response = slope * concentration + intercept` is fitted by
    /// ordinary least squares over the calibration pairs and solved for the
    /// peak's integral.
    ///
    /// # Errors
    ///
    /// * `Precondition` if the integral or the compound id has not been computed
    /// * `MissingCalibration` if the compound has no calibration entry
    /// * `DegenerateCalibration` if the curve is flat or its slope is undefined
    pub fn quantify_peak(&mut self, database: &QuantificationDatabase) -> DadResult<f64> {
        let integral = self.integral.ok_or(DadError::Precondition("integral"))?;
        let compound = self
            .compound_id
            .as_deref()
            .ok_or(DadError::Precondition("compound id"))?;

        let curve = database.calibration_curve(compound)?;
        let concentration = curve.inverse_predict(integral).ok_or_else(|| {
            log::warn!("flat calibration curve for '{}', cannot quantify", compound);
            DadError::DegenerateCalibration {
                compound: compound.to_string(),
                slope: curve.slope,
            }
        })?;

        log::debug!(
            "quantified '{}': integral {} -> concentration {}",
            compound,
            integral,
            concentration
        );
        self.concentration = Some(concentration);
        Ok(concentration)
    }

    /// Calibration curve that [`Peak::quantify_peak`] would use, if available.
    pub fn calibration(&self, database: &QuantificationDatabase) -> Option<LinearFit> {
        self.compound_id
            .as_deref()
            .and_then(|compound| database.calibration_curve(compound).ok())
    }
}

impl fmt::Debug for Peak<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peak")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("maximum", &self.maximum)
            .field("integral", &self.integral)
            .field("pure", &self.pure)
            .field("saturation", &self.saturation)
            .field("compound_id", &self.compound_id)
            .field("concentration", &self.concentration)
            .finish()
    }
}

impl fmt::Display for Peak<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Peak(left: {}, maximum: {}, right: {}, compound: {})",
            self.left,
            self.maximum,
            self.right,
            self.compound_id.as_deref().unwrap_or("-")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::DadDataset;
    use crate::fixtures::{single_compound_dataset, ten_compound_dataset, NUM_WAVELENGTHS};
    use crate::simulation::chromatogram::gaussian_band;

    #[test]
    fn test_rejects_invalid_bounds() {
        let ds = ten_compound_dataset(0.0);
        assert!(Peak::new(10, 10, 10, &ds).is_err());
        assert!(Peak::new(10, 20, 25, &ds).is_err());
        assert!(Peak::new(10, 20, 5, &ds).is_err());
        assert!(matches!(
            Peak::new(990, 1000, 995, &ds),
            Err(DadError::InvalidBounds { num_times: 1000, .. })
        ));
        assert!(Peak::new(990, 999, 999, &ds).is_ok());
    }

    #[test]
    fn test_new_peak_has_no_results() {
        let ds = ten_compound_dataset(0.0);
        let peak = Peak::new(90, 110, 100, &ds).unwrap();
        assert_eq!(peak.spectra().len(), NUM_WAVELENGTHS);
        assert!(peak.integral().is_none());
        assert!(peak.pure().is_none());
        assert!(peak.saturation().is_none());
        assert!(peak.compound_id().is_none());
        assert!(peak.concentration().is_none());
    }

    #[test]
    fn test_overlap_is_symmetric_on_closed_intervals() {
        let ds = ten_compound_dataset(0.0);
        let a = Peak::new(10, 20, 15, &ds).unwrap();
        let touching = Peak::new(20, 30, 25, &ds).unwrap();
        let inside = Peak::new(12, 14, 13, &ds).unwrap();
        let apart = Peak::new(21, 30, 25, &ds).unwrap();

        for other in [&touching, &inside, &apart] {
            assert_eq!(a.peak_overlap(other).unwrap(), other.peak_overlap(&a).unwrap());
        }
        assert!(a.peak_overlap(&touching).unwrap());
        assert!(a.peak_overlap(&inside).unwrap());
        assert!(!a.peak_overlap(&apart).unwrap());
        assert!(a.peak_overlap(&a).unwrap());
    }

    #[test]
    fn test_distance_is_symmetric() {
        let ds = ten_compound_dataset(0.0);
        let a = Peak::new(10, 20, 15, &ds).unwrap();
        let b = Peak::new(100, 200, 150, &ds).unwrap();
        assert_eq!(a.distance_to(&b).unwrap(), 135);
        assert_eq!(b.distance_to(&a).unwrap(), 135);
        assert_eq!(a.distance_to(&a).unwrap(), 0);
    }

    #[test]
    fn test_geometry_across_datasets_fails() {
        let ds1 = ten_compound_dataset(0.0);
        let ds2 = ds1.clone();
        let a = Peak::new(10, 20, 15, &ds1).unwrap();
        let b = Peak::new(10, 20, 15, &ds2).unwrap();
        assert!(!a.same_dataset(&b));
        assert!(matches!(a.peak_overlap(&b), Err(DadError::CrossDataset)));
        assert!(matches!(b.distance_to(&a), Err(DadError::CrossDataset)));

        // clones share the borrowed dataset
        let c = a.clone();
        assert!(a.same_dataset(&c));
    }

    #[test]
    fn test_integrate_noise_window_is_near_zero() {
        let ds = ten_compound_dataset(5e-7);
        let mut peak = Peak::new(550, 650, 600, &ds).unwrap();
        let integral = peak.integrate_peak();
        assert!(integral >= 0.0 && integral < 0.005);
        assert_eq!(peak.integral(), Some(integral));
    }

    #[test]
    fn test_integrate_isolated_peak_approaches_unit_area() {
        let ds = ten_compound_dataset(5e-7);
        let mut peak = Peak::new(90, 110, 100, &ds).unwrap();
        let integral = peak.integrate_peak();
        assert!(integral > 0.9 && integral < 1.0);

        let mut wide = Peak::new(75, 125, 100, &ds).unwrap();
        assert!((wide.integrate_peak() - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_integrate_small_grid() {
        let ds = DadDataset::from_spectra(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]]).unwrap();
        let mut peak = Peak::new(0, 2, 1, &ds).unwrap();
        assert_eq!(peak.integrate_peak(), 2.0);
    }

    fn reference_database<'a>(ds: &'a DadDataset) -> ComponentDatabase<'a> {
        let mut db = ComponentDatabase::new();
        db.add_peak(Peak::new(140, 160, 150, ds).unwrap(), "caffeine").unwrap();
        db.add_peak(Peak::new(190, 210, 200, ds).unwrap(), "theobromine").unwrap();
        db
    }

    #[test]
    fn test_identification_assigns_matching_reference() {
        let references = ten_compound_dataset(0.0);
        let db = reference_database(&references);

        let sample = ten_compound_dataset(5e-7);
        let mut peak = Peak::new(135, 165, 150, &sample).unwrap();
        assert_eq!(peak.check_database(&db, 0.999), "caffeine");
        assert!(peak.compound_id().is_none());

        assert_eq!(peak.set_compound_id(&db, 0.999), "caffeine");
        assert_eq!(peak.compound_id(), Some("caffeine"));

        let mut other = Peak::new(195, 205, 200, &sample).unwrap();
        other.set_compound_id(&db, 0.999);
        assert_eq!(other.compound_id(), Some("theobromine"));
    }

    #[test]
    fn test_identification_without_match_is_unknown() {
        let references = ten_compound_dataset(0.0);
        let db = reference_database(&references);

        let sample = ten_compound_dataset(5e-7);
        let mut peak = Peak::new(290, 310, 300, &sample).unwrap();
        assert_eq!(peak.set_compound_id(&db, 0.999), UNKNOWN_COMPOUND);

        let empty = ComponentDatabase::new();
        assert_eq!(peak.check_database(&empty, 0.0), UNKNOWN_COMPOUND);
    }

    #[test]
    fn test_lower_threshold_admits_match() {
        let reference = single_compound_dataset(gaussian_band(NUM_WAVELENGTHS, 26.0, 4.0), 1.0, 100.0, 5.0);
        let sample = single_compound_dataset(gaussian_band(NUM_WAVELENGTHS, 25.0, 4.0), 1.0, 100.0, 5.0);
        let mut db = ComponentDatabase::new();
        db.add_peak(Peak::new(90, 110, 100, &reference).unwrap(), "shifted").unwrap();

        let mut peak = Peak::new(90, 110, 100, &sample).unwrap();
        assert_eq!(peak.set_compound_id(&db, 0.999), UNKNOWN_COMPOUND);
        assert_eq!(peak.set_compound_id(&db, 0.8), "shifted");
    }

    fn identified_peak<'a>(sample: &'a DadDataset, db: &ComponentDatabase<'_>) -> Peak<'a> {
        let mut peak = Peak::new(90, 110, 100, sample).unwrap();
        peak.integrate_peak();
        peak.set_compound_id(db, 0.999);
        peak
    }

    #[test]
    fn test_quantify_with_unit_calibration() {
        let references = ten_compound_dataset(0.0);
        let mut db = ComponentDatabase::new();
        db.add_peak(Peak::new(90, 110, 100, &references).unwrap(), "caffeine").unwrap();
        let sample = ten_compound_dataset(5e-7);
        let mut peak = identified_peak(&sample, &db);
        assert_eq!(peak.compound_id(), Some("caffeine"));

        let mut quant = QuantificationDatabase::new();
        for pair in [(1.0, 0.9), (2.0, 2.1), (3.0, 3.0), (4.0, 4.0)] {
            quant.add_compound_concentration("caffeine", pair);
        }
        let concentration = peak.quantify_peak(&quant).unwrap();
        let integral = peak.integral().unwrap();
        assert!((concentration - integral).abs() < 0.1);
        assert_eq!(peak.concentration(), Some(concentration));
        assert!(peak.calibration(&quant).is_some());
    }

    #[test]
    fn test_quantify_with_scaled_calibration() {
        let references = ten_compound_dataset(0.0);
        let mut db = ComponentDatabase::new();
        db.add_peak(Peak::new(90, 110, 100, &references).unwrap(), "caffeine").unwrap();
        let sample = ten_compound_dataset(5e-7);
        let mut peak = identified_peak(&sample, &db);

        let mut quant = QuantificationDatabase::new();
        for pair in [(1.0, 2.5), (2.0, 5.1), (3.0, 7.4), (4.0, 10.0)] {
            quant.add_compound_concentration("caffeine", pair);
        }
        let concentration = peak.quantify_peak(&quant).unwrap();
        let integral = peak.integral().unwrap();
        assert!((concentration - integral / 2.5).abs() < 0.05);
    }

    #[test]
    fn test_quantify_requires_previous_stages() {
        let ds = ten_compound_dataset(0.0);
        let mut quant = QuantificationDatabase::new();
        quant.add_compound_concentration("caffeine", (1.0, 1.0));
        quant.add_compound_concentration("caffeine", (2.0, 2.0));

        let mut peak = Peak::new(90, 110, 100, &ds).unwrap();
        assert!(matches!(peak.quantify_peak(&quant), Err(DadError::Precondition("integral"))));

        peak.integrate_peak();
        assert!(matches!(peak.quantify_peak(&quant), Err(DadError::Precondition("compound id"))));

        peak.set_compound_id(&ComponentDatabase::new(), 0.999);
        assert!(matches!(peak.quantify_peak(&quant), Err(DadError::MissingCalibration(_))));
        assert!(peak.concentration().is_none());
    }

    #[test]
    fn test_quantify_flat_calibration_is_an_error() {
        let references = ten_compound_dataset(0.0);
        let mut db = ComponentDatabase::new();
        db.add_peak(Peak::new(90, 110, 100, &references).unwrap(), "caffeine").unwrap();
        let sample = ten_compound_dataset(0.0);
        let mut peak = identified_peak(&sample, &db);

        let mut quant = QuantificationDatabase::new();
        for concentration in [1.0, 2.0, 3.0, 4.0] {
            quant.add_compound_concentration("caffeine", (concentration, 5.0));
        }
        assert!(matches!(
            peak.quantify_peak(&quant),
            Err(DadError::DegenerateCalibration { slope, .. }) if slope == 0.0
        ));

        let mut single = QuantificationDatabase::new();
        single.add_compound_concentration("caffeine", (1.0, 1.0));
        single.add_compound_concentration("caffeine", (1.0, 1.2));
        assert!(matches!(
            peak.quantify_peak(&single),
            Err(DadError::DegenerateCalibration { .. })
        ));
        assert!(peak.concentration().is_none());
    }

    #[test]
    fn test_display() {
        let ds = ten_compound_dataset(0.0);
        let peak = Peak::new(90, 110, 100, &ds).unwrap();
        assert_eq!(peak.to_string(), "Peak(left: 90, maximum: 100, right: 110, compound: -)");
    }
}
