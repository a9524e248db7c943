use itertools::Itertools;
use ordered_float::OrderedFloat;

/// Scale factor turning a median absolute deviation into a normal standard deviation.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Trapezoidal integral of a trace sampled at unit spacing.
///
/// Arguments:
///
/// * `y` - sampled values
///
/// Returns:
///
/// * `f64` - area under the piecewise-linear interpolation of `y`, 0.0 for fewer than 2 samples
///
/// # Examples
///
/// ```
/// use dadcore::algorithm::utility::trapezoid_area;
///
/// let area = trapezoid_area(&[0.0, 1.0, 1.0, 0.0]);
/// assert_eq!(area, 2.0);
/// ```
pub fn trapezoid_area(y: &[f64]) -> f64 {
    y.iter()
        .tuple_windows()
        .map(|(a, b)| 0.5 * (a + b))
        .sum()
}

/// Build a normalized 1D Gaussian kernel.
/// `sigma`: stddev in samples
/// `truncate`: cutoff in sigmas (e.g., 3.0 => radius = ceil(3*sigma))
pub fn gaussian_kernel_1d(sigma: f64, truncate: f64) -> Vec<f64> {
    if sigma <= 0.0 || truncate < 0.0 {
        return vec![1.0];
    }
    let radius = (truncate * sigma).ceil() as i64;
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut w: Vec<f64> = (-radius..=radius)
        .map(|dx| {
            let x = dx as f64;
            (-x * x / two_sigma2).exp()
        })
        .collect();
    let sum: f64 = w.iter().sum();
    for v in &mut w {
        *v /= sum;
    }
    w
}

/// Gaussian smoothing of a trace; the kernel is renormalized where it hangs over the edges.
pub fn smooth_vector_gaussian(v: &[f64], sigma: f64, truncate: f64) -> Vec<f64> {
    if v.is_empty() || sigma <= 0.0 {
        return v.to_vec();
    }
    let w = gaussian_kernel_1d(sigma, truncate);
    let radius = (w.len() as isize - 1) / 2;
    let n = v.len() as isize;

    (0..n)
        .map(|i| {
            let mut acc = 0.0;
            let mut norm = 0.0;
            for (k, &wk) in w.iter().enumerate() {
                let di = i + k as isize - radius;
                if di >= 0 && di < n {
                    acc += wk * v[di as usize];
                    norm += wk;
                }
            }
            if norm > 0.0 { acc / norm } else { 0.0 }
        })
        .collect()
}

/// Median of a slice, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<OrderedFloat<f64>> = values.iter().copied().map(OrderedFloat).collect();
    sorted.sort_unstable();
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid].0)
    } else {
        Some(0.5 * (sorted[mid - 1].0 + sorted[mid].0))
    }
}

/// Robust baseline and noise level of a trace.
///
/// The baseline is the median and the noise is the scaled median absolute
/// deviation around it, so isolated peaks covering less than half of the
/// trace do not bias either estimate.
///
/// Returns `(baseline, noise_sigma)`, `(0.0, 0.0)` for an empty trace.
pub fn robust_baseline_noise(y: &[f64]) -> (f64, f64) {
    let baseline = match median(y) {
        Some(m) => m,
        None => return (0.0, 0.0),
    };
    let deviations: Vec<f64> = y.iter().map(|v| (v - baseline).abs()).collect();
    let mad = median(&deviations).unwrap_or(0.0);
    (baseline, MAD_TO_SIGMA * mad)
}
