use serde::{Deserialize, Serialize};

/// Slopes with a smaller magnitude are treated as a flat line.
const MIN_SLOPE: f64 = 1e-12;

/// Ordinary least squares line `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, 1.0 when all `y` are equal and the line passes through them
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    /// Fit a line through `(x, y)` pairs.
    ///
    /// Returns `None` for fewer than two pairs or when all `x` are equal,
    /// since the slope is undefined in both cases.
    pub fn fit(points: &[(f64, f64)]) -> Option<LinearFit> {
        if points.len() < 2 {
            return None;
        }

        // slope = Cov(x,y) / Var(x), intercept = mean_y - slope * mean_x
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let sxy: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
        let syy: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();

        if sxx <= f64::EPSILON * mean_x.abs().max(1.0) {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_res: f64 = points
            .iter()
            .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
            .sum();
        let r_squared = if syy > 0.0 { 1.0 - ss_res / syy } else { 1.0 };

        Some(LinearFit { slope, intercept, r_squared, n: points.len() })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Solve the line for `x` given `y`; `None` for a flat line.
    pub fn inverse_predict(&self, y: f64) -> Option<f64> {
        if !self.is_invertible() {
            return None;
        }
        Some((y - self.intercept) / self.slope)
    }

    pub fn is_invertible(&self) -> bool {
        self.slope.is_finite() && self.slope.abs() > MIN_SLOPE
    }
}
