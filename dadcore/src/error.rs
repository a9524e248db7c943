/// Errors raised by peak analysis, the reference registries and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum DadError {
    /// Geometry operation between peaks that belong to different datasets
    #[error("peaks reference different datasets")]
    CrossDataset,

    /// Peak window violates `left < right`, `left <= maximum <= right` or the time axis length
    #[error("invalid peak bounds: left={left}, maximum={maximum}, right={right} (time axis has {num_times} samples)")]
    InvalidBounds {
        left: usize,
        maximum: usize,
        right: usize,
        num_times: usize,
    },

    /// Component name already registered
    #[error("component '{0}' is already present in the database")]
    DuplicateComponent(String),

    /// Component name not registered
    #[error("component '{0}' not found in the database")]
    MissingComponent(String),

    /// Compound has no calibration entry
    #[error("no calibration data for compound '{0}'")]
    MissingCalibration(String),

    /// A pipeline stage was run before the stage it depends on
    #[error("{0} must be computed before quantification")]
    Precondition(&'static str),

    /// Calibration curve cannot be inverted
    #[error("calibration curve for '{compound}' is degenerate (slope = {slope})")]
    DegenerateCalibration { compound: String, slope: f64 },

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("simulation error: {0}")]
    Simulation(String),

    /// I/O error reading a configuration file
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type DadResult<T> = Result<T, DadError>;
