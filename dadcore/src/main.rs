//! Demo run of the DAD peak analysis on a simulated chromatogram.
//!
//! A standards series calibrates six compounds, a sample run containing those
//! compounds plus one unregistered impurity is analysed, and the peak
//! reports are printed as JSON.
//!
//! ```bash
//! dadcore --noise 5e-7 --seed 7 -v
//! dadcore --config analysis.json --threads 8
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::info;

use dadcore::config::PeakAnalysisConfig;
use dadcore::data::dataset::{DadData, DadDataset};
use dadcore::database::component::ComponentDatabase;
use dadcore::database::quantification::QuantificationDatabase;
use dadcore::error::DadResult;
use dadcore::peak::Peak;
use dadcore::pipeline::PeakPipeline;
use dadcore::simulation::chromatogram::{reference_spectra, ChromatogramSimulator, SimulatedCompound};

const NUM_WAVELENGTHS: usize = 50;
const NUM_COMPOUNDS: usize = 6;
const ELUTION: [(f64, f64); NUM_COMPOUNDS + 1] = [
    (120.0, 5.0),
    (220.0, 8.0),
    (330.0, 4.0),
    (450.0, 10.0),
    (600.0, 6.0),
    (760.0, 12.0),
    (880.0, 5.0),
];
const STANDARDS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];
const SAMPLE: [f64; NUM_COMPOUNDS + 1] = [0.8, 1.5, 2.2, 0.6, 3.0, 1.1, 0.9];

/// DAD chromatogram peak analysis demo
#[derive(Parser)]
#[command(name = "dadcore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON analysis configuration, defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of worker threads, overrides the configuration
    #[arg(short, long)]
    threads: Option<usize>,

    /// Standard deviation of the simulated detector noise
    #[arg(long, default_value_t = 5e-7)]
    noise: f64,

    /// Seed of the noise generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of time samples per run
    #[arg(long, default_value_t = 1000)]
    num_times: usize,
}

fn main() -> DadResult<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &cli.config {
        Some(path) => PeakAnalysisConfig::from_path(path)?,
        None => PeakAnalysisConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config.num_threads = threads;
    }

    let spectra = reference_spectra(NUM_WAVELENGTHS, NUM_COMPOUNDS + 1);
    let names: Vec<String> = (0..NUM_COMPOUNDS).map(|i| format!("compound_{}", i + 1)).collect();

    // reference spectra from a clean standard of every registered compound
    let reference_run = simulate(&cli, &spectra[..NUM_COMPOUNDS], &[1.0; NUM_COMPOUNDS], 0.0, cli.seed)?;
    let mut components = ComponentDatabase::new();
    for (name, &(time, _)) in names.iter().zip(ELUTION.iter()) {
        let apex = time as usize;
        components.add_peak(Peak::new(apex - 1, apex + 1, apex, &reference_run)?, name)?;
    }

    let mut calibration = QuantificationDatabase::new();
    for (i, &concentration) in STANDARDS.iter().enumerate() {
        let run = simulate(
            &cli,
            &spectra[..NUM_COMPOUNDS],
            &[concentration; NUM_COMPOUNDS],
            cli.noise,
            cli.seed + 1 + i as u64,
        )?;
        for (name, &(time, width)) in names.iter().zip(ELUTION.iter()) {
            let mut peak = elution_window(&run, time, 4.0 * width)?;
            calibration.add_compound_concentration(name, (concentration, peak.integrate_peak()));
        }
    }
    info!(
        "calibrated {} compounds with {} standards each",
        calibration.len(),
        STANDARDS.len()
    );

    let sample = simulate(&cli, &spectra, &SAMPLE, cli.noise, cli.seed)?;
    let mut peaks = ELUTION
        .iter()
        .map(|&(time, _)| elution_window(&sample, time, 2.0))
        .collect::<DadResult<Vec<_>>>()?;

    let pipeline = PeakPipeline::new(config);
    let reports = pipeline.process_all(&mut peaks, &components, Some(&calibration))?;

    for (peak, expected) in peaks.iter().zip(SAMPLE.iter()) {
        info!("{} expected concentration {:.3}, found {:?}", peak, expected, peak.concentration());
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn simulate(
    cli: &Cli,
    spectra: &[Vec<f64>],
    concentrations: &[f64],
    noise: f64,
    seed: u64,
) -> DadResult<DadDataset> {
    spectra
        .iter()
        .zip(concentrations)
        .zip(ELUTION.iter())
        .fold(
            ChromatogramSimulator::new(cli.num_times, NUM_WAVELENGTHS),
            |sim, ((spectrum, &concentration), &(time, width))| {
                sim.with_compound(SimulatedCompound::new(spectrum.clone(), concentration, time, width))
            },
        )
        .with_noise(noise)
        .with_seed(seed)
        .build()
}

/// Peak spanning `half_width` samples on both sides of `time`, clipped to the time axis.
fn elution_window(dataset: &DadDataset, time: f64, half_width: f64) -> DadResult<Peak<'_>> {
    let last = dataset.num_times().saturating_sub(1);
    let apex = (time.round() as usize).min(last);
    let left = apex.saturating_sub(half_width.ceil() as usize);
    let right = (apex + half_width.ceil() as usize).min(last);
    Peak::new(left, right, apex, dataset)
}
