use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use platebench::recognition::ocr::default_model_dir;
use platebench::report::{ensure_txt_extension, write_report};
use platebench::{Binarized, BatchRunner, OcrsRecognizer, Passthrough, Preprocess};

/// Preprocessing applied before recognition
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Grayscale, Gaussian blur and Otsu threshold
    Otsu,
    /// Grayscale only
    Raw,
}

impl Variant {
    fn default_report(self) -> &'static str {
        match self {
            Variant::Otsu => "hasil_ocr_filterOtsu.txt",
            Variant::Raw => "hasil_ocr_tanpaFilter.txt",
        }
    }
}

#[derive(Parser)]
#[command(name = "platebench")]
#[command(about = "Score license plate OCR against file-name labels")]
struct Cli {
    /// Directory of plate images named after their plate number
    #[arg(long, value_name = "DIR", default_value = "./dataset")]
    source: PathBuf,

    /// Preprocessing variant
    #[arg(long, value_enum, default_value_t = Variant::Otsu)]
    variant: Variant,

    /// Report file (".txt" is appended if missing)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Where binarized images are saved (otsu variant only)
    #[arg(long, value_name = "DIR", default_value = "./filtered_images")]
    artifact_dir: PathBuf,

    /// Directory holding text-detection.rten and text-recognition.rten
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Abandon a single image's recognition after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Number of images processed in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let report_path = ensure_txt_extension(
        args.output
            .unwrap_or_else(|| PathBuf::from(args.variant.default_report())),
    );

    let preprocess: Arc<dyn Preprocess> = match args.variant {
        Variant::Otsu => {
            std::fs::create_dir_all(&args.artifact_dir).with_context(|| {
                format!("Failed to create artifact directory {}", args.artifact_dir.display())
            })?;
            Arc::new(Binarized::new(&args.artifact_dir))
        }
        Variant::Raw => Arc::new(Passthrough),
    };

    let model_dir = match args.model_dir {
        Some(dir) => dir,
        None => default_model_dir()?,
    };
    info!("Loading OCR models from {}", model_dir.display());
    let recognizer = OcrsRecognizer::load(&model_dir)?;

    let runner = BatchRunner::new(preprocess, Arc::new(recognizer))
        .with_timeout(args.timeout.map(Duration::from_secs))
        .with_jobs(args.jobs);

    let outcome = runner.run(&args.source)?;

    write_report(&report_path, &outcome.report)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;
    info!("OCR results and accuracy saved to {}", report_path.display());

    Ok(())
}
