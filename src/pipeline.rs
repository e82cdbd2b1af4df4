use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use image::{DynamicImage, GrayImage, ImageReader};
use log::{debug, info, warn};

use crate::error::{BatchError, EngineError, ItemError};
use crate::models::{BatchReport, ImageRecord, ScoredResult};
use crate::recognition::{normalize_plate, positional_accuracy, Preprocess, Recognizer};

/// An image that was skipped, and why.
#[derive(Debug)]
pub struct ItemFailure {
    pub file_name: String,
    pub error: ItemError,
}

/// Result of a completed batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub report: BatchReport,
    pub failures: Vec<ItemFailure>,
}

type ItemOutcome = (usize, Result<ScoredResult, ItemError>);

/// List benchmark images directly inside `dir`, in directory-listing order.
pub fn discover_images(dir: &Path) -> Result<Vec<ImageRecord>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::SourceMissing(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| BatchError::io(format!("cannot list {}", dir.display()), e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BatchError::io(format!("cannot list {}", dir.display()), e))?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }

    let records: Vec<ImageRecord> = paths
        .iter()
        .filter_map(|path| ImageRecord::from_path(0, path))
        .enumerate()
        .map(|(index, record)| ImageRecord { index, ..record })
        .collect();

    if records.is_empty() {
        return Err(BatchError::NoImages(dir.to_path_buf()));
    }
    Ok(records)
}

/// Runs preprocessing, recognition and scoring over a directory of images.
pub struct BatchRunner {
    preprocess: Arc<dyn Preprocess>,
    recognizer: Arc<dyn Recognizer>,
    timeout: Option<Duration>,
    jobs: usize,
}

impl BatchRunner {
    pub fn new(preprocess: Arc<dyn Preprocess>, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            preprocess,
            recognizer,
            timeout: None,
            jobs: 1,
        }
    }

    /// Give up on a recognition call after `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of images processed at once (at least 1)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Process every image in `source_dir`. Only directory-level problems
    /// are returned as errors; failed images are listed in the outcome.
    pub fn run(&self, source_dir: &Path) -> Result<BatchOutcome, BatchError> {
        let records = discover_images(source_dir)?;
        info!(
            "Processing {} image files in {} ({} preprocessing, {} engine)",
            records.len(),
            source_dir.display(),
            self.preprocess.name(),
            self.recognizer.name()
        );

        let outcomes = if self.jobs > 1 && records.len() > 1 {
            self.run_parallel(&records)
        } else {
            records
                .iter()
                .map(|record| (record.index, self.process_guarded(record)))
                .collect()
        };

        Ok(collect_outcomes(&records, outcomes))
    }

    /// Run the full pipeline for one image.
    pub fn process_item(&self, record: &ImageRecord) -> Result<ScoredResult, ItemError> {
        debug!("Reading {}", record.file_name);

        let image = decode_image(record)?;
        let prepared = self.preprocess.prepare(&image, record);
        let raw_text = self.recognize(prepared.image)?;

        let detected_plate = normalize_plate(&raw_text);
        let actual_plate = record.actual_plate().to_string();
        let accuracy_percent = positional_accuracy(&detected_plate, &actual_plate);

        Ok(ScoredResult {
            file_name: record.file_name.clone(),
            detected_plate,
            actual_plate,
            accuracy_percent,
            filtered_image_path: prepared.artifact,
        })
    }

    fn process_guarded(&self, record: &ImageRecord) -> Result<ScoredResult, ItemError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.process_item(record)))
            .unwrap_or_else(|_| Err(ItemError::Unexpected(record.file_name.clone())))
    }

    fn recognize(&self, image: GrayImage) -> Result<String, EngineError> {
        let Some(limit) = self.timeout else {
            return panic::catch_unwind(AssertUnwindSafe(|| self.recognizer.recognize(&image)))
                .unwrap_or(Err(EngineError::Crashed));
        };

        // The engine call runs on its own thread so a hung call can be
        // abandoned. An abandoned thread finishes (or not) in the background.
        let (sender, receiver) = mpsc::channel();
        let recognizer = Arc::clone(&self.recognizer);
        thread::Builder::new()
            .name("recognizer".to_string())
            .spawn(move || {
                let _ = sender.send(recognizer.recognize(&image));
            })
            .map_err(|e| EngineError::Failed(format!("cannot start recognizer thread: {}", e)))?;

        match receiver.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(EngineError::TimedOut(limit)),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::Crashed),
        }
    }

    /// Workers pull the next unclaimed image; results are put back into
    /// listing order afterwards.
    fn run_parallel(&self, records: &[ImageRecord]) -> Vec<ItemOutcome> {
        let next = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel::<ItemOutcome>();
        let workers = self.jobs.min(records.len());
        debug!("Starting {} workers", workers);

        thread::scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let next = &next;
                scope.spawn(move || {
                    while let Some(record) = records.get(next.fetch_add(1, Ordering::Relaxed)) {
                        if sender.send((record.index, self.process_guarded(record))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(sender);

        let mut outcomes: Vec<ItemOutcome> = receiver.into_iter().collect();
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes
    }
}

fn decode_image(record: &ImageRecord) -> Result<DynamicImage, ItemError> {
    let read_error = |source: std::io::Error| ItemError::Read {
        file: record.file_name.clone(),
        source,
    };

    ImageReader::open(&record.path)
        .map_err(read_error)?
        .with_guessed_format()
        .map_err(read_error)?
        .decode()
        .map_err(|source| ItemError::Decode {
            file: record.file_name.clone(),
            source,
        })
}

fn collect_outcomes(records: &[ImageRecord], outcomes: Vec<ItemOutcome>) -> BatchOutcome {
    let mut report = BatchReport::new();
    let mut failures = Vec::new();

    for (index, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                info!("{}", result.report_line());
                report.push(result);
            }
            Err(error) => {
                let file_name = records[index].file_name.clone();
                warn!("Skipping {} ({} error): {}", file_name, error.kind(), error);
                failures.push(ItemFailure { file_name, error });
            }
        }
    }

    match report.mean_accuracy() {
        Some(mean) => info!(
            "Scored {} images, skipped {}, mean accuracy {:.2}%",
            report.len(),
            failures.len(),
            mean
        ),
        None => warn!("No image could be scored ({} skipped)", failures.len()),
    }

    BatchOutcome { report, failures }
}
