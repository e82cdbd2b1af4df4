pub mod error;
pub mod models;
pub mod pipeline;
pub mod recognition;
pub mod report;

pub use error::{BatchError, EngineError, ItemError};
pub use models::{BatchReport, ImageRecord, ScoredResult};
pub use pipeline::{discover_images, BatchOutcome, BatchRunner, ItemFailure};
pub use recognition::{
    normalize_plate, positional_accuracy, Binarized, OcrsRecognizer, Passthrough, Preprocess,
    PreprocessedImage, Recognizer,
};
pub use report::{render_report, write_report};
