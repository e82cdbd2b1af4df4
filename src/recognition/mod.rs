pub mod preprocessing;
pub mod ocr;
pub mod text;
pub mod scoring;

pub use ocr::{OcrsRecognizer, Recognizer};
pub use preprocessing::{Binarized, Passthrough, Preprocess, PreprocessedImage};
pub use scoring::positional_accuracy;
pub use text::normalize_plate;
