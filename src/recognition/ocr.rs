use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage};
pub use ocrs::{ImageSource, OcrEngine};
use ocrs::OcrEngineParams;
use rten::Model;

use crate::error::EngineError;

/// Turns a preprocessed plate image into raw text.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> Result<String, EngineError>;

    /// Human-readable name for this engine (used in log output)
    fn name(&self) -> &str;
}

/// Standard cache location of the ocrs models.
pub fn default_model_dir() -> anyhow::Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// Recognizer backed by the `ocrs` engine, reading the whole image as one
/// token: detected word boxes are joined into a single line and no layout
/// analysis is done.
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load detection and recognition models from `model_dir`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let detection_model_path = model_dir.join("text-detection.rten");
        let recognition_model_path = model_dir.join("text-recognition.rten");

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        let detection_model = Model::load_file(&detection_model_path)?;
        let recognition_model = Model::load_file(&recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        Ok(Self { engine })
    }

    fn read_single_token(&self, image: &GrayImage) -> anyhow::Result<String> {
        // The engine expects colour input
        let img = DynamicImage::ImageLuma8(image.clone()).to_rgb8();

        let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())?;
        let ocr_input = self.engine.prepare_input(img_source)?;

        let mut words = self.engine.detect_words(&ocr_input)?;
        if words.is_empty() {
            return Ok(String::new());
        }
        words.sort_by(|a, b| a.center().x.total_cmp(&b.center().x));

        let lines = self.engine.recognize_text(&ocr_input, &[words])?;
        let text = lines
            .into_iter()
            .flatten()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(text)
    }
}

impl Recognizer for OcrsRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<String, EngineError> {
        self.read_single_token(image)
            .map_err(|e| EngineError::Failed(format!("{:#}", e)))
    }

    fn name(&self) -> &str {
        "ocrs"
    }
}
