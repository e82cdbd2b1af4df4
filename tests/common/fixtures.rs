use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use image::{GrayImage, ImageBuffer, Rgb};
use platebench::{EngineError, Recognizer};

/// Writes a plate-like test image: dark characters band on a light plate.
/// Width doubles as the key fake recognizers use to pick their answer.
pub fn write_plate_image(dir: &Path, name: &str, width: u32) -> PathBuf {
    let img = ImageBuffer::from_fn(width, 24, |x, y| {
        if (8..16).contains(&y) && x % 4 < 2 {
            Rgb([20u8, 20u8, 20u8])
        } else {
            Rgb([235u8, 235u8, 220u8])
        }
    });
    let path = dir.join(name);
    img.save(&path).expect("Failed to save test image");
    path
}

/// Writes bytes that no image decoder accepts.
pub fn write_corrupt_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"this is not an image at all").expect("Failed to write corrupt image");
    path
}

/// What a scripted recognizer does for an image of a given width
#[derive(Clone)]
pub enum Reply {
    Text(&'static str),
    Fail,
    Hang(Duration),
}

/// Fake engine that answers by image width.
pub struct ScriptedRecognizer {
    replies: HashMap<u32, Reply>,
}

impl ScriptedRecognizer {
    pub fn new(replies: impl IntoIterator<Item = (u32, Reply)>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
        }
    }
}

impl Recognizer for ScriptedRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<String, EngineError> {
        match self.replies.get(&image.width()) {
            Some(Reply::Text(text)) => Ok(text.to_string()),
            Some(Reply::Fail) | None => Err(EngineError::Failed("engine unavailable".to_string())),
            Some(Reply::Hang(delay)) => {
                thread::sleep(*delay);
                Ok(String::new())
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
