use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::map::map_colors;
use log::{debug, warn};

use crate::models::ImageRecord;

/// Prefix of binarized artifacts written next to the report.
pub const ARTIFACT_PREFIX: &str = "filteredOtsu_";

/// 5-tap binomial kernel, the Gaussian used for a 5x5 window when sigma is
/// derived from the kernel size.
const GAUSSIAN_5: [u32; 5] = [1, 4, 6, 4, 1];
const GAUSSIAN_5_SUM: u32 = 16;

/// Image handed to the recognizer, plus the debug artifact if one was saved.
pub struct PreprocessedImage {
    pub image: GrayImage,
    pub artifact: Option<PathBuf>,
}

/// Strategy applied to a decoded image before recognition.
pub trait Preprocess: Send + Sync {
    fn prepare(&self, image: &DynamicImage, record: &ImageRecord) -> PreprocessedImage;

    /// Human-readable name for this strategy (used in log output)
    fn name(&self) -> &str;
}

/// Grayscale only.
pub struct Passthrough;

impl Preprocess for Passthrough {
    fn prepare(&self, image: &DynamicImage, _record: &ImageRecord) -> PreprocessedImage {
        PreprocessedImage {
            image: to_grayscale(image),
            artifact: None,
        }
    }

    fn name(&self) -> &str {
        "grayscale"
    }
}

/// Grayscale, 5x5 Gaussian, Otsu threshold. Saves the binary image to
/// `artifact_dir/filteredOtsu_<file name>`.
pub struct Binarized {
    pub artifact_dir: PathBuf,
}

impl Binarized {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.artifact_dir
            .join(format!("{}{}", ARTIFACT_PREFIX, file_name))
    }
}

impl Preprocess for Binarized {
    fn prepare(&self, image: &DynamicImage, record: &ImageRecord) -> PreprocessedImage {
        let gray = to_grayscale(image);
        let blurred = gaussian_blur_5x5(&gray);
        let binary = otsu_binarize(&blurred);

        let path = self.artifact_path(&record.file_name);
        let artifact = match save_artifact(&binary, &path) {
            Ok(()) => {
                debug!("saved {}", path.display());
                Some(path)
            }
            Err(e) => {
                // Scoring still runs on the in-memory image
                warn!("{}: cannot save {}: {}", record.file_name, path.display(), e);
                None
            }
        };

        PreprocessedImage {
            image: binary,
            artifact,
        }
    }

    fn name(&self) -> &str {
        "otsu"
    }
}

fn save_artifact(image: &GrayImage, path: &Path) -> image::ImageResult<()> {
    image.save(path)
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Separable 5x5 Gaussian with reflect-101 borders.
pub fn gaussian_blur_5x5(img: &GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    let horizontal = GrayImage::from_fn(width, height, |x, y| {
        let value = convolve_1d(|i| img.get_pixel(reflect_101(x as i64 + i, width), y)[0]);
        Luma([value])
    });

    GrayImage::from_fn(width, height, |x, y| {
        let value = convolve_1d(|i| horizontal.get_pixel(x, reflect_101(y as i64 + i, height))[0]);
        Luma([value])
    })
}

fn convolve_1d(sample: impl Fn(i64) -> u8) -> u8 {
    let acc: u32 = GAUSSIAN_5
        .iter()
        .zip(-2i64..=2)
        .map(|(weight, offset)| weight * sample(offset) as u32)
        .sum();
    ((acc + GAUSSIAN_5_SUM / 2) / GAUSSIAN_5_SUM) as u8
}

/// Mirror an out-of-range index without repeating the edge pixel
/// (`-1 -> 1`, `len -> len - 2`).
fn reflect_101(index: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as u32
}

/// Binarize with Otsu's global threshold: above the level → 255, else 0.
pub fn otsu_binarize(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    map_colors(img, |p: Luma<u8>| {
        if p[0] > level { Luma([255u8]) } else { Luma([0u8]) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn record(name: &str) -> ImageRecord {
        ImageRecord::from_path(0, Path::new(name)).unwrap()
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-2, 2), 0);
        assert_eq!(reflect_101(3, 1), 0);
    }

    #[test]
    fn test_blur_keeps_flat_image() {
        let img = GrayImage::from_pixel(7, 4, Luma([137u8]));
        let blurred = gaussian_blur_5x5(&img);
        assert!(blurred.pixels().all(|p| p[0] == 137));
    }

    #[test]
    fn test_blur_spreads_single_point() {
        let mut img = GrayImage::new(9, 9);
        img.put_pixel(4, 4, Luma([255u8]));
        let blurred = gaussian_blur_5x5(&img);

        // centre weight 6*6/256 of 255, rounded twice
        assert_eq!(blurred.get_pixel(4, 4)[0], 36);
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
        assert_eq!(blurred.get_pixel(4, 3)[0], blurred.get_pixel(3, 4)[0]);
    }

    #[test]
    fn test_otsu_splits_two_levels() {
        let img = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([40u8]) } else { Luma([210u8]) });
        let binary = otsu_binarize(&img);

        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 9)[0], 255);
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_passthrough_is_grayscale_only() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([90u8, 90, 90])));
        let prepared = Passthrough.prepare(&img, &record("A1.png"));

        assert_eq!(prepared.image.dimensions(), (4, 3));
        assert!(prepared.image.pixels().all(|p| p[0] == 90));
        assert!(prepared.artifact.is_none());
    }

    #[test]
    fn test_binarized_writes_artifact() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 { Rgb([10u8, 10, 10]) } else { Rgb([240u8, 240, 240]) }
        }));

        let strategy = Binarized::new(dir.path());
        let prepared = strategy.prepare(&img, &record("XYZ999.png"));

        let expected = dir.path().join("filteredOtsu_XYZ999.png");
        assert_eq!(prepared.artifact.as_deref(), Some(expected.as_path()));
        assert!(expected.exists());
        assert!(prepared.image.pixels().all(|p| p[0] == 0 || p[0] == 255));
        Ok(())
    }

    #[test]
    fn test_binarized_survives_missing_artifact_dir() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([200u8, 10, 10])));
        let strategy = Binarized::new("/nonexistent/platebench/artifacts");
        let prepared = strategy.prepare(&img, &record("A1.png"));

        assert!(prepared.artifact.is_none());
        assert_eq!(prepared.image.dimensions(), (4, 4));
    }
}
