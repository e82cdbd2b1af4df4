use std::path::{Path, PathBuf};

/// Extensions accepted as benchmark images (compared lowercase).
pub const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// One image discovered in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Position in the directory listing
    pub index: usize,
    pub path: PathBuf,
    pub file_name: String,
    /// File name without extension, used as the ground-truth plate
    pub file_stem: String,
}

impl ImageRecord {
    /// Build a record for `path` if its name carries an image extension.
    pub fn from_path(index: usize, path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        if !is_image_name(&file_name) {
            return None;
        }
        let file_stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Some(Self {
            index,
            path: path.to_path_buf(),
            file_name,
            file_stem,
        })
    }

    pub fn actual_plate(&self) -> &str {
        &self.file_stem
    }
}

pub fn is_image_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Outcome of a successfully processed image.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    pub file_name: String,
    pub detected_plate: String,
    pub actual_plate: String,
    /// In `[0, 100]`
    pub accuracy_percent: f64,
    pub filtered_image_path: Option<PathBuf>,
}

impl ScoredResult {
    /// Render as a report line (without trailing newline).
    pub fn report_line(&self) -> String {
        format!(
            "{};   {};\t\t\t{:.2}%",
            self.file_name, self.detected_plate, self.accuracy_percent
        )
    }
}

/// Ordered results of a batch run, in directory-listing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    results: Vec<ScoredResult>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ScoredResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[ScoredResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Mean accuracy over all results, `None` when empty.
    pub fn mean_accuracy(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let total: f64 = self.results.iter().map(|r| r.accuracy_percent).sum();
        Some(total / self.results.len() as f64)
    }
}

impl FromIterator<ScoredResult> for BatchReport {
    fn from_iter<I: IntoIterator<Item = ScoredResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
