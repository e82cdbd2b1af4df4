//! Plain-text benchmark report.
//!
//! Layout: a divider, the column legend, another divider and a blank line,
//! then one `name;   plate;\t\t\tNN.NN%` line per scored image.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::BatchReport;

pub const DIVIDER: &str =
    "================================================================================================";
pub const LEGEND: &str = "FORMAT : Nama File;   Plat Nomor Terbaca;  Akurasinya (%)";

/// Append `.txt` unless the path already ends with it.
pub fn ensure_txt_extension(path: PathBuf) -> PathBuf {
    if path.to_string_lossy().ends_with(".txt") {
        path
    } else {
        let mut raw = path.into_os_string();
        raw.push(".txt");
        PathBuf::from(raw)
    }
}

/// Write the header and every result line to `out`.
pub fn write_report_to<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    writeln!(out, "{}", DIVIDER)?;
    writeln!(out, "{}", LEGEND)?;
    writeln!(out, "{}", DIVIDER)?;
    writeln!(out)?;

    for result in report.results() {
        writeln!(out, "{}", result.report_line())?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write the report. The file is flushed
/// before returning and closed when the writer drops, on success or error.
pub fn write_report(path: &Path, report: &BatchReport) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_report_to(&mut writer, report)?;
    writer.flush()
}

/// Render the report in memory.
pub fn render_report(report: &BatchReport) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_report_to(&mut buf, report);
    String::from_utf8_lossy(&buf).into_owned()
}
