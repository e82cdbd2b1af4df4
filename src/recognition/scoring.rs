/// Positional character accuracy of `detected` against `actual`, in percent.
///
/// Characters are compared index by index (case-insensitive) up to the
/// shorter string, and the match count is divided by the longer length.
/// There is no alignment: one inserted or dropped character shifts every
/// later position, so a stray character near the front scores far lower
/// than an edit-distance metric would.
///
/// Returns 0 when `actual` is empty.
pub fn positional_accuracy(detected: &str, actual: &str) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }

    let matched = detected
        .chars()
        .zip(actual.chars())
        .filter(|(d, a)| d.to_lowercase().eq(a.to_lowercase()))
        .count();
    let max_len = detected.chars().count().max(actual.chars().count());

    if max_len == 0 {
        return 0.0;
    }
    matched as f64 / max_len as f64 * 100.0
}
