/// Keep only letters and digits from raw OCR output, in order and case.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars().filter(|c| c.is_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_whitespace_and_punctuation() {
        assert_eq!(normalize_plate(" B 1234-CD\n"), "B1234CD");
        assert_eq!(normalize_plate("[XYZ.999]\x0c"), "XYZ999");
    }

    #[test]
    fn test_preserves_case_and_order() {
        assert_eq!(normalize_plate("aB 1c"), "aB1c");
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert_eq!(normalize_plate(""), "");
        assert_eq!(normalize_plate(" .,;:!\t\n"), "");
    }
}
