//! # File Validation
//!
//! Client-side checks run on every acquired file before anything touches
//! the network. A file is accepted when:
//!
//! - its name has an extension (text after the last `.`),
//! - the whole name is made of ASCII word characters, hyphens, dots and
//!   spaces, ending in one of the allowed extensions when an allow-list is
//!   configured (case-insensitive),
//! - its size does not exceed the configured ceiling.
//!
//! ## Usage Examples
//!
//! ```rust
//! use file_upload_widget::validator::FileValidator;
//!
//! let allowed = vec!["pdf".to_string(), "png".to_string()];
//! assert!(FileValidator::validate_extension("report.PDF", &allowed).is_ok());
//! assert!(FileValidator::validate_extension("report", &allowed).is_err());
//! ```

use regex::Regex;

use crate::errors::ValidationError;
use crate::models::AcquiredFile;

/// Validation rules for acquired files.
///
/// All checks are static methods returning [`ValidationError`] so callers
/// can decide how to report the failure.
pub struct FileValidator;

impl FileValidator {
    /// Runs the extension check, then the size check.
    ///
    /// # Arguments
    ///
    /// * `file` - The acquired file
    /// * `allowed` - Lowercase extensions without leading dot; empty admits any extension
    /// * `max_size` - Size ceiling in bytes
    ///
    /// # Errors
    ///
    /// - `BadExtension`: missing extension or a name outside the allowed pattern
    /// - `FileTooLarge`: `file.size` is above `max_size`
    pub fn validate(file: &AcquiredFile, allowed: &[String], max_size: u64) -> Result<(), ValidationError> {
        Self::validate_extension(&file.name, allowed)?;
        Self::validate_file_size(file.size, max_size)
    }

    /// Returns the non-empty text after the last `.` of `file_name`.
    pub fn extension(file_name: &str) -> Option<&str> {
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Builds the anchored, case-insensitive name pattern for an allow-list.
    ///
    /// With `["pdf", "png"]` the pattern is `(?i)^[[:word:]\-. ]+\.(?:pdf|png)$`.
    pub fn name_pattern(allowed: &[String]) -> String {
        let mut pattern = String::from(r"(?i)^[[:word:]\-. ]+");
        if !allowed.is_empty() {
            let alternatives = allowed
                .iter()
                .map(|ext| regex::escape(ext))
                .collect::<Vec<_>>()
                .join("|");
            pattern.push_str(&format!(r"\.(?:{})", alternatives));
        }
        pattern.push('$');
        pattern
    }

    pub fn validate_extension(file_name: &str, allowed: &[String]) -> Result<(), ValidationError> {
        let matches = Self::extension(file_name).is_some()
            && Regex::new(&Self::name_pattern(allowed))
                .map(|pattern| pattern.is_match(file_name))
                .unwrap_or(false);

        if matches {
            Ok(())
        } else {
            Err(ValidationError::BadExtension {
                file_name: file_name.to_string(),
                allowed: allowed.to_vec(),
            })
        }
    }

    /// Validates that a file size is within the configured ceiling.
    pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), ValidationError> {
        if size > max_size {
            return Err(ValidationError::FileTooLarge { size, max: max_size });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("report.pdf", &["pdf", "png"], true)]
    #[case("report.PDF", &["pdf", "png"], true)]
    #[case("my photo-1.final.png", &["pdf", "png"], true)]
    #[case("report.doc", &["pdf", "png"], false)]
    #[case("report", &["pdf", "png"], false)]
    #[case("report", &[], false)]
    #[case("report.", &[], false)]
    #[case("notes.anything", &[], true)]
    #[case("bad$name.pdf", &["pdf"], false)]
    #[case("my.xpdf", &["pdf"], false)]
    #[case(".pdf", &["pdf"], false)]
    #[case("naïve.pdf", &["pdf"], false)]
    fn extension_rules(#[case] name: &str, #[case] allowed: &[&str], #[case] ok: bool) {
        assert_eq!(FileValidator::validate_extension(name, &list(allowed)).is_ok(), ok, "{}", name);
    }

    #[test]
    fn bad_extension_lists_allowed_extensions() {
        let err = FileValidator::validate_extension("report", &list(&["pdf", "png"])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::BadExtension {
                file_name: "report".to_string(),
                allowed: list(&["pdf", "png"]),
            }
        );
        assert!(err.to_string().contains("pdf, png"));
    }

    #[test]
    fn validate_file_size_allows_within_limit() {
        assert!(FileValidator::validate_file_size(500_000, 500_000).is_ok());
    }

    #[test]
    fn validate_file_size_rejects_over_limit() {
        let err = FileValidator::validate_file_size(500_001, 500_000).unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { size: 500_001, max: 500_000 }));
    }

    #[test]
    fn oversized_file_fails_even_with_good_extension() {
        let file = AcquiredFile::new("report.pdf", vec![0; 10]);
        let err = FileValidator::validate(&file, &list(&["pdf"]), 5).unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { .. }));
    }

    #[test]
    fn extension_failure_is_reported_before_size() {
        let file = AcquiredFile::new("report.exe", vec![0; 10]);
        let err = FileValidator::validate(&file, &list(&["pdf"]), 5).unwrap_err();
        assert!(matches!(err, ValidationError::BadExtension { .. }));
    }

    #[test]
    fn pattern_escapes_extensions() {
        assert_eq!(
            FileValidator::name_pattern(&list(&["pdf", "png"])),
            r"(?i)^[[:word:]\-. ]+\.(?:pdf|png)$"
        );
        assert_eq!(FileValidator::name_pattern(&[]), r"(?i)^[[:word:]\-. ]+$");
    }
}
