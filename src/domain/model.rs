use crate::utils::error::{CertError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One parsed roster row. Fields are trimmed and guaranteed non-empty by the
/// parser; rows that fail that guarantee never become records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub student_name: String,
    pub course_name: String,
    pub date: String,
}

/// Ordered collection of records from one uploaded CSV. Insertion order is
/// significant: it drives display order, progress percentage and output
/// filenames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub records: Vec<Record>,
}

impl Roster {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `limit` records, for the preview table.
    pub fn preview(&self, limit: usize) -> &[Record] {
        let end = limit.min(self.records.len());
        &self.records[..end]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

/// The single background image reused for every certificate in a run.
/// `preview` is a locally renderable reference (the source path); it is
/// dropped together with the asset when a new one is loaded.
#[derive(Debug, Clone)]
pub struct BackgroundAsset {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub preview: Option<PathBuf>,
}

impl BackgroundAsset {
    pub fn new(file_name: String, content_type: String, bytes: Vec<u8>) -> Result<Self> {
        if !content_type.starts_with("image/") {
            return Err(CertError::FileTypeError {
                message: "Please upload an image file".to_string(),
            });
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
            preview: None,
        })
    }

    pub fn with_preview<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.preview = Some(path.as_ref().to_path_buf());
        self
    }
}

/// One rendered certificate. The download filename is captured here at
/// generation time, so replacing the roster afterwards cannot change it.
#[derive(Debug, Clone, Serialize)]
pub struct Certificate {
    pub student_name: String,
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Output of one complete generation run, index-aligned with the roster that
/// produced it. Only fully successful runs yield one; failures discard any
/// partial list.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub certificates: Vec<Certificate>,
}

impl GenerationOutput {
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.certificates
            .iter()
            .map(|c| c.file_name.clone())
            .collect()
    }
}

/// `Jane Doe` -> `Jane_Doe_certificate.pdf`. Any whitespace run collapses to
/// a single underscore.
pub fn download_file_name(student_name: &str) -> String {
    let re = Regex::new(r"\s+").unwrap();
    format!("{}_certificate.pdf", re.replace_all(student_name, "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_file_name_replaces_whitespace_with_underscores() {
        assert_eq!(download_file_name("Jane Doe"), "Jane_Doe_certificate.pdf");
        assert_eq!(
            download_file_name("Bob A. Smith"),
            "Bob_A._Smith_certificate.pdf"
        );
    }

    #[test]
    fn download_file_name_collapses_whitespace_runs() {
        assert_eq!(
            download_file_name("Ana  Maria\tLopez"),
            "Ana_Maria_Lopez_certificate.pdf"
        );
    }

    #[test]
    fn background_asset_rejects_non_image_content_types() {
        let err = BackgroundAsset::new(
            "notes.txt".to_string(),
            "text/plain".to_string(),
            vec![1, 2, 3],
        )
        .unwrap_err();

        assert!(matches!(err, CertError::FileTypeError { .. }));
        assert_eq!(err.to_string(), "Please upload an image file");
    }

    #[test]
    fn background_asset_accepts_any_image_subtype() {
        for ct in ["image/png", "image/jpeg", "image/webp"] {
            assert!(
                BackgroundAsset::new("bg".to_string(), ct.to_string(), vec![0]).is_ok(),
                "{} should be accepted",
                ct
            );
        }
    }

    #[test]
    fn preview_caps_at_limit_but_returns_short_rosters_whole() {
        let records: Vec<Record> = (0..7)
            .map(|i| Record {
                student_name: format!("Student {}", i),
                course_name: "Algebra".to_string(),
                date: "2024-01-01".to_string(),
            })
            .collect();

        let roster = Roster::new(records);
        assert_eq!(roster.preview(5).len(), 5);
        assert_eq!(roster.preview(5)[0].student_name, "Student 0");

        let short = Roster::new(roster.records[..2].to_vec());
        assert_eq!(short.preview(5).len(), 2);
    }
}
