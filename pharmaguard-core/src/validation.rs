//! Client-side upload validation.
//!
//! Runs before any network call. A rejected upload never reaches the backend.

use std::path::Path;

use thiserror::Error;

use crate::drugs::DrugSelection;

/// Largest accepted upload: 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Required filename suffix.
pub const VCF_EXTENSION: &str = ".vcf";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file selected")]
    NoFile,

    #[error("File must be a .vcf file")]
    WrongExtension { name: String },

    #[error("File size must be under {} MB", mib(.limit))]
    TooLarge { size: u64, limit: u64 },

    #[error("Select at least one target drug")]
    NoDrugs,

    #[error("An analysis is already running")]
    InFlight,

    #[error("cannot read {path}: {reason}")]
    Io { path: String, reason: String },
}

fn mib(bytes: &u64) -> String {
    let m = *bytes as f64 / (1024.0 * 1024.0);
    if m.fract() == 0.0 {
        format!("{m:.0}")
    } else {
        format!("{m:.1}")
    }
}

/// Check the name and size of a candidate file.
pub fn validate_upload(name: &str, size: u64, limit: u64) -> Result<(), ValidationError> {
    if !name.ends_with(VCF_EXTENSION) {
        return Err(ValidationError::WrongExtension {
            name: name.to_string(),
        });
    }
    if size > limit {
        return Err(ValidationError::TooLarge { size, limit });
    }
    Ok(())
}

/// A validated VCF file held in memory, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfUpload {
    name: String,
    bytes: Vec<u8>,
}

impl VcfUpload {
    /// Validate an in-memory file.
    pub fn new(
        name: impl Into<String>,
        bytes: Vec<u8>,
        limit: u64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_upload(&name, bytes.len() as u64, limit)?;
        Ok(Self { name, bytes })
    }

    /// Validate name and size from metadata, then read the file.
    pub fn from_path(path: &Path, limit: u64) -> Result<Self, ValidationError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(ValidationError::NoFile)?;
        let io_err = |e: std::io::Error| ValidationError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let meta = std::fs::metadata(path).map_err(io_err)?;
        if !meta.is_file() {
            return Err(ValidationError::Io {
                path: path.display().to_string(),
                reason: "not a regular file".into(),
            });
        }
        validate_upload(&name, meta.len(), limit)?;

        let bytes = std::fs::read(path).map_err(io_err)?;
        // The file may have grown between stat and read.
        validate_upload(&name, bytes.len() as u64, limit)?;
        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size in KiB with one decimal, as shown next to the file name.
    pub fn size_kib(&self) -> String {
        format!("{:.1}", self.size() as f64 / 1024.0)
    }

    /// Lossy text view, for local inspection only.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Whether the submit action is enabled.
pub fn can_submit(
    upload: Option<&VcfUpload>,
    drugs: &DrugSelection,
    in_flight: bool,
) -> Result<(), ValidationError> {
    if in_flight {
        return Err(ValidationError::InFlight);
    }
    if upload.is_none() {
        return Err(ValidationError::NoFile);
    }
    if drugs.is_empty() {
        return Err(ValidationError::NoDrugs);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_vcf_at_limit() {
        assert!(validate_upload("sample.vcf", MAX_UPLOAD_BYTES, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn rejects_one_byte_over() {
        let err = validate_upload("sample.vcf", MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), "File size must be under 5 MB");
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["sample.txt", "sample.vcf.gz", "sample.VCF", "vcf", "sample"] {
            let err = validate_upload(name, 10, MAX_UPLOAD_BYTES).unwrap_err();
            assert_eq!(err.to_string(), "File must be a .vcf file", "{name}");
        }
    }

    #[test]
    fn extension_checked_before_size() {
        let err = validate_upload("big.txt", MAX_UPLOAD_BYTES * 2, MAX_UPLOAD_BYTES).unwrap_err();
        assert!(matches!(err, ValidationError::WrongExtension { .. }));
    }

    #[test]
    fn from_path_reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient.vcf");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "##fileformat=VCFv4.2").unwrap();

        let upload = VcfUpload::from_path(&path, MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(upload.name(), "patient.vcf");
        assert!(upload.text().starts_with("##fileformat"));
    }

    #[test]
    fn from_path_missing_file() {
        let err = VcfUpload::from_path(Path::new("/nonexistent/x.vcf"), MAX_UPLOAD_BYTES).unwrap_err();
        assert!(matches!(err, ValidationError::Io { .. }));
    }

    #[test]
    fn from_path_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.vcf");
        std::fs::write(&path, vec![b'A'; 2048]).unwrap();
        let err = VcfUpload::from_path(&path, 1024).unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { size: 2048, limit: 1024 });
    }

    #[test]
    fn submit_gating() {
        let upload = VcfUpload::new("a.vcf", b"x".to_vec(), MAX_UPLOAD_BYTES).unwrap();
        let mut drugs = DrugSelection::new();
        assert_eq!(can_submit(None, &drugs, false), Err(ValidationError::NoFile));
        assert_eq!(can_submit(Some(&upload), &drugs, false), Err(ValidationError::NoDrugs));
        drugs.toggle("CODEINE");
        assert!(can_submit(Some(&upload), &drugs, false).is_ok());
        assert_eq!(can_submit(Some(&upload), &drugs, true), Err(ValidationError::InFlight));
    }

    #[test]
    fn size_kib_formatting() {
        let upload = VcfUpload::new("a.vcf", vec![0; 40 * 1024], MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(upload.size_kib(), "40.0");
    }
}
