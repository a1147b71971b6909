use super::payment::PaymentId;
use crate::error::{LedgerError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Content types accepted as proof of payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceMediaType {
    Pdf,
    Png,
    Jpeg,
}

impl EvidenceMediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Best-effort content type for a file name, used when the caller does not declare one.
    pub fn guess_content_type(file_name: &str) -> &'static str {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Self::Pdf.as_str(),
            Some("png") => Self::Png.as_str(),
            Some("jpg" | "jpeg") => Self::Jpeg.as_str(),
            _ => "application/octet-stream",
        }
    }
}

impl FromStr for EvidenceMediaType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "application/pdf" => Ok(Self::Pdf),
            "image/png" => Ok(Self::Png),
            "image/jpeg" => Ok(Self::Jpeg),
            other => Err(LedgerError::UnsupportedMediaType(format!(
                "'{other}' is not one of application/pdf, image/png, image/jpeg"
            ))),
        }
    }
}

impl fmt::Display for EvidenceMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blob key for a payment's evidence: `{id}_{filename}`.
///
/// Only the last component of `file_name` is kept. Re-uploading the same file
/// name overwrites the earlier blob; a different name leaves it in place.
pub fn evidence_key(id: &PaymentId, file_name: &str) -> Result<String> {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| {
            LedgerError::ValidationError(format!("Invalid evidence file name '{file_name}'"))
        })?;
    Ok(format!("{id}_{base}"))
}

/// Evidence retrieved for a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    pub path: String,
    pub bytes: Vec<u8>,
}
