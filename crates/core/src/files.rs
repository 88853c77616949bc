//! Attachment constraints and category codes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

/// Maximum accepted upload size (5 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted by the file manager.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
];

/// Which section an attachment belongs to, as wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FileCategory {
    Personal = 1,
    Undergraduate = 2,
    Postgraduate = 3,
    English = 4,
}

impl FileCategory {
    /// Wire code used by the file endpoints.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse from the wire code.
    pub fn from_code(code: u8) -> Result<Self, CoreError> {
        match code {
            1 => Ok(Self::Personal),
            2 => Ok(Self::Undergraduate),
            3 => Ok(Self::Postgraduate),
            4 => Ok(Self::English),
            other => Err(CoreError::Validation(format!(
                "Unknown file category code {other}"
            ))),
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal documents",
            Self::Undergraduate => "Undergraduate documents",
            Self::Postgraduate => "Postgraduate documents",
            Self::English => "English qualification documents",
        }
    }
}

impl From<FileCategory> for u8 {
    fn from(category: FileCategory) -> Self {
        category.code()
    }
}

impl TryFrom<u8> for FileCategory {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// A persisted attachment as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: EntityId,
    pub file_name: String,
    /// Server-side storage name, used by the delete endpoint.
    pub local_name: String,
    pub size: u64,
    pub content_type: String,
    pub path: String,
    pub category: FileCategory,
    /// Scopes the attachment to one repeated-section entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
}

/// Why a file was rejected client-side. Rejections are per-file and never
/// abort the rest of a batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FileRejection {
    #[error("{file_name} is {size} bytes, over the {MAX_FILE_SIZE_BYTES}-byte limit")]
    TooLarge { file_name: String, size: u64 },

    #[error("{file_name} has disallowed type {content_type}")]
    DisallowedType {
        file_name: String,
        content_type: String,
    },
}

/// Check one candidate file against the size cap and MIME allow-list.
pub fn check_file(file_name: &str, size: u64, content_type: &str) -> Result<(), FileRejection> {
    if size > MAX_FILE_SIZE_BYTES {
        return Err(FileRejection::TooLarge {
            file_name: file_name.to_string(),
            size,
        });
    }
    let lowered = content_type.to_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&lowered.as_str()) {
        return Err(FileRejection::DisallowedType {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
        });
    }
    Ok(())
}

/// Guess a MIME type from a file extension, for callers feeding the file
/// manager from disk.
pub fn mime_for_extension(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn category_codes_round_trip() {
        for category in [
            FileCategory::Personal,
            FileCategory::Undergraduate,
            FileCategory::Postgraduate,
            FileCategory::English,
        ] {
            assert_eq!(FileCategory::from_code(category.code()).unwrap(), category);
        }
        assert!(FileCategory::from_code(0).is_err());
        assert!(FileCategory::from_code(5).is_err());
    }

    #[test]
    fn oversized_file_rejected() {
        let err = check_file("transcript.pdf", MAX_FILE_SIZE_BYTES + 1, "application/pdf");
        assert_matches!(err, Err(FileRejection::TooLarge { .. }));
    }

    #[test]
    fn size_at_limit_accepted() {
        assert!(check_file("transcript.pdf", MAX_FILE_SIZE_BYTES, "application/pdf").is_ok());
    }

    #[test]
    fn disallowed_type_rejected() {
        let err = check_file("macro.docx", 1024, "application/msword");
        assert_matches!(err, Err(FileRejection::DisallowedType { .. }));
    }

    #[test]
    fn mime_check_is_case_insensitive() {
        assert!(check_file("scan.PNG", 1024, "Image/PNG").is_ok());
    }

    #[test]
    fn extension_mapping() {
        assert_eq!(mime_for_extension("a.PDF"), Some("application/pdf"));
        assert_eq!(mime_for_extension("b.jpg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("c.png"), Some("image/png"));
        assert_eq!(mime_for_extension("d.docx"), None);
        assert_eq!(mime_for_extension("noext"), None);
    }
}
