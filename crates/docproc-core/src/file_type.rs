//! Upload file classification and local validation.

use std::path::{Path, PathBuf};

use crate::error::InputError;

/// Extensions sent to the backend as `file_type=image`.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "svg"];

pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "xlsx"];

pub const PRICE_LIST_EXTENSIONS: &[&str] = &["csv", "json", "xlsx", "xls"];

/// Default upload ceiling (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Document,
    Image,
}

impl UploadKind {
    pub fn label(self) -> &'static str {
        match self {
            UploadKind::Document => "document",
            UploadKind::Image => "image",
        }
    }
}

/// Lower-cased extension of `path`; empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Value of the multipart `file_type` field: `"image"` for allowlisted image
/// extensions, otherwise the extension itself.
pub fn file_type_field(ext: &str) -> String {
    let ext = ext.to_ascii_lowercase();
    if is_image_extension(&ext) {
        "image".to_string()
    } else {
        ext
    }
}

pub fn upload_kind(ext: &str) -> UploadKind {
    if is_image_extension(ext) {
        UploadKind::Image
    } else {
        UploadKind::Document
    }
}

/// A file that passed local checks and is ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub file_name: String,
    pub extension: String,
    pub size: u64,
}

impl UploadFile {
    pub fn kind(&self) -> UploadKind {
        upload_kind(&self.extension)
    }

    pub fn file_type_field(&self) -> String {
        file_type_field(&self.extension)
    }
}

/// Check a document or image before upload.
pub fn validate_document(path: Option<&Path>, max_bytes: u64) -> Result<UploadFile, InputError> {
    let file = inspect(path, max_bytes)?;
    if DOCUMENT_EXTENSIONS.contains(&file.extension.as_str()) || is_image_extension(&file.extension)
    {
        Ok(file)
    } else {
        let allowed: Vec<&str> = DOCUMENT_EXTENSIONS
            .iter()
            .chain(IMAGE_EXTENSIONS)
            .copied()
            .collect();
        Err(InputError::UnsupportedExtension {
            kind: "document",
            extension: file.extension,
            allowed: allowed.join(", "),
        })
    }
}

/// Check a price-list file before upload.
pub fn validate_price_list(path: Option<&Path>, max_bytes: u64) -> Result<UploadFile, InputError> {
    let file = inspect(path, max_bytes)?;
    if PRICE_LIST_EXTENSIONS.contains(&file.extension.as_str()) {
        Ok(file)
    } else {
        Err(InputError::UnsupportedExtension {
            kind: "price list",
            extension: file.extension,
            allowed: PRICE_LIST_EXTENSIONS.join(", "),
        })
    }
}

fn inspect(path: Option<&Path>, max_bytes: u64) -> Result<UploadFile, InputError> {
    let path = path.ok_or(InputError::NoFileSelected)?;
    let meta = std::fs::metadata(path).map_err(|_| InputError::FileNotFound(path.to_path_buf()))?;
    if !meta.is_file() {
        return Err(InputError::NotAFile(path.to_path_buf()));
    }
    let size = meta.len();
    if size == 0 {
        return Err(InputError::EmptyFile(path.to_path_buf()));
    }
    if size > max_bytes {
        return Err(InputError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| InputError::NotAFile(path.to_path_buf()))?;

    Ok(UploadFile {
        path: path.to_path_buf(),
        file_name,
        extension: extension_of(path),
        size,
    })
}
