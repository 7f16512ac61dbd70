//! Car photo handling: upload constraints, object keys and legacy references.
//!
//! Photos live in a private bucket. Records store the bucket-relative object
//! key (`cars/<millis>-<random>.<ext>`), never a public URL. Older records may
//! still hold a full storage URL; [`object_key_from_reference`] recovers the
//! key from those.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ImageRejection, Result};

/// Default upload ceiling: 5 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Marker that identifies a full storage URL rather than a bare key.
const STORAGE_URL_MARKER: &str = "supabase";

/// Length of the random suffix in generated object keys.
const RANDOM_SUFFIX_LEN: usize = 11;

/// An image selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name, used for the extension.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Creates an upload from in-memory content.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads an upload from disk.
    ///
    /// The content type is inferred from the extension unless given.
    /// Unknown extensions fall back to `application/octet-stream`, which the
    /// media rules then reject.
    pub fn from_path(path: impl AsRef<Path>, content_type: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::io_with_path(e, path))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::validation_field("image", "path has no file name"))?;
        let content_type = content_type
            .map(str::to_string)
            .or_else(|| content_type_for(&file_name).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Text after the last `.` of the file name (the whole name if none).
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or(&self.file_name)
    }
}

/// Constraints checked before an image is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRules {
    /// Largest accepted file, in bytes.
    pub max_bytes: u64,
}

impl Default for MediaRules {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl MediaRules {
    /// Creates rules with the given ceiling.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Checks content type and size.
    pub fn check(&self, upload: &ImageUpload) -> std::result::Result<(), ImageRejection> {
        if !upload.content_type.starts_with("image/") {
            return Err(ImageRejection::NotAnImage {
                content_type: upload.content_type.clone(),
            });
        }
        if upload.bytes.is_empty() {
            return Err(ImageRejection::Empty);
        }
        if upload.size() > self.max_bytes {
            return Err(ImageRejection::TooLarge {
                size: upload.size(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Guesses an image MIME type from a file name.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

/// Builds an object key from its parts.
///
/// Format: `<prefix>/<millis>-<random>.<ext>`.
pub fn object_key(prefix: &str, millis: i64, random: &str, extension: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{millis}-{random}.{extension}")
    } else {
        format!("{prefix}/{millis}-{random}.{extension}")
    }
}

/// Generates a fresh object key for an upload.
pub fn new_object_key(prefix: &str, upload: &ImageUpload) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = random_suffix();
    object_key(prefix, millis, &random, upload.extension())
}

fn random_suffix() -> String {
    let mut suffix = to_base36(uuid::Uuid::new_v4().as_u128());
    suffix.truncate(RANDOM_SUFFIX_LEN);
    suffix
}

/// Encodes a number in lowercase base 36.
pub fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Turns a stored image reference into a bucket-relative object key.
///
/// A reference containing `supabase` is treated as a full URL and reduced to
/// its last two path segments (`<bucket>/<file>`). Anything else is already a
/// key and is returned unchanged.
pub fn object_key_from_reference(reference: &str) -> Result<String> {
    if !reference.contains(STORAGE_URL_MARKER) {
        return Ok(reference.to_string());
    }

    let url = url::Url::parse(reference).map_err(|e| {
        Error::validation_field("image_url", format!("invalid storage URL '{reference}': {e}"))
    })?;
    let segments: Vec<&str> = url.path().split('/').collect();
    if segments.len() < 3 {
        return Err(Error::validation_field(
            "image_url",
            format!("storage URL '{reference}' has no <bucket>/<file> path"),
        ));
    }
    Ok(segments[segments.len() - 2..].join("/"))
}
