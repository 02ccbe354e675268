//! Base64 transport encoding and user-selected image files.

use crate::error::{CanvasError, Result};
use crate::image::types::{ImageFormat, InlineImage};
use base64::Engine;
use std::path::{Path, PathBuf};

/// Encodes bytes as standard base64 with no scheme prefix.
pub fn encode_base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// Builds a `data:` URL for the given bytes.
pub fn data_url(format: ImageFormat, data: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), encode_base64(data))
}

/// Returns the content portion of an encoded image, dropping a
/// `data:<mime>;base64,` prefix if one is present.
pub fn strip_data_url_prefix(input: &str) -> &str {
    match input.find(";base64,") {
        Some(pos) if input.starts_with("data:") => &input[pos + 8..],
        _ => input,
    }
}

/// Decodes base64 that may carry a data URL prefix, whitespace, or
/// missing padding.
pub fn decode_base64_lenient(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = strip_data_url_prefix(input)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(cleaned.trim_end_matches('='))
        .map_err(|e| CanvasError::Decode(e.to_string()))
}

/// An image file the user picked, read once into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    path: PathBuf,
    image: InlineImage,
}

impl UploadedImage {
    /// Reads the file at `path`.
    ///
    /// The format comes from the magic bytes, then the extension, and is
    /// declared as JPEG when neither is recognised.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| CanvasError::read(path, e))?;
        if data.is_empty() {
            return Err(CanvasError::read(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "file is empty"),
            ));
        }

        let format = ImageFormat::from_magic_bytes(&data)
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(ImageFormat::from_extension)
            })
            .unwrap_or(ImageFormat::Jpeg);

        tracing::debug!(path = %path.display(), bytes = data.len(), ?format, "loaded image");

        Ok(Self {
            path: path.to_path_buf(),
            image: InlineImage::new(data, format),
        })
    }

    /// Wraps bytes that did not come from a file.
    pub fn from_bytes(name: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self {
            path: name.into(),
            image: InlineImage::from_bytes(data),
        }
    }

    /// Path the image was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected or declared format.
    pub fn format(&self) -> ImageFormat {
        self.image.format
    }

    /// The image as an inline request part.
    pub fn inline(&self) -> &InlineImage {
        &self.image
    }

    /// Content-only base64 encoding.
    pub fn to_base64(&self) -> String {
        self.image.to_base64()
    }

    /// Data URL suitable for previewing the selection.
    pub fn preview_url(&self) -> String {
        data_url(self.image.format, &self.image.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix("AAAA"), "AAAA");
    }

    #[test]
    fn test_decode_lenient_variants() {
        assert_eq!(decode_base64_lenient("aGk=").unwrap(), b"hi");
        assert_eq!(decode_base64_lenient("aGk").unwrap(), b"hi");
        assert_eq!(
            decode_base64_lenient("data:image/png;base64,aG\nk=").unwrap(),
            b"hi"
        );
        assert!(matches!(
            decode_base64_lenient("!!!"),
            Err(CanvasError::Decode(_))
        ));
    }

    #[test]
    fn test_open_png_file() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&PNG_HEADER).unwrap();

        let uploaded = UploadedImage::open(file.path()).unwrap();
        assert_eq!(uploaded.format(), ImageFormat::Png);
        assert_eq!(uploaded.to_base64(), "iVBORw0KGgo=");
        assert!(uploaded.preview_url().starts_with("data:image/png;base64,"));
        assert!(!uploaded.to_base64().starts_with("data:"));
    }

    #[test]
    fn test_open_uses_extension_then_jpeg() {
        let mut webp = tempfile::Builder::new().suffix(".webp").tempfile().unwrap();
        webp.write_all(b"not really").unwrap();
        assert_eq!(
            UploadedImage::open(webp.path()).unwrap().format(),
            ImageFormat::WebP
        );

        let mut unknown = tempfile::Builder::new().suffix(".heic").tempfile().unwrap();
        unknown.write_all(b"opaque").unwrap();
        assert_eq!(
            UploadedImage::open(unknown.path()).unwrap().format(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_open_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadedImage::open(dir.path().join("nope.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Read);
    }

    #[test]
    fn test_open_empty_file_is_read_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = UploadedImage::open(file.path()).unwrap_err();
        assert!(matches!(err, CanvasError::Read { .. }));
    }
}
