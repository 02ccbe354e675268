//! Core types for image generation.

use crate::error::{CanvasError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Maps a declared MIME type onto a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Binary image content plus its declared media type, ready to be sent
/// inline to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Declared format.
    pub format: ImageFormat,
}

impl InlineImage {
    /// Creates an inline image with an explicit format.
    pub fn new(data: Vec<u8>, format: ImageFormat) -> Self {
        Self { data, format }
    }

    /// Creates an inline image, detecting the format from magic bytes and
    /// falling back to JPEG.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let format = ImageFormat::from_magic_bytes(&data).unwrap_or(ImageFormat::Jpeg);
        Self { data, format }
    }

    /// Encodes the bytes as base64, without any scheme prefix.
    pub fn to_base64(&self) -> String {
        crate::image::codec::encode_base64(&self.data)
    }
}

/// A request to the generation service: one instruction plus up to two
/// inline images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// The text instruction describing the desired image.
    pub instruction: String,
    /// Input images, sent ahead of the instruction in this order.
    pub images: Vec<InlineImage>,
}

impl GenerationRequest {
    /// Maximum number of inline images a request may carry.
    pub const MAX_IMAGES: usize = 2;

    /// Creates a text-only request.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            images: Vec::new(),
        }
    }

    /// Appends an input image.
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.images.push(image);
        self
    }

    /// Returns true if this request edits or combines existing images.
    pub fn is_edit(&self) -> bool {
        !self.images.is_empty()
    }

    /// Checks the request shape before it is sent.
    pub fn validate(&self) -> Result<()> {
        if self.instruction.trim().is_empty() {
            return Err(CanvasError::InvalidRequest("instruction is empty".into()));
        }
        if self.images.len() > Self::MAX_IMAGES {
            return Err(CanvasError::InvalidRequest(format!(
                "at most {} input images are supported, got {}",
                Self::MAX_IMAGES,
                self.images.len()
            )));
        }
        if self.images.iter().any(|img| img.data.is_empty()) {
            return Err(CanvasError::InvalidRequest("input image is empty".into()));
        }
        Ok(())
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated image should be saved or displayed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(data: Vec<u8>, format: ImageFormat, metadata: GenerationMetadata) -> Self {
        Self {
            data,
            format,
            metadata,
        }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        crate::image::codec::encode_base64(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        crate::image::codec::data_url(self.format, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_format_from_extension_and_mime() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
        assert_eq!(
            ImageFormat::from_mime_type("image/webp"),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_mime_type("text/plain"), None);
    }

    #[test]
    fn test_inline_image_falls_back_to_jpeg() {
        assert_eq!(
            InlineImage::from_bytes(PNG_MAGIC.to_vec()).format,
            ImageFormat::Png
        );
        assert_eq!(
            InlineImage::from_bytes(vec![1, 2, 3]).format,
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_request_validation() {
        let img = InlineImage::from_bytes(PNG_MAGIC.to_vec());
        assert!(GenerationRequest::new("a cat").validate().is_ok());
        assert!(GenerationRequest::new("  ").validate().is_err());

        let three = GenerationRequest::new("merge")
            .with_image(img.clone())
            .with_image(img.clone())
            .with_image(img.clone());
        assert!(matches!(
            three.validate(),
            Err(CanvasError::InvalidRequest(_))
        ));

        let two = GenerationRequest::new("merge")
            .with_image(img.clone())
            .with_image(img);
        assert!(two.validate().is_ok());
        assert!(two.is_edit());
    }

    #[test]
    fn test_generated_image_data_url() {
        let image = GeneratedImage::new(
            vec![0x89, 0x50, 0x4E, 0x47],
            ImageFormat::Png,
            GenerationMetadata::default(),
        );
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw==");
        assert_eq!(image.size(), 4);
    }
}
