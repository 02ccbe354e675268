//! Image generation module.

pub mod codec;
mod provider;
pub mod providers;
mod types;

pub use codec::UploadedImage;
pub use provider::{ImageProvider, ImageProviderExt, DEFAULT_FUSION_INSTRUCTION};
pub use types::{GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, InlineImage};

#[cfg(test)]
pub(crate) use provider::stub;
