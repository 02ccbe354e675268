//! Image provider trait and the three request shapes the tools use.

use crate::error::Result;
use crate::image::types::{GeneratedImage, GenerationRequest, InlineImage};
use async_trait::async_trait;

/// Instruction used for couple fusion when the caller supplies none.
pub const DEFAULT_FUSION_INSTRUCTION: &str = "Generate a romantic couple photo featuring these two people, preserving their facial structures and features as much as possible.";

/// Trait for image generation providers.
///
/// One call is one round trip: implementations must not retry.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// The request shapes offered on top of [`ImageProvider::generate`].
#[async_trait]
pub trait ImageProviderExt: ImageProvider {
    /// Combines two images, using [`DEFAULT_FUSION_INSTRUCTION`] when
    /// `instruction` is `None` or blank.
    async fn fuse_two_images(
        &self,
        first: &InlineImage,
        second: &InlineImage,
        instruction: Option<&str>,
    ) -> Result<GeneratedImage> {
        let instruction = instruction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_FUSION_INSTRUCTION);
        let request = GenerationRequest::new(instruction)
            .with_image(first.clone())
            .with_image(second.clone());
        self.generate(&request).await
    }

    /// Creates an image from text alone.
    async fn create_from_text(&self, instruction: &str) -> Result<GeneratedImage> {
        self.generate(&GenerationRequest::new(instruction)).await
    }

    /// Edits one image according to `instruction`.
    async fn edit_image(&self, image: &InlineImage, instruction: &str) -> Result<GeneratedImage> {
        let request = GenerationRequest::new(instruction).with_image(image.clone());
        self.generate(&request).await
    }
}

impl<T: ImageProvider + ?Sized> ImageProviderExt for T {}
