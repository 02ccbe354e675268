#![warn(missing_docs)]
//! NanoCanvas - image tools on top of Gemini image generation.
//!
//! Four tools share one lifecycle: collect inputs, build an instruction,
//! make a single call to the generation service, then show the result
//! full-screen with zoom and save.
//!
//! - Couple Fusion: two portraits merged into one couple photo.
//! - Logo Craft: a brand logo from a description.
//! - Ad Studio: an advertisement image from a description.
//! - Magic Edit: add, remove or change something in a photo.
//!
//! # Quick Start
//!
//! ```no_run
//! use nanocanvas::{Config, GeminiProvider, Studio, View};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> nanocanvas::Result<()> {
//!     let config = Config::from_env()?;
//!     let provider = GeminiProvider::builder().api_key(config.api_key).build()?;
//!     let mut studio = Studio::new(Arc::new(provider));
//!
//!     studio.router_mut().navigate_to(View::BrandLogo);
//!     if let Some(logo) = studio.router_mut().logo_mut() {
//!         logo.inputs_mut().set_description("Acme Coffee");
//!     }
//!     studio.generate().await;
//!
//!     if let Some(viewer) = studio.router_mut().viewer_mut() {
//!         viewer.save_to(".")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli`: the `nanocanvas` command-line binary (default).

mod config;
mod error;
pub mod image;
pub mod studio;

// Re-export error types at crate root
pub use config::{resolve_api_key, Config, API_KEY_ENV_VARS};
pub use error::{
    parse_retry_after, sanitize_error_message, CanvasError, ErrorKind, Result,
    GENERIC_FAILURE_NOTICE,
};

pub use image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use image::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, ImageProvider,
    ImageProviderExt, InlineImage, UploadedImage, DEFAULT_FUSION_INSTRUCTION,
};
pub use studio::{
    CompletionOutcome, EditorMode, ResultViewer, Router, ScreenOps, ScreenStatus, Studio, View,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CanvasError, Result};
    pub use crate::image::providers::GeminiProvider;
    pub use crate::image::{GeneratedImage, GenerationRequest, ImageProvider, ImageProviderExt};
    pub use crate::studio::{Router, ScreenOps, Studio, View};
}
