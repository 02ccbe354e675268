//! Full-screen result viewer with pointer-driven magnification.

use crate::error::Result;
use crate::image::GeneratedImage;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Magnification applied while the pointer or a touch is active.
pub const ZOOM_SCALE: f64 = 2.5;

/// Screen-space rectangle the image is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width; must be positive to track the pointer.
    pub width: f64,
    /// Height; must be positive to track the pointer.
    pub height: f64,
}

impl Bounds {
    /// Creates bounds from origin and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Pointer position as a percentage of the image size, each axis in
/// `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    /// Horizontal percentage.
    pub x: f64,
    /// Vertical percentage.
    pub y: f64,
}

impl Default for PointerPosition {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

impl PointerPosition {
    /// Maps screen coordinates into `bounds`, clamped to the image.
    ///
    /// Returns `None` for empty bounds or non-finite input.
    pub fn from_client(client_x: f64, client_y: f64, bounds: &Bounds) -> Option<Self> {
        Some(Self {
            x: percent_along(client_x, bounds.left, bounds.width)?,
            y: percent_along(client_y, bounds.top, bounds.height)?,
        })
    }
}

fn percent_along(coord: f64, origin: f64, extent: f64) -> Option<f64> {
    if !(extent > 0.0) || !coord.is_finite() || !origin.is_finite() || !extent.is_finite() {
        return None;
    }
    Some(((coord - origin) / extent * 100.0).clamp(0.0, 100.0))
}

/// Pointer and touch input over the image.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    MouseEnter,
    MouseMove { x: f64, y: f64 },
    MouseLeave,
    TouchStart,
    TouchMove { x: f64, y: f64 },
    TouchEnd,
}

/// How the image should be drawn right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    /// Transform origin, percent of width.
    pub origin_x: f64,
    /// Transform origin, percent of height.
    pub origin_y: f64,
    /// Scale factor, 1.0 when not magnified.
    pub scale: f64,
}

/// Shows one generated image until the owning screen closes it.
#[derive(Debug, Clone)]
pub struct ResultViewer {
    image: GeneratedImage,
    position: PointerPosition,
    zoomed: bool,
}

impl ResultViewer {
    /// Opens a viewer on `image`, centred and unmagnified.
    pub fn new(image: GeneratedImage) -> Self {
        Self {
            image,
            position: PointerPosition::default(),
            zoomed: false,
        }
    }

    /// The image being shown.
    pub fn image(&self) -> &GeneratedImage {
        &self.image
    }

    /// Last pointer position.
    pub fn position(&self) -> PointerPosition {
        self.position
    }

    /// True while the pointer or a touch is active.
    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    /// Feeds one pointer event.
    pub fn handle(&mut self, event: PointerEvent, bounds: &Bounds) {
        match event {
            PointerEvent::MouseEnter | PointerEvent::TouchStart => self.zoomed = true,
            PointerEvent::MouseLeave | PointerEvent::TouchEnd => self.zoomed = false,
            PointerEvent::MouseMove { x, y } => {
                self.track(x, y, bounds);
                self.zoomed = true;
            }
            // Touch moves only reposition; touch-start already zoomed in.
            PointerEvent::TouchMove { x, y } => self.track(x, y, bounds),
        }
    }

    fn track(&mut self, x: f64, y: f64, bounds: &Bounds) {
        if let Some(position) = PointerPosition::from_client(x, y, bounds) {
            self.position = position;
        }
    }

    /// Current draw transform.
    pub fn transform(&self) -> ZoomTransform {
        ZoomTransform {
            origin_x: self.position.x,
            origin_y: self.position.y,
            scale: if self.zoomed { ZOOM_SCALE } else { 1.0 },
        }
    }

    /// Download file name for a save made at `at`.
    pub fn download_name(at: SystemTime) -> String {
        let millis = at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("nanocanvas-{millis}.png")
    }

    /// Writes the image into `dir`, named from the current time.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(Self::download_name(SystemTime::now()));
        self.image.save(&path)?;
        tracing::debug!(path = %path.display(), bytes = self.image.size(), "saved result");
        Ok(path)
    }
}
