//! Per-tool inputs and how each tool turns them into a request.

use crate::error::Result;
use crate::image::{
    GeneratedImage, ImageProvider, ImageProviderExt, InlineImage, UploadedImage,
    DEFAULT_FUSION_INSTRUCTION,
};
use crate::studio::view::{EditorMode, View};

/// Builds the logo tool's instruction.
pub fn logo_instruction(description: &str) -> String {
    format!(
        "Create a professional, minimalist, vector-style brand logo for: {}. High contrast, clean lines.",
        description.trim()
    )
}

/// Builds the ad tool's instruction.
pub fn ad_instruction(description: &str) -> String {
    format!(
        "Create a high-converting, visually stunning advertisement image for: {}. Cinematic lighting, commercial photography style.",
        description.trim()
    )
}

fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}

/// A generation call with everything it needs captured by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolJob {
    /// Two images plus an optional instruction.
    Fuse {
        first: InlineImage,
        second: InlineImage,
        instruction: Option<String>,
    },
    /// Instruction only.
    Create { instruction: String },
    /// One image plus an instruction.
    Edit {
        image: InlineImage,
        instruction: String,
    },
}

impl ToolJob {
    /// The instruction that will be sent.
    pub fn instruction(&self) -> &str {
        match self {
            Self::Fuse { instruction, .. } => instruction
                .as_deref()
                .filter(|s| has_text(s))
                .unwrap_or(DEFAULT_FUSION_INSTRUCTION),
            Self::Create { instruction } | Self::Edit { instruction, .. } => instruction,
        }
    }

    /// Performs the call. Single attempt.
    pub async fn run(&self, provider: &dyn ImageProvider) -> Result<GeneratedImage> {
        match self {
            Self::Fuse {
                first,
                second,
                instruction,
            } => {
                provider
                    .fuse_two_images(first, second, instruction.as_deref())
                    .await
            }
            Self::Create { instruction } => provider.create_from_text(instruction).await,
            Self::Edit { image, instruction } => provider.edit_image(image, instruction).await,
        }
    }
}

/// An edit to a tool's form, independent of which tool is showing.
#[derive(Debug, Clone)]
pub enum FormEdit {
    /// Select or remove the image in a 1-based slot.
    Image {
        slot: usize,
        image: Option<UploadedImage>,
    },
    /// Replace the main text field.
    Text(String),
    /// Switch the photo editor's mode.
    Mode(EditorMode),
}

/// The form does not have the field an edit targeted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{tool} has no {field}")]
pub struct UnsupportedInput {
    /// Tool title.
    pub tool: &'static str,
    /// Description of the missing field.
    pub field: String,
}

/// Inputs of one tool screen.
pub trait Tool: Default + Send {
    /// The screen this tool is shown on.
    const VIEW: View;

    /// True when every required input is present.
    fn is_complete(&self) -> bool;

    /// Builds the call for the current inputs, or `None` if incomplete.
    fn job(&self) -> Option<ToolJob>;

    /// Applies a form edit.
    fn apply(&mut self, edit: FormEdit) -> std::result::Result<(), UnsupportedInput>;

    /// Current field values for display.
    fn fields(&self) -> Vec<(&'static str, String)>;
}

fn unsupported(tool: View, field: impl Into<String>) -> UnsupportedInput {
    UnsupportedInput {
        tool: tool.title(),
        field: field.into(),
    }
}

fn describe_image(image: &Option<UploadedImage>) -> String {
    match image {
        Some(img) => format!("{} ({})", img.path().display(), img.format().extension()),
        None => "(none)".to_string(),
    }
}

/// Which partner photo of the couple fusion form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partner {
    /// First photo.
    One,
    /// Second photo.
    Two,
}

/// Couple fusion form: two photos and an optional instruction.
#[derive(Debug, Clone, Default)]
pub struct CoupleFusion {
    first: Option<UploadedImage>,
    second: Option<UploadedImage>,
    instruction: String,
}

impl CoupleFusion {
    /// Selects or clears a partner photo.
    pub fn set_partner(&mut self, partner: Partner, image: Option<UploadedImage>) {
        match partner {
            Partner::One => self.first = image,
            Partner::Two => self.second = image,
        }
    }

    /// The selected photo for `partner`.
    pub fn partner(&self, partner: Partner) -> Option<&UploadedImage> {
        match partner {
            Partner::One => self.first.as_ref(),
            Partner::Two => self.second.as_ref(),
        }
    }

    /// Sets the instruction; blank means the default.
    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }
}

impl Tool for CoupleFusion {
    const VIEW: View = View::CoupleGenerator;

    fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    fn job(&self) -> Option<ToolJob> {
        let (first, second) = (self.first.as_ref()?, self.second.as_ref()?);
        Some(ToolJob::Fuse {
            first: first.inline().clone(),
            second: second.inline().clone(),
            instruction: has_text(&self.instruction).then(|| self.instruction.trim().to_string()),
        })
    }

    fn apply(&mut self, edit: FormEdit) -> std::result::Result<(), UnsupportedInput> {
        match edit {
            FormEdit::Image { slot: 1, image } => self.set_partner(Partner::One, image),
            FormEdit::Image { slot: 2, image } => self.set_partner(Partner::Two, image),
            FormEdit::Image { slot, .. } => {
                return Err(unsupported(Self::VIEW, format!("image slot {slot}")))
            }
            FormEdit::Text(text) => self.set_instruction(text),
            FormEdit::Mode(_) => return Err(unsupported(Self::VIEW, "editor mode")),
        }
        Ok(())
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("partner 1", describe_image(&self.first)),
            ("partner 2", describe_image(&self.second)),
            (
                "instruction",
                if has_text(&self.instruction) {
                    self.instruction.clone()
                } else {
                    "(default)".to_string()
                },
            ),
        ]
    }
}

/// Logo form: a description of the brand.
#[derive(Debug, Clone, Default)]
pub struct BrandLogo {
    description: String,
}

impl BrandLogo {
    /// Sets the brand description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Current brand description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Tool for BrandLogo {
    const VIEW: View = View::BrandLogo;

    fn is_complete(&self) -> bool {
        has_text(&self.description)
    }

    fn job(&self) -> Option<ToolJob> {
        self.is_complete().then(|| ToolJob::Create {
            instruction: logo_instruction(&self.description),
        })
    }

    fn apply(&mut self, edit: FormEdit) -> std::result::Result<(), UnsupportedInput> {
        match edit {
            FormEdit::Text(text) => {
                self.set_description(text);
                Ok(())
            }
            FormEdit::Image { .. } => Err(unsupported(Self::VIEW, "image input")),
            FormEdit::Mode(_) => Err(unsupported(Self::VIEW, "editor mode")),
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("brand", self.description.clone())]
    }
}

/// Ad form: a description of the product or campaign.
#[derive(Debug, Clone, Default)]
pub struct AdMaker {
    description: String,
}

impl AdMaker {
    /// Sets the product description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Current product description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Tool for AdMaker {
    const VIEW: View = View::AdMaker;

    fn is_complete(&self) -> bool {
        has_text(&self.description)
    }

    fn job(&self) -> Option<ToolJob> {
        self.is_complete().then(|| ToolJob::Create {
            instruction: ad_instruction(&self.description),
        })
    }

    fn apply(&mut self, edit: FormEdit) -> std::result::Result<(), UnsupportedInput> {
        match edit {
            FormEdit::Text(text) => {
                self.set_description(text);
                Ok(())
            }
            FormEdit::Image { .. } => Err(unsupported(Self::VIEW, "image input")),
            FormEdit::Mode(_) => Err(unsupported(Self::VIEW, "editor mode")),
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("product", self.description.clone())]
    }
}

/// Photo editor form: a source photo, a mode and what to add, remove or
/// change.
#[derive(Debug, Clone, Default)]
pub struct PhotoEditor {
    image: Option<UploadedImage>,
    mode: EditorMode,
    subject: String,
}

impl PhotoEditor {
    /// Selects or clears the source photo.
    pub fn set_image(&mut self, image: Option<UploadedImage>) {
        self.image = image;
    }

    /// The source photo.
    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    /// Switches the mode.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }

    /// Current mode.
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Sets what the edit is about.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }
}

impl Tool for PhotoEditor {
    const VIEW: View = View::PhotoEditor;

    fn is_complete(&self) -> bool {
        self.image.is_some() && has_text(&self.subject)
    }

    fn job(&self) -> Option<ToolJob> {
        let image = self.image.as_ref()?;
        has_text(&self.subject).then(|| ToolJob::Edit {
            image: image.inline().clone(),
            instruction: self.mode.instruction(&self.subject),
        })
    }

    fn apply(&mut self, edit: FormEdit) -> std::result::Result<(), UnsupportedInput> {
        match edit {
            FormEdit::Image { slot: 1, image } => self.set_image(image),
            FormEdit::Image { slot, .. } => {
                return Err(unsupported(Self::VIEW, format!("image slot {slot}")))
            }
            FormEdit::Text(text) => self.set_subject(text),
            FormEdit::Mode(mode) => self.set_mode(mode),
        }
        Ok(())
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("image", describe_image(&self.image)),
            ("mode", self.mode.to_string()),
            ("subject", self.subject.clone()),
        ]
    }
}
