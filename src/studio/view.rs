//! Top-level screens and the photo editor's instruction modes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which top-level screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// The tool menu.
    #[default]
    Home,
    /// Merge two portraits into one couple photo.
    CoupleGenerator,
    /// Text-to-logo.
    BrandLogo,
    /// Text-to-advertisement.
    AdMaker,
    /// Text-guided edits of one photo.
    PhotoEditor,
}

impl View {
    /// The tool screens, in menu order.
    pub const TOOLS: [View; 4] = [
        View::CoupleGenerator,
        View::BrandLogo,
        View::AdMaker,
        View::PhotoEditor,
    ];

    /// Short identifier used on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::CoupleGenerator => "couple",
            Self::BrandLogo => "logo",
            Self::AdMaker => "ad",
            Self::PhotoEditor => "edit",
        }
    }

    /// Menu title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "NanoCanvas",
            Self::CoupleGenerator => "Couple Fusion",
            Self::BrandLogo => "Logo Craft",
            Self::AdMaker => "Ad Studio",
            Self::PhotoEditor => "Magic Edit",
        }
    }

    /// Menu subtitle.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Home => "Pick a tool",
            Self::CoupleGenerator => "Merge photos into one",
            Self::BrandLogo => "AI Brand Identity",
            Self::AdMaker => "Marketing Visuals",
            Self::PhotoEditor => "Add, Remove, Change",
        }
    }

    /// Returns true for everything except [`View::Home`].
    pub fn is_tool(&self) -> bool {
        !matches!(self, Self::Home)
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "couple" | "fusion" => Ok(Self::CoupleGenerator),
            "logo" => Ok(Self::BrandLogo),
            "ad" | "ads" => Ok(Self::AdMaker),
            "edit" | "editor" => Ok(Self::PhotoEditor),
            other => Err(format!("unknown screen '{other}'")),
        }
    }
}

/// How the photo editor phrases its instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditorMode {
    /// Insert something into the photo.
    #[default]
    Add,
    /// Take something out of the photo.
    Remove,
    /// Alter something already in the photo.
    Change,
}

impl EditorMode {
    /// All modes, in display order.
    pub const ALL: [EditorMode; 3] = [EditorMode::Add, EditorMode::Remove, EditorMode::Change];

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Remove => "Remove",
            Self::Change => "Change",
        }
    }

    /// Builds the instruction sent to the provider for `subject`.
    pub fn instruction(&self, subject: &str) -> String {
        let subject = subject.trim();
        match self {
            Self::Add => format!("Add {subject} to this image. Blend it naturally."),
            Self::Remove => {
                format!("Remove {subject} from this image. Fill in the background naturally.")
            }
            Self::Change => format!("Change {subject} in this image. Keep the rest consistent."),
        }
    }
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "change" => Ok(Self::Change),
            other => Err(format!("unknown editor mode '{other}'")),
        }
    }
}
