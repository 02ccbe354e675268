//! Tool screens, navigation and the result viewer.

pub mod command;
mod router;
mod screen;
mod session;
pub mod tools;
mod view;
pub mod viewer;

pub use command::{ShellCommand, ShellParseError, SHELL_HELP};
pub use router::{ActiveScreen, CompletedGeneration, PendingGeneration, RequestTicket, Router};
pub use screen::{CompletionOutcome, FormError, ScreenOps, ScreenStatus, ToolScreen};
pub use session::Studio;
pub use tools::{
    ad_instruction, logo_instruction, AdMaker, BrandLogo, CoupleFusion, FormEdit, Partner,
    PhotoEditor, Tool, ToolJob, UnsupportedInput,
};
pub use view::{EditorMode, View};
pub use viewer::{Bounds, PointerEvent, PointerPosition, ResultViewer, ZoomTransform, ZOOM_SCALE};
