//! The lifecycle shared by every tool screen.

use crate::error::Result;
use crate::image::GeneratedImage;
use crate::studio::tools::{FormEdit, Tool, ToolJob, UnsupportedInput};
use crate::studio::view::View;
use crate::studio::viewer::ResultViewer;

/// Externally visible state of a tool screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenStatus {
    /// Required inputs are missing; generation is disabled.
    Idle,
    /// Inputs are complete; generation is enabled.
    Ready,
    /// A request is in flight; generation is disabled.
    Pending,
    /// A result is open in the viewer.
    Succeeded,
}

/// What happened when a generation finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The result is open in the viewer.
    Succeeded,
    /// The attempt failed; carries the notice shown to the user.
    Failed(String),
    /// The screen that asked for it is gone or moved on.
    Discarded,
}

/// Why a form edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The viewer covers the form until it is closed.
    #[error("close the current result first")]
    ResultOpen,
    /// The form has no such field.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedInput),
}

#[derive(Debug)]
enum Phase {
    Editing { notice: Option<String> },
    Pending { seq: u64 },
    Succeeded { viewer: ResultViewer },
}

/// One tool's inputs plus the state of its current generation attempt.
#[derive(Debug)]
pub struct ToolScreen<T: Tool> {
    inputs: T,
    phase: Phase,
    next_seq: u64,
}

impl<T: Tool> Default for ToolScreen<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tool> ToolScreen<T> {
    /// A screen with empty inputs.
    pub fn new() -> Self {
        Self {
            inputs: T::default(),
            phase: Phase::Editing { notice: None },
            next_seq: 0,
        }
    }

    /// The form inputs.
    pub fn inputs(&self) -> &T {
        &self.inputs
    }

    /// Mutable access to the form inputs.
    pub fn inputs_mut(&mut self) -> &mut T {
        &mut self.inputs
    }
}

/// Object-safe operations on any tool screen.
pub trait ScreenOps: Send {
    /// Which screen this is.
    fn view(&self) -> View;

    /// Current lifecycle state.
    fn status(&self) -> ScreenStatus;

    /// True iff the generation action is enabled.
    fn can_generate(&self) -> bool {
        self.status() == ScreenStatus::Ready
    }

    /// Notice from the last failed attempt, if any.
    fn notice(&self) -> Option<&str>;

    /// Moves to Pending and returns the request to run, or `None` when the
    /// action is disabled.
    fn begin(&mut self) -> Option<(u64, ToolJob)>;

    /// Applies the outcome of attempt `seq`.
    fn finish(&mut self, seq: u64, result: Result<GeneratedImage>) -> CompletionOutcome;

    /// The open viewer, when Succeeded.
    fn viewer(&self) -> Option<&ResultViewer>;

    /// Mutable access to the open viewer.
    fn viewer_mut(&mut self) -> Option<&mut ResultViewer>;

    /// Closes the viewer, dropping the result and keeping the inputs.
    fn close_viewer(&mut self) -> bool;

    /// Edits the form. Refused while a result is open.
    fn apply(&mut self, edit: FormEdit) -> std::result::Result<(), FormError>;

    /// Current field values for display.
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl<T: Tool> ScreenOps for ToolScreen<T> {
    fn view(&self) -> View {
        T::VIEW
    }

    fn status(&self) -> ScreenStatus {
        match self.phase {
            Phase::Pending { .. } => ScreenStatus::Pending,
            Phase::Succeeded { .. } => ScreenStatus::Succeeded,
            Phase::Editing { .. } if self.inputs.is_complete() => ScreenStatus::Ready,
            Phase::Editing { .. } => ScreenStatus::Idle,
        }
    }

    fn notice(&self) -> Option<&str> {
        match &self.phase {
            Phase::Editing { notice } => notice.as_deref(),
            _ => None,
        }
    }

    fn begin(&mut self) -> Option<(u64, ToolJob)> {
        if !matches!(self.phase, Phase::Editing { .. }) {
            return None;
        }
        let job = self.inputs.job()?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.phase = Phase::Pending { seq };
        tracing::debug!(view = T::VIEW.slug(), seq, "generation started");
        Some((seq, job))
    }

    fn finish(&mut self, seq: u64, result: Result<GeneratedImage>) -> CompletionOutcome {
        match self.phase {
            Phase::Pending { seq: pending } if pending == seq => {}
            _ => {
                tracing::debug!(view = T::VIEW.slug(), seq, "ignoring completion for an attempt that is not pending");
                return CompletionOutcome::Discarded;
            }
        }

        match result {
            Ok(image) => {
                tracing::debug!(view = T::VIEW.slug(), seq, bytes = image.size(), "generation succeeded");
                self.phase = Phase::Succeeded {
                    viewer: ResultViewer::new(image),
                };
                CompletionOutcome::Succeeded
            }
            Err(err) => {
                tracing::warn!(view = T::VIEW.slug(), seq, kind = ?err.kind(), "generation failed: {err}");
                let notice = err.user_message();
                self.phase = Phase::Editing {
                    notice: Some(notice.clone()),
                };
                CompletionOutcome::Failed(notice)
            }
        }
    }

    fn viewer(&self) -> Option<&ResultViewer> {
        match &self.phase {
            Phase::Succeeded { viewer } => Some(viewer),
            _ => None,
        }
    }

    fn viewer_mut(&mut self) -> Option<&mut ResultViewer> {
        match &mut self.phase {
            Phase::Succeeded { viewer } => Some(viewer),
            _ => None,
        }
    }

    fn close_viewer(&mut self) -> bool {
        if matches!(self.phase, Phase::Succeeded { .. }) {
            self.phase = Phase::Editing { notice: None };
            true
        } else {
            false
        }
    }

    fn apply(&mut self, edit: FormEdit) -> std::result::Result<(), FormError> {
        if matches!(self.phase, Phase::Succeeded { .. }) {
            return Err(FormError::ResultOpen);
        }
        Ok(self.inputs.apply(edit)?)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        self.inputs.fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CanvasError, GENERIC_FAILURE_NOTICE};
    use crate::image::stub::sample_image;
    use crate::image::UploadedImage;
    use crate::studio::tools::{AdMaker, BrandLogo, CoupleFusion, Partner, PhotoEditor};

    fn upload() -> UploadedImage {
        UploadedImage::from_bytes("p.png", vec![0x89, 0x50, 0x4E, 0x47, 1])
    }

    fn ready_logo() -> ToolScreen<BrandLogo> {
        let mut screen = ToolScreen::<BrandLogo>::new();
        screen.inputs_mut().set_description("Acme");
        screen
    }

    #[test]
    fn test_enabled_iff_inputs_complete() {
        let mut couple = ToolScreen::<CoupleFusion>::new();
        assert_eq!(couple.status(), ScreenStatus::Idle);
        assert!(!couple.can_generate());
        couple.inputs_mut().set_partner(Partner::One, Some(upload()));
        assert!(!couple.can_generate());
        couple.inputs_mut().set_partner(Partner::Two, Some(upload()));
        assert!(couple.can_generate());

        let mut ad = ToolScreen::<AdMaker>::new();
        assert!(!ad.can_generate());
        ad.inputs_mut().set_description("shoes");
        assert!(ad.can_generate());

        let mut editor = ToolScreen::<PhotoEditor>::new();
        editor.inputs_mut().set_subject("hat");
        assert!(!editor.can_generate());
        editor.inputs_mut().set_image(Some(upload()));
        assert!(editor.can_generate());
    }

    #[test]
    fn test_begin_disabled_when_idle() {
        let mut screen = ToolScreen::<BrandLogo>::new();
        assert!(screen.begin().is_none());
        assert_eq!(screen.status(), ScreenStatus::Idle);
    }

    #[test]
    fn test_repeated_begin_while_pending() {
        let mut screen = ready_logo();
        assert!(screen.begin().is_some());
        assert_eq!(screen.status(), ScreenStatus::Pending);
        assert!(!screen.can_generate());
        assert!(screen.begin().is_none());
        assert!(screen.begin().is_none());
        assert_eq!(screen.status(), ScreenStatus::Pending);
    }

    #[test]
    fn test_success_opens_viewer() {
        let mut screen = ready_logo();
        let (seq, _) = screen.begin().unwrap();
        assert_eq!(
            screen.finish(seq, Ok(sample_image())),
            CompletionOutcome::Succeeded
        );
        assert_eq!(screen.status(), ScreenStatus::Succeeded);
        assert_eq!(screen.viewer().unwrap().image(), &sample_image());
        assert!(!screen.can_generate());
    }

    #[test]
    fn test_failure_returns_to_ready_without_image() {
        let mut screen = ready_logo();
        let (seq, _) = screen.begin().unwrap();
        let outcome = screen.finish(
            seq,
            Err(CanvasError::Api {
                status: 500,
                message: "boom".into(),
            }),
        );
        assert_eq!(
            outcome,
            CompletionOutcome::Failed(GENERIC_FAILURE_NOTICE.into())
        );
        assert_eq!(screen.status(), ScreenStatus::Ready);
        assert!(screen.viewer().is_none());
        assert_eq!(screen.notice(), Some(GENERIC_FAILURE_NOTICE));

        // Retrying clears the notice.
        let (retry, _) = screen.begin().unwrap();
        assert!(retry > seq);
        assert_eq!(screen.notice(), None);
    }

    #[test]
    fn test_close_viewer_keeps_inputs() {
        let mut screen = ready_logo();
        let (seq, _) = screen.begin().unwrap();
        screen.finish(seq, Ok(sample_image()));
        assert!(screen.close_viewer());
        assert_eq!(screen.status(), ScreenStatus::Ready);
        assert!(screen.viewer().is_none());
        assert_eq!(screen.inputs().description(), "Acme");
        assert!(!screen.close_viewer());
    }

    #[test]
    fn test_edits_refused_while_result_open() {
        let mut screen = ready_logo();
        let (seq, _) = screen.begin().unwrap();
        screen.finish(seq, Ok(sample_image()));

        assert_eq!(
            screen.apply(FormEdit::Text(String::new())),
            Err(FormError::ResultOpen)
        );
        assert_eq!(screen.inputs().description(), "Acme");

        assert!(screen.close_viewer());
        assert_eq!(screen.status(), ScreenStatus::Ready);
        assert_eq!(screen.inputs().description(), "Acme");
        screen.apply(FormEdit::Text("Globex".into())).unwrap();
        assert_eq!(screen.inputs().description(), "Globex");
    }

    #[test]
    fn test_edits_allowed_while_pending() {
        let mut screen = ready_logo();
        screen.begin().unwrap();
        screen.apply(FormEdit::Text("Globex".into())).unwrap();
        assert_eq!(screen.inputs().description(), "Globex");
        assert!(matches!(
            screen.apply(FormEdit::Mode(crate::studio::EditorMode::Remove)),
            Err(FormError::Unsupported(_))
        ));
    }

    #[test]
    fn test_finish_with_wrong_seq_is_discarded() {
        let mut screen = ready_logo();
        let (seq, _) = screen.begin().unwrap();
        assert_eq!(
            screen.finish(seq + 1, Ok(sample_image())),
            CompletionOutcome::Discarded
        );
        assert_eq!(screen.status(), ScreenStatus::Pending);
        screen.finish(seq, Ok(sample_image()));
        assert_eq!(
            screen.finish(seq, Ok(sample_image())),
            CompletionOutcome::Discarded
        );
    }
}
