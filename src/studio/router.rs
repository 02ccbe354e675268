//! The view router: sole owner of which screen is active.
//!
//! Each tool screen lives inside the router only while it is on view.
//! Navigating away drops it, and every generation it launched carries a
//! [`RequestTicket`] that stops matching once that happens.

use crate::error::Result;
use crate::image::{GeneratedImage, ImageProvider};
use crate::studio::screen::{CompletionOutcome, ScreenOps, ScreenStatus, ToolScreen};
use crate::studio::tools::{AdMaker, BrandLogo, CoupleFusion, PhotoEditor, ToolJob};
use crate::studio::view::View;
use crate::studio::viewer::ResultViewer;

/// The active screen together with its local state.
#[derive(Debug)]
pub enum ActiveScreen {
    /// Tool menu; no local state.
    Home,
    /// Couple fusion form.
    Couple(ToolScreen<CoupleFusion>),
    /// Logo form.
    Logo(ToolScreen<BrandLogo>),
    /// Ad form.
    Ad(ToolScreen<AdMaker>),
    /// Photo editor form.
    Editor(ToolScreen<PhotoEditor>),
}

impl ActiveScreen {
    fn fresh(view: View) -> Self {
        match view {
            View::Home => Self::Home,
            View::CoupleGenerator => Self::Couple(ToolScreen::new()),
            View::BrandLogo => Self::Logo(ToolScreen::new()),
            View::AdMaker => Self::Ad(ToolScreen::new()),
            View::PhotoEditor => Self::Editor(ToolScreen::new()),
        }
    }

    /// Which view this is.
    pub fn view(&self) -> View {
        match self {
            Self::Home => View::Home,
            Self::Couple(_) => View::CoupleGenerator,
            Self::Logo(_) => View::BrandLogo,
            Self::Ad(_) => View::AdMaker,
            Self::Editor(_) => View::PhotoEditor,
        }
    }

    /// The screen as a tool, or `None` on Home.
    pub fn as_tool(&self) -> Option<&dyn ScreenOps> {
        match self {
            Self::Home => None,
            Self::Couple(s) => Some(s),
            Self::Logo(s) => Some(s),
            Self::Ad(s) => Some(s),
            Self::Editor(s) => Some(s),
        }
    }

    /// Mutable variant of [`ActiveScreen::as_tool`].
    pub fn as_tool_mut(&mut self) -> Option<&mut dyn ScreenOps> {
        match self {
            Self::Home => None,
            Self::Couple(s) => Some(s),
            Self::Logo(s) => Some(s),
            Self::Ad(s) => Some(s),
            Self::Editor(s) => Some(s),
        }
    }
}

/// Identifies one launched generation: the screen, the visit to that
/// screen, and the attempt within the visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    view: View,
    visit: u64,
    seq: u64,
}

impl RequestTicket {
    /// The screen that launched the request.
    pub fn view(&self) -> View {
        self.view
    }
}

/// A generation that has been launched but not yet run.
#[derive(Debug, Clone)]
#[must_use = "a pending generation does nothing until run"]
pub struct PendingGeneration {
    ticket: RequestTicket,
    job: ToolJob,
}

impl PendingGeneration {
    /// Ticket to present on completion.
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    /// The call that will be made.
    pub fn job(&self) -> &ToolJob {
        &self.job
    }

    /// Performs the remote call.
    pub async fn run(self, provider: &dyn ImageProvider) -> CompletedGeneration {
        let result = self.job.run(provider).await;
        CompletedGeneration {
            ticket: self.ticket,
            result,
        }
    }
}

/// The result of a generation, addressed to the screen that launched it.
#[derive(Debug)]
pub struct CompletedGeneration {
    /// Where the result should go.
    pub ticket: RequestTicket,
    /// The image, or why there is none.
    pub result: Result<GeneratedImage>,
}

/// Holds the active view. Starts on Home.
#[derive(Debug)]
pub struct Router {
    active: ActiveScreen,
    visit: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// A router showing Home.
    pub fn new() -> Self {
        Self {
            active: ActiveScreen::Home,
            visit: 0,
        }
    }

    /// The active view.
    pub fn view(&self) -> View {
        self.active.view()
    }

    /// The active screen.
    pub fn active(&self) -> &ActiveScreen {
        &self.active
    }

    /// Shows `view` with fresh state, dropping the current screen.
    ///
    /// Navigating to the view already showing is a no-op. Returns whether
    /// the view changed.
    pub fn navigate_to(&mut self, view: View) -> bool {
        if self.active.view() == view {
            return false;
        }
        let from = self.active.view();
        if matches!(self.status(), Some(ScreenStatus::Pending)) {
            tracing::debug!(%from, "leaving screen with a request in flight");
        }
        self.visit += 1;
        self.active = ActiveScreen::fresh(view);
        tracing::debug!(%from, to = %view, visit = self.visit, "navigated");
        true
    }

    /// Shows Home.
    pub fn navigate_home(&mut self) -> bool {
        self.navigate_to(View::Home)
    }

    /// The active tool screen, if any.
    pub fn screen(&self) -> Option<&dyn ScreenOps> {
        self.active.as_tool()
    }

    /// Mutable access to the active tool screen.
    pub fn screen_mut(&mut self) -> Option<&mut dyn ScreenOps> {
        self.active.as_tool_mut()
    }

    /// Status of the active tool screen.
    pub fn status(&self) -> Option<ScreenStatus> {
        self.screen().map(|s| s.status())
    }

    /// The couple fusion screen, if active.
    pub fn couple_mut(&mut self) -> Option<&mut ToolScreen<CoupleFusion>> {
        match &mut self.active {
            ActiveScreen::Couple(s) => Some(s),
            _ => None,
        }
    }

    /// The logo screen, if active.
    pub fn logo_mut(&mut self) -> Option<&mut ToolScreen<BrandLogo>> {
        match &mut self.active {
            ActiveScreen::Logo(s) => Some(s),
            _ => None,
        }
    }

    /// The ad screen, if active.
    pub fn ad_mut(&mut self) -> Option<&mut ToolScreen<AdMaker>> {
        match &mut self.active {
            ActiveScreen::Ad(s) => Some(s),
            _ => None,
        }
    }

    /// The photo editor screen, if active.
    pub fn editor_mut(&mut self) -> Option<&mut ToolScreen<PhotoEditor>> {
        match &mut self.active {
            ActiveScreen::Editor(s) => Some(s),
            _ => None,
        }
    }

    /// Triggers generation on the active screen.
    ///
    /// Returns `None` when there is no tool screen or its action is
    /// disabled.
    pub fn trigger(&mut self) -> Option<PendingGeneration> {
        let visit = self.visit;
        let screen = self.active.as_tool_mut()?;
        let view = screen.view();
        let (seq, job) = screen.begin()?;
        Some(PendingGeneration {
            ticket: RequestTicket { view, visit, seq },
            job,
        })
    }

    /// Delivers a finished generation. Results for screens that are no
    /// longer on view are dropped.
    pub fn complete(&mut self, completed: CompletedGeneration) -> CompletionOutcome {
        let CompletedGeneration { ticket, result } = completed;
        if ticket.visit != self.visit || ticket.view != self.active.view() {
            tracing::debug!(
                view = %ticket.view,
                visit = ticket.visit,
                current_visit = self.visit,
                ok = result.is_ok(),
                "discarding stale generation result"
            );
            return CompletionOutcome::Discarded;
        }
        match self.active.as_tool_mut() {
            Some(screen) => screen.finish(ticket.seq, result),
            None => CompletionOutcome::Discarded,
        }
    }

    /// The open result viewer, if any.
    pub fn viewer_mut(&mut self) -> Option<&mut ResultViewer> {
        self.screen_mut()?.viewer_mut()
    }

    /// Closes the result viewer on the active screen.
    pub fn close_viewer(&mut self) -> bool {
        self.screen_mut().is_some_and(|s| s.close_viewer())
    }
}
