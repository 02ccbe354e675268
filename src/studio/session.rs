//! Router plus provider, for callers that run one generation at a time.

use crate::image::ImageProvider;
use crate::studio::router::Router;
use crate::studio::screen::CompletionOutcome;
use std::sync::Arc;

/// A router bound to a provider.
pub struct Studio {
    router: Router,
    provider: Arc<dyn ImageProvider>,
}

impl Studio {
    /// Starts on Home.
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self {
            router: Router::new(),
            provider,
        }
    }

    /// The router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Mutable access to the router.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Triggers generation on the active screen and waits for it.
    ///
    /// Returns `None` when the action is disabled.
    pub async fn generate(&mut self) -> Option<CompletionOutcome> {
        let pending = self.router.trigger()?;
        let completed = pending.run(self.provider.as_ref()).await;
        Some(self.router.complete(completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CanvasError, GENERIC_FAILURE_NOTICE};
    use crate::image::stub::StubProvider;
    use crate::studio::screen::ScreenStatus;
    use crate::studio::view::View;

    #[tokio::test]
    async fn test_generate_disabled_without_inputs() {
        let mut studio = Studio::new(Arc::new(StubProvider::succeeding()));
        assert!(studio.generate().await.is_none());
        studio.router_mut().navigate_to(View::BrandLogo);
        assert!(studio.generate().await.is_none());
    }

    #[tokio::test]
    async fn test_logo_round_trip() {
        let stub = Arc::new(StubProvider::succeeding());
        let mut studio = Studio::new(stub.clone());
        studio.router_mut().navigate_to(View::BrandLogo);
        studio
            .router_mut()
            .logo_mut()
            .unwrap()
            .inputs_mut()
            .set_description("Acme Coffee");

        assert_eq!(studio.generate().await, Some(CompletionOutcome::Succeeded));
        assert_eq!(studio.router().status(), Some(ScreenStatus::Succeeded));
        assert!(stub
            .last_request()
            .unwrap()
            .instruction
            .contains("brand logo for: Acme Coffee."));
    }

    #[tokio::test]
    async fn test_failure_then_manual_retry() {
        let stub = Arc::new(StubProvider::failing(CanvasError::Auth("nope".into())));
        let mut studio = Studio::new(stub.clone());
        studio.router_mut().navigate_to(View::AdMaker);
        studio
            .router_mut()
            .ad_mut()
            .unwrap()
            .inputs_mut()
            .set_description("shoes");

        assert_eq!(
            studio.generate().await,
            Some(CompletionOutcome::Failed(GENERIC_FAILURE_NOTICE.into()))
        );
        assert_eq!(studio.router().status(), Some(ScreenStatus::Ready));
        assert_eq!(stub.requests.lock().unwrap().len(), 1);

        stub.push(Ok(crate::image::stub::sample_image()));
        assert_eq!(studio.generate().await, Some(CompletionOutcome::Succeeded));
        assert_eq!(stub.requests.lock().unwrap().len(), 2);
    }
}
