use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use interview_core::IdentityContext;

use crate::config::{DEFAULT_MAX_QUESTIONS, ServiceConfig};
use crate::error::AppServicesError;
use crate::gateway::{HttpGateway, InMemoryGateway, InterviewGateway};
use crate::identity::IdentityResolver;
use crate::sessions::{InterviewController, SessionReader};

/// Assembles app-facing services around one resolved identity.
#[derive(Clone)]
pub struct AppServices {
    identity: IdentityContext,
    gateway: Arc<dyn InterviewGateway>,
    reader: Arc<SessionReader>,
    question_limit: u32,
}

impl AppServices {
    /// Resolve the caller and build services backed by the interview service.
    ///
    /// `token` overrides the token from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` for an unusable configuration and
    /// `AppServicesError::Http` if the HTTP client cannot be built.
    pub async fn connect(
        config: &ServiceConfig,
        token: Option<&str>,
    ) -> Result<Self, AppServicesError> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        let resolver = IdentityResolver::new(client.clone(), config);
        let identity = resolver.resolve(token.or_else(|| config.token())).await;
        info!(
            api_base = %config.api_base(),
            user = identity.identity().display_name(),
            "connected to interview service"
        );

        let gateway: Arc<dyn InterviewGateway> =
            Arc::new(HttpGateway::with_client(client, config, &identity));
        Ok(Self::with_gateway(gateway, identity, config.max_questions))
    }

    /// Build services over an in-process gateway.
    #[must_use]
    pub fn in_memory(gateway: InMemoryGateway, identity: IdentityContext) -> Self {
        Self::with_gateway(Arc::new(gateway), identity, DEFAULT_MAX_QUESTIONS)
    }

    fn with_gateway(
        gateway: Arc<dyn InterviewGateway>,
        identity: IdentityContext,
        question_limit: u32,
    ) -> Self {
        let reader = Arc::new(SessionReader::new(Arc::clone(&gateway)));
        Self {
            identity,
            gateway,
            reader,
            question_limit,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// A fresh controller for one interview.
    #[must_use]
    pub fn controller(&self) -> InterviewController {
        InterviewController::new(Arc::clone(&self.gateway), self.identity.clone())
            .with_question_limit(self.question_limit)
    }

    #[must_use]
    pub fn reader(&self) -> Arc<SessionReader> {
        Arc::clone(&self.reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn connect_without_token_is_guest() {
        let server = Server::new_async().await;
        let config = ServiceConfig {
            base_url: server.url(),
            ..ServiceConfig::default()
        };

        let services = AppServices::connect(&config, None).await.unwrap();
        assert!(services.identity().identity().is_guest());
    }

    #[tokio::test]
    async fn connect_rejects_invalid_config() {
        let config = ServiceConfig {
            timeout_secs: 0,
            ..ServiceConfig::default()
        };
        let err = AppServices::connect(&config, None).await.err();
        assert!(matches!(err, Some(AppServicesError::Config(_))));
    }
}
