use reqwest::Client;
use tracing::{debug, warn};

use interview_core::IdentityContext;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::gateway::wire::{ErrorBody, UserDto};

/// Resolves who is driving the interview before the flow starts.
///
/// Never fails: no token, a rejected token or an unreachable service all
/// resolve to a guest context.
#[derive(Clone)]
pub struct IdentityResolver {
    client: Client,
    api_base: String,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            api_base: config.api_base(),
        }
    }

    pub async fn resolve(&self, token: Option<&str>) -> IdentityContext {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            debug!("no credential configured, continuing as guest");
            return IdentityContext::guest();
        };

        match self.fetch_user(token).await {
            Ok(user) => {
                debug!(user_id = %user.id, "resolved authenticated identity");
                IdentityContext::authenticated(user.id, user.email, user.full_name, token)
            }
            Err(err) => {
                warn!(%err, "could not resolve identity, continuing as guest");
                IdentityContext::guest()
            }
        }
    }

    async fn fetch_user(&self, token: &str) -> Result<UserDto, ServiceError> {
        let response = self
            .client
            .get(format!("{}/auth/me", self.api_base))
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.json::<ErrorBody>().await.ok().map(ErrorBody::into_detail);
            return Err(ServiceError::HttpStatus { status, detail });
        }
        Ok(response.json::<UserDto>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::Identity;
    use mockito::{Server, ServerGuard};

    fn resolver(server: &ServerGuard) -> IdentityResolver {
        let config = ServiceConfig {
            base_url: server.url(),
            ..ServiceConfig::default()
        };
        IdentityResolver::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn missing_token_is_guest_without_a_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/auth/me")
            .expect(0)
            .create_async()
            .await;

        let ctx = resolver(&server).resolve(None).await;
        mock.assert_async().await;
        assert!(ctx.identity().is_guest());
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/auth/me")
            .match_header("authorization", "Bearer good")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_id":"u-7","email":"dev@example.com","full_name":"Dev"}"#)
            .create_async()
            .await;

        let ctx = resolver(&server).resolve(Some("good")).await;
        assert_eq!(ctx.bearer_token(), Some("good"));
        match ctx.identity() {
            Identity::Authenticated { user_id, email, .. } => {
                assert_eq!(user_id.as_str(), "u-7");
                assert_eq!(email, "dev@example.com");
            }
            Identity::Guest => panic!("expected an authenticated identity"),
        }
        assert_eq!(ctx.identity().display_name(), "Dev");
    }

    #[tokio::test]
    async fn rejected_token_falls_back_to_guest() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/auth/me")
            .with_status(401)
            .with_body(r#"{"detail":"Could not validate credentials"}"#)
            .create_async()
            .await;

        let ctx = resolver(&server).resolve(Some("expired")).await;
        assert!(ctx.identity().is_guest());
        assert!(ctx.bearer_token().is_none());
    }

    #[tokio::test]
    async fn rejected_token_reports_status_and_detail() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/auth/me")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"Could not validate credentials"}"#)
            .create_async()
            .await;

        let err = resolver(&server).fetch_user("expired").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::HttpStatus { status, detail: Some(ref detail) }
                if status == reqwest::StatusCode::UNAUTHORIZED
                    && detail == "Could not validate credentials"
        ));
    }
}
