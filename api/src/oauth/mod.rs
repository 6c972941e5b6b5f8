use std::borrow::Cow;

use oauth2::{
    AuthUrl, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge,
    RedirectUrl, Scope, TokenUrl, basic::BasicClient, url,
};
use serde::{Deserialize, Serialize};

pub mod google;

type Client = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Debug, thiserror::Error)]
pub enum AuthorizationSetupError {
    #[error("missing OAuth {0}")]
    MissingCredential(&'static str),

    #[error("invalid provider endpoint")]
    InvalidEndpoint(#[source] url::ParseError),

    #[error("invalid redirect url {url:?}")]
    InvalidRedirectUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Static description of an OAuth2 authorization server.
#[derive(Debug)]
pub struct Provider {
    /// Also the session key the flow state is stored under.
    pub name: &'static str,
    pub auth_url: &'static str,
    pub token_url: &'static str,
    pub scopes: &'static [&'static str],
    pub callback_path: &'static str,
}

impl Provider {
    pub fn callback_url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.callback_path)
    }
}

/// In-flight state of one authorization attempt, kept in the user's session
/// until the provider calls back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationFlowState {
    pub provider: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

pub struct AuthorizationFlow {
    provider: &'static Provider,
    client_id: String,
    client: Client,
}

impl AuthorizationFlow {
    pub fn new(
        provider: &'static Provider,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, AuthorizationSetupError> {
        if client_id.is_empty() {
            return Err(AuthorizationSetupError::MissingCredential("client id"));
        }
        if client_secret.is_empty() {
            return Err(AuthorizationSetupError::MissingCredential("client secret"));
        }

        let auth_url = AuthUrl::new(provider.auth_url.to_owned())
            .map_err(AuthorizationSetupError::InvalidEndpoint)?;
        let token_url = TokenUrl::new(provider.token_url.to_owned())
            .map_err(AuthorizationSetupError::InvalidEndpoint)?;

        let client = BasicClient::new(ClientId::new(client_id.to_owned()))
            .set_client_secret(ClientSecret::new(client_secret.to_owned()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url);

        Ok(Self {
            provider,
            client_id: client_id.to_owned(),
            client,
        })
    }

    pub fn provider(&self) -> &'static Provider {
        self.provider
    }

    /// Builds the consent page URL bound to `redirect_uri`, together with the
    /// state the callback needs to finish the exchange.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
    ) -> Result<(url::Url, AuthorizationFlowState), AuthorizationSetupError> {
        let redirect_url = RedirectUrl::new(redirect_uri.to_owned()).map_err(|source| {
            AuthorizationSetupError::InvalidRedirectUrl {
                url: redirect_uri.to_owned(),
                source,
            }
        })?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(
                self.provider
                    .scopes
                    .iter()
                    .map(|scope| Scope::new((*scope).to_owned())),
            )
            .set_pkce_challenge(pkce_challenge)
            .set_redirect_uri(Cow::Owned(redirect_url))
            .url();

        let state = AuthorizationFlowState {
            provider: self.provider.name.to_owned(),
            client_id: self.client_id.clone(),
            redirect_uri: redirect_uri.to_owned(),
            scopes: self.provider.scopes.iter().map(|s| s.to_string()).collect(),
            csrf_state: csrf_token.secret().to_string(),
            pkce_verifier: pkce_verifier.secret().to_string(),
        };

        Ok((auth_url, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static TEST_PROVIDER: Provider = Provider {
        name: "test",
        auth_url: "https://idp.test/authorize",
        token_url: "https://idp.test/token",
        scopes: &["read", "write"],
        callback_path: "/TestCallback",
    };

    #[test]
    fn rejects_empty_credentials() {
        assert!(matches!(
            AuthorizationFlow::new(&TEST_PROVIDER, "", "secret"),
            Err(AuthorizationSetupError::MissingCredential("client id"))
        ));
        assert!(matches!(
            AuthorizationFlow::new(&TEST_PROVIDER, "id", ""),
            Err(AuthorizationSetupError::MissingCredential("client secret"))
        ));
    }

    #[test]
    fn relative_redirect_is_rejected() {
        let flow = AuthorizationFlow::new(&TEST_PROVIDER, "id", "secret").unwrap();
        let callback = TEST_PROVIDER.callback_url("");

        assert_eq!(callback, "/TestCallback");
        assert!(matches!(
            flow.authorization_url(&callback),
            Err(AuthorizationSetupError::InvalidRedirectUrl { .. })
        ));
    }

    #[test]
    fn url_and_state_agree() {
        let flow = AuthorizationFlow::new(&TEST_PROVIDER, "id", "secret").unwrap();
        let (url, state) = flow
            .authorization_url("https://app.test/TestCallback")
            .unwrap();

        assert!(url.as_str().starts_with("https://idp.test/authorize?"));

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let param = |name: &str| {
            query
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        assert_eq!(param("client_id").as_deref(), Some("id"));
        assert_eq!(param("scope").as_deref(), Some("read write"));
        assert_eq!(
            param("redirect_uri").as_deref(),
            Some("https://app.test/TestCallback")
        );
        assert_eq!(param("state"), Some(state.csrf_state.clone()));
        assert_eq!(param("code_challenge_method").as_deref(), Some("S256"));

        assert_eq!(state.provider, "test");
        assert_eq!(state.client_id, "id");
        assert_eq!(state.scopes, vec!["read".to_string(), "write".to_string()]);
        assert!(!state.pkce_verifier.is_empty());
    }

    #[test]
    fn every_call_gets_fresh_secrets() {
        let flow = AuthorizationFlow::new(&TEST_PROVIDER, "id", "secret").unwrap();
        let (_, first) = flow.authorization_url("https://app.test/cb").unwrap();
        let (_, second) = flow.authorization_url("https://app.test/cb").unwrap();

        assert_ne!(first.csrf_state, second.csrf_state);
        assert_ne!(first.pkce_verifier, second.pkce_verifier);
    }
}
