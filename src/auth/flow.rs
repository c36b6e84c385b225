use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::auth::listener::{CallbackListener, CallbackOutcome};
use crate::catalog::{AccessToken, CatalogApi};
use crate::config::CatalogConfig;
use crate::error::AuthError;

pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Scopes needed to find, create and rewrite the user's playlist.
pub const PLAYLIST_SCOPES: &[&str] = &[
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-private",
    "playlist-modify-public",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    AwaitingRedirect,
    Exchanging,
    Authorized,
    Failed,
    TimedOut,
}

impl AuthState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Authorized | Self::Failed | Self::TimedOut)
    }
}

/// Shows the consent URL to the user once the callback listener is ready.
pub trait ConsentPresenter: Send + Sync {
    fn present(&self, consent_url: &str);
}

impl<F> ConsentPresenter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn present(&self, consent_url: &str) {
        self(consent_url)
    }
}

/// Logs the consent URL; used when no presenter is configured.
pub struct LogPresenter;

impl ConsentPresenter for LogPresenter {
    fn present(&self, consent_url: &str) {
        info!("Open this URL in your browser to authorize Spotify: {}", consent_url);
    }
}

/// OAuth authorization-code flow through a local one-shot callback listener.
pub struct AuthorizationFlow<'a> {
    catalog: &'a dyn CatalogApi,
    client_id: String,
    auth_endpoint: String,
    presenter: Box<dyn ConsentPresenter + 'a>,
    state: AuthState,
}

impl<'a> AuthorizationFlow<'a> {
    pub fn new(catalog: &'a dyn CatalogApi, config: &CatalogConfig) -> Self {
        Self {
            catalog,
            client_id: config.client_id.clone(),
            auth_endpoint: config.auth_endpoint.clone(),
            presenter: Box::new(LogPresenter),
            state: AuthState::Idle,
        }
    }

    pub fn with_presenter(mut self, presenter: impl ConsentPresenter + 'a) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Build the consent URL. Pure string building, no network access.
    pub fn consent_url(&self, scopes: &[&str], redirect_uri: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.auth_endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("scope", scopes.join(" ").as_str()),
                ("redirect_uri", redirect_uri),
            ],
        )
        .map_err(|e| AuthError::InvalidAuthEndpoint(format!("{}: {}", self.auth_endpoint, e)))
    }

    /// Run the flow once and return the user token.
    ///
    /// `TimedOut` and `Failed` are terminal; retrying means calling
    /// `authorize` again. The callback listener is released before this
    /// returns, whichever way it ends, and also when the returned future is
    /// dropped mid-wait.
    pub async fn authorize(
        &mut self,
        scopes: &[&str],
        redirect_uri: &str,
        timeout: Duration,
    ) -> Result<AccessToken, AuthError> {
        self.transition(AuthState::Idle);

        let consent_url = match self.consent_url(scopes, redirect_uri) {
            Ok(url) => url,
            Err(e) => {
                self.transition(AuthState::Failed);
                return Err(e);
            }
        };
        let redirect = match Url::parse(redirect_uri) {
            Ok(url) => url,
            Err(e) => {
                self.transition(AuthState::Failed);
                return Err(AuthError::InvalidRedirectUri(format!("{}: {}", redirect_uri, e)));
            }
        };

        let listener = match CallbackListener::bind(&redirect).await {
            Ok(listener) => listener,
            Err(e) => {
                self.transition(AuthState::Failed);
                return Err(e);
            }
        };

        self.transition(AuthState::AwaitingRedirect);
        info!("Waiting for Spotify authorization response at {}", redirect_uri);
        self.presenter.present(consent_url.as_str());

        let code = match listener.wait(timeout).await {
            Ok(Some(CallbackOutcome::Code(code))) => code,
            Ok(Some(CallbackOutcome::Denied(reason))) => {
                warn!("Authorization redirect carried no code: {}", reason);
                self.transition(AuthState::Failed);
                return Err(AuthError::Denied(reason));
            }
            Ok(None) => {
                warn!("Timed out waiting for Spotify authorization response");
                self.transition(AuthState::TimedOut);
                return Err(AuthError::TimedOut(timeout));
            }
            Err(e) => {
                self.transition(AuthState::Failed);
                return Err(e);
            }
        };

        self.transition(AuthState::Exchanging);
        match self.catalog.exchange_authorization_code(&code, redirect_uri).await {
            Ok(Some(token)) => {
                self.transition(AuthState::Authorized);
                Ok(token)
            }
            Ok(None) => {
                self.transition(AuthState::Failed);
                Err(AuthError::NoToken)
            }
            Err(e) => {
                self.transition(AuthState::Failed);
                Err(AuthError::Exchange(e))
            }
        }
    }

    fn transition(&mut self, next: AuthState) {
        debug!("Authorization state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
