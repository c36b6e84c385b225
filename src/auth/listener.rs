use std::collections::HashMap;
use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, warn};
use url::Url;

use crate::error::AuthError;

pub const SUCCESS_HTML: &str =
    "<html><body>Authorization received. You may close this window.</body></html>";
pub const FAILURE_HTML: &str = "<html><body>No authorization code received.</body></html>";
const ALREADY_HANDLED_HTML: &str =
    "<html><body>Authorization was already handled. You may close this window.</body></html>";

/// What the browser redirect carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    /// Redirect without a code; holds the `error` parameter if one was sent.
    Denied(String),
}

type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>;

/// One-shot HTTP endpoint bound to the redirect URI.
///
/// The socket is owned by this value and, once [`CallbackListener::wait`]
/// starts, by the future it returns; it is closed as soon as either is
/// dropped, so the address can be bound again right away.
pub struct CallbackListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    path: String,
}

impl CallbackListener {
    pub async fn bind(redirect_uri: &Url) -> Result<Self, AuthError> {
        let host = redirect_uri
            .host_str()
            .ok_or_else(|| AuthError::InvalidRedirectUri(format!("{} has no host", redirect_uri)))?;
        let port = redirect_uri
            .port_or_known_default()
            .ok_or_else(|| AuthError::InvalidRedirectUri(format!("{} has no port", redirect_uri)))?;

        let listener = TcpListener::bind((host, port)).await?;
        let local_addr = listener.local_addr()?;
        let path = redirect_uri.path().to_string();

        debug!("Callback listener bound on {}{}", local_addr, path);

        Ok(Self {
            listener,
            local_addr,
            path,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve the redirect path until the first redirect arrives or `timeout`
    /// elapses. `Ok(None)` means the timer won.
    ///
    /// Server, redirect and timer are polled together; whichever finishes
    /// first ends the race and the losers are dropped with the socket.
    pub async fn wait(self, timeout: Duration) -> Result<Option<CallbackOutcome>, AuthError> {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let slot: OutcomeSlot = Arc::new(Mutex::new(Some(outcome_tx)));

        let app = Router::new()
            .route(&self.path, get(callback))
            .with_state(slot);
        let server = axum::serve(self.listener, app).into_future();

        let result = tokio::select! {
            outcome = outcome_rx => outcome.map(Some).map_err(|_| stopped()),
            _ = tokio::time::sleep(timeout) => Ok(None),
            served = server => Err(match served {
                Ok(()) => stopped(),
                Err(e) => AuthError::Listener(e),
            }),
        };

        debug!("Callback listener on {} closed", self.local_addr);
        result
    }
}

fn stopped() -> AuthError {
    AuthError::Listener(io::Error::other(
        "callback listener stopped before a redirect arrived",
    ))
}

async fn callback(
    State(slot): State<OutcomeSlot>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<&'static str> {
    let outcome = match params.get("code").filter(|code| !code.is_empty()) {
        Some(code) => CallbackOutcome::Code(code.clone()),
        None => CallbackOutcome::Denied(
            params
                .get("error")
                .cloned()
                .unwrap_or_else(|| "no authorization code in redirect".to_string()),
        ),
    };

    let Some(sender) = slot.lock().await.take() else {
        return Html(ALREADY_HANDLED_HTML);
    };

    let page = match outcome {
        CallbackOutcome::Code(_) => SUCCESS_HTML,
        CallbackOutcome::Denied(_) => FAILURE_HTML,
    };

    if sender.send(outcome).is_err() {
        warn!("Authorization redirect arrived after the flow stopped waiting");
    }

    Html(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_redirect_uri(path: &str) -> Url {
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);
        Url::parse(&format!("http://127.0.0.1:{}{}", port, path)).unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_redirect_code_is_delivered() {
        let redirect = free_redirect_uri("/callback");
        let listener = CallbackListener::bind(&redirect).await.unwrap();
        let addr = listener.local_addr();

        let target = format!("{}?code=abc", redirect);
        let page = tokio::spawn(async move {
            reqwest::get(target).await.unwrap().text().await.unwrap()
        });

        let outcome = listener.wait(Duration::from_secs(5)).await.unwrap();

        assert_eq!(outcome, Some(CallbackOutcome::Code("abc".to_string())));
        assert_eq!(page.await.unwrap(), SUCCESS_HTML);
        assert!(std::net::TcpListener::bind(addr).is_ok());
    }

    #[tokio::test]
    async fn test_only_first_redirect_is_accepted() {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let slot: OutcomeSlot = Arc::new(Mutex::new(Some(outcome_tx)));

        let first = callback(State(slot.clone()), query(&[("code", "first")])).await;
        let second = callback(State(slot), query(&[("code", "second")])).await;

        assert_eq!(first.0, SUCCESS_HTML);
        assert_eq!(second.0, ALREADY_HANDLED_HTML);
        assert_eq!(
            outcome_rx.await.unwrap(),
            CallbackOutcome::Code("first".to_string())
        );
    }

    #[tokio::test]
    async fn test_redirect_without_code_is_denied() {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let slot: OutcomeSlot = Arc::new(Mutex::new(Some(outcome_tx)));

        let page = callback(State(slot), query(&[("error", "access_denied")])).await;

        assert_eq!(page.0, FAILURE_HTML);
        assert_eq!(
            outcome_rx.await.unwrap(),
            CallbackOutcome::Denied("access_denied".to_string())
        );
    }

    #[tokio::test]
    async fn test_other_paths_are_not_accepted() {
        let redirect = free_redirect_uri("/callback");
        let listener = CallbackListener::bind(&redirect).await.unwrap();

        let target = format!("http://{}/favicon.ico", listener.local_addr());
        let status = tokio::spawn(async move { reqwest::get(target).await.unwrap().status() });

        let outcome = listener.wait(Duration::from_millis(500)).await.unwrap();

        assert_eq!(status.await.unwrap().as_u16(), 404);
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn test_dropped_listener_releases_port() {
        let redirect = free_redirect_uri("/callback");
        let listener = CallbackListener::bind(&redirect).await.unwrap();
        let addr = listener.local_addr();

        drop(listener);

        assert!(std::net::TcpListener::bind(addr).is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_wait_releases_port() {
        let redirect = free_redirect_uri("/callback");
        let listener = CallbackListener::bind(&redirect).await.unwrap();
        let addr = listener.local_addr();

        let waited =
            tokio::time::timeout(Duration::from_millis(50), listener.wait(Duration::from_secs(60)))
                .await;

        assert!(waited.is_err());
        assert!(std::net::TcpListener::bind(addr).is_ok());
    }
}
