pub mod flow;
pub mod listener;

pub use flow::{
    AuthState, AuthorizationFlow, ConsentPresenter, DEFAULT_AUTH_TIMEOUT, LogPresenter,
    PLAYLIST_SCOPES,
};
pub use listener::{CallbackListener, CallbackOutcome};
