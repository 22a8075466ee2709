use iced::Event;
use iced::widget::scrollable::Viewport;
use std::time::Instant;

use crate::auth::{AuthError, Session};

#[derive(Clone, Debug)]
pub enum Message {
    SplashElapsed,
    SessionChanged(Option<Session>),
    Tick(Instant),
    EventOccurred(Event),
    DismissToast(u64),
    ShowLogin,
    ShowRegister,
    LoginEmailChanged(String),
    LoginPasswordChanged(String),
    TogglePasswordVisibility,
    SubmitLogin,
    LoginFinished(Result<Session, AuthError>),
    RegisterNameChanged(String),
    RegisterEmailChanged(String),
    RegisterPasswordChanged(String),
    RegisterConfirmChanged(String),
    SubmitRegister,
    RegisterFinished(Result<String, AuthError>), // display name on success
    FeedScrolled(Viewport),
    TapVideo(usize),
    ToggleLike(usize),
    Share(usize),
    LogoutRequested,
    LogoutCancelled,
    LogoutConfirmed,
    SignedOut,
}
