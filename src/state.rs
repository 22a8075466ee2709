use iced::Size;
use iced::keyboard::key;
use iced::task;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::feed::{page_offset, snap_target};
use crate::forms::{LoginForm, RegisterForm};
use crate::loader::VideoSlots;
use crate::motion::Entrance;
use crate::reels::{PauseChange, ReelsScreen};
use crate::root::{RootComposer, Screen};
use crate::toast::Toasts;

pub const SPLASH_FADE: Duration = Duration::from_millis(1200);

pub const FORM_ENTRANCE: Entrance = Entrance {
    duration: Duration::from_millis(800),
    offset: 50.0,
};

/// Which auth form is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Register,
}

/// The feed screen: playback model, decoders and the logout prompt.
pub struct FeedView {
    pub reels: ReelsScreen,
    pub videos: VideoSlots,
    pub confirm_logout: bool,
}

/// What a key press means on the feed screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKey {
    CancelLogout,
    PageTo(usize),
}

impl FeedView {
    /// A feed with no decoders open yet; see [`FeedView::sync_videos`].
    pub fn new(reels: ReelsScreen) -> Self {
        let videos = VideoSlots::new(reels.feed().len());
        FeedView {
            reels,
            videos,
            confirm_logout: false,
        }
    }

    pub fn sync_videos(&mut self) {
        self.videos.sync(&self.reels);
    }

    /// Record a scroll viewport. Returns the page to snap to when the list
    /// stopped between pages.
    pub fn scrolled(&mut self, offset: f32, viewport: f32) -> Option<usize> {
        if (viewport - self.reels.page_height()).abs() > 0.5 {
            self.reels.set_page_height(viewport);
        }
        let changes = self.reels.scrolled(offset, viewport);
        self.apply(&changes);
        snap_target(
            offset,
            self.reels.page_height(),
            self.reels.active(),
            self.reels.feed().len(),
        )
    }

    /// Settle on `index`, clamped to the feed. Returns the list offset to
    /// scroll to.
    pub fn page_to(&mut self, index: usize) -> Option<f32> {
        let last = self.reels.feed().len().checked_sub(1)?;
        let page = self.reels.page_height();
        let y = page_offset(index.min(last), page);
        let changes = self.reels.scrolled(y, page);
        self.apply(&changes);
        Some(y)
    }

    pub fn key_action(&self, named: key::Named) -> Option<FeedKey> {
        if self.confirm_logout {
            return (named == key::Named::Escape).then_some(FeedKey::CancelLogout);
        }
        let active = self.reels.active();
        match named {
            key::Named::ArrowDown | key::Named::PageDown => Some(FeedKey::PageTo(active + 1)),
            key::Named::ArrowUp | key::Named::PageUp => {
                Some(FeedKey::PageTo(active.saturating_sub(1)))
            }
            _ => None,
        }
    }

    /// Open the logout prompt; everything pauses while it is up.
    pub fn request_logout(&mut self) {
        self.confirm_logout = true;
        let changes = self.reels.set_force_pause(true);
        self.apply(&changes);
    }

    pub fn cancel_logout(&mut self) {
        self.confirm_logout = false;
        let changes = self.reels.set_force_pause(false);
        self.apply(&changes);
    }

    /// Close the prompt for sign-out. Playback stays force-paused until the
    /// feed is unmounted.
    pub fn accept_logout(&mut self) {
        self.confirm_logout = false;
    }

    fn apply(&mut self, changes: &[PauseChange]) {
        if changes.is_empty() {
            return;
        }
        self.videos.apply(changes);
        log::debug!("playing reels {:?}", self.reels.playing());
    }
}

/// Application state.
pub struct App {
    pub config: Config,
    pub provider: Arc<dyn IdentityProvider>,
    pub root: RootComposer,
    pub screen: Screen,
    pub auth_screen: AuthScreen,
    pub login: LoginForm,
    pub register: RegisterForm,
    pub feed: Option<FeedView>,
    pub toasts: Toasts,
    pub window: Size,
    pub now: Instant,
    pub splash_since: Instant,
    pub entrance_since: Instant,
    // Aborts the splash timer when the app goes away.
    pub _splash_timer: Option<task::Handle>,
}

impl App {
    pub fn new(config: Config, provider: Arc<dyn IdentityProvider>) -> Self {
        let now = Instant::now();
        App {
            window: Size::new(config.window_width, config.window_height),
            config,
            provider,
            root: RootComposer::default(),
            screen: Screen::Splash,
            auth_screen: AuthScreen::Login,
            login: LoginForm::default(),
            register: RegisterForm::default(),
            feed: None,
            toasts: Toasts::default(),
            now,
            splash_since: now,
            entrance_since: now,
            _splash_timer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;

    const PAGE: f32 = 800.0;

    fn feed_view() -> FeedView {
        FeedView::new(ReelsScreen::new(Feed::bundled().unwrap(), PAGE))
    }

    #[test]
    fn logout_prompt_pauses_everything_until_cancelled() {
        let mut view = feed_view();
        assert_eq!(view.reels.playing(), vec![0]);

        view.request_logout();
        assert!(view.confirm_logout);
        assert!(view.reels.playing().is_empty());

        view.cancel_logout();
        assert!(!view.confirm_logout);
        assert_eq!(view.reels.playing(), vec![0]);
    }

    #[test]
    fn accepted_logout_keeps_playback_paused() {
        let mut view = feed_view();
        view.page_to(2);
        view.request_logout();
        view.accept_logout();
        assert!(!view.confirm_logout);
        assert!(view.reels.playing().is_empty());

        view.page_to(0);
        assert!(view.reels.playing().is_empty());
    }

    #[test]
    fn escape_only_cancels_an_open_prompt() {
        let mut view = feed_view();
        assert_eq!(view.key_action(key::Named::Escape), None);

        view.request_logout();
        assert_eq!(
            view.key_action(key::Named::Escape),
            Some(FeedKey::CancelLogout)
        );
        assert_eq!(view.key_action(key::Named::ArrowDown), None);
    }

    #[test]
    fn arrow_paging_moves_active_at_once_and_clamps() {
        let mut view = feed_view();
        let last = view.reels.feed().len() - 1;
        assert_eq!(view.key_action(key::Named::ArrowUp), Some(FeedKey::PageTo(0)));

        assert_eq!(view.key_action(key::Named::ArrowDown), Some(FeedKey::PageTo(1)));
        assert_eq!(view.page_to(1), Some(PAGE));
        assert_eq!(view.reels.active(), 1);
        assert_eq!(view.reels.playing(), vec![1]);

        assert_eq!(view.page_to(last + 3), Some(page_offset(last, PAGE)));
        assert_eq!(view.reels.active(), last);
        assert_eq!(
            view.key_action(key::Named::PageDown),
            Some(FeedKey::PageTo(last + 1))
        );
        view.page_to(last + 1);
        assert_eq!(view.reels.active(), last);
        assert_eq!(view.reels.playing(), vec![last]);
    }

    #[test]
    fn free_scroll_between_pages_settles_on_a_page() {
        let mut view = feed_view();
        assert_eq!(view.scrolled(0.75 * PAGE, PAGE), Some(1));
        assert_eq!(view.reels.active(), 0);

        view.page_to(1);
        assert_eq!(view.reels.playing(), vec![1]);
        assert_eq!(view.scrolled(PAGE, PAGE), None);

        assert_eq!(view.scrolled(0.9 * PAGE, PAGE), Some(0));
        view.page_to(0);
        assert_eq!(view.reels.active(), 0);
        assert_eq!(view.reels.playing(), vec![0]);
    }
}
