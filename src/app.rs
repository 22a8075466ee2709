use iced::keyboard;
use iced::widget::operation::scroll_to;
use iced::widget::scrollable::AbsoluteOffset;
use iced::{Element, Point, Subscription, Task, event, window};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::{
    AuthError, FirebaseIdentity, IdentityProvider, LocalIdentity, Session, SessionStore,
};
use crate::config::Config;
use crate::feed::Feed;
use crate::forms::{FormKind, LoginForm, RegisterForm};
use crate::message::Message;
use crate::reels::ReelsScreen;
use crate::root::Screen;
use crate::share::ShareRequest;
use crate::state::{App, AuthScreen, FORM_ENTRANCE, FeedKey, FeedView, SPLASH_FADE};
use crate::toast::Notice;
use crate::ui;

/// Animation frame interval.
const FRAME: Duration = Duration::from_millis(16);

/// Simulated round trip of the in-process provider, so the busy state shows.
const LOCAL_LATENCY: Duration = Duration::from_millis(400);

/// Pick the identity backend from configuration.
pub fn identity_provider(config: &Config) -> Arc<dyn IdentityProvider> {
    match config.firebase_api_key.as_deref() {
        Some(api_key) => {
            let store = SessionStore::persistent(config.session_path());
            let mut identity = FirebaseIdentity::new(api_key, store);
            if let Some(endpoint) = config.firebase_endpoint.as_deref() {
                log::info!("Using identity endpoint {}", endpoint);
                identity = identity.with_endpoint(endpoint);
            }
            Arc::new(identity)
        }
        None => {
            log::warn!(
                "No Firebase API key configured; accounts live in memory until exit"
            );
            Arc::new(LocalIdentity::new(SessionStore::new()).with_latency(LOCAL_LATENCY))
        }
    }
}

impl App {
    /// Build the initial state, start the splash timer and listen for sessions.
    pub fn boot(config: Config) -> (Self, Task<Message>) {
        let provider = identity_provider(&config);
        let sessions = provider.subscribe().into_stream();
        let mut app = App::new(config, provider);

        let (splash, handle) = Task::perform(
            tokio::time::sleep(app.config.splash_duration()),
            |_| Message::SplashElapsed,
        )
        .abortable();
        app._splash_timer = Some(handle.abort_on_drop());

        (
            app,
            Task::batch([splash, Task::run(sessions, Message::SessionChanged)]),
        )
    }

    /// Handle UI messages and state updates.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        self.now = Instant::now();

        match message {
            Message::SplashElapsed => {
                log::debug!("Splash finished");
                self.root.splash_elapsed();
                self._splash_timer = None;
                self.sync_screen();
            }
            Message::SessionChanged(session) => {
                self.session_changed(session);
            }
            Message::Tick(now) => {
                self.now = now;
                self.toasts.prune(now);
                if let Some(feed) = &mut self.feed {
                    feed.reels.tick(now);
                }
            }
            Message::EventOccurred(event) => return self.handle_event(event),
            Message::DismissToast(id) => self.toasts.dismiss(id),
            Message::ShowLogin => self.show_auth(AuthScreen::Login),
            Message::ShowRegister => self.show_auth(AuthScreen::Register),
            Message::LoginEmailChanged(email) => self.login.email = email,
            Message::LoginPasswordChanged(password) => self.login.password = password,
            Message::TogglePasswordVisibility => {
                self.login.show_password = !self.login.show_password;
            }
            Message::SubmitLogin => return self.submit_login(),
            Message::LoginFinished(result) => {
                self.login.finish_submit();
                let notice = match result {
                    Ok(session) => {
                        Notice::success("Login Successful 🎉", format!("Welcome back, {}", session.email))
                    }
                    Err(e) => {
                        log::warn!("Sign-in failed: {}", e);
                        Notice::error("Login Failed ❌", e.to_string())
                    }
                };
                self.toasts.push(notice, self.now);
            }
            Message::RegisterNameChanged(name) => self.register.name = name,
            Message::RegisterEmailChanged(email) => self.register.email = email,
            Message::RegisterPasswordChanged(password) => self.register.password = password,
            Message::RegisterConfirmChanged(confirm) => self.register.confirm_password = confirm,
            Message::SubmitRegister => return self.submit_register(),
            Message::RegisterFinished(result) => {
                self.register.finish_submit();
                let notice = match result {
                    Ok(name) => Notice::success("Account Created 🎉", format!("Welcome, {}", name)),
                    Err(e) => {
                        log::warn!("Registration failed: {}", e);
                        let body = match e.to_string() {
                            message if message.trim().is_empty() => {
                                "Something went wrong. Please try again.".to_string()
                            }
                            message => message,
                        };
                        Notice::error("Registration Error 🚫", body)
                    }
                };
                self.toasts.push(notice, self.now);
            }
            Message::FeedScrolled(viewport) => {
                if let Some(feed) = &mut self.feed {
                    let snap =
                        feed.scrolled(viewport.absolute_offset().y, viewport.bounds().height);
                    feed.sync_videos();
                    if let Some(index) = snap {
                        log::debug!("Snapping feed to reel {}", index);
                        return self.page_to(index);
                    }
                }
            }
            Message::TapVideo(index) => {
                if let Some(feed) = &mut self.feed {
                    if let Some(change) = feed.reels.tap_video(index, self.now) {
                        feed.videos.apply(&[change]);
                    }
                }
            }
            Message::ToggleLike(index) => {
                if let Some(feed) = &mut self.feed {
                    let anchor = Point::new(
                        self.window.width - 60.0,
                        feed.reels.page_height() - 180.0,
                    );
                    if let Some(liked) =
                        feed.reels
                            .toggle_like(index, self.now, anchor, &mut rand::thread_rng())
                    {
                        log::debug!("Reel {} liked={}", index, liked);
                    }
                }
            }
            Message::Share(index) => return self.share(index),
            Message::LogoutRequested => {
                if let Some(feed) = &mut self.feed {
                    feed.request_logout();
                }
            }
            Message::LogoutCancelled => {
                if let Some(feed) = &mut self.feed {
                    feed.cancel_logout();
                }
            }
            Message::LogoutConfirmed => {
                if let Some(feed) = &mut self.feed {
                    feed.accept_logout();
                }
                log::info!("Signing out");
                return Task::perform(self.provider.sign_out(), |_| Message::SignedOut);
            }
            Message::SignedOut => {
                self.toasts
                    .push(Notice::success("Logged out", "See you soon! 👋"), self.now);
            }
        }

        Task::none()
    }

    /// Subscribe to events, plus a frame clock while anything animates.
    pub fn subscription(&self) -> Subscription<Message> {
        let events = event::listen().map(Message::EventOccurred);
        if self.is_animating() {
            Subscription::batch([events, iced::time::every(FRAME).map(Message::Tick)])
        } else {
            events
        }
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        ui::render_main_view(self)
    }

    /// Whether the next frame differs from the current one.
    pub fn is_animating(&self) -> bool {
        let now = self.now;
        let splash = self.screen == Screen::Splash
            && now.saturating_duration_since(self.splash_since) < SPLASH_FADE;
        let entrance =
            self.screen == Screen::Auth && !FORM_ENTRANCE.finished(self.entrance_since, now);
        let feed = self.feed.as_ref().is_some_and(|f| f.reels.is_animating());
        splash || entrance || feed || !self.toasts.is_empty()
    }

    fn session_changed(&mut self, session: Option<Session>) {
        let phase = self.root.session_changed(session);
        log::info!(
            "Session changed: phase={:?}, user={}",
            phase,
            self.root.session().map_or("-", |s| s.email.as_str())
        );
        self.sync_screen();
    }

    /// Mount or tear down the feed to match the composed screen.
    fn sync_screen(&mut self) {
        let screen = self.root.screen();
        match screen {
            Screen::Feed if self.feed.is_none() => self.feed = Some(self.mount_feed()),
            Screen::Feed => {}
            _ => {
                if let Some(mut feed) = self.feed.take() {
                    feed.videos.pause_all();
                    log::info!("Feed unmounted");
                }
            }
        }

        if screen != self.screen {
            if screen == Screen::Auth {
                self.login = LoginForm {
                    email: std::mem::take(&mut self.login.email),
                    ..LoginForm::default()
                };
                self.register = RegisterForm::default();
                self.show_auth(AuthScreen::Login);
            }
            self.screen = screen;
        }
    }

    fn mount_feed(&self) -> FeedView {
        let feed = Feed::load(self.config.feed_path.as_deref()).unwrap_or_else(|e| {
            log::error!("Failed to load feed: {}; falling back to bundled reels", e);
            Feed::bundled().unwrap_or_default()
        });
        log::info!("Feed mounted with {} reels", feed.len());

        let mut view = FeedView::new(ReelsScreen::new(feed, self.window.height));
        view.sync_videos();
        view
    }

    fn show_auth(&mut self, screen: AuthScreen) {
        self.auth_screen = screen;
        self.entrance_since = self.now;
    }

    fn handle_event(&mut self, event: iced::Event) -> Task<Message> {
        match event {
            iced::Event::Window(window::Event::Resized(size)) => {
                self.window = size;
                if let Some(feed) = &mut self.feed {
                    feed.reels.set_page_height(size.height);
                    let active = feed.reels.active();
                    return self.page_to(active);
                }
            }
            iced::Event::Keyboard(keyboard::Event::KeyPressed {
                key: keyboard::Key::Named(named),
                ..
            }) => {
                match self.feed.as_ref().and_then(|feed| feed.key_action(named)) {
                    Some(FeedKey::CancelLogout) => return self.update(Message::LogoutCancelled),
                    Some(FeedKey::PageTo(index)) => return self.page_to(index),
                    None => {}
                }
            }
            _ => {}
        }
        Task::none()
    }

    /// Snap the feed to `index` and settle visibility without waiting for
    /// the scrollable to report back.
    fn page_to(&mut self, index: usize) -> Task<Message> {
        let Some(feed) = &mut self.feed else {
            return Task::none();
        };
        let Some(y) = feed.page_to(index) else {
            return Task::none();
        };
        feed.sync_videos();

        scroll_to::<Message>(ui::feed_scroll_id(), AbsoluteOffset { x: 0.0, y })
    }

    fn submit_login(&mut self) -> Task<Message> {
        match self.login.begin_submit() {
            None => Task::none(),
            Some(Err(e)) => {
                self.toasts.push(e.notice(FormKind::Login), self.now);
                Task::none()
            }
            Some(Ok(credentials)) => {
                log::info!("Signing in {}", credentials.email);
                Task::perform(
                    self.provider
                        .sign_in(&credentials.email, &credentials.password),
                    Message::LoginFinished,
                )
            }
        }
    }

    fn submit_register(&mut self) -> Task<Message> {
        match self.register.begin_submit() {
            None => Task::none(),
            Some(Err(e)) => {
                self.toasts.push(e.notice(FormKind::Register), self.now);
                Task::none()
            }
            Some(Ok(registration)) => {
                log::info!("Creating account for {}", registration.credentials.email);
                let provider = Arc::clone(&self.provider);
                let create = provider.create_account(
                    &registration.credentials.email,
                    &registration.credentials.password,
                );
                Task::perform(
                    async move {
                        create.await?;
                        provider.update_display_name(&registration.name).await?;
                        Ok::<_, AuthError>(registration.name)
                    },
                    Message::RegisterFinished,
                )
            }
        }
    }

    fn share(&mut self, index: usize) -> Task<Message> {
        let Some(reel) = self.feed.as_ref().and_then(|f| f.reels.reel(index)) else {
            return Task::none();
        };
        match ShareRequest::for_reel(reel) {
            Ok(request) => {
                log::info!("Sharing reel {} as \"{}\"", reel.id, request.title);
                self.toasts.push(
                    Notice::success("Link Copied 🔗", request.url.to_string()),
                    self.now,
                );
                iced::clipboard::write(request.message)
            }
            Err(e) => {
                log::warn!("Error sharing: {}", e);
                Task::none()
            }
        }
    }
}
