use iced::gradient::Linear;
use iced::widget::text::Shaping;
use iced::widget::text_input::TextInput;
use iced::widget::{
    button, center, column, container, mouse_area, opaque, row, scrollable, stack, text,
    text_input,
};
use iced::{
    Background, Color, ContentFit, Degrees, Element, Font, Gradient, Length, Padding, Theme,
    alignment, border, font,
};
use iced_video_player::VideoPlayer;
use std::time::Instant;

use crate::feed::Reel;
use crate::hearts::HeartFrame;
use crate::loader::Slot;
use crate::message::Message;
use crate::motion::{ease_out_back, lerp, progress};
use crate::player::ReelPlayer;
use crate::root::Screen;
use crate::state::{App, AuthScreen, FORM_ENTRANCE, FeedView, SPLASH_FADE};
use crate::toast::{Severity, Toast};

const BOLD: Font = Font {
    weight: font::Weight::Bold,
    ..Font::DEFAULT
};

const SPLASH_COLORS: [u32; 3] = [0x0f2027, 0x203a43, 0x2c5364];
const LOGIN_COLORS: [u32; 2] = [0x667eea, 0x764ba2];
const REGISTER_COLORS: [u32; 2] = [0x764ba2, 0x667eea];
const HASHTAG_BLUE: u32 = 0x1da1f2;

/// Scrollable id of the reel feed, for programmatic paging.
pub fn feed_scroll_id() -> iced::widget::Id {
    iced::widget::Id::new("reel-feed")
}

fn rgb(hex: u32) -> Color {
    Color::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

fn faded(color: Color, alpha: f32) -> Color {
    Color {
        a: color.a * alpha.clamp(0.0, 1.0),
        ..color
    }
}

/// Top-left to bottom-right gradient through evenly spaced stops.
fn gradient(stops: &[u32]) -> Background {
    let last = stops.len().saturating_sub(1).max(1) as f32;
    let linear = stops
        .iter()
        .enumerate()
        .fold(Linear::new(Degrees(135.0)), |linear, (i, hex)| {
            linear.add_stop(i as f32 / last, rgb(*hex))
        });
    Background::Gradient(Gradient::Linear(linear))
}

/// Compact like/comment counts: 999, 1.2K, 3.4M.
pub fn format_count(count: u64) -> String {
    let (tenths, suffix) = match count {
        0..=999 => return count.to_string(),
        1_000..=999_999 => (count / 100, "K"),
        _ => (count / 100_000, "M"),
    };
    match tenths % 10 {
        0 => format!("{}{}", tenths / 10, suffix),
        frac => format!("{}.{}{}", tenths / 10, frac, suffix),
    }
}

/// Render the screen chosen by the root composer, with toasts on top.
pub fn render_main_view(app: &App) -> Element<'_, Message> {
    let screen = match (app.screen, &app.feed) {
        (Screen::Feed, Some(feed)) => render_feed(app, feed),
        (Screen::Auth, _) => render_auth(app),
        _ => render_splash(app),
    };

    if app.toasts.is_empty() {
        screen
    } else {
        stack![screen, render_toasts(app)].into()
    }
}

fn render_splash(app: &App) -> Element<'_, Message> {
    let t = progress(app.splash_since, app.now, SPLASH_FADE);
    let scale = lerp(0.5, 1.0, ease_out_back(t));

    let logo = column![
        text("🎞️")
            .size(80.0 * scale)
            .shaping(Shaping::Advanced)
            .color(faded(Color::WHITE, t)),
        text("Reelsify")
            .size(38.0 * scale)
            .font(BOLD)
            .color(faded(Color::WHITE, t)),
        text("Your daily dose of reels ⚡")
            .size(16)
            .shaping(Shaping::Advanced)
            .color(faded(rgb(0xdddddd), t)),
    ]
    .spacing(10)
    .align_x(alignment::Horizontal::Center);

    container(logo)
        .center(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(gradient(&SPLASH_COLORS)),
            ..Default::default()
        })
        .into()
}

fn render_auth(app: &App) -> Element<'_, Message> {
    let opacity = FORM_ENTRANCE.opacity(app.entrance_since, app.now);
    let offset = FORM_ENTRANCE.offset(app.entrance_since, app.now);
    let (form, colors) = match app.auth_screen {
        AuthScreen::Login => (create_login_form(app, opacity), LOGIN_COLORS),
        AuthScreen::Register => (create_register_form(app, opacity), REGISTER_COLORS),
    };

    let body = container(form)
        .center_x(Length::Fill)
        .padding(Padding {
            top: 60.0 + offset,
            right: 30.0,
            bottom: 40.0,
            left: 30.0,
        });

    container(scrollable(body))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(gradient(&colors)),
            ..Default::default()
        })
        .into()
}

fn build_header<'a>(title: &'a str, subtitle: &'a str, opacity: f32) -> Element<'a, Message> {
    column![
        text("🎞️")
            .size(48)
            .shaping(Shaping::Advanced)
            .color(faded(Color::WHITE, opacity)),
        text(title)
            .size(32)
            .font(BOLD)
            .color(faded(Color::WHITE, opacity)),
        text(subtitle)
            .size(16)
            .color(faded(rgb(0xe0e0e0), opacity)),
    ]
    .spacing(8)
    .align_x(alignment::Horizontal::Center)
    .width(Length::Fill)
    .into()
}

fn build_field<'a>(
    label: &'a str,
    input: impl Into<Element<'a, Message>>,
    opacity: f32,
) -> Element<'a, Message> {
    column![
        text(label)
            .size(14)
            .font(BOLD)
            .color(faded(Color::WHITE, opacity)),
        input.into(),
    ]
    .spacing(6)
    .into()
}

fn build_input<'a>(
    placeholder: &'a str,
    value: &'a str,
    on_input: fn(String) -> Message,
    on_submit: Message,
) -> TextInput<'a, Message> {
    text_input(placeholder, value)
        .on_input(on_input)
        .on_submit(on_submit)
        .padding(12)
        .size(16)
}

fn build_submit<'a>(label: &'a str, on_press: Option<Message>) -> Element<'a, Message> {
    button(
        container(text(label).size(18).font(BOLD))
            .center_x(Length::Fill),
    )
    .width(Length::Fill)
    .padding(15)
    .on_press_maybe(on_press)
    .style(|_theme: &Theme, status| {
        let disabled = status == button::Status::Disabled;
        button::Style {
            background: Some(faded(Color::WHITE, if disabled { 0.6 } else { 1.0 }).into()),
            text_color: rgb(LOGIN_COLORS[0]),
            border: border::rounded(12),
            ..Default::default()
        }
    })
    .into()
}

fn build_link<'a>(label: &'a str, message: Message, opacity: f32) -> Element<'a, Message> {
    container(
        button(text(label).size(15).color(faded(Color::WHITE, opacity)))
            .on_press(message)
            .style(button::text),
    )
    .center_x(Length::Fill)
    .into()
}

fn create_login_form(app: &App, opacity: f32) -> Element<'_, Message> {
    let form = &app.login;
    let busy = form.is_busy();

    let email = build_input(
        "Enter your email",
        &form.email,
        Message::LoginEmailChanged,
        Message::SubmitLogin,
    );
    let password = row![
        build_input(
            "Enter your password",
            &form.password,
            Message::LoginPasswordChanged,
            Message::SubmitLogin,
        )
        .secure(!form.show_password),
        button(
            text(if form.show_password { "🙈" } else { "👁️" })
                .size(18)
                .shaping(Shaping::Advanced)
        )
        .on_press(Message::TogglePasswordVisibility)
        .padding(8)
        .style(button::text),
    ]
    .spacing(6)
    .align_y(alignment::Vertical::Center);

    column![
        build_header("Welcome Back", "Sign in to continue", opacity),
        build_field("Email", email, opacity),
        build_field("Password", password, opacity),
        build_submit(
            if busy { "Signing In..." } else { "Sign In" },
            (!busy).then_some(Message::SubmitLogin),
        ),
        build_link("Don't have an account? Sign Up", Message::ShowRegister, opacity),
    ]
    .spacing(20)
    .max_width(400)
    .into()
}

fn create_register_form(app: &App, opacity: f32) -> Element<'_, Message> {
    let form = &app.register;
    let busy = form.is_busy();

    column![
        build_header("Create Account", "Join the community", opacity),
        build_field(
            "Full Name",
            build_input(
                "Enter your full name",
                &form.name,
                Message::RegisterNameChanged,
                Message::SubmitRegister,
            ),
            opacity,
        ),
        build_field(
            "Email",
            build_input(
                "Enter your email",
                &form.email,
                Message::RegisterEmailChanged,
                Message::SubmitRegister,
            ),
            opacity,
        ),
        build_field(
            "Password",
            build_input(
                "Create a password",
                &form.password,
                Message::RegisterPasswordChanged,
                Message::SubmitRegister,
            )
            .secure(true),
            opacity,
        ),
        build_field(
            "Confirm Password",
            build_input(
                "Confirm your password",
                &form.confirm_password,
                Message::RegisterConfirmChanged,
                Message::SubmitRegister,
            )
            .secure(true),
            opacity,
        ),
        build_submit(
            if busy { "Creating Account..." } else { "Create Account" },
            (!busy).then_some(Message::SubmitRegister),
        ),
        build_link("Already have an account? Sign In", Message::ShowLogin, opacity),
    ]
    .spacing(20)
    .max_width(400)
    .into()
}

fn render_feed<'a>(app: &'a App, feed: &'a FeedView) -> Element<'a, Message> {
    let page = feed.reels.page_height();
    let reels = (0..feed.reels.feed().len()).map(|index| create_reel_item(app, feed, index, page));

    let list = scrollable(column(reels))
        .id(feed_scroll_id())
        .on_scroll(Message::FeedScrolled)
        .width(Length::Fill)
        .height(Length::Fill);

    let logout = container(
        button(text("Logout").size(14).font(BOLD))
            .on_press(Message::LogoutRequested)
            .padding([8, 15])
            .style(|_theme: &Theme, _status| button::Style {
                background: Some(Color::from_rgba(1.0, 1.0, 1.0, 0.2).into()),
                text_color: Color::WHITE,
                border: border::rounded(20),
                ..Default::default()
            }),
    )
    .width(Length::Fill)
    .align_x(alignment::Horizontal::Right)
    .padding(Padding {
        top: 50.0,
        right: 20.0,
        ..Padding::ZERO
    });

    let mut layers = stack![
        container(list)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme: &Theme| container::Style {
                background: Some(Color::BLACK.into()),
                ..Default::default()
            }),
        logout
    ];
    if feed.confirm_logout {
        layers = layers.push(build_logout_dialog());
    }
    layers.into()
}

/// One full-page reel: video, tap target, overlays and metadata.
fn create_reel_item<'a>(
    app: &'a App,
    feed: &'a FeedView,
    index: usize,
    page: f32,
) -> Element<'a, Message> {
    let Some(reel) = feed.reels.reel(index) else {
        return container("").into();
    };
    let player = feed.reels.player(index);

    let video: Element<'a, Message> = match feed.videos.slot(index) {
        Some(Slot::Loaded(video)) => VideoPlayer::new(video)
            .content_fit(ContentFit::Cover)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        Some(Slot::Failed(_)) => center(text("Video unavailable").color(rgb(0x888888))).into(),
        _ => container("").width(Length::Fill).height(Length::Fill).into(),
    };

    let mut layers = stack![
        mouse_area(container(video).width(Length::Fill).height(Length::Fill))
            .on_press(Message::TapVideo(index))
    ];

    if let Some(player) = player {
        if let Some(opacity) = player.controls_opacity(app.now) {
            layers = layers.push(build_controls(player.paused(), opacity));
        }
        for particle in player.hearts().particles() {
            layers = layers.push(build_heart(particle.frame(app.now)));
        }
    }
    layers = layers.push(build_actions(reel, index, player, app.now));
    layers = layers.push(build_reel_info(reel));

    container(layers)
        .width(Length::Fill)
        .height(Length::Fixed(page))
        .clip(true)
        .style(|_theme: &Theme| container::Style {
            background: Some(Color::BLACK.into()),
            ..Default::default()
        })
        .into()
}

/// Centered play/pause badge, faded by the controls envelope.
fn build_controls<'a>(paused: bool, opacity: f32) -> Element<'a, Message> {
    let badge = container(
        text(if paused { "▶️" } else { "⏸️" })
            .size(32)
            .shaping(Shaping::Advanced)
            .color(faded(Color::WHITE, opacity)),
    )
    .center(Length::Fixed(80.0))
    .style(move |_theme: &Theme| container::Style {
        background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6 * opacity).into()),
        border: border::rounded(40),
        ..Default::default()
    });

    center(badge).into()
}

fn build_heart<'a>(frame: HeartFrame) -> Element<'a, Message> {
    let size = (24.0 * frame.scale).max(1.0);
    container(
        text("❤️")
            .size(size)
            .shaping(Shaping::Advanced)
            .color(faded(Color::WHITE, frame.opacity)),
    )
    .padding(Padding {
        top: (frame.y - size / 2.0).max(0.0),
        left: (frame.x - size / 2.0).max(0.0),
        ..Padding::ZERO
    })
    .into()
}

fn build_action<'a>(
    icon: &'a str,
    icon_size: f32,
    label: String,
    on_press: Option<Message>,
) -> Element<'a, Message> {
    let mut content = column![text(icon).size(icon_size).shaping(Shaping::Advanced)]
        .spacing(5)
        .align_x(alignment::Horizontal::Center);
    if !label.is_empty() {
        content = content.push(text(label).size(12).color(Color::WHITE));
    }

    button(content)
        .padding(0)
        .on_press_maybe(on_press)
        .style(|_theme: &Theme, _status| button::Style {
            text_color: Color::WHITE,
            ..Default::default()
        })
        .into()
}

fn build_actions<'a>(
    reel: &'a Reel,
    index: usize,
    player: Option<&ReelPlayer>,
    now: Instant,
) -> Element<'a, Message> {
    let liked = player.is_some_and(|p| p.liked());
    let like_scale = player.map_or(1.0, |p| p.like_scale(now));

    let actions = column![
        build_action(
            if liked { "❤️" } else { "🤍" },
            28.0 * like_scale,
            format_count(reel.likes),
            Some(Message::ToggleLike(index)),
        ),
        build_action("💬", 28.0, format_count(reel.comments), None),
        build_action("📤", 28.0, "Share".to_string(), Some(Message::Share(index))),
        build_action("🎵", 28.0, String::new(), None),
    ]
    .spacing(20)
    .align_x(alignment::Horizontal::Center);

    container(actions)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Right)
        .align_y(alignment::Vertical::Bottom)
        .padding(Padding {
            right: 15.0,
            bottom: 100.0,
            ..Padding::ZERO
        })
        .into()
}

fn build_reel_info<'a>(reel: &'a Reel) -> Element<'a, Message> {
    let mut info = column![
        text(format!("@{}", reel.username))
            .size(16)
            .font(BOLD)
            .color(Color::WHITE),
        text(&reel.description).size(14).color(Color::WHITE),
    ]
    .spacing(5);
    if !reel.hashtags.is_empty() {
        info = info.push(text(&reel.hashtags).size(14).color(rgb(HASHTAG_BLUE)));
    }

    container(info)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_y(alignment::Vertical::Bottom)
        .padding(Padding {
            left: 15.0,
            right: 80.0,
            bottom: 30.0,
            ..Padding::ZERO
        })
        .into()
}

fn build_logout_dialog<'a>() -> Element<'a, Message> {
    let card = container(
        column![
            text("Logout").size(20).font(BOLD),
            text("Are you sure you want to logout?").size(15),
            row![
                container("").width(Length::Fill),
                button(text("Cancel"))
                    .on_press(Message::LogoutCancelled)
                    .style(button::secondary),
                button(text("Logout"))
                    .on_press(Message::LogoutConfirmed)
                    .style(button::danger),
            ]
            .spacing(10),
        ]
        .spacing(16),
    )
    .padding(24)
    .max_width(320)
    .style(|_theme: &Theme| container::Style {
        background: Some(rgb(0x1e1e1e).into()),
        text_color: Some(Color::WHITE),
        border: border::rounded(14),
        ..Default::default()
    });

    opaque(
        center(card).style(|_theme: &Theme| container::Style {
            background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
            ..Default::default()
        }),
    )
}

fn render_toasts(app: &App) -> Element<'_, Message> {
    let cards = app.toasts.iter().map(|toast| create_toast_card(toast, app.now));
    container(column(cards).spacing(8).max_width(360))
        .center_x(Length::Fill)
        .padding(Padding {
            top: 50.0,
            right: 16.0,
            left: 16.0,
            ..Padding::ZERO
        })
        .into()
}

fn create_toast_card(toast: &Toast, now: Instant) -> Element<'_, Message> {
    let opacity = toast.opacity(now);
    let accent = match toast.notice.severity {
        Severity::Success => rgb(0x2ecc71),
        Severity::Error => rgb(0xe74c3c),
    };

    let card = container(
        column![
            text(&toast.notice.title)
                .size(15)
                .font(BOLD)
                .shaping(Shaping::Advanced)
                .color(faded(rgb(0x222222), opacity)),
            text(&toast.notice.body)
                .size(13)
                .shaping(Shaping::Advanced)
                .color(faded(rgb(0x555555), opacity)),
        ]
        .spacing(2),
    )
    .padding(12)
    .width(Length::Fill)
    .style(move |_theme: &Theme| container::Style {
        background: Some(faded(Color::WHITE, opacity).into()),
        border: border::rounded(10).color(faded(accent, opacity)).width(2.0),
        ..Default::default()
    });

    mouse_area(card)
        .on_press(Message::DismissToast(toast.id))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_below_a_thousand_are_exact() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn large_counts_are_truncated_to_one_decimal() {
        assert_eq!(format_count(1_000), "1K");
        assert_eq!(format_count(12_450), "12.4K");
        assert_eq!(format_count(999_999), "999.9K");
        assert_eq!(format_count(2_500_000), "2.5M");
        assert_eq!(format_count(3_000_000), "3M");
    }

    #[test]
    fn rgb_unpacks_channels() {
        assert_eq!(rgb(0xff0000), Color::from_rgb8(255, 0, 0));
        assert_eq!(rgb(0x1da1f2), Color::from_rgb8(0x1d, 0xa1, 0xf2));
    }

    #[test]
    fn faded_scales_alpha() {
        let c = faded(Color::from_rgba(1.0, 1.0, 1.0, 0.5), 0.5);
        assert!((c.a - 0.25).abs() < f32::EPSILON);
        assert_eq!(faded(Color::WHITE, 2.0).a, 1.0);
    }
}
