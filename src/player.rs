//! Per-reel playback state machine.
//!
//! `paused` is derived from the feed-wide signals (active index and force
//! pause) but the user can flip it by tapping the video. A tap stays in effect
//! until one of the derived inputs genuinely changes, at which point the
//! derived value wins again.

use std::time::{Duration, Instant};

use iced::Point;
use rand::Rng;

use crate::hearts::HeartField;
use crate::motion::{Envelope, Pulse};

pub const CONTROLS: Envelope = Envelope {
    fade_in: Duration::from_millis(200),
    hold: Duration::from_millis(2000),
    fade_out: Duration::from_millis(200),
};

pub const LIKE_PULSE: Pulse = Pulse {
    peak: 1.3,
    rise: Duration::from_millis(150),
    fall: Duration::from_millis(150),
};

/// Read-only signals a reel receives from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackInputs {
    pub is_active: bool,
    pub force_pause: bool,
}

impl PlaybackInputs {
    pub fn for_item(index: usize, active: usize, force_pause: bool) -> Self {
        PlaybackInputs {
            is_active: index == active && !force_pause,
            force_pause,
        }
    }

    fn should_play(self) -> bool {
        self.is_active && !self.force_pause
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub paused: bool,
    inputs: PlaybackInputs,
}

impl PlaybackState {
    pub fn mount(inputs: PlaybackInputs) -> Self {
        PlaybackState {
            paused: !inputs.should_play(),
            inputs,
        }
    }
}

/// Next playback state given the current inputs and whether the user tapped.
///
/// A change in inputs recomputes `paused` from scratch. A tap toggles it, but
/// only an item that is allowed to play can be resumed this way, so at most
/// one reel in the feed is ever playing.
pub fn reduce(prev: PlaybackState, inputs: PlaybackInputs, user_toggled: bool) -> PlaybackState {
    let mut next = prev;
    if inputs != prev.inputs {
        next = PlaybackState::mount(inputs);
    }
    if user_toggled {
        next.paused = if next.paused {
            !inputs.should_play()
        } else {
            true
        };
    }
    next
}

/// Everything one feed entry owns: playback, like toggle and the transient
/// overlays drawn on top of the video.
#[derive(Debug)]
pub struct ReelPlayer {
    playback: PlaybackState,
    liked: bool,
    controls_since: Option<Instant>,
    pulse_since: Option<Instant>,
    hearts: HeartField,
}

impl ReelPlayer {
    pub fn mount(inputs: PlaybackInputs) -> Self {
        ReelPlayer {
            playback: PlaybackState::mount(inputs),
            liked: false,
            controls_since: None,
            pulse_since: None,
            hearts: HeartField::default(),
        }
    }

    pub fn paused(&self) -> bool {
        self.playback.paused
    }

    pub fn liked(&self) -> bool {
        self.liked
    }

    pub fn hearts(&self) -> &HeartField {
        &self.hearts
    }

    /// Re-derive playback from feed signals. Returns true if `paused` changed.
    pub fn reconcile(&mut self, inputs: PlaybackInputs) -> bool {
        let before = self.playback.paused;
        self.playback = reduce(self.playback, inputs, false);
        before != self.playback.paused
    }

    /// Tap on the video surface. Restarts the controls overlay either way.
    pub fn tap_video(&mut self, now: Instant) -> bool {
        let before = self.playback.paused;
        self.playback = reduce(self.playback, self.playback.inputs, true);
        self.controls_since = Some(now);
        before != self.playback.paused
    }

    /// Toggle the like. Only liking spawns hearts; the pulse plays both ways.
    pub fn toggle_like<R: Rng + ?Sized>(&mut self, now: Instant, anchor: Point, rng: &mut R) -> bool {
        self.liked = !self.liked;
        if self.liked {
            self.hearts.burst(anchor, now, rng);
        }
        self.pulse_since = Some(now);
        self.liked
    }

    pub fn controls_opacity(&self, now: Instant) -> Option<f32> {
        self.controls_since.map(|since| CONTROLS.opacity(since, now))
    }

    pub fn like_scale(&self, now: Instant) -> f32 {
        self.pulse_since
            .map_or(1.0, |since| LIKE_PULSE.scale(since, now))
    }

    /// Expire finished overlays and heart particles.
    pub fn tick(&mut self, now: Instant) {
        if self
            .controls_since
            .is_some_and(|since| CONTROLS.finished(since, now))
        {
            self.controls_since = None;
        }
        if self
            .pulse_since
            .is_some_and(|since| LIKE_PULSE.finished(since, now))
        {
            self.pulse_since = None;
        }
        self.hearts.prune(now);
    }

    pub fn is_animating(&self) -> bool {
        self.controls_since.is_some() || self.pulse_since.is_some() || !self.hearts.is_empty()
    }
}
