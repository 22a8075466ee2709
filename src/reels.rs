//! The feed screen model: reels, the visibility tracker, force pause and one
//! player per reel. Video handles live elsewhere; this type only decides who
//! should be paused.

use std::time::Instant;

use iced::Point;
use rand::Rng;

use crate::feed::{Feed, Reel, VisibilityTracker, viewable_items};
use crate::player::{PlaybackInputs, ReelPlayer};

/// A reel whose `paused` flag changed and must be pushed to its decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseChange {
    pub index: usize,
    pub paused: bool,
}

#[derive(Debug)]
pub struct ReelsScreen {
    feed: Feed,
    tracker: VisibilityTracker,
    force_pause: bool,
    players: Vec<ReelPlayer>,
    page_height: f32,
}

impl ReelsScreen {
    pub fn new(feed: Feed, page_height: f32) -> Self {
        let players = (0..feed.len())
            .map(|index| ReelPlayer::mount(PlaybackInputs::for_item(index, 0, false)))
            .collect();
        ReelsScreen {
            feed,
            tracker: VisibilityTracker::default(),
            force_pause: false,
            players,
            page_height,
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn reel(&self, index: usize) -> Option<&Reel> {
        self.feed.get(index)
    }

    pub fn player(&self, index: usize) -> Option<&ReelPlayer> {
        self.players.get(index)
    }

    pub fn active(&self) -> usize {
        self.tracker.active()
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn set_page_height(&mut self, height: f32) {
        if height > 0.0 {
            self.page_height = height;
        }
    }

    /// Apply a scroll viewport. Returns the reels whose pause state flipped.
    pub fn scrolled(&mut self, offset: f32, viewport: f32) -> Vec<PauseChange> {
        let tokens = viewable_items(offset, viewport, self.page_height, self.feed.len());
        if self.tracker.observe(&tokens) {
            self.reconcile()
        } else {
            Vec::new()
        }
    }

    pub fn set_force_pause(&mut self, force_pause: bool) -> Vec<PauseChange> {
        if self.force_pause == force_pause {
            return Vec::new();
        }
        log::info!("force pause {}", if force_pause { "on" } else { "off" });
        self.force_pause = force_pause;
        self.reconcile()
    }

    pub fn tap_video(&mut self, index: usize, now: Instant) -> Option<PauseChange> {
        let player = self.players.get_mut(index)?;
        player
            .tap_video(now)
            .then(|| PauseChange { index, paused: player.paused() })
    }

    pub fn toggle_like<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        now: Instant,
        anchor: Point,
        rng: &mut R,
    ) -> Option<bool> {
        let player = self.players.get_mut(index)?;
        Some(player.toggle_like(now, anchor, rng))
    }

    pub fn tick(&mut self, now: Instant) {
        for player in &mut self.players {
            player.tick(now);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.players.iter().any(ReelPlayer::is_animating)
    }

    /// Indices currently playing.
    pub fn playing(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.paused())
            .map(|(i, _)| i)
            .collect()
    }

    fn reconcile(&mut self) -> Vec<PauseChange> {
        let active = self.tracker.active();
        let force_pause = self.force_pause;
        self.players
            .iter_mut()
            .enumerate()
            .filter_map(|(index, player)| {
                player
                    .reconcile(PlaybackInputs::for_item(index, active, force_pause))
                    .then(|| PauseChange { index, paused: player.paused() })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const PAGE: f32 = 800.0;

    fn screen() -> ReelsScreen {
        ReelsScreen::new(Feed::bundled().unwrap(), PAGE)
    }

    #[test]
    fn only_first_reel_plays_on_mount() {
        let screen = screen();
        assert_eq!(screen.playing(), vec![0]);
    }

    #[test]
    fn scrolling_to_a_page_hands_playback_over() {
        let mut screen = screen();
        let changes = screen.scrolled(2.0 * PAGE, PAGE);
        assert_eq!(screen.active(), 2);
        assert!(changes.contains(&PauseChange { index: 0, paused: true }));
        assert!(changes.contains(&PauseChange { index: 2, paused: false }));
        assert_eq!(screen.playing(), vec![2]);
    }

    #[test]
    fn partial_scroll_keeps_previous_active() {
        let mut screen = screen();
        assert!(screen.scrolled(0.5 * PAGE, PAGE).is_empty());
        assert_eq!(screen.playing(), vec![0]);
    }

    #[test]
    fn force_pause_stops_everything_and_release_resumes_active() {
        let mut screen = screen();
        screen.scrolled(PAGE, PAGE);
        screen.set_force_pause(true);
        assert!(screen.playing().is_empty());

        screen.scrolled(3.0 * PAGE, PAGE);
        assert!(screen.playing().is_empty());

        let changes = screen.set_force_pause(false);
        assert_eq!(changes, vec![PauseChange { index: 3, paused: false }]);
        assert_eq!(screen.playing(), vec![3]);
    }

    enum Step {
        Scroll(f32),
        Tap(usize, u64),
        Force(bool),
    }

    #[test]
    fn at_most_one_reel_plays_through_any_interaction() {
        let mut screen = screen();
        let now = Instant::now();
        let steps = [
            Step::Scroll(PAGE),
            Step::Tap(3, 0),
            Step::Tap(1, 0),
            Step::Tap(1, 10),
            Step::Force(true),
            Step::Tap(1, 20),
            Step::Force(false),
        ];
        for step in steps {
            match step {
                Step::Scroll(offset) => {
                    screen.scrolled(offset, PAGE);
                }
                Step::Tap(index, ms) => {
                    screen.tap_video(index, now + Duration::from_millis(ms));
                }
                Step::Force(on) => {
                    screen.set_force_pause(on);
                }
            }
            assert!(screen.playing().len() <= 1, "{:?}", screen.playing());
        }
        assert_eq!(screen.playing(), vec![1]);
    }

    #[test]
    fn empty_feed_plays_nothing() {
        let mut screen = ReelsScreen::new(Feed::default(), PAGE);
        assert!(screen.scrolled(0.0, PAGE).is_empty());
        assert!(screen.playing().is_empty());
    }
}
