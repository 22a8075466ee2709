use iced_video_player::Video;
use std::ops::Range;
use std::time::Instant;
use thiserror::Error;

use crate::feed::{Reel, render_window};
use crate::reels::{PauseChange, ReelsScreen};

/// Decoders kept alive on each side of the active reel.
pub const WINDOW_RADIUS: usize = 1;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid video url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to open video: {0}")]
    Video(#[from] iced_video_player::Error),
}

/// Decoder state of one reel.
pub enum Slot {
    Empty,
    Loaded(Video),
    Failed(String),
}

/// One slot per reel; only the window around the active reel holds a decoder.
pub struct VideoSlots {
    slots: Vec<Slot>,
}

/// Open a reel's stream, looping, initially paused.
pub fn load_reel_video(reel: &Reel) -> Result<Video, LoadError> {
    let url = url::Url::parse(&reel.video_url)?;
    let start = Instant::now();
    let mut video = Video::new(&url)?;
    video.set_looping(true);
    video.set_paused(true);
    log::info!(
        "Video loaded: reel={}, url={}, fps={:.1}, took={}ms",
        reel.id,
        url,
        video.framerate(),
        start.elapsed().as_millis()
    );
    Ok(video)
}

impl VideoSlots {
    pub fn new(len: usize) -> Self {
        VideoSlots {
            slots: (0..len).map(|_| Slot::Empty).collect(),
        }
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn window(screen: &ReelsScreen) -> Range<usize> {
        render_window(screen.active(), screen.feed().len(), WINDOW_RADIUS)
    }

    /// Open decoders entering the window and release those leaving it.
    pub fn sync(&mut self, screen: &ReelsScreen) {
        let window = Self::window(screen);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let inside = window.contains(&index);
            match slot {
                Slot::Empty if inside => {
                    let Some(reel) = screen.reel(index) else {
                        continue;
                    };
                    *slot = match load_reel_video(reel) {
                        Ok(mut video) => {
                            let paused = screen.player(index).is_none_or(|p| p.paused());
                            video.set_paused(paused);
                            Slot::Loaded(video)
                        }
                        Err(e) => {
                            log::error!("Failed to load reel {}: {}", reel.id, e);
                            Slot::Failed(e.to_string())
                        }
                    };
                }
                Slot::Loaded(_) | Slot::Failed(_) if !inside => {
                    log::debug!("Video released: index={}", index);
                    *slot = Slot::Empty;
                }
                _ => {}
            }
        }
    }

    /// Push pause changes to the decoders that exist.
    pub fn apply(&mut self, changes: &[PauseChange]) {
        for change in changes {
            if let Some(Slot::Loaded(video)) = self.slots.get_mut(change.index) {
                set_paused_timed(change.index, video, change.paused);
            }
        }
    }

    /// Pause every decoder, e.g. before the feed is torn down.
    pub fn pause_all(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Slot::Loaded(video) = slot {
                if !video.paused() {
                    set_paused_timed(index, video, true);
                }
            }
        }
    }
}

fn set_paused_timed(index: usize, video: &mut Video, paused: bool) {
    let start = Instant::now();
    video.set_paused(paused);
    let elapsed_ms = start.elapsed().as_millis();
    if elapsed_ms > 500 {
        log::warn!(
            "Video {} pause toggle SLOW: paused={}, {}ms",
            index,
            paused,
            elapsed_ms
        );
    } else {
        log::debug!("Video {} paused={} ({}ms)", index, paused, elapsed_ms);
    }
}
