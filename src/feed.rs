//! Reel records, the ordered feed and active-item selection.

use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fraction of an item's area that must be on screen for it to count as viewable.
pub const VISIBILITY_THRESHOLD: f32 = 0.8;

const BUNDLED_REELS: &str = include_str!("../assets/reels.json");

/// A single short video entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reel {
    pub id: String,
    pub video_url: String,
    pub username: String,
    pub description: String,
    #[serde(default)]
    pub hashtags: String,
    pub likes: u64,
    pub comments: u64,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("duplicate reel id {0:?}")]
    DuplicateId(String),
    #[error("failed to read feed file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed feed data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered reels; display order is insertion order and ids are unique.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    reels: Vec<Reel>,
}

impl Feed {
    pub fn new(reels: Vec<Reel>) -> Result<Self, FeedError> {
        let mut seen = HashSet::new();
        for reel in &reels {
            if !seen.insert(reel.id.as_str()) {
                return Err(FeedError::DuplicateId(reel.id.clone()));
            }
        }
        Ok(Feed { reels })
    }

    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        Feed::new(serde_json::from_str(json)?)
    }

    /// The list shipped inside the binary.
    pub fn bundled() -> Result<Self, FeedError> {
        Feed::from_json(BUNDLED_REELS)
    }

    /// Load from `path` when given, otherwise the bundled list.
    pub fn load(path: Option<&Path>) -> Result<Self, FeedError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| FeedError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Feed::from_json(&json)
            }
            None => Feed::bundled(),
        }
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn get(&self, index: usize) -> Option<&Reel> {
        self.reels.get(index)
    }

    pub fn len(&self) -> usize {
        self.reels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reels.is_empty()
    }
}

/// One viewable item and how much of it is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewToken {
    pub index: usize,
    pub visible: f32,
}

/// Items at least [`VISIBILITY_THRESHOLD`] visible in a vertical list of
/// `page`-tall items scrolled to `offset`, most visible first.
pub fn viewable_items(offset: f32, viewport: f32, page: f32, len: usize) -> Vec<ViewToken> {
    if page <= 0.0 || viewport <= 0.0 || len == 0 {
        return Vec::new();
    }

    let top = offset.max(0.0);
    let bottom = top + viewport;
    let first = (top / page).floor() as usize;
    let last = ((bottom / page).ceil() as usize).min(len);

    let mut tokens: Vec<ViewToken> = (first.min(len)..last)
        .filter_map(|index| {
            let item_top = index as f32 * page;
            let overlap = (bottom.min(item_top + page) - top.max(item_top)).max(0.0);
            let visible = overlap / page;
            (visible >= VISIBILITY_THRESHOLD).then_some(ViewToken { index, visible })
        })
        .collect();

    tokens.sort_by(|a, b| {
        b.visible
            .total_cmp(&a.visible)
            .then_with(|| a.index.cmp(&b.index))
    });
    tokens
}

/// Tracks which single item is eligible to play.
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    active: usize,
    viewable: Vec<usize>,
}

impl VisibilityTracker {
    pub fn active(&self) -> usize {
        self.active
    }

    /// Feed a fresh viewability snapshot. Only a change in the viewable set
    /// counts as an event; an empty set leaves the active index alone.
    /// Returns true when the active index moved.
    pub fn observe(&mut self, tokens: &[ViewToken]) -> bool {
        let viewable: Vec<usize> = tokens.iter().map(|t| t.index).collect();
        if viewable == self.viewable {
            return false;
        }
        self.viewable = viewable;

        match self.viewable.first() {
            Some(&index) if index != self.active => {
                log::debug!("active reel {} -> {}", self.active, index);
                self.active = index;
                true
            }
            _ => false,
        }
    }
}

/// Indices kept decoded around the active one.
pub fn render_window(active: usize, len: usize, radius: usize) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }
    let active = active.min(len - 1);
    active.saturating_sub(radius)..(active + radius + 1).min(len)
}

/// Scroll offset that puts `index` at the top of the viewport.
pub fn page_offset(index: usize, page: f32) -> f32 {
    index as f32 * page
}

/// Offsets this close to a page boundary count as settled.
const SNAP_TOLERANCE: f32 = 0.5;

/// Page a free scroll settles on: the next boundary in the direction moved
/// away from `active`. `None` when the offset already sits on a boundary.
pub fn snap_target(offset: f32, page: f32, active: usize, len: usize) -> Option<usize> {
    if len == 0 || page <= 0.0 {
        return None;
    }
    let position = offset / page;
    if (position - position.round()).abs() * page <= SNAP_TOLERANCE {
        return None;
    }
    let target = if position > active as f32 {
        position.ceil()
    } else {
        position.floor()
    };
    Some((target.max(0.0) as usize).min(len - 1))
}
