//! Transient notifications stacked over every screen.

use std::time::{Duration, Instant};

use crate::motion::progress;

pub const TOAST_LIFETIME: Duration = Duration::from_millis(4000);
const FADE_OUT: Duration = Duration::from_millis(300);
const MAX_STACKED: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Success,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
    pub shown_at: Instant,
}

impl Toast {
    pub fn opacity(&self, now: Instant) -> f32 {
        let fade_from = self.shown_at + TOAST_LIFETIME - FADE_OUT;
        1.0 - progress(fade_from, now, FADE_OUT)
    }
}

#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
    next_id: u64,
}

impl Toasts {
    pub fn push(&mut self, notice: Notice, now: Instant) -> u64 {
        match notice.severity {
            Severity::Success => log::info!("toast: {} - {}", notice.title, notice.body),
            Severity::Error => log::warn!("toast: {} - {}", notice.title, notice.body),
        }
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast {
            id,
            notice,
            shown_at: now,
        });
        if self.items.len() > MAX_STACKED {
            let excess = self.items.len() - MAX_STACKED;
            self.items.drain(..excess);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn prune(&mut self, now: Instant) {
        self.items
            .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_LIFETIME);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
