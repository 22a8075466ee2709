//! Heart bursts spawned by liking a reel.
//!
//! Particles live in a time-indexed collection: a burst appends eight entries,
//! each expiring a fixed lifetime after spawn, and every tick prunes the ones
//! whose time has passed.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use iced::Point;
use rand::Rng;

use crate::motion::{ease_out_quad, lerp, progress};

pub const BURST_SIZE: usize = 8;
pub const HEART_LIFETIME: Duration = Duration::from_millis(1300);

const FLIGHT: Duration = Duration::from_millis(800);
const RISE: f32 = 80.0;
const VERTICAL_JITTER: f32 = 50.0;
const MAX_DRIFT: f32 = 10.0;
const POP: Duration = Duration::from_millis(150);
const SETTLE: Duration = Duration::from_millis(600);

/// Wall-clock millisecond of the burst plus a per-field sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeartId {
    pub spawned_ms: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartParticle {
    pub id: HeartId,
    pub start_x: f32,
    pub start_y: f32,
    pub drift_x: f32,
    pub spawned_at: Instant,
}

/// Where a particle is drawn at a given instant, relative to its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartFrame {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub scale: f32,
}

impl HeartParticle {
    pub fn expires_at(&self) -> Instant {
        self.spawned_at + HEART_LIFETIME
    }

    pub fn frame(&self, now: Instant) -> HeartFrame {
        let t = progress(self.spawned_at, now, FLIGHT);
        let elapsed = now.saturating_duration_since(self.spawned_at);
        let scale = if elapsed < POP {
            lerp(0.0, 1.2, ease_out_quad(progress(self.spawned_at, now, POP)))
        } else {
            lerp(1.2, 0.9, progress(self.spawned_at + POP, now, SETTLE))
        };

        HeartFrame {
            x: self.start_x + self.drift_x * t,
            y: self.start_y - RISE * t,
            opacity: 1.0 - t,
            scale,
        }
    }
}

#[derive(Debug, Default)]
pub struct HeartField {
    particles: Vec<HeartParticle>,
    next_seq: u64,
}

impl HeartField {
    /// Spawn one burst around `anchor`, spreading particles upward.
    pub fn burst<R: Rng + ?Sized>(&mut self, anchor: Point, now: Instant, rng: &mut R) {
        let spawned_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        for _ in 0..BURST_SIZE {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.particles.push(HeartParticle {
                id: HeartId { spawned_ms, seq },
                start_x: anchor.x,
                start_y: anchor.y - rng.gen_range(0.0..VERTICAL_JITTER),
                drift_x: rng.gen_range(-MAX_DRIFT..MAX_DRIFT),
                spawned_at: now,
            });
        }
        log::trace!("heart burst: {} live particles", self.particles.len());
    }

    /// Drop every particle whose lifetime has elapsed; returns how many went.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.expires_at() > now);
        before - self.particles.len()
    }

    pub fn particles(&self) -> &[HeartParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn burst_spawns_eight_unique_particles_near_anchor() {
        let mut field = HeartField::default();
        let mut rng = StdRng::seed_from_u64(7);
        let anchor = Point::new(330.0, 660.0);
        let now = Instant::now();

        field.burst(anchor, now, &mut rng);
        field.burst(anchor, now, &mut rng);

        assert_eq!(field.len(), 2 * BURST_SIZE);
        let ids: HashSet<_> = field.particles().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 2 * BURST_SIZE);
        for p in field.particles() {
            assert_eq!(p.start_x, anchor.x);
            assert!(p.start_y <= anchor.y && p.start_y >= anchor.y - VERTICAL_JITTER);
            assert!(p.drift_x.abs() <= MAX_DRIFT);
        }
    }

    #[test]
    fn particles_expire_after_lifetime() {
        let mut field = HeartField::default();
        let mut rng = StdRng::seed_from_u64(1);
        let now = Instant::now();
        field.burst(Point::ORIGIN, now, &mut rng);

        assert_eq!(field.prune(now + Duration::from_millis(1299)), 0);
        assert_eq!(field.prune(now + HEART_LIFETIME), BURST_SIZE);
        assert!(field.is_empty());
    }

    #[test]
    fn frame_rises_and_fades() {
        let mut field = HeartField::default();
        let mut rng = StdRng::seed_from_u64(3);
        let now = Instant::now();
        field.burst(Point::new(0.0, 100.0), now, &mut rng);
        let p = &field.particles()[0];

        let start = p.frame(now);
        assert_eq!(start.opacity, 1.0);
        assert_eq!(start.scale, 0.0);

        let end = p.frame(now + FLIGHT);
        assert_eq!(end.opacity, 0.0);
        assert!((end.y - (p.start_y - RISE)).abs() < 1e-3);
        assert!((end.scale - 0.9).abs() < 0.05);
    }
}
