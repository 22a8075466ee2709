//! Time-indexed animation curves.
//!
//! Every animated value in the app is a pure function of a start instant and
//! "now", so state only has to remember when something began. The frame tick
//! subscription supplies `now`; dropping the owning state cancels the animation.

use std::time::{Duration, Instant};

/// Normalized progress of `duration` since `start`, clamped to `0.0..=1.0`.
pub fn progress(start: Instant, now: Instant, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Overshooting ease used in place of a spring.
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u * u * u + C1 * u * u
}

/// Fade-in, hold, fade-out opacity envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub fade_in: Duration,
    pub hold: Duration,
    pub fade_out: Duration,
}

impl Envelope {
    pub fn total(&self) -> Duration {
        self.fade_in + self.hold + self.fade_out
    }

    pub fn opacity(&self, start: Instant, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.fade_in {
            progress(start, now, self.fade_in)
        } else if elapsed < self.fade_in + self.hold {
            1.0
        } else {
            1.0 - progress(start + self.fade_in + self.hold, now, self.fade_out)
        }
    }

    pub fn finished(&self, start: Instant, now: Instant) -> bool {
        now.saturating_duration_since(start) >= self.total()
    }
}

/// Scale pulse: 1.0 up to `peak` and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub peak: f32,
    pub rise: Duration,
    pub fall: Duration,
}

impl Pulse {
    pub fn scale(&self, start: Instant, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.rise {
            lerp(1.0, self.peak, progress(start, now, self.rise))
        } else {
            lerp(self.peak, 1.0, progress(start + self.rise, now, self.fall))
        }
    }

    pub fn finished(&self, start: Instant, now: Instant) -> bool {
        now.saturating_duration_since(start) >= self.rise + self.fall
    }
}

/// One-shot screen entrance: fade in while sliding up by `offset` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entrance {
    pub duration: Duration,
    pub offset: f32,
}

impl Entrance {
    pub fn opacity(&self, start: Instant, now: Instant) -> f32 {
        progress(start, now, self.duration)
    }

    pub fn offset(&self, start: Instant, now: Instant) -> f32 {
        lerp(self.offset, 0.0, progress(start, now, self.duration))
    }

    pub fn finished(&self, start: Instant, now: Instant) -> bool {
        now.saturating_duration_since(start) >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn envelope_fades_holds_and_fades() {
        let env = Envelope {
            fade_in: ms(200),
            hold: ms(2000),
            fade_out: ms(200),
        };
        let start = Instant::now();
        assert_eq!(env.opacity(start, start), 0.0);
        assert!((env.opacity(start, start + ms(100)) - 0.5).abs() < 1e-3);
        assert_eq!(env.opacity(start, start + ms(1000)), 1.0);
        assert!((env.opacity(start, start + ms(2300)) - 0.5).abs() < 1e-3);
        assert_eq!(env.opacity(start, start + ms(2400)), 0.0);
        assert!(!env.finished(start, start + ms(2399)));
        assert!(env.finished(start, start + ms(2400)));
    }

    #[test]
    fn pulse_peaks_then_returns_to_rest() {
        let pulse = Pulse {
            peak: 1.3,
            rise: ms(150),
            fall: ms(150),
        };
        let start = Instant::now();
        assert_eq!(pulse.scale(start, start), 1.0);
        assert!((pulse.scale(start, start + ms(150)) - 1.3).abs() < 1e-3);
        assert!((pulse.scale(start, start + ms(300)) - 1.0).abs() < 1e-3);
        assert!(pulse.finished(start, start + ms(300)));
    }

    #[test]
    fn ease_out_back_overshoots_and_lands() {
        assert!(ease_out_back(0.0).abs() < 1e-5);
        assert!((ease_out_back(1.0) - 1.0).abs() < 1e-5);
        assert!(ease_out_back(0.7) > 1.0);
    }
}
