//! Speed-adjustable scene clock
//!
//! Accumulates elapsed scene time under a live-adjustable playback speed.
//! Uses `std::time::Instant` for monotonic guarantees. Sampled once per
//! frame by the render loop, mutated occasionally from the interaction
//! context.
//!
//! Speed changes never rescale past time: `set_speed` banks the outgoing
//! regime's contribution into `banked` at the *old* speed, then re-bases the
//! regime start under the new speed. `elapsed()` is O(1) regardless of how
//! many speed changes occurred - no regime history is kept.

use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use portable_atomic::AtomicF64;

use crate::primitives::Second;

/// Error raised by [`SceneClock::set_speed`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClockError {
    #[error("invalid speed {requested}: must be a finite, non-negative number")]
    InvalidSpeed { requested: f64 },
}

/// Full clock state, replaced wholesale on every speed change
///
/// Readers copy the whole snapshot out, so `banked`, `regime_start`, and
/// `speed` are always observed together - never a torn mix of regimes.
#[derive(Debug, Clone, Copy)]
struct ClockSnapshot {
    /// Seconds accumulated from all completed speed regimes
    banked: f64,
    /// When the current regime began; `None` while frozen
    regime_start: Option<Instant>,
    /// Current playback multiplier (0 = frozen)
    speed: f64,
}

impl ClockSnapshot {
    fn frozen() -> Self {
        Self {
            banked: 0.0,
            regime_start: None,
            speed: 0.0,
        }
    }

    fn elapsed_at(&self, now: Instant) -> f64 {
        match self.regime_start {
            Some(start) => self.banked + now.duration_since(start).as_secs_f64() * self.speed,
            None => self.banked,
        }
    }
}

/// Frame-query-safe accumulating clock
///
/// Starts frozen at zero; time only advances while speed is positive.
/// `elapsed()` is a pure read and never decreases for any sequence of
/// `set_speed` calls with valid arguments.
pub struct SceneClock {
    snapshot: RwLock<ClockSnapshot>,
    /// Lock-free mirror of the current speed for per-frame reads
    published_speed: Arc<AtomicF64>,
}

impl SceneClock {
    /// Create a new clock, frozen at zero elapsed time
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(ClockSnapshot::frozen()),
            published_speed: Arc::new(AtomicF64::new(0.0)),
        }
    }

    /// Change playback speed
    ///
    /// Banks the outgoing regime's contribution under the old speed, then
    /// re-bases the regime start under the new one. Setting the current
    /// speed again still re-bases; the result is unobservable in
    /// `elapsed()`. Rejects non-finite or negative values and leaves the
    /// clock untouched.
    pub fn set_speed(&self, new_speed: f64) -> Result<(), ClockError> {
        if !new_speed.is_finite() || new_speed < 0.0 {
            return Err(ClockError::InvalidSpeed {
                requested: new_speed,
            });
        }

        let mut guard = self.snapshot.write().unwrap();
        // `now` must be sampled under the lock: the lock totally orders
        // regime swaps against frame reads, which is what keeps elapsed()
        // monotonic across a deceleration.
        let now = Instant::now();
        let prev = *guard;
        *guard = ClockSnapshot {
            banked: prev.elapsed_at(now),
            regime_start: (new_speed > 0.0).then_some(now),
            speed: new_speed,
        };
        drop(guard);

        self.published_speed.store(new_speed, Ordering::Relaxed);
        tracing::debug!(old_speed = prev.speed, new_speed, "scene clock speed changed");
        Ok(())
    }

    /// Elapsed scene time
    ///
    /// Pure read: `banked + (now - regime_start) * speed`, or just `banked`
    /// while frozen. Bounded sub-frame cost, no allocation.
    pub fn elapsed(&self) -> Second {
        let guard = self.snapshot.read().unwrap();
        // Sampled under the lock; see set_speed.
        let value = guard.elapsed_at(Instant::now());
        Second(value)
    }

    /// Current playback speed, read without taking the snapshot lock
    pub fn speed(&self) -> f64 {
        self.published_speed.load(Ordering::Relaxed)
    }

    /// Shared handle to the published speed, for consumers that poll it
    /// from a realtime context
    pub fn speed_handle(&self) -> Arc<AtomicF64> {
        Arc::clone(&self.published_speed)
    }
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn new_clock_is_frozen_at_zero() {
        let clock = SceneClock::new();
        assert_eq!(clock.elapsed().0, 0.0);
        assert_eq!(clock.speed(), 0.0);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.elapsed().0, 0.0);
    }

    #[test]
    fn elapsed_advances_under_positive_speed() {
        let clock = SceneClock::new();
        clock.set_speed(1.0).unwrap();

        thread::sleep(Duration::from_millis(100));

        let elapsed = clock.elapsed().0;
        assert!(elapsed > 0.08, "elapsed {} should be > 0.08", elapsed);
        assert!(elapsed < 0.5, "elapsed {} should be < 0.5", elapsed);
    }

    #[test]
    fn freeze_stops_accumulation() {
        let clock = SceneClock::new();
        clock.set_speed(1.0).unwrap();
        thread::sleep(Duration::from_millis(50));

        clock.set_speed(0.0).unwrap();
        let frozen = clock.elapsed().0;

        thread::sleep(Duration::from_millis(50));
        assert_eq!(clock.elapsed().0, frozen);
        assert_eq!(clock.elapsed().0, frozen);
    }

    #[test]
    fn banking_sums_regime_contributions() {
        let clock = SceneClock::new();

        // ~100ms at 2x, then ~100ms at 0.5x => ~0.25s total
        clock.set_speed(2.0).unwrap();
        thread::sleep(Duration::from_millis(100));
        clock.set_speed(0.5).unwrap();
        thread::sleep(Duration::from_millis(100));
        clock.set_speed(0.0).unwrap();

        let elapsed = clock.elapsed().0;
        assert!(elapsed > 0.2, "elapsed {} should be > 0.2", elapsed);
        assert!(elapsed < 0.8, "elapsed {} should be < 0.8", elapsed);
    }

    #[test]
    fn rebasing_same_speed_is_idempotent() {
        let clock = SceneClock::new();
        clock.set_speed(1.5).unwrap();
        thread::sleep(Duration::from_millis(50));

        let before = clock.elapsed().0;
        clock.set_speed(1.5).unwrap();
        let after = clock.elapsed().0;

        // Only the wall-time gap between the two calls (scaled by 1.5)
        // separates the samples.
        assert!(after >= before);
        assert!(after - before < 0.05, "rebase gap {} too large", after - before);
    }

    #[test]
    fn negative_speed_rejected_and_state_unchanged() {
        let clock = SceneClock::new();
        clock.set_speed(1.0).unwrap();
        thread::sleep(Duration::from_millis(50));

        let err = clock.set_speed(-1.0).unwrap_err();
        assert!(matches!(err, ClockError::InvalidSpeed { .. }));

        // Still running at 1.0: the rejected call banked nothing.
        assert_eq!(clock.speed(), 1.0);
        let before = clock.elapsed().0;
        thread::sleep(Duration::from_millis(50));
        assert!(clock.elapsed().0 > before);
    }

    #[test]
    fn non_finite_speed_rejected() {
        let clock = SceneClock::new();
        assert!(clock.set_speed(f64::NAN).is_err());
        assert!(clock.set_speed(f64::INFINITY).is_err());
        assert_eq!(clock.elapsed().0, 0.0);
    }

    #[test]
    fn elapsed_is_monotonic_across_speed_changes() {
        let clock = SceneClock::new();
        let mut last = 0.0;

        for &speed in &[1.0, 0.0, 2.0, 0.5, 0.0, 1.7] {
            clock.set_speed(speed).unwrap();
            thread::sleep(Duration::from_millis(10));
            for _ in 0..50 {
                let sample = clock.elapsed().0;
                assert!(
                    sample >= last,
                    "elapsed went backwards: {} -> {}",
                    last,
                    sample
                );
                last = sample;
            }
        }
    }

    #[test]
    fn published_speed_mirrors_snapshot() {
        let clock = SceneClock::new();
        let handle = clock.speed_handle();

        clock.set_speed(1.25).unwrap();
        assert_eq!(clock.speed(), 1.25);
        assert_eq!(handle.load(Ordering::Relaxed), 1.25);

        clock.set_speed(0.0).unwrap();
        assert_eq!(handle.load(Ordering::Relaxed), 0.0);
    }
}
