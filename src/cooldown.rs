/// Remaining-duration timers.
///
/// A `Cooldown` is advanced by the real time elapsed each tick, so gated
/// actions run at the same rate regardless of the achieved frame rate.
/// Restarting resets the remaining time rather than adding to it, which means
/// a long frame can never let an action fire twice.

use std::time::Duration;

use rand::Rng;

#[derive(Clone, Debug, PartialEq)]
pub struct Cooldown {
    duration: Duration,
    variance: Duration,
    remaining: Duration,
}

impl Cooldown {
    /// A fixed-length cooldown.  It starts finished.
    pub fn new(duration: Duration) -> Self {
        Cooldown { duration, variance: Duration::ZERO, remaining: Duration::ZERO }
    }

    pub fn from_millis(ms: u64) -> Self {
        Cooldown::new(Duration::from_millis(ms))
    }

    /// A cooldown whose length is re-rolled within `duration ± variance` on
    /// every `restart_with`.  It starts finished.
    pub fn with_variance(duration: Duration, variance: Duration) -> Self {
        Cooldown { duration, variance, remaining: Duration::ZERO }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.is_zero()
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Restart at the base duration, ignoring variance.
    pub fn restart(&mut self) {
        self.remaining = self.duration;
    }

    /// Restart at a duration rolled from `duration ± variance`.
    pub fn restart_with(&mut self, rng: &mut impl Rng) {
        if self.variance.is_zero() {
            self.restart();
            return;
        }
        let base = self.duration.as_millis() as i64;
        let spread = self.variance.as_millis() as i64;
        let rolled = base + rng.gen_range(-spread..=spread);
        self.remaining = Duration::from_millis(rolled.max(0) as u64);
    }

    /// Change the base duration; the running countdown is left untouched.
    pub fn set_duration(&mut self, duration: Duration, variance: Duration) {
        self.duration = duration;
        self.variance = variance;
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }
}
