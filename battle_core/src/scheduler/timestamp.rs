//! Timestamp readiness - absolute next-ready times on the battle clock

use super::{Readiness, ReadinessStrategy};
use crate::config::{SchedulerKind, TimingConstants};
use crate::stats::round_tenths;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampReadiness;

impl ReadinessStrategy for TimestampReadiness {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Timestamp
    }

    fn seed(&self, readiness: &mut Readiness, delay: f64, timing: &TimingConstants) {
        let fraction = timing.initial_delay_fraction.clamp(0.0, 1.0);
        readiness.gauge = 0.0;
        readiness.rate = timing.ready_threshold / delay.max(timing.min_delay);
        readiness.scheduled_at = 0.0;
        readiness.next_ready_at = round_tenths(delay * fraction);
    }

    fn advance(&self, readiness: &mut Readiness, _dt: f64, clock: f64, timing: &TimingConstants) {
        readiness.gauge = self.progress(readiness, clock, timing) * timing.ready_threshold;
    }

    fn is_ready(&self, readiness: &Readiness, clock: f64, _timing: &TimingConstants) -> bool {
        clock >= readiness.next_ready_at
    }

    /// Earlier timestamps go first
    fn priority(&self, readiness: &Readiness) -> f64 {
        -readiness.next_ready_at
    }

    fn on_turn_start(&self, readiness: &mut Readiness, timing: &TimingConstants) {
        readiness.gauge = timing.ready_threshold;
    }

    fn schedule(
        &self,
        readiness: &mut Readiness,
        clock: f64,
        delay: f64,
        timing: &TimingConstants,
    ) {
        readiness.gauge = 0.0;
        readiness.rate = timing.ready_threshold / delay.max(timing.min_delay);
        readiness.scheduled_at = clock;
        readiness.next_ready_at = round_tenths(clock + delay);
    }

    fn progress(&self, readiness: &Readiness, clock: f64, _timing: &TimingConstants) -> f64 {
        let span = readiness.next_ready_at - readiness.scheduled_at;
        if span <= 0.0 {
            return 1.0;
        }
        ((clock - readiness.scheduled_at) / span).clamp(0.0, 1.0)
    }
}
