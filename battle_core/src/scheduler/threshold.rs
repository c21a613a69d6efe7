//! Threshold readiness - a gauge that fills toward the ready threshold

use super::{Readiness, ReadinessStrategy};
use crate::config::{SchedulerKind, TimingConstants};
use crate::stats::round_tenths;

#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdReadiness;

impl ThresholdReadiness {
    fn rate_for(delay: f64, timing: &TimingConstants) -> f64 {
        timing.ready_threshold / delay.max(timing.min_delay)
    }
}

impl ReadinessStrategy for ThresholdReadiness {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Threshold
    }

    fn seed(&self, readiness: &mut Readiness, delay: f64, timing: &TimingConstants) {
        let fraction = timing.initial_delay_fraction.clamp(0.0, 1.0);
        readiness.rate = Self::rate_for(delay, timing);
        readiness.gauge = timing.ready_threshold * (1.0 - fraction);
        readiness.scheduled_at = 0.0;
        readiness.next_ready_at = round_tenths(delay.max(timing.min_delay) * fraction);
    }

    fn advance(&self, readiness: &mut Readiness, dt: f64, _clock: f64, timing: &TimingConstants) {
        let gained = readiness.rate * dt.max(0.0);
        readiness.gauge = (readiness.gauge + gained).min(timing.readiness_cap);
    }

    fn is_ready(&self, readiness: &Readiness, _clock: f64, timing: &TimingConstants) -> bool {
        readiness.gauge >= timing.ready_threshold
    }

    fn priority(&self, readiness: &Readiness) -> f64 {
        readiness.gauge
    }

    fn on_turn_start(&self, readiness: &mut Readiness, timing: &TimingConstants) {
        readiness.gauge = readiness.gauge.max(timing.ready_threshold);
    }

    fn schedule(
        &self,
        readiness: &mut Readiness,
        clock: f64,
        delay: f64,
        timing: &TimingConstants,
    ) {
        readiness.gauge = 0.0;
        readiness.rate = Self::rate_for(delay, timing);
        readiness.scheduled_at = clock;
        readiness.next_ready_at = round_tenths(clock + delay);
    }

    fn progress(&self, readiness: &Readiness, _clock: f64, timing: &TimingConstants) -> f64 {
        (readiness.gauge / timing.ready_threshold).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_fills_and_caps() {
        let timing = TimingConstants::default();
        let strategy = ThresholdReadiness;
        let mut readiness = Readiness::default();
        strategy.schedule(&mut readiness, 0.0, 2.0, &timing);
        assert!((readiness.rate - 50.0).abs() < 1e-9);

        strategy.advance(&mut readiness, 1.0, 1.0, &timing);
        assert!(!strategy.is_ready(&readiness, 1.0, &timing));
        strategy.advance(&mut readiness, 1.0, 2.0, &timing);
        assert!(strategy.is_ready(&readiness, 2.0, &timing));

        strategy.advance(&mut readiness, 10.0, 12.0, &timing);
        assert!((readiness.gauge - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_seed_lands_within_initial_window() {
        let timing = TimingConstants::default();
        let strategy = ThresholdReadiness;
        let mut readiness = Readiness::default();
        strategy.seed(&mut readiness, 2.5, &timing);
        assert!((readiness.gauge - 50.0).abs() < 1e-9);
        assert!(!strategy.is_ready(&readiness, 0.0, &timing));

        // 50 remaining at 40/s
        strategy.advance(&mut readiness, 1.25, 1.25, &timing);
        assert!(strategy.is_ready(&readiness, 1.25, &timing));
    }

    #[test]
    fn test_turn_start_and_reset() {
        let timing = TimingConstants::default();
        let strategy = ThresholdReadiness;
        let mut readiness = Readiness {
            gauge: 99.5,
            ..Default::default()
        };
        strategy.on_turn_start(&mut readiness, &timing);
        assert!((readiness.gauge - 100.0).abs() < 1e-9);

        strategy.schedule(&mut readiness, 3.0, 2.5, &timing);
        assert!((readiness.gauge - 0.0).abs() < f64::EPSILON);
        assert!((readiness.rate - 40.0).abs() < 1e-9);
        assert!((readiness.next_ready_at - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_rate_respects_min_delay() {
        let timing = TimingConstants::default();
        let strategy = ThresholdReadiness;
        let mut readiness = Readiness::default();
        strategy.schedule(&mut readiness, 0.0, 0.0, &timing);
        assert!((readiness.rate - 1000.0).abs() < 1e-9);
    }
}
