//! Timed status tick processing

use super::{StatusDuration, StatusEffect, StatusRegistry};

/// Result of ticking timed statuses
#[derive(Debug, Clone, Default)]
pub struct StatusTickResult {
    /// Statuses that ran out this tick
    pub expired: Vec<StatusEffect>,
}

impl StatusTickResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expired_names(&self) -> Vec<&str> {
        self.expired.iter().map(|s| s.name.as_str()).collect()
    }
}

impl StatusRegistry {
    /// Advance every timed status by `delta_time` seconds
    ///
    /// Remaining time floors at 0 and anything that reaches it is removed.
    /// Turn-counted statuses are untouched.
    pub fn tick_timed(&mut self, delta_time: f64) -> StatusTickResult {
        let delta_time = delta_time.max(0.0);
        for status in self.effects_mut().iter_mut() {
            if let StatusDuration::Timed { remaining, .. } = &mut status.duration {
                *remaining = (*remaining - delta_time).max(0.0);
            }
        }

        StatusTickResult {
            expired: self.purge_expired(),
        }
    }
}
