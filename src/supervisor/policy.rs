// src/supervisor/policy.rs

/// Restart hysteresis for a host service stuck in degraded mode.
///
/// The first degraded cycle after normal operation restarts immediately.
/// After that, a restart is only issued once the counter exceeds
/// `threshold`, so a service that keeps coming back degraded is not
/// restarted every cycle.
#[derive(Debug, Clone)]
pub struct DegradedPolicy {
    consecutive_degraded_cycles: u32,
    threshold: u32,
}

impl DegradedPolicy {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_degraded_cycles: 0,
            threshold,
        }
    }

    pub fn consecutive_degraded_cycles(&self) -> u32 {
        self.consecutive_degraded_cycles
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn on_normal(&mut self) {
        self.consecutive_degraded_cycles = 0;
    }

    /// Records a degraded verdict and returns whether to restart now.
    ///
    /// The counter is reset on restart and then incremented like every
    /// other degraded cycle, so it reads 1 right after a restart.
    pub fn on_degraded(&mut self) -> bool {
        let restart = self.consecutive_degraded_cycles == 0
            || self.consecutive_degraded_cycles > self.threshold;
        if restart {
            self.consecutive_degraded_cycles = 0;
        }
        self.consecutive_degraded_cycles = self.consecutive_degraded_cycles.saturating_add(1);
        restart
    }
}

impl Default for DegradedPolicy {
    fn default() -> Self {
        Self::new(10)
    }
}
