// src/health/status.rs

/// Whether the host service answered as itself this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Alive,
    Unreachable,
}

impl HealthStatus {
    pub fn is_alive(self) -> bool {
        self == HealthStatus::Alive
    }
}

/// Outcome of the degraded-mode ("safe mode") check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedModeStatus {
    Normal,
    Degraded,
    /// No probe could answer. Treated as normal: a spurious restart costs
    /// more than a missed detection.
    Indeterminate,
}

impl DegradedModeStatus {
    pub fn is_normal(self) -> bool {
        !matches!(self, DegradedModeStatus::Degraded)
    }
}
