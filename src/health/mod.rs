// src/health/mod.rs
mod evaluator;
mod status;

pub use evaluator::{
    DegradedModeProbe, HealthEvaluator, OnUnavailable, DEGRADED_MODE_CHAIN, HOST_SERVICE_MARKER,
};
pub use status::{DegradedModeStatus, HealthStatus};
