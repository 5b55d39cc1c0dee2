// src/supervisor/mod.rs
mod panic;
mod policy;
mod supervisor;

pub use policy::DegradedPolicy;
pub use supervisor::{CycleReport, ShutdownHandle, Supervisor};
