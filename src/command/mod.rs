// src/command/mod.rs
mod restart;
mod runner;

pub use restart::{RestartOutcome, Restarter};
pub use runner::{CommandError, CommandOutput, CommandRunner, ShellRunner};
