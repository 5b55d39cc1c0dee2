// src/remote/mod.rs
mod pinger;

pub use pinger::{PingError, RemotePinger};
