// src/lib.rs
pub mod api;
pub mod command;
pub mod config;
pub mod health;
pub mod remote;
pub mod supervisor;
