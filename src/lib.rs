//! jobpoll
//!
//! A server that simulates asynchronous jobs and a client that polls them
//! to completion with capped exponential backoff.
//!
//! - **state_machine**: job entity, status enum and the per-query evaluation
//! - **registry**: concurrent in-memory job store with injectable clock and RNG
//! - **server**: axum routes over the registry
//! - **client**: reqwest client, backoff sequence and the polling loop
//! - **config**: defaults, `jobpoll.toml` and environment overrides

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod server;
pub mod state_machine;
pub mod telemetry;
pub mod ui;
pub mod wire;

#[cfg(test)]
mod end_to_end;
