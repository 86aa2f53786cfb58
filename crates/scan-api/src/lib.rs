//! HTTP service for the code security scanner.

pub mod config;
pub mod server;
