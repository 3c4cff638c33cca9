//! Logger module
//!
//! Provides logging utilities for the gateway:
//! - Server lifecycle logging
//! - Timestamped access logging for requests and responses
//! - Error and warning logging

use crate::config::Config;
use chrono::Local;
use std::net::SocketAddr;
use std::path::Path;

/// Timestamp in common-log style, e.g. `30/Aug/2026:14:02:11 +0000`
fn timestamp() -> String {
    Local::now().format("%d/%b/%Y:%H:%M:%S %z").to_string()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, data_dir: &Path) {
    println!("======================================");
    println!("roster-store started successfully");
    println!("Listening on: http://{addr}");
    println!("Data directory: {}", data_dir.display());
    println!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("Using Tokio runtime for concurrency");
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

/// Access log line for an incoming request
pub fn log_request(method: &hyper::Method, uri: &hyper::Uri, version: hyper::Version) {
    println!("[{}] --> {method} {uri} {version:?}", timestamp());
}

/// Access log line for an outgoing response
pub fn log_response(status: u16, body_bytes: usize) {
    println!("[{}] <-- {status} ({body_bytes} bytes)", timestamp());
}
