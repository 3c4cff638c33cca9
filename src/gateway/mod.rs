//! File gateway module
//!
//! Maps HTTP requests onto the four managed roster files: allow-list
//! validation, raw reads, and atomic overwrites.

pub mod router;
pub mod store;

// Re-export main entry point
pub use router::handle_request;
