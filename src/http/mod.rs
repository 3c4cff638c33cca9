//! HTTP protocol layer module
//!
//! Response builders shared by the gateway dispatch, decoupled from the
//! file store.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_405_response, build_413_response, build_500_response, build_bad_body_response,
    build_invalid_filename_response, build_saved_response, build_yaml_response,
};
