//! HTTP protocol layer module
//!
//! Response builders and content-type detection, decoupled from the
//! directory service and the relay.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_413_response, build_attachment_response,
    build_health_response, build_html_response, build_json_response, build_options_response,
};
