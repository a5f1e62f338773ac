//! Request handler module
//!
//! Request routing dispatch plus the directory and relay endpoints.

pub mod files;
pub mod router;
pub mod share;

// Re-export main entry point
pub use router::handle_request;
