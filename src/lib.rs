//! filedrop
//!
//! An HTTP server that lists and serves the files of one configured
//! directory, and relays social posts to an external posting service.

pub mod config;
pub mod files;
pub mod handler;
pub mod http;
pub mod logger;
pub mod relay;
pub mod server;
