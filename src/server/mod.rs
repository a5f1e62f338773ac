// Server module entry
// Listener creation, accept loop, per-connection serving and shutdown signals

pub mod accept_loop;
pub mod connection;
pub mod listener;
pub mod signal;

// Re-export commonly used items
pub use accept_loop::run;
pub use listener::create_reusable_listener;
pub use signal::shutdown_signal;
