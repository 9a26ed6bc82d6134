// Server module entry point
// Listener creation, the accept loop and per-connection serving

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export common entry points
pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
