pub mod builder;
pub mod handler;
pub mod listener;

pub use builder::{serve_listener, ServerBuilder};
pub use handler::RequestHandler;
