pub mod health;
pub mod invoke;
pub mod stream;

pub use health::{health_handler, ready_handler};
pub use invoke::invoke_handler;
pub use stream::sse_handler;
