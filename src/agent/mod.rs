//! The artist: scanning model output, executing it, and deciding what to do
//! next.

pub mod emotion;
pub mod executor;
pub mod memory;
pub mod prompts;
pub mod scanner;
pub mod scheduler;
pub mod session;
pub mod speed;
pub mod templates;

pub use session::{Session, TickEvent};
