//! Sink implementations

pub mod console;
pub mod file;
pub mod rotating_file;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use rotating_file::{RotatingFileSink, RotationPolicy};
