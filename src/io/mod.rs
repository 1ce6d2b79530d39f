//! Windowed input abstraction.
//!
//! Search loops never touch a byte source directly; they go through a
//! [`WindowReader`], which serves fixed-size [`Window`]s of the underlying
//! bytes. Past-end is a sentinel (`None`), distinct from I/O failure
//! (`Err`), so normal termination never takes an error path.
//!
//! The crate ships one reader, [`ByteArrayReader`], which serves an
//! in-memory source in configurable window sizes. File and mmap readers are
//! external collaborators that implement the same trait.

mod reader;
mod window;

pub use reader::{ByteArrayReader, WindowReader};
pub use window::Window;
