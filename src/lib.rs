//! Fixed-capacity ring buffer used to stage elements between producers and
//! consumers of bounded I/O.

#[macro_use]
mod macros;
pub mod error;
pub mod ring_buffer;

pub use error::RingBufferError;
pub use ring_buffer::RingBuffer;
