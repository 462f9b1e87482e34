use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingBufferError {
    /// Logical index past the live elements.
    OutOfRange { index: usize, size: usize },
}

impl fmt::Display for RingBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingBufferError::OutOfRange { index, size } => write!(
                f,
                "ring buffer index out of range: index {} but size is {}",
                index, size
            ),
        }
    }
}

impl Error for RingBufferError {}
