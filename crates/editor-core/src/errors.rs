pub type BufferResult<T> = Result<T, BufferError>;

#[derive(Debug)]
pub enum BufferError {
    /// The gap could not be grown to hold an insertion.
    /// The buffer contents are unchanged when this is returned.
    OutOfMemory,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::OutOfMemory => write!(f, "out of memory growing edit buffer"),
        }
    }
}

impl std::error::Error for BufferError {}

impl From<std::collections::TryReserveError> for BufferError {
    fn from(_: std::collections::TryReserveError) -> Self {
        BufferError::OutOfMemory
    }
}
