/// Errors that can occur while reading frames from a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading from the stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before another complete frame was received.
    #[error("connection closed ({buffered} bytes of incomplete frame buffered)")]
    ConnectionClosed { buffered: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
