use thiserror::Error;

/// Fatal conditions surfaced to the driver. There is no per-block recovery:
/// every variant aborts the whole run with a nonzero exit.
#[derive(Debug, Error)]
pub enum CodecError {
  /// The PPM header could not be parsed, or declared nonsense dimensions.
  #[error("invalid PPM input: {0}")]
  InvalidPpm(String),

  /// The compressed stream's magic line or dimension line is wrong.
  #[error("invalid compressed header: {0}")]
  InvalidHeader(String),

  /// The stream ended before the declared payload was fully read.
  #[error("truncated stream: expected {expected} bytes of block data, got {actual}")]
  TruncatedStream {
    expected: usize,
    actual: usize,
  },

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
