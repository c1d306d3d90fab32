use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The layer-size list must contain at least an input and an output
    /// layer after zero-width entries are dropped.
    #[error("topology must contain at least an input and an output layer")]
    InvalidTopology,

    /// One activation function is required per layer transition.
    #[error("expected {expected} activation functions, got {actual}")]
    MissingActivations { expected: usize, actual: usize },

    /// Pixel data was required but the supplied image is missing or empty.
    /// A stale cached render must never silently stand in for real input.
    #[error("missing or empty pixel data")]
    InvalidInput,

    #[error("digit labels must be 0-9, got {0}")]
    InvalidDigit(u8),

    /// Training was requested on a sample set with no samples in it.
    #[error("sample set contains no samples")]
    EmptySampleSet,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisted model data is inconsistent with its declared topology.
    #[error("model format error: {0}")]
    Format(String),

    #[error("requested image dimensions must be non-zero")]
    InvalidDimensions,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
