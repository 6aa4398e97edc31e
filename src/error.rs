use thiserror::Error;

/// Error types for the chifit-rs library.
#[derive(Error, Debug)]
pub enum FitError {
    /// Fewer usable samples than the model has parameters.
    #[error("Under-determined fit: {samples} usable samples for {parameters} parameters")]
    Underdetermined {
        /// Number of samples that survived the range and model filters
        samples: usize,
        /// Number of parameters the model needs
        parameters: usize,
    },

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error for invalid parameter values.
    #[error("Invalid parameter value: {0}")]
    InvalidParameter(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The sample source carries neither x nor y errors, so no weighting exists.
    #[error("Parameter errors are undefined without x or y measurement errors")]
    MissingErrors,

    /// A parameter index past the end of the parameter vector.
    #[error("Parameter index {index} out of range for {count} parameters")]
    ParameterIndex {
        /// The requested index
        index: usize,
        /// The number of parameters in the model
        count: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for chifit-rs operations.
pub type Result<T> = std::result::Result<T, FitError>;
