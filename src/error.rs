use thiserror::Error;

/// Errors raised while constructing a decode stage or baking an artifact.
///
/// Runtime operations (`get_samples`, `rewind`, `set_loop`) never fail;
/// exhaustion is reported through frame counts, not errors.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Invalid decoder spec: {reason}")]
    InvalidSpec { reason: String },

    #[error("Converter configuration failed: {0}")]
    ConverterConfig(String),

    #[error("Frame of {frame_size} bytes exceeds staging capacity of {capacity} bytes")]
    FrameTooLarge { frame_size: usize, capacity: usize },
}

impl StageError {
    /// Get user-friendly error message with suggested context
    pub fn user_message(&self) -> String {
        match self {
            StageError::InvalidSpec { reason } => {
                format!("The decoder spec is not usable: {}", reason)
            }
            StageError::ConverterConfig(msg) => {
                format!("Could not configure the format converter: {}", msg)
            }
            StageError::FrameTooLarge {
                frame_size,
                capacity,
            } => format!(
                "A single frame ({} bytes) does not fit the {}-byte staging buffer - reduce the channel count",
                frame_size, capacity
            ),
        }
    }

    /// Check if retrying with different parameters could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            StageError::InvalidSpec { .. } => false, // Requires a corrected spec
            StageError::ConverterConfig(_) => true,  // Can retry with other parameters
            StageError::FrameTooLarge { .. } => true, // Can retry with fewer channels
        }
    }
}
