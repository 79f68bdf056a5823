//! Error types for graph construction and control-thread operations.
//!
//! Nothing on the real-time path returns these. Faults that happen while a
//! block is being rendered are counted in [`crate::engine::stats::EngineStats`]
//! instead.

use thiserror::Error;

use crate::graph::OperatorId;

/// Result type for configuration and control operations.
pub type Result<T> = std::result::Result<T, SynthError>;

/// Errors reported before the stream starts or from the control thread.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// Carrier frequency ratio was zero, negative or not finite.
    #[error("frequency ratio must be positive and finite, got {0}")]
    InvalidFreqRatio(f32),

    /// Note frequency was zero, negative or not finite.
    #[error("note frequency must be positive and finite, got {0} Hz")]
    InvalidFrequency(f32),

    /// Note onset was negative or not finite.
    #[error("note onset must be non-negative and finite, got {0} s")]
    InvalidOnset(f32),

    /// Sample rate was zero, negative or not finite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// Block size outside `1..=max`.
    #[error("block size must be between 1 and {max}, got {size}")]
    InvalidBlockSize {
        /// Requested size.
        size: usize,
        /// Largest supported size.
        max: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// An operator's buffers do not match the graph's block size.
    #[error("operator {id} holds {actual}-frame buffers but the graph block size is {expected}")]
    BlockSizeMismatch {
        /// Offending operator.
        id: OperatorId,
        /// Block size configured for the graph.
        expected: usize,
        /// Capacity of the operator's buffers.
        actual: usize,
    },

    /// Id does not name an operator of this graph.
    #[error("unknown operator {0}")]
    UnknownOperator(OperatorId),

    /// An operator was connected to itself.
    #[error("operator {0} cannot feed itself")]
    SelfLoop(OperatorId),

    /// The same edge was declared twice.
    #[error("operator {from} is already connected to {to}")]
    DuplicateConnection {
        /// Producer.
        from: OperatorId,
        /// Consumer.
        to: OperatorId,
    },

    /// The connections contain a cycle through this operator.
    #[error("connections form a cycle through operator {0}")]
    CycleDetected(OperatorId),

    /// Graph has no operators.
    #[error("graph has no operators")]
    EmptyGraph,

    /// No output was set and more than one operator has no successor.
    #[error("graph output is ambiguous: {0} operators have no successors")]
    AmbiguousOutput(usize),

    /// Note messages can only target carriers.
    #[error("operator {0} is not a carrier")]
    NotACarrier(OperatorId),

    /// The note ring is full; the real-time thread has not caught up.
    #[error("note queue is full")]
    QueueFull,
}

impl SynthError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_param_names_parameter() {
        let err = SynthError::invalid_param("q", "must be positive");
        assert!(err.to_string().contains("'q'"));
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn mismatch_reports_both_sizes() {
        let err = SynthError::BlockSizeMismatch {
            id: OperatorId::from_index(3),
            expected: 512,
            actual: 256,
        };
        let text = err.to_string();
        assert!(text.contains("#3"));
        assert!(text.contains("512"));
        assert!(text.contains("256"));
    }
}
