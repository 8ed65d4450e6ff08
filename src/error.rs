use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Precondition violations raised by the analysis functions.
///
/// None of these are transient: every variant means the caller handed over
/// input (or parameters) that the requested test cannot work with.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No draw data available for {0}")]
    NoData(&'static str),

    #[error("{test} requires at least {needed} observations, got {got}")]
    InsufficientData {
        test: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Sequence for {0} must contain both 0 and 1 values")]
    DegenerateSequence(&'static str),

    #[error("Unsupported bit encoding: {0} (allowed: binary, parity, presence)")]
    InvalidEncoding(String),

    #[error("{test} requires at least {needed} bits, got {got}")]
    InsufficientBits {
        test: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Simulated reference sample is empty")]
    EmptyReference,

    #[error("Invalid draw {draw_no}: {reason}")]
    InvalidDraw { draw_no: u32, reason: String },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed to read draw history: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse draw history: {0}")]
    Json(#[from] serde_json::Error),
}
