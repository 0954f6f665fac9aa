//! Error types for presidential-plinko.
//!
//! - Configuration errors: the board, a target or the settings are unusable
//! - Boundary errors: file I/O and JSON encoding at the export layer

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum PlinkoError {
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Target {target} is out of range for a board with {pin_rows} pin rows")]
    TargetOutOfRange { target: i32, pin_rows: u32 },

    #[error("Bin {bin} does not exist on a board with {n_bins} bins")]
    BinOutOfRange { bin: u32, n_bins: u32 },

    #[error(
        "Target {target} cannot be reached in {pin_rows} rows: {pin_rows} - |{target}| is odd"
    )]
    ParityMismatch { target: i32, pin_rows: u32 },

    #[error("Invalid forecast: {0}")]
    InvalidForecast(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlinkoError {
    /// Wrap an I/O failure on `path` with a short description of the operation.
    pub fn io(action: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("{action} {}", path.display()),
            source,
        }
    }
}

/// Result type alias using PlinkoError.
pub type Result<T> = std::result::Result<T, PlinkoError>;
