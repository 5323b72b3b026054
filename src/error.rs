//! # Error Types
//!
//! Custom error types for VTX Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for VTX Bridge
#[derive(Debug, Error)]
pub enum VtxBridgeError {
    /// CRSF protocol errors
    #[error("CRSF protocol error: {0}")]
    CrsfProtocol(String),

    /// Frequency table errors
    #[error("frequency table error: {0}")]
    FrequencyTable(String),

    /// VTX command dispatch errors
    #[error("VTX command error: {0}")]
    Command(String),

    /// Serial port errors
    #[error("serial port error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for VTX Bridge
pub type Result<T> = std::result::Result<T, VtxBridgeError>;
