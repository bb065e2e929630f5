//! Error types for the PostScript backend

use thiserror::Error;

/// Errors raised while producing a PostScript document
#[derive(Error, Debug)]
pub enum PsError {
    /// Writing to the output sink failed
    #[error("PostScript output failed: {0}")]
    Io(#[from] std::io::Error),

    /// A symbol label named a glyph that is not registered
    #[error("Bad label {0}")]
    UnknownSymbol(String),

    /// A raw line style code outside the known dash styles
    #[error("Unknown dashstyle: {0}")]
    UnknownLineStyle(i32),

    /// Gamma factor too close to zero
    #[error("Bad Gamma value {0:.2}")]
    BadGamma(f32),

    /// Alias links of a symbol never reach a concrete descriptor
    #[error("Symbol alias cycle at {0}")]
    AliasCycle(String),

    /// A color specification could not be resolved
    #[error("Unknown color: {0}")]
    UnknownColor(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for PostScript operations
pub type PsResult<T> = std::result::Result<T, PsError>;
