//! Error types for the radical crate

use thiserror::Error;

/// Errors that can occur while laying out or resolving a radical
#[derive(Error, Debug)]
pub enum RadicalError {
    /// The font metrics table has no entry for a glyph under a font
    #[error("Unknown glyph {ch:?} in font {font}")]
    UnknownGlyph { ch: char, font: String },

    /// A radical was laid out without a radicand box
    #[error("Radical has no base box")]
    MissingBase,

    /// Generated glyph markup could not be turned into a renderable glyph
    #[error("Glyph markup error: {0}")]
    Markup(String),

    /// XML error from quick-xml
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Font metrics table could not be decoded
    #[error("Metrics table error: {0}")]
    MetricsTable(#[from] serde_json::Error),
}

/// Result type for radical operations
pub type RadicalResult<T> = Result<T, RadicalError>;
