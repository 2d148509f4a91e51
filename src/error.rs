//! Error types for the snapsolve library.
//!
//! Every failure in the recognition pipeline is a [`SnapsolveError`] variant,
//! and every variant maps onto exactly one branch of the request-handler state
//! machine. The handler is the recovery boundary: nothing past it ever sees an
//! `Err` — [`SnapsolveError::response_text`] turns each variant into the
//! human-readable `result` string of the wire payload, so the endpoint can
//! answer HTTP 200 with a descriptive message no matter what went wrong.
//!
//! Display messages are written for operators reading logs (with hints where
//! the fix is obvious); `response_text` is written for the person squinting at
//! the web page wondering why their photo of `2x+3=7` did not solve.

use thiserror::Error;

/// All errors produced by the snapsolve pipeline.
#[derive(Debug, Error)]
pub enum SnapsolveError {
    // ── Recognizer availability ───────────────────────────────────────────
    /// No tesseract binary was found at startup; recognition is disabled.
    #[error("tesseract binary not found\nInstall it (e.g. apt install tesseract-ocr) or pass --tesseract <PATH>.")]
    RecognizerUnavailable,

    // ── Request input errors ──────────────────────────────────────────────
    /// The request carried no image payload.
    #[error("request contained no image data")]
    MissingImage,

    /// The image payload could not be base64-decoded or decoded as a bitmap.
    #[error("could not decode image: {reason}")]
    ImageDecode { reason: String },

    // ── Recognition errors ────────────────────────────────────────────────
    /// The tesseract subprocess failed to spawn or exited non-zero.
    #[error("recognition failed: {reason}")]
    Recognition { reason: String },

    // ── Expression errors ─────────────────────────────────────────────────
    /// Normalisation left nothing to parse (OCR saw no usable characters).
    #[error("no valid expression detected in the recognized text")]
    EmptyExpression,

    /// The normalized text did not parse or evaluate as a closed expression.
    #[error("invalid expression: {reason}")]
    InvalidExpression { reason: String },

    /// The equation could not be solved (parse failure on a side, unsupported
    /// form, no closed-form handling).
    #[error("could not solve equation: {reason}")]
    UnsolvableEquation { reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SnapsolveError {
    /// The `result` string returned to the client for this error.
    ///
    /// Every state-machine branch that does not produce a solution produces
    /// one of these fixed strings instead; the endpoint stays HTTP 200
    /// throughout.
    pub fn response_text(&self) -> String {
        match self {
            Self::RecognizerUnavailable => {
                "Tesseract OCR is not installed or not found. Please install it.".to_string()
            }
            Self::MissingImage => "No image received".to_string(),
            Self::EmptyExpression => "Could not detect valid expression".to_string(),
            Self::InvalidExpression { .. } => "Invalid expression".to_string(),
            Self::UnsolvableEquation { reason } => {
                format!("Could not solve equation: {reason}")
            }
            other => format!("Error: {other}"),
        }
    }
}
