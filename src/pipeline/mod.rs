//! Pipeline stages for image-to-expression recognition.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch OCR engine) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! decode ──▶ preprocess ──▶ recognize ──▶ normalize
//! (base64)   (binarize)     (tesseract)   (repair text)
//! ```
//!
//! 1. [`decode`]     — data-URI payload → decoded bitmap
//! 2. [`preprocess`] — grayscale, upscale, autocontrast, binarize; pure
//!    transforms tuned for glyph recognition
//! 3. [`recognize`]  — shell out to the tesseract binary; runs in
//!    `spawn_blocking` because subprocess I/O is blocking
//! 4. [`normalize`]  — deterministic text-cleanup rules that turn raw OCR
//!    output into a parseable algebraic string
//!
//! The solving that follows normalisation lives in [`crate::symbolic`]; it
//! operates on text, not images, so it is not a pipeline stage here.

pub mod decode;
pub mod normalize;
pub mod preprocess;
pub mod recognize;
