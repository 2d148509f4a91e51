//! Configuration types for the recognition-and-solve pipeline.
//!
//! All behaviour is controlled through [`SolveConfig`], built via its
//! [`SolveConfigBuilder`]. The config is resolved **once** at startup —
//! including the probe for the tesseract binary — and is immutable afterwards;
//! request handling only ever reads it. That keeps the per-request path free
//! of filesystem probing and makes the whole config shareable behind an `Arc`.
//!
//! # Design choice: builder over constructor
//! Setters clamp their inputs to sane ranges and `build()` validates the rest,
//! so a `SolveConfig` that exists is a `SolveConfig` that works.

use crate::error::SnapsolveError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Character set handed to tesseract as the recognition whitelist.
///
/// Digits, the four operators, parentheses, dot, equals, the variable letters
/// in both cases, and caret. Everything else the OCR layer might hallucinate
/// is cleaned up by normalisation afterwards.
pub const DEFAULT_CHAR_WHITELIST: &str = "0123456789+-*/().=xyzXYZ^";

/// Configuration for image recognition and solving.
///
/// Built via [`SolveConfig::builder()`], [`SolveConfig::default()`] (no
/// recognizer), or [`SolveConfig::detect()`] (probe for tesseract once).
///
/// # Example
/// ```rust
/// use snapsolve::SolveConfig;
///
/// let config = SolveConfig::builder()
///     .upscale_factor(3)
///     .binarize_threshold(180)
///     .build()
///     .unwrap();
/// assert!(config.tesseract_cmd.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveConfig {
    /// Resolved path to the tesseract binary, or `None` when the startup probe
    /// found nothing. `None` makes every solve request answer with the fixed
    /// "not installed" message instead of attempting recognition.
    pub tesseract_cmd: Option<PathBuf>,

    /// Characters tesseract is allowed to emit. Default: [`DEFAULT_CHAR_WHITELIST`].
    ///
    /// Restricting the engine to the algebra alphabet roughly halves the
    /// misread rate on handwriting: the engine cannot answer `S` for `5` if
    /// `S` is not in the alphabet.
    pub char_whitelist: String,

    /// Tesseract page segmentation mode. Range: 0–13. Default: 6.
    ///
    /// Mode 6 ("assume a single uniform block of text") fits the one-line
    /// expression images this service receives. Automatic segmentation
    /// (mode 3) tends to split a long equation into fragments.
    pub page_seg_mode: u8,

    /// Upscale factor applied before recognition. Range: 1–8. Default: 3.
    ///
    /// Canvas drawings arrive small; scaling 3× gives strokes enough pixels
    /// for the engine's feature detection. Beyond ~4× the gains flatten while
    /// the binarisation cost grows quadratically.
    pub upscale_factor: u32,

    /// Binarisation threshold on the 0–255 luminance scale. Default: 180.
    ///
    /// Pixels strictly brighter than this become white, everything else black.
    /// 180 keeps faint pencil strokes while dropping paper texture and JPEG
    /// shadow noise.
    pub binarize_threshold: u8,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: None,
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            page_seg_mode: 6,
            upscale_factor: 3,
            binarize_threshold: 180,
        }
    }
}

impl SolveConfig {
    /// Create a new builder for `SolveConfig`.
    pub fn builder() -> SolveConfigBuilder {
        SolveConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config with the recognizer probed from the host.
    ///
    /// Checks the well-known install locations first, then `PATH`. This is
    /// the one-time startup probe; keep the returned config around rather
    /// than calling this per request.
    pub fn detect() -> Self {
        Self {
            tesseract_cmd: crate::pipeline::recognize::detect_tesseract(),
            ..Self::default()
        }
    }

    /// Whether a recognizer binary was resolved.
    pub fn recognizer_available(&self) -> bool {
        self.tesseract_cmd.is_some()
    }
}

/// Builder for [`SolveConfig`].
#[derive(Debug)]
pub struct SolveConfigBuilder {
    config: SolveConfig,
}

impl SolveConfigBuilder {
    /// Use a specific tesseract binary instead of probing.
    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = Some(cmd.into());
        self
    }

    pub fn char_whitelist(mut self, whitelist: impl Into<String>) -> Self {
        self.config.char_whitelist = whitelist.into();
        self
    }

    pub fn page_seg_mode(mut self, mode: u8) -> Self {
        self.config.page_seg_mode = mode.min(13);
        self
    }

    pub fn upscale_factor(mut self, factor: u32) -> Self {
        self.config.upscale_factor = factor.clamp(1, 8);
        self
    }

    pub fn binarize_threshold(mut self, threshold: u8) -> Self {
        self.config.binarize_threshold = threshold;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SolveConfig, SnapsolveError> {
        let c = &self.config;
        if c.char_whitelist.is_empty() {
            return Err(SnapsolveError::InvalidConfig(
                "Character whitelist must not be empty".into(),
            ));
        }
        if !c.char_whitelist.is_ascii() {
            return Err(SnapsolveError::InvalidConfig(format!(
                "Character whitelist must be ASCII, got {:?}",
                c.char_whitelist
            )));
        }
        Ok(self.config)
    }
}
