//! # snapsolve
//!
//! Solve handwritten or typed math expressions from images.
//!
//! ## Why this crate?
//!
//! Typing an equation into a calculator means transcribing it first. This
//! crate skips the transcription: photograph or sketch the expression, POST
//! it to `/solve`, get the answer. OCR is delegated to the `tesseract`
//! binary; the crate's own work is the part OCR engines get wrong — image
//! conditioning tuned for glyph recognition and a deterministic repair pass
//! that turns noisy recognition output into a parseable algebraic string.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image payload
//!  │
//!  ├─ 1. Decode      data-URI base64 → bitmap
//!  ├─ 2. Preprocess  grayscale, 3× upscale, autocontrast, binarize
//!  ├─ 3. Recognize   tesseract subprocess (blocking, spawn_blocking)
//!  ├─ 4. Normalize   fix misreads, insert implicit `*` operators
//!  └─ 5. Solve       evaluate a value, or solve an equation for its unknown
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapsolve::{solve_request, SolveConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Probes for the tesseract binary once; reuse the config per request.
//!     let config = SolveConfig::detect();
//!     let reply = solve_request(&config, "data:image/png;base64,iVBOR...").await;
//!     println!("{} → {}", reply.expression, reply.result);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `snapsolve` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! snapsolve = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod solve;
pub mod symbolic;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SolveConfig, SolveConfigBuilder, DEFAULT_CHAR_WHITELIST};
pub use error::SnapsolveError;
pub use pipeline::normalize::normalize;
pub use server::{router, run};
pub use solve::{evaluate_or_solve, solve_request, SolveReply, SolveRequest};
pub use symbolic::{Expr, Solution};
