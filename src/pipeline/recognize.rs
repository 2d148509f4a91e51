//! Recognition: run the tesseract binary over a preprocessed bitmap.
//!
//! ## Why a subprocess?
//!
//! Linking libtesseract ties the build to a system C++ toolchain and a
//! specific API generation. The `tesseract` CLI is present wherever the
//! library is, has a stable invocation (`tesseract <image> stdout`), and the
//! page-segmentation and whitelist knobs this service needs are plain
//! command-line flags. The cost — one temp PNG per request — is negligible
//! next to the recognition itself.
//!
//! ## Why spawn_blocking?
//!
//! `Command::output()` blocks until tesseract exits (hundreds of
//! milliseconds). `tokio::task::spawn_blocking` moves that wait onto the
//! blocking thread pool so the async workers serving other requests never
//! stall behind it.

use crate::config::SolveConfig;
use crate::error::SnapsolveError;
use image::GrayImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Well-known install locations probed before falling back to `PATH`.
///
/// Package managers on Unix land in the first two; Homebrew on Apple Silicon
/// uses `/opt/homebrew`; the two Windows paths are the installer defaults.
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

/// Locate the tesseract binary, or `None` when it is not installed.
///
/// Probes [`WELL_KNOWN_PATHS`] first, then every directory on `PATH`. Called
/// once at startup via [`SolveConfig::detect`]; the result is carried in the
/// config so requests never touch the filesystem for this.
pub fn detect_tesseract() -> Option<PathBuf> {
    for candidate in WELL_KNOWN_PATHS {
        let path = Path::new(candidate);
        if path.is_file() {
            debug!("Found tesseract at well-known path: {}", path.display());
            return Some(path.to_path_buf());
        }
    }
    search_path("tesseract")
}

/// Scan the `PATH` directories for `name` (and `name.exe` on Windows).
fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!("Found {} on PATH: {}", name, candidate.display());
            return Some(candidate);
        }
        if cfg!(windows) {
            let candidate = dir.join(format!("{name}.exe"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Recognize text in a preprocessed bitmap.
///
/// Writes the bitmap to a scratch PNG, invokes tesseract on it, and returns
/// the captured stdout. The raw text may contain whitespace and stray
/// characters despite the whitelist; [`super::normalize`] deals with those.
///
/// # Errors
/// - [`SnapsolveError::RecognizerUnavailable`] when the config carries no
///   resolved binary.
/// - [`SnapsolveError::Recognition`] when the scratch file cannot be written,
///   the process fails to spawn, or it exits non-zero (stderr is surfaced in
///   the reason).
pub async fn recognize(bitmap: GrayImage, config: &SolveConfig) -> Result<String, SnapsolveError> {
    let cmd = config
        .tesseract_cmd
        .clone()
        .ok_or(SnapsolveError::RecognizerUnavailable)?;
    let whitelist = config.char_whitelist.clone();
    let psm = config.page_seg_mode;

    tokio::task::spawn_blocking(move || recognize_blocking(&cmd, &bitmap, psm, &whitelist))
        .await
        .map_err(|e| SnapsolveError::Internal(format!("Recognition task panicked: {e}")))?
}

/// Blocking implementation: scratch PNG → subprocess → stdout.
fn recognize_blocking(
    cmd: &Path,
    bitmap: &GrayImage,
    psm: u8,
    whitelist: &str,
) -> Result<String, SnapsolveError> {
    let scratch = tempfile::Builder::new()
        .prefix("snapsolve-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| SnapsolveError::Recognition {
            reason: format!("could not create scratch file: {e}"),
        })?;

    bitmap
        .save(scratch.path())
        .map_err(|e| SnapsolveError::Recognition {
            reason: format!("could not write scratch PNG: {e}"),
        })?;

    let args = tesseract_args(scratch.path(), psm, whitelist);
    debug!("Running {} {:?}", cmd.display(), args);

    let output = Command::new(cmd)
        .args(&args)
        .output()
        .map_err(|e| SnapsolveError::Recognition {
            reason: format!("failed to run {}: {e}", cmd.display()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("tesseract exited with {}: {}", output.status, stderr.trim());
        return Err(SnapsolveError::Recognition {
            reason: format!("tesseract exited with {}: {}", output.status, stderr.trim()),
        });
    }

    // `scratch` is dropped (and the PNG deleted) when this function returns.
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Argument list for one recognition run.
///
/// `stdout` as the output base makes tesseract print the text instead of
/// writing `<base>.txt`; the whitelist and page-segmentation mode are the two
/// accuracy knobs from the config.
fn tesseract_args(png: &Path, psm: u8, whitelist: &str) -> Vec<OsString> {
    vec![
        png.as_os_str().to_os_string(),
        OsString::from("stdout"),
        OsString::from("--psm"),
        OsString::from(psm.to_string()),
        OsString::from("-c"),
        OsString::from(format!("tessedit_char_whitelist={whitelist}")),
    ]
}
