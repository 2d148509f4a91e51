//! Request orchestration: image payload in, `{expression, result}` out.
//!
//! This is the recovery boundary of the whole crate. [`solve_request`] walks
//! the pipeline stage by stage and converts every failure into a
//! [`SolveReply`] with a human-readable `result` string — callers (the HTTP
//! handler, the CLI) never see an `Err` and never return anything but a
//! well-formed payload.

use crate::config::SolveConfig;
use crate::error::SnapsolveError;
use crate::pipeline::{decode, normalize, preprocess, recognize};
use crate::symbolic::{parse, solve_equation, EvalError};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Body of a `POST /solve` request.
///
/// `image` defaults to empty so a body without the field (or an empty `{}`)
/// walks the no-image branch instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolveRequest {
    #[serde(default)]
    pub image: String,
}

/// The wire payload every request ends in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReply {
    /// The normalized expression, or `""` when the pipeline never got that far.
    pub expression: String,
    /// A solution, a computed value, or a human-readable error string.
    pub result: String,
}

impl SolveReply {
    fn failure(err: &SnapsolveError) -> Self {
        Self {
            expression: String::new(),
            result: err.response_text(),
        }
    }
}

/// Run the full recognize-and-solve pipeline for one image payload.
///
/// Total: every branch of the state machine ends in a [`SolveReply`], never a
/// panic or an error. The stages:
///
/// 1. recognizer probe result — short-circuit when tesseract is missing
/// 2. payload presence check
/// 3. base64/bitmap decode
/// 4. preprocessing (pure)
/// 5. OCR via the tesseract subprocess
/// 6. normalisation; empty output means no usable expression
/// 7. evaluate or solve
pub async fn solve_request(config: &SolveConfig, image_payload: &str) -> SolveReply {
    let start = Instant::now();

    // ── Step 1: Recognizer availability ──────────────────────────────────
    if !config.recognizer_available() {
        return SolveReply::failure(&SnapsolveError::RecognizerUnavailable);
    }

    // ── Step 2: Payload presence ─────────────────────────────────────────
    if image_payload.trim().is_empty() {
        return SolveReply::failure(&SnapsolveError::MissingImage);
    }

    // ── Step 3: Decode ───────────────────────────────────────────────────
    let bitmap = match decode::decode_data_uri(image_payload) {
        Ok(img) => img,
        Err(e) => {
            warn!("Image decode failed: {e}");
            return SolveReply::failure(&e);
        }
    };

    // ── Step 4: Preprocess ───────────────────────────────────────────────
    let prepared = preprocess::prepare_for_recognition(&bitmap, config);

    // ── Step 5: Recognize ────────────────────────────────────────────────
    let raw_text = match recognize::recognize(prepared, config).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Recognition failed: {e}");
            return SolveReply::failure(&e);
        }
    };
    debug!("Extracted text: {raw_text:?}");

    // ── Step 6: Normalize ────────────────────────────────────────────────
    let expression = normalize::normalize(&raw_text);
    debug!("Cleaned expression: {expression:?}");

    if expression.is_empty() {
        return SolveReply::failure(&SnapsolveError::EmptyExpression);
    }

    // ── Step 7: Evaluate or solve ────────────────────────────────────────
    let result = match evaluate_or_solve(&expression) {
        Ok(result) => result,
        Err(e) => {
            debug!("Solve failed: {e}");
            e.response_text()
        }
    };

    info!(
        "Solved {:?} → {:?} in {}ms",
        expression,
        result,
        start.elapsed().as_millis()
    );

    SolveReply { expression, result }
}

/// Evaluate a normalized expression, or solve it when it is an equation.
///
/// Splits at the **first** `=`; an equation is solved for the union of free
/// variables on both sides (a nominal `x` when there are none), a plain
/// expression is evaluated to a number. A plain expression that still
/// contains a variable has no numeric value; it is echoed back in its parsed
/// form instead (`2*x+3` answers `2*x+3`), matching how a symbolic engine
/// partially evaluates.
///
/// # Errors
/// [`SnapsolveError::UnsolvableEquation`] on the equation path,
/// [`SnapsolveError::InvalidExpression`] on the evaluation path. Both carry
/// the underlying reason for logs; `response_text()` renders the wire string.
pub fn evaluate_or_solve(expression: &str) -> Result<String, SnapsolveError> {
    if let Some((lhs_text, rhs_text)) = expression.split_once('=') {
        let lhs = parse(lhs_text).map_err(|e| SnapsolveError::UnsolvableEquation {
            reason: format!("left side: {e}"),
        })?;
        let rhs = parse(rhs_text).map_err(|e| SnapsolveError::UnsolvableEquation {
            reason: format!("right side: {e}"),
        })?;
        let (var, solution) =
            solve_equation(&lhs, &rhs).map_err(|e| SnapsolveError::UnsolvableEquation {
                reason: e.to_string(),
            })?;
        debug!("Solved for {var}: {solution}");
        Ok(format!("Solutions: {solution}"))
    } else {
        let parsed = parse(expression).map_err(|e| SnapsolveError::InvalidExpression {
            reason: e.to_string(),
        })?;
        match parsed.eval() {
            Ok(value) => Ok(crate::symbolic::format_number(value)),
            // No `=` but a variable remains: nothing to solve for, nothing to
            // compute. Echo the parsed form rather than calling it invalid.
            Err(EvalError::FreeVariable { .. }) => Ok(parsed.to_string()),
            Err(e) => Err(SnapsolveError::InvalidExpression {
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── evaluate_or_solve ────────────────────────────────────────────────

    #[test]
    fn evaluates_a_closed_expression() {
        assert_eq!(evaluate_or_solve("2*2").unwrap(), "4");
        assert_eq!(evaluate_or_solve("10/4").unwrap(), "2.5");
    }

    #[test]
    fn solves_a_linear_equation() {
        assert_eq!(evaluate_or_solve("2*x+3=7").unwrap(), "Solutions: [2]");
    }

    #[test]
    fn solves_a_quadratic_equation() {
        assert_eq!(evaluate_or_solve("x**2-4=0").unwrap(), "Solutions: [-2, 2]");
    }

    #[test]
    fn splits_at_the_first_equals_sign() {
        // "x=1=2" → lhs "x", rhs "1=2"; the second '=' makes the right side
        // unparseable, which is an equation error, not a crash.
        let err = evaluate_or_solve("x=1=2").unwrap_err();
        match err {
            SnapsolveError::UnsolvableEquation { reason } => {
                assert!(reason.starts_with("right side:"), "got: {reason}")
            }
            other => panic!("expected UnsolvableEquation, got {other:?}"),
        }
    }

    #[test]
    fn free_variable_without_equals_echoes_the_parsed_form() {
        assert_eq!(evaluate_or_solve("2*x+3").unwrap(), "2*x+3");
        // Partial evaluation is not attempted; the parsed shape is kept.
        assert_eq!(evaluate_or_solve("(x+1)*(x-1)").unwrap(), "(x+1)*(x-1)");
    }

    #[test]
    fn non_finite_evaluation_is_still_invalid() {
        let err = evaluate_or_solve("1/0").unwrap_err();
        assert!(matches!(err, SnapsolveError::InvalidExpression { .. }));
        assert_eq!(err.response_text(), "Invalid expression");
    }

    #[test]
    fn unparseable_expression_is_invalid() {
        let err = evaluate_or_solve("2++").unwrap_err();
        assert!(matches!(err, SnapsolveError::InvalidExpression { .. }));
    }

    #[test]
    fn unsupported_equation_keeps_its_reason() {
        let err = evaluate_or_solve("x**3=8").unwrap_err();
        let text = err.response_text();
        assert!(text.starts_with("Could not solve equation:"), "got {text}");
        assert!(text.contains("degree 3"));
    }

    #[test]
    fn constant_identity_solves_to_all_reals() {
        assert_eq!(
            evaluate_or_solve("2=2").unwrap(),
            "Solutions: all real numbers"
        );
        assert_eq!(evaluate_or_solve("2=3").unwrap(), "Solutions: []");
    }

    // ── solve_request state machine ──────────────────────────────────────

    fn ready_config() -> SolveConfig {
        // A path that exists as a file but is not tesseract; only reached by
        // branches that stop before recognition.
        SolveConfig::builder()
            .tesseract_cmd("/dev/null")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn no_recognizer_short_circuits() {
        let reply = solve_request(&SolveConfig::default(), "anything").await;
        assert_eq!(reply.expression, "");
        assert_eq!(
            reply.result,
            "Tesseract OCR is not installed or not found. Please install it."
        );
    }

    #[tokio::test]
    async fn empty_payload_is_no_image() {
        let reply = solve_request(&ready_config(), "   ").await;
        assert_eq!(reply.expression, "");
        assert_eq!(reply.result, "No image received");
    }

    #[tokio::test]
    async fn undecodable_payload_is_an_error_reply() {
        let reply = solve_request(&ready_config(), "data:image/png;base64,@@@@").await;
        assert_eq!(reply.expression, "");
        assert!(reply.result.starts_with("Error: "), "got: {}", reply.result);
    }

    #[test]
    fn request_body_tolerates_missing_image_field() {
        let req: SolveRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.image, "");
    }

    #[test]
    fn reply_serializes_to_the_wire_shape() {
        let reply = SolveReply {
            expression: "2*x+3=7".into(),
            result: "Solutions: [2]".into(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"expression": "2*x+3=7", "result": "Solutions: [2]"})
        );
    }
}
