//! Normalisation: deterministic repair of raw OCR text into algebra.
//!
//! ## Why normalise?
//!
//! Tesseract output for a photographed `2x+3=7` is rarely `2x+3=7`. Even with
//! a whitelist the engine emits artefacts that are *visually plausible* but
//! *algebraically invalid* — for example:
//!
//! - Stray spaces and newlines from page segmentation (`2x +3 =7\n`)
//! - Unicode look-alikes: `−` (minus sign) for `-`, `×` for `*`, `÷` for `/`
//! - Stroke confusions: `|`, `I`, `l` for `1`; `O`, `o` for `0`
//! - Handwriting that omits multiplication entirely (`2x`, `(x+1)(x-1)`)
//!
//! This module applies cheap, deterministic string/regex rules that turn that
//! text into something the expression parser accepts, without guessing at
//! intent. Each rule is independently testable.
//!
//! ## Rule Order
//!
//! Rules must run in this specific order: substitutions before the whitelist
//! filter (so `^` becomes `**` instead of being dropped, and `×`/`÷` are
//! translated rather than lost), the filter before the insertion passes (so
//! noise cannot create false adjacencies), and the insertion passes exactly as
//! listed — each pass scans left to right, non-overlapping, and a `*` it
//! inserts is invisible to the passes that follow.

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalise raw recognized text into a parseable algebraic string.
///
/// Runs the cleanup passes in a defined order. Each pass is a pure function
/// (`&str → String`) with no shared state; the function is total and never
/// panics, whatever the OCR engine produced.
///
/// Rules (applied in order):
/// 1. Strip space and newline characters
/// 2. Substitute common recognition confusions (`−×÷^|IlOo` and dashes)
/// 3. Drop every character outside `0-9 a-z A-Z + - * / ( ) . =`
/// 4. `2x` → `2*x` (digit then letter)
/// 5. `x2` → `x*2` (letter then digit)
/// 6. `xy` → `x*y` (letter then letter)
/// 7. `)2` → `)*2` (close-paren then digit)
/// 8. `)x` → `)*x` (close-paren then letter)
/// 9. `)(` → `)*(` (close-paren then open-paren)
///
/// # Example
/// ```rust
/// use snapsolve::pipeline::normalize::normalize;
///
/// assert_eq!(normalize("2x + 3 = 7\n"), "2*x+3=7");
/// assert_eq!(normalize("x^2-4"), "x**2-4");
/// ```
pub fn normalize(raw: &str) -> String {
    let s = strip_whitespace(raw);
    let s = substitute_confusions(&s);
    let s = drop_disallowed_chars(&s);
    let s = star_digit_then_letter(&s);
    let s = star_letter_then_digit(&s);
    let s = star_letter_then_letter(&s);
    let s = star_paren_then_digit(&s);
    let s = star_paren_then_letter(&s);
    star_paren_then_paren(&s)
}

// ── Rule 1: Strip spaces and newlines ────────────────────────────────────────

fn strip_whitespace(input: &str) -> String {
    input.replace([' ', '\n'], "")
}

// ── Rule 2: Substitute recognition confusions ────────────────────────────────

/// Ordered substitution table. `^ → **` must happen before the whitelist
/// filter, and the `1`/`0` confusions before the insertion passes (a repaired
/// `O` must count as a digit, not a letter, when stars are inserted).
const CONFUSIONS: &[(&str, &str)] = &[
    ("\u{2212}", "-"), // minus sign
    ("\u{00D7}", "*"), // multiplication sign
    ("\u{00F7}", "/"), // division sign
    ("^", "**"),
    ("|", "1"),
    ("I", "1"),
    ("l", "1"),
    ("O", "0"),
    ("o", "0"),
    ("\u{2014}", "-"), // em-dash
    ("\u{2013}", "-"), // en-dash
];

fn substitute_confusions(input: &str) -> String {
    let mut s = input.to_string();
    for (from, to) in CONFUSIONS {
        s = s.replace(from, to);
    }
    s
}

// ── Rule 3: Drop everything outside the expression alphabet ──────────────────

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9a-zA-Z+\-*/().=]").unwrap());

fn drop_disallowed_chars(input: &str) -> String {
    RE_DISALLOWED.replace_all(input, "").to_string()
}

// ── Rule 4: digit then letter ────────────────────────────────────────────────

static RE_DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)([a-zA-Z])").unwrap());

fn star_digit_then_letter(input: &str) -> String {
    RE_DIGIT_LETTER.replace_all(input, "${1}*${2}").to_string()
}

// ── Rule 5: letter then digit ────────────────────────────────────────────────

static RE_LETTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z])(\d)").unwrap());

fn star_letter_then_digit(input: &str) -> String {
    RE_LETTER_DIGIT.replace_all(input, "${1}*${2}").to_string()
}

// ── Rule 6: letter then letter ───────────────────────────────────────────────
//
// Non-overlapping by design: `xyz` pairs up `xy`, resumes after it, and
// leaves `yz` alone — the result is `x*yz`, not `x*y*z`. Chained adjacency is
// a heuristic, not a grammar; keep the scan semantics exactly as they are.

static RE_LETTER_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z])([a-zA-Z])").unwrap());

fn star_letter_then_letter(input: &str) -> String {
    RE_LETTER_LETTER.replace_all(input, "${1}*${2}").to_string()
}

// ── Rule 7: close-paren then digit ───────────────────────────────────────────

static RE_PAREN_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)(\d)").unwrap());

fn star_paren_then_digit(input: &str) -> String {
    RE_PAREN_DIGIT.replace_all(input, ")*${1}").to_string()
}

// ── Rule 8: close-paren then letter ──────────────────────────────────────────

static RE_PAREN_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)([a-zA-Z])").unwrap());

fn star_paren_then_letter(input: &str) -> String {
    RE_PAREN_LETTER.replace_all(input, ")*${1}").to_string()
}

// ── Rule 9: close-paren then open-paren ──────────────────────────────────────
//
// Runs last so the inserted stars cannot shift the scan positions of the
// earlier passes.

static RE_PAREN_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)\(").unwrap());

fn star_paren_then_paren(input: &str) -> String {
    RE_PAREN_PAREN.replace_all(input, ")*(").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace("2x + 3\n= 7\n"), "2x+3=7");
    }

    #[test]
    fn test_substitute_unicode_operators() {
        assert_eq!(substitute_confusions("3\u{00D7}4\u{00F7}2"), "3*4/2");
        assert_eq!(substitute_confusions("5\u{2212}2"), "5-2");
        assert_eq!(substitute_confusions("a\u{2014}b\u{2013}c"), "a-b-c");
    }

    #[test]
    fn test_substitute_caret_becomes_double_star() {
        assert_eq!(substitute_confusions("x^2"), "x**2");
    }

    #[test]
    fn test_substitute_stroke_confusions() {
        assert_eq!(substitute_confusions("|+I+l"), "1+1+1");
        assert_eq!(substitute_confusions("O+o"), "0+0");
    }

    #[test]
    fn test_drop_disallowed() {
        assert_eq!(drop_disallowed_chars("2+#2!?"), "2+2");
        assert_eq!(drop_disallowed_chars("\t$€2"), "2");
    }

    #[test]
    fn test_star_digit_then_letter() {
        assert_eq!(star_digit_then_letter("2x"), "2*x");
        assert_eq!(star_digit_then_letter("22x"), "22*x");
    }

    #[test]
    fn test_star_letter_then_digit() {
        assert_eq!(star_letter_then_digit("x2"), "x*2");
    }

    #[test]
    fn test_star_letter_then_letter_non_overlapping() {
        assert_eq!(star_letter_then_letter("xy"), "x*y");
        // Pairs are consumed left to right; the middle letter is not reused.
        assert_eq!(star_letter_then_letter("xyz"), "x*yz");
        assert_eq!(star_letter_then_letter("abcd"), "a*bc*d");
    }

    #[test]
    fn test_star_paren_rules() {
        assert_eq!(star_paren_then_digit(")2"), ")*2");
        assert_eq!(star_paren_then_letter(")x"), ")*x");
        assert_eq!(star_paren_then_paren(")("), ")*(");
    }

    // ── Full-pipeline properties ─────────────────────────────────────────

    #[test]
    fn normalize_linear_equation() {
        assert_eq!(normalize("2x+3=7"), "2*x+3=7");
    }

    #[test]
    fn normalize_caret_power() {
        assert_eq!(normalize("x^2-4"), "x**2-4");
    }

    #[test]
    fn normalize_adjacent_parens() {
        assert_eq!(normalize("(x+1)(x-1)"), "(x+1)*(x-1)");
    }

    #[test]
    fn normalize_capital_o_reads_as_zero() {
        assert_eq!(normalize("2O+1"), "20+1");
    }

    #[test]
    fn normalize_strips_all_whitespace() {
        let out = normalize(" 2 +\t3\n* 4 ");
        assert_eq!(out, "2+3*4");
        assert!(out.chars().all(|c| !c.is_whitespace()));
    }

    #[test]
    fn normalize_chained_adjacency_heuristics() {
        // The passes run in a fixed order and do not re-trigger each other.
        assert_eq!(normalize("2xy"), "2*x*y");
        assert_eq!(normalize("x2y"), "x*2*y");
        assert_eq!(normalize("xyz"), "x*yz");
    }

    #[test]
    fn normalize_mixed_noise() {
        // Whitespace, unicode operators, stroke confusions, and noise chars
        // all in one line.
        assert_eq!(normalize("2x \u{00D7} O + l\n#"), "2*x*0+1");
    }

    #[test]
    fn substitution_and_filter_are_idempotent_on_clean_text() {
        for cleaned in ["2*x+3=7", "x**2-4", "(x+1)*(x-1)", "20+1", ""] {
            let again = drop_disallowed_chars(&substitute_confusions(cleaned));
            assert_eq!(again, cleaned, "steps 2-3 must be a no-op on {cleaned:?}");
        }
    }

    #[test]
    fn normalize_empty_and_pure_noise() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n "), "");
        assert_eq!(normalize("##!!??"), "");
    }

    #[test]
    fn inserted_star_does_not_retrigger_earlier_passes() {
        // `)x2` → paren-letter gives `)*x2`, but letter-digit already ran;
        // the digit pass order is what the output reflects.
        assert_eq!(normalize(")x"), ")*x");
        // letter-digit runs before paren-letter, so `x2` is starred first.
        assert_eq!(normalize(")x2"), ")*x*2");
    }
}
