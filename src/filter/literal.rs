//! Numeric text widening
//!
//! Planners copy numbers out of the question as written, so a numeric column
//! may be compared against `"80k"`, `"1.2M"`, `"40%"` or `"80,000"`.

use crate::config::LiteralPolicy;
use crate::plan::Literal;

/// Parse numeric text, honouring the suffixes the policy allows
///
/// Returns `None` for anything that is not a finite number once suffixes
/// and thousands separators are stripped.
pub fn parse_numeric_text(text: &str, policy: &LiteralPolicy) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (body, scale) = if let Some(body) = trimmed.strip_suffix('%') {
        if !policy.percent_suffix {
            return None;
        }
        (body, 0.01)
    } else if let Some(body) = trimmed.strip_suffix(['k', 'K']) {
        if !policy.magnitude_suffixes {
            return None;
        }
        (body, 1e3)
    } else if let Some(body) = trimmed.strip_suffix(['m', 'M']) {
        if !policy.magnitude_suffixes {
            return None;
        }
        (body, 1e6)
    } else {
        (trimmed, 1.0)
    };

    let digits: String = body
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_'))
        .collect();
    // reject "inf", "NaN" and friends that f64::from_str accepts
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let value = digits.parse::<f64>().ok()? * scale;
    value.is_finite().then_some(value)
}

/// Numeric value of a scalar literal, widening text when allowed
pub fn numeric_literal(literal: &Literal, policy: &LiteralPolicy) -> Option<f64> {
    match literal {
        Literal::Number(n) if n.is_finite() => Some(*n),
        Literal::Text(text) => parse_numeric_text(text, policy),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes() {
        let policy = LiteralPolicy::default();
        assert_eq!(parse_numeric_text("80k", &policy), Some(80_000.0));
        assert_eq!(parse_numeric_text("1.5M", &policy), Some(1_500_000.0));
        assert_eq!(parse_numeric_text("40%", &policy), Some(0.4));
        assert_eq!(parse_numeric_text(" 80,000 ", &policy), Some(80_000.0));
        assert_eq!(parse_numeric_text("-3", &policy), Some(-3.0));
    }

    #[test]
    fn test_rejects_non_numbers() {
        let policy = LiteralPolicy::default();
        for text in ["", "k", "abc", "inf", "NaN", "12kk", "1e400"] {
            assert_eq!(parse_numeric_text(text, &policy), None, "{}", text);
        }
    }

    #[test]
    fn test_policy_disables_suffixes() {
        let policy = LiteralPolicy {
            magnitude_suffixes: false,
            percent_suffix: false,
        };
        assert_eq!(parse_numeric_text("80k", &policy), None);
        assert_eq!(parse_numeric_text("40%", &policy), None);
        assert_eq!(parse_numeric_text("80000", &policy), Some(80_000.0));
    }
}
