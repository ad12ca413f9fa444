//! Free-text amount parsing (`10rb`, `1jt`, `100k`, `25.000`).

use thiserror::Error as ThisError;
use tracing::warn;

/// Multiplier tokens, checked in this order. Detection is substring
/// containment, so a token anywhere in the input triggers the multiplier.
const MULTIPLIERS: [(&str, i64); 3] = [("jt", 1_000_000), ("rb", 1_000), ("k", 1_000)];

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum NominalError {
    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("negative amount: {0}")]
    Negative(i64),

    #[error("amount out of range: {0:?}")]
    Overflow(String),
}

/// Strict parse. Spaces and `.` thousands separators are dropped before the
/// multiplier is detected, so `1.5jt` reads as `15jt`.
pub fn try_parse(text: &str) -> Result<i64, NominalError> {
    let mut token: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();

    let mut multiplier = 1;
    if let Some((suffix, factor)) = MULTIPLIERS.iter().find(|(s, _)| token.contains(s)) {
        token = token.replace(suffix, "");
        multiplier = *factor;
    }

    let base: i64 = token
        .parse()
        .map_err(|_| NominalError::NotANumber(text.to_string()))?;
    if base < 0 {
        return Err(NominalError::Negative(base));
    }
    base.checked_mul(multiplier)
        .ok_or_else(|| NominalError::Overflow(text.to_string()))
}

/// Fail-open parse: anything unparseable becomes `0`, with a warning.
pub fn parse(text: &str) -> i64 {
    try_parse(text).unwrap_or_else(|err| {
        warn!(input = %text, error = %err, "Nominal did not parse; recording 0");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_suffixes() {
        assert_eq!(parse("10rb"), 10_000);
        assert_eq!(parse("1jt"), 1_000_000);
        assert_eq!(parse("100k"), 100_000);
        assert_eq!(parse("2500"), 2500);
    }

    #[test]
    fn case_spaces_and_separators_are_ignored() {
        assert_eq!(parse(" 10 RB "), 10_000);
        assert_eq!(parse("25.000"), 25_000);
        assert_eq!(parse("2JT"), 2_000_000);
    }

    #[test]
    fn dot_is_stripped_before_the_multiplier() {
        assert_eq!(parse("1.5jt"), 15_000_000);
        assert_eq!(parse("1.5jt"), parse("15jt"));
    }

    #[test]
    fn jt_wins_over_k() {
        // "jt" is checked first; the stray "k" is left behind and breaks the number.
        assert_eq!(try_parse("1jtk"), Err(NominalError::NotANumber("1jtk".to_string())));
    }

    #[test]
    fn unparseable_input_is_zero() {
        assert_eq!(parse("abc"), 0);
        assert_eq!(parse(""), 0);
        assert!(matches!(try_parse("abc"), Err(NominalError::NotANumber(_))));
    }

    #[test]
    fn negative_and_overflowing_amounts_are_rejected() {
        assert_eq!(try_parse("-5rb"), Err(NominalError::Negative(-5)));
        assert!(matches!(
            try_parse("99999999999999jt"),
            Err(NominalError::Overflow(_))
        ));
        assert_eq!(parse("-5rb"), 0);
    }
}
