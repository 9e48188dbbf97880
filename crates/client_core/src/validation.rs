use shared::domain::{Marks, MarksOutOfRange};
use thiserror::Error;

pub const MARKS_RANGE_WARNING: &str = "Marks must be between 0 and 100.";
pub const COUNT_LABEL: &str = "Total Students";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarksInputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error(transparent)]
    OutOfRange(#[from] MarksOutOfRange),
}

/// Client-side check of the score input before any request is issued.
pub fn parse_marks_input(raw: &str) -> Result<Marks, MarksInputError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| MarksInputError::NotANumber(trimmed.to_string()))?;
    if value.is_nan() {
        return Err(MarksInputError::NotANumber(trimmed.to_string()));
    }
    Ok(Marks::new(value)?)
}

/// Reads the first number in the count indicator and renders it one lower.
/// `None` when the text holds no number.
pub fn decrement_count_text(text: &str) -> Option<String> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let current: u64 = digits.parse().ok()?;
    Some(format!("{COUNT_LABEL}: {}", current.saturating_sub(1)))
}
