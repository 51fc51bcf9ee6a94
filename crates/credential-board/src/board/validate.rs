use super::error::BoardError;

/// Longest accepted value for free-text fields.
pub(crate) const MAX_TEXT_LEN: usize = 100;

pub(crate) const MIN_YEAR: i32 = 1900;
pub(crate) const MAX_YEAR: i32 = 2100;

/// Trimmed, non-blank, at most `MAX_TEXT_LEN` characters.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, BoardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(BoardError::validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Same checks as `required_text` but keeps the value byte-for-byte; used for fields that
/// feed a certificate fingerprint.
pub(crate) fn required_verbatim(field: &str, value: String) -> Result<String, BoardError> {
    required_text(field, &value)?;
    Ok(value)
}

pub(crate) fn graduation_year(year: i32) -> Result<i32, BoardError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(BoardError::validation(format!(
            "year must be between {MIN_YEAR} and {MAX_YEAR}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("title", "  Rust dev ").ok(), Some("Rust dev".to_string()));
        assert!(required_text("title", "   ").is_err());
        assert!(required_text("title", &"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn required_verbatim_keeps_whitespace() {
        assert_eq!(
            required_verbatim("student_name", "Jane Doe ".to_string()).ok(),
            Some("Jane Doe ".to_string())
        );
        assert!(required_verbatim("student_name", " ".to_string()).is_err());
    }

    #[test]
    fn graduation_year_bounds() {
        assert!(graduation_year(2023).is_ok());
        assert!(graduation_year(1899).is_err());
        assert!(graduation_year(2101).is_err());
    }
}
