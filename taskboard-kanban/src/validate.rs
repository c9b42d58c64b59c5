//! Field validation for board commands

use crate::error::{BoardError, Result};
use crate::types::{ColumnId, Uid};

pub const MAX_TITLE_CHARS: usize = 50;
pub const MAX_DESCRIPTION_CHARS: usize = 200;
pub const MAX_STATUS_CHARS: usize = 50;
pub const MAX_UID_CHARS: usize = 128;
pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_EMAIL_CHARS: usize = 254;

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(BoardError::invalid_value(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Owner identifiers are opaque but must be present
pub fn uid(uid: &Uid) -> Result<()> {
    if uid.as_str().trim().is_empty() {
        return Err(BoardError::missing_field("uid"));
    }
    check_len("uid", uid.as_str(), MAX_UID_CHARS)
}

pub fn title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(BoardError::invalid_value("title", "is required"));
    }
    check_len("title", title, MAX_TITLE_CHARS)
}

pub fn description(description: &str) -> Result<()> {
    check_len("description", description, MAX_DESCRIPTION_CHARS)
}

pub fn status(status: &ColumnId) -> Result<()> {
    if status.as_str().trim().is_empty() {
        return Err(BoardError::invalid_value("status", "must not be empty"));
    }
    check_len("status", status.as_str(), MAX_STATUS_CHARS)
}

pub fn name(name: &str) -> Result<()> {
    check_len("name", name, MAX_NAME_CHARS)
}

pub fn email(email: &str) -> Result<()> {
    check_len("email", email, MAX_EMAIL_CHARS)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(BoardError::invalid_value("email", "must look like name@host")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_limits() {
        assert!(title("Ship it").is_ok());
        assert!(title(&"x".repeat(50)).is_ok());
        assert!(title(&"x".repeat(51)).is_err());
        assert!(title("   ").is_err());
        assert!(title("").is_err());
    }

    #[test]
    fn test_limits_count_characters_not_bytes() {
        assert!(title(&"é".repeat(50)).is_ok());
        assert!(description(&"ü".repeat(200)).is_ok());
        assert!(description(&"ü".repeat(201)).is_err());
    }

    #[test]
    fn test_uid_required() {
        assert!(matches!(
            uid(&Uid::from("")),
            Err(BoardError::MissingField { .. })
        ));
        assert!(uid(&Uid::from("firebase-uid-123")).is_ok());
    }

    #[test]
    fn test_status_and_email() {
        assert!(status(&ColumnId::from("in-progress")).is_ok());
        assert!(status(&ColumnId::from(" ")).is_err());
        assert!(email("a@b.io").is_ok());
        assert!(email("nope").is_err());
        assert!(email("@b.io").is_err());
    }
}
