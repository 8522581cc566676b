//! Form checks run before anything reaches a repository.

use crate::error::{AppError, FieldError, Result};
use crate::models::IssueInput;

/// Whether the "at least one content section" rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCheck {
    Create,
    Replace,
}

pub fn validate_issue(input: &IssueInput, check: IssueCheck) -> Result<()> {
    let mut errors = Vec::new();

    if input.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    positive_number(&input.volume, "volume", "Volume", &mut errors);
    positive_number(&input.issue_number, "issueNumber", "Issue number", &mut errors);

    if check == IssueCheck::Create {
        let any_content = [&input.foreword, &input.reflections, &input.lessons]
            .iter()
            .any(|s| s.as_deref().is_some_and(|t| !t.trim().is_empty()));
        if !any_content {
            errors.push(FieldError::new("content", "At least one content section is required"));
        }
    }

    finish(errors)
}

fn positive_number(raw: &str, field: &'static str, label: &str, errors: &mut Vec<FieldError>) {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
        return;
    }
    match raw.parse::<u64>() {
        Ok(n) if n >= 1 => {}
        _ => errors.push(FieldError::new(field, format!("{label} must be a positive number"))),
    }
}

/// Name, e-mail and password rules for new accounts.
pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !looks_like_email(email) {
        errors.push(FieldError::new("email", "A valid e-mail address is required"));
    }
    if password.chars().count() < 8 {
        errors.push(FieldError::new("password", "Password must be at least 8 characters"));
    }
    finish(errors)
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> IssueInput {
        IssueInput {
            title: "Echoes".into(),
            volume: "2".into(),
            issue_number: "5".into(),
            foreword: Some("Dear Reader,".into()),
            ..Default::default()
        }
    }

    fn fields(err: AppError) -> Vec<&'static str> {
        match err {
            AppError::Validation(list) => list.into_iter().map(|e| e.field).collect(),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn accepts_complete_issue() {
        assert!(validate_issue(&input(), IssueCheck::Create).is_ok());
    }

    #[test]
    fn reports_every_missing_field() {
        let err = validate_issue(&IssueInput::default(), IssueCheck::Create).unwrap_err();
        assert_eq!(fields(err), vec!["title", "volume", "issueNumber", "content"]);
    }

    #[test]
    fn rejects_zero_and_non_numeric_volume() {
        let mut bad = input();
        bad.volume = "0".into();
        bad.issue_number = "two".into();
        let err = validate_issue(&bad, IssueCheck::Create).unwrap_err();
        assert_eq!(fields(err), vec!["volume", "issueNumber"]);
    }

    #[test]
    fn whitespace_only_sections_do_not_count_as_content() {
        let mut bad = input();
        bad.foreword = Some("  \n ".into());
        assert!(validate_issue(&bad, IssueCheck::Create).is_err());
        assert!(validate_issue(&bad, IssueCheck::Replace).is_ok());
    }

    #[test]
    fn signup_rules() {
        assert!(validate_signup("Ada", "ada@example.com", "correct horse").is_ok());
        let err = validate_signup(" ", "ada@", "short").unwrap_err();
        assert_eq!(fields(err), vec!["name", "email", "password"]);
    }
}
