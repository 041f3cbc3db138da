/// Sign-up input rules
use crate::domain::DomainError;

const PASSWORD_MIN_CHARS: usize = 10;
const PASSWORD_MAX_CHARS: usize = 15;
const NICKNAME_MAX_CHARS: usize = 20;

/// 10 to 15 characters with at least one letter and one digit, typed the
/// same way twice
pub fn validate_password(password: &str, confirm: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(format!(
            "Password must be {} to {} characters",
            PASSWORD_MIN_CHARS, PASSWORD_MAX_CHARS
        )));
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(char::is_numeric);
    if !has_letter || !has_digit {
        return Err(DomainError::validation(
            "Password must contain at least one letter and one digit",
        ));
    }
    if password != confirm {
        return Err(DomainError::validation("Passwords do not match"));
    }
    Ok(())
}

/// Trim and lowercase an email, then check it looks like `local@domain.tld`
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    let invalid = || DomainError::validation("Enter a valid email address");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(email)
}

/// Trimmed nickname of 1 to 20 characters
pub fn validate_nickname(nickname: &str) -> Result<String, DomainError> {
    let nickname = nickname.trim();
    let len = nickname.chars().count();
    if len == 0 || len > NICKNAME_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Nickname must be 1 to {} characters",
            NICKNAME_MAX_CHARS
        )));
    }
    Ok(nickname.to_string())
}
