// Input rules for guesses, words and account fields.

use crate::board::WORD_LENGTH;
use thiserror::Error;

pub const MIN_USERNAME_LENGTH: usize = 5;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Symbols a password may contain, and must contain at least one of.
pub const PASSWORD_SYMBOLS: [char; 4] = ['$', '%', '*', '@'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error("username is required")]
    UsernameRequired,
    #[error("username must be between 5 and 50 characters long")]
    UsernameLength,
    #[error("username can only contain letters")]
    UsernameCharacters,
    #[error("username must contain both uppercase and lowercase letters")]
    UsernameNeedsMixedCase,
    #[error("password is required")]
    PasswordRequired,
    #[error("password must be between 8 and 100 characters long")]
    PasswordLength,
    #[error("password can only contain letters, numbers and $, %, *, @")]
    PasswordCharacters,
    #[error("password must contain at least one letter")]
    PasswordNeedsLetter,
    #[error("password must contain at least one number")]
    PasswordNeedsDigit,
    #[error("password must contain one of these special characters: $, %, *, @")]
    PasswordNeedsSymbol,
    #[error("word must be exactly 5 letters")]
    WordLength,
    #[error("word must contain only letters")]
    WordCharacters,
}

/// True for exactly five ASCII letters, either case.
#[must_use]
pub fn is_valid_word(word: &str) -> bool {
    word.len() == WORD_LENGTH && word.chars().all(|c| c.is_ascii_alphabetic())
}

/// Trim and uppercase a guess or admin word, rejecting anything that is not
/// five letters.
pub fn normalize_word(input: &str) -> Result<String, ValidationError> {
    let word = input.trim();
    if is_valid_word(word) {
        return Ok(word.to_ascii_uppercase());
    }
    if word.chars().all(|c| c.is_ascii_alphabetic()) {
        Err(ValidationError::WordLength)
    } else {
        Err(ValidationError::WordCharacters)
    }
}

/// Letters only, mixed case, 5 to 50 characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(ValidationError::UsernameLength);
    }
    if !username.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::UsernameCharacters);
    }
    if !username.chars().any(|c| c.is_ascii_lowercase())
        || !username.chars().any(|c| c.is_ascii_uppercase())
    {
        return Err(ValidationError::UsernameNeedsMixedCase);
    }
    Ok(())
}

/// 8 to 100 characters from letters, digits and [`PASSWORD_SYMBOLS`], with at
/// least one of each kind.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    let len = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(ValidationError::PasswordLength);
    }
    if !password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(&c))
    {
        return Err(ValidationError::PasswordCharacters);
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::PasswordNeedsLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNeedsDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(&c)) {
        return Err(ValidationError::PasswordNeedsSymbol);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_word() {
        assert!(is_valid_word("CRANE"));
        assert!(is_valid_word("crane"));
        assert!(!is_valid_word("CRAN"));
        assert!(!is_valid_word("CRANES"));
        assert!(!is_valid_word("CR4NE"));
        assert!(!is_valid_word(""));
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  crane ").unwrap(), "CRANE");
        assert_eq!(normalize_word("CRAN"), Err(ValidationError::WordLength));
        assert_eq!(normalize_word("CR4NE"), Err(ValidationError::WordCharacters));
        assert_eq!(normalize_word("ÉCRAN"), Err(ValidationError::WordCharacters));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("PlayerOne").is_ok());
        assert_eq!(validate_username(""), Err(ValidationError::UsernameRequired));
        assert_eq!(validate_username("   "), Err(ValidationError::UsernameRequired));
        assert_eq!(validate_username("BoB"), Err(ValidationError::UsernameLength));
        assert_eq!(
            validate_username(&"Xy".repeat(26)),
            Err(ValidationError::UsernameLength)
        );
        assert_eq!(
            validate_username("alice_01"),
            Err(ValidationError::UsernameCharacters)
        );
        assert_eq!(
            validate_username("Bad Name"),
            Err(ValidationError::UsernameCharacters)
        );
        assert_eq!(
            validate_username("player"),
            Err(ValidationError::UsernameNeedsMixedCase)
        );
        assert_eq!(
            validate_username("PLAYER"),
            Err(ValidationError::UsernameNeedsMixedCase)
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abcd123$").is_ok());
        assert!(validate_password("Secret12@").is_ok());
        assert_eq!(validate_password(""), Err(ValidationError::PasswordRequired));
        assert_eq!(validate_password("ab1$"), Err(ValidationError::PasswordLength));
        assert_eq!(
            validate_password(&format!("a1$${}", "b".repeat(97))),
            Err(ValidationError::PasswordLength)
        );
        assert!(validate_password(&format!("a1${}", "b".repeat(97))).is_ok());
        assert_eq!(
            validate_password("Secret 12$"),
            Err(ValidationError::PasswordCharacters)
        );
        assert_eq!(
            validate_password("secret12#"),
            Err(ValidationError::PasswordCharacters)
        );
        assert_eq!(
            validate_password("12345678$"),
            Err(ValidationError::PasswordNeedsLetter)
        );
        assert_eq!(
            validate_password("password$"),
            Err(ValidationError::PasswordNeedsDigit)
        );
        assert_eq!(
            validate_password("Secret123"),
            Err(ValidationError::PasswordNeedsSymbol)
        );
    }
}
