use validator::ValidateEmail;

/// Syntactic email check (HTML5 / RFC 5322 subset, as `#[validate(email)]` applies).
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}
