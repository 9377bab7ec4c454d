use crate::error::ValidationError;

/// Minimum length, in bytes, of both logins and passwords.
pub const MIN_CREDENTIAL_LEN: usize = 8;

pub fn validate_login(login: &str) -> Result<(), ValidationError> {
    validate_credential("login", login)
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    validate_credential("password", password)
}

fn validate_credential(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.len() < MIN_CREDENTIAL_LEN {
        return Err(ValidationError(format!(
            "{} cannot be shorter than {} characters",
            field, MIN_CREDENTIAL_LEN
        )));
    }

    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError(format!("{} cannot contain spaces", field)));
    }

    Ok(())
}
