use crate::types::FormErrors;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex = {
        let pattern = r"\A[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\z";
        Regex::new(pattern).unwrap()
    };
    static ref URL_RE: Regex = Regex::new(r"\Ahttps?://\S+\z").unwrap();
}

pub fn validate_required(field: &str, value: &str) -> Result<(), FormErrors> {
    if value.trim().is_empty() {
        Err(FormErrors::from(field, format!("{} is required", field)))
    } else {
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<(), FormErrors> {
    if !EMAIL_RE.is_match(email) {
        Err(FormErrors::from(
            "email",
            format!("Invalid email: {}", email),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_password(password: &str) -> Result<(), FormErrors> {
    if password.len() < 6 {
        Err(FormErrors::from(
            "password",
            "Password must be at least 6 characters",
        ))
    } else {
        Ok(())
    }
}

/// URL fields are optional everywhere; an empty value passes and gets a
/// default later.
pub fn validate_optional_url(field: &str, url: &str) -> Result<(), FormErrors> {
    if url.is_empty() || URL_RE.is_match(url) {
        Ok(())
    } else {
        Err(FormErrors::from(field, format!("Invalid URL: {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert!(validate_required("name", "  ").is_err());
        assert!(validate_required("name", "Test Cafe").is_ok());
    }

    #[test]
    fn email_format() {
        assert!(validate_email("test@test.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("tiny").is_err());
    }

    #[test]
    fn optional_url() {
        assert!(validate_optional_url("url", "").is_ok());
        assert!(validate_optional_url("url", "https://perchoffee.com").is_ok());
        assert!(validate_optional_url("url", "nope").is_err());
    }
}
