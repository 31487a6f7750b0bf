use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name, email, and message are required")]
    MissingContactFields,

    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Message must be at least 10 characters long")]
    MessageTooShort,

    #[error("Message must be at most 2000 characters long")]
    MessageTooLong,
}

/// Body of the contact form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsletterForm {
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(pub String);

fn present(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

impl ContactForm {
    pub fn validate(&self) -> Result<ValidContact, ValidationError> {
        let (Some(name), Some(email), Some(message)) = (
            present(self.name.as_deref()),
            present(self.email.as_deref()),
            present(self.message.as_deref()),
        ) else {
            return Err(ValidationError::MissingContactFields);
        };

        check_email(email)?;

        let length = message.chars().count();
        if length < MESSAGE_MIN_CHARS {
            return Err(ValidationError::MessageTooShort);
        }
        if length > MESSAGE_MAX_CHARS {
            return Err(ValidationError::MessageTooLong);
        }

        Ok(ValidContact {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

impl NewsletterForm {
    pub fn validate(&self) -> Result<ValidEmail, ValidationError> {
        let email = present(self.email.as_deref()).ok_or(ValidationError::MissingEmail)?;
        check_email(email)?;
        Ok(ValidEmail(email.to_string()))
    }
}
