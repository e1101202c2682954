//! Form validation.
//!
//! Every form is checked locally before anything is sent to the backend.
//! Errors are collected per field so a front end can show them next to the
//! inputs; only the first problem with each field is kept.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use devmart_core::{CategoryId, Email, Price};

use crate::api::{CategoryInput, ProductInput};

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 100;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;

/// Per-field validation failures, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    fields: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.fields.push((field, message.into()));
        }
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(field, message)` pairs in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(value)` if nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Auth Forms
// =============================================================================

/// Sign-in form.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    /// Validate and return the parsed email.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&mut errors, &self.email);
        check_password(&mut errors, "password", &self.password);
        match email {
            Some(email) => errors.into_result(email),
            None => Err(errors),
        }
    }
}

/// Registration form.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl RegisterForm {
    /// Validate and return the parsed email.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username_len = self.username.trim().chars().count();
        if username_len < MIN_USERNAME_LENGTH {
            errors.add(
                "username",
                format!("Username must be at least {MIN_USERNAME_LENGTH} characters"),
            );
        } else if username_len > MAX_USERNAME_LENGTH {
            errors.add(
                "username",
                format!("Username must be at most {MAX_USERNAME_LENGTH} characters"),
            );
        }

        let email = check_email(&mut errors, &self.email);
        check_password(&mut errors, "password", &self.password);

        if self.confirm_password.expose_secret().is_empty() {
            errors.add("confirm_password", "Please confirm your password");
        } else if self.confirm_password.expose_secret() != self.password.expose_secret() {
            errors.add("confirm_password", "Passwords do not match");
        }

        match email {
            Some(email) => errors.into_result(email),
            None => Err(errors),
        }
    }
}

fn check_email(errors: &mut ValidationErrors, raw: &str) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.add("email", e.to_string());
            None
        }
    }
}

fn check_password(errors: &mut ValidationErrors, field: &'static str, password: &SecretString) {
    let len = password.expose_secret().chars().count();
    if len < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    } else if len > MAX_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("Password must be at most {MAX_PASSWORD_LENGTH} characters"),
        );
    }
}

// =============================================================================
// Admin Forms
// =============================================================================

/// Product editor form, as typed by the administrator.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub image_url: String,
    pub category_id: String,
}

impl ProductForm {
    /// Validate and convert into a request body.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let price = match Price::from_str(self.price.trim()) {
            Ok(price) if price.is_negative() => {
                errors.add("price", "Price cannot be negative");
                Price::ZERO
            }
            Ok(price) => price,
            Err(_) => {
                errors.add("price", "Price must be a number");
                Price::ZERO
            }
        };

        let stock = self.stock.trim().parse::<u32>().unwrap_or_else(|_| {
            errors.add("stock", "Stock must be a whole number, zero or more");
            0
        });

        let image_url = optional(&self.image_url);
        if let Some(raw) = &image_url
            && Url::parse(raw).is_err()
        {
            errors.add("image_url", "Image URL is not a valid URL");
        }

        let category_id = optional(&self.category_id).and_then(|raw| {
            raw.parse::<CategoryId>()
                .map_err(|_| errors.add("category_id", "Category must be a numeric ID"))
                .ok()
        });

        errors.into_result(ProductInput {
            name: name.to_string(),
            description: optional(&self.description),
            price,
            stock,
            image_url,
            category_id,
        })
    }
}

/// Category editor form.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
}

impl CategoryForm {
    /// Validate and convert into a request body.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<CategoryInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }
        errors.into_result(CategoryInput {
            name: name.to_string(),
            description: optional(&self.description),
        })
    }
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
