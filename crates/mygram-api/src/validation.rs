//! Structural validation of request payloads.
//!
//! Every violated rule contributes one message. Messages come out in the
//! order fields are checked, then in rule order within a field. A field that
//! fails `required` is not checked any further.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use email_address::EmailAddress;
use serde::de::DeserializeOwned;

use mygram_types::api::{
    CommentRequest, LoginRequest, PhotoRequest, RegisterRequest, SocialMediaRequest,
};

use crate::error::ApiError;

pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Collects field errors across all rules of a payload.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text<'v, 'a>(&'v mut self, field: &'static str, value: &'a str) -> TextField<'v, 'a> {
        TextField {
            validator: self,
            field,
            value,
            failed: false,
        }
    }

    pub fn number(&mut self, field: &'static str, value: Option<i64>) -> NumberField<'_> {
        NumberField {
            validator: self,
            field,
            value,
            failed: false,
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }

    fn reject(&mut self, message: String) {
        self.errors.push(message);
    }
}

pub struct TextField<'v, 'a> {
    validator: &'v mut Validator,
    field: &'static str,
    value: &'a str,
    failed: bool,
}

impl TextField<'_, '_> {
    pub fn required(mut self) -> Self {
        if !self.failed && self.value.trim().is_empty() {
            self.fail(format!("{} is required", self.field));
        }
        self
    }

    pub fn email(mut self) -> Self {
        if !self.failed && !EmailAddress::is_valid(self.value) {
            self.fail(format!("{} must be a valid email address", self.field));
        }
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        if !self.failed && self.value.chars().count() < min {
            self.fail(format!("{} must be at least {} characters", self.field, min));
        }
        self
    }

    fn fail(&mut self, message: String) {
        self.failed = true;
        self.validator.reject(message);
    }
}

pub struct NumberField<'v> {
    validator: &'v mut Validator,
    field: &'static str,
    value: Option<i64>,
    failed: bool,
}

impl NumberField<'_> {
    pub fn required(mut self) -> Self {
        if !self.failed && self.value.is_none() {
            self.failed = true;
            self.validator.reject(format!("{} is required", self.field));
        }
        self
    }

    /// Inclusive on both ends. An absent value is left to `required`.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        if let Some(value) = self.value {
            if !self.failed && !(min..=max).contains(&value) {
                self.failed = true;
                self.validator
                    .reject(format!("{} must be between {} and {}", self.field, min, max));
            }
        }
        self
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.text("username", &self.username).required();
        v.text("email", &self.email).required().email();
        v.text("password", &self.password).required().min_length(6);
        v.number("age", self.age).required().range(8, 99);
        v.finish()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.text("email", &self.email).required();
        v.text("password", &self.password).required();
        v.finish()
    }
}

impl Validate for PhotoRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.text("title", &self.title).required();
        v.text("photo_url", &self.photo_url).required();
        v.finish()
    }
}

impl Validate for CommentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.text("message", &self.message).required();
        v.finish()
    }
}

impl Validate for SocialMediaRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.text("name", &self.name).required();
        v.text("social_media_url", &self.social_media_url).required();
        v.finish()
    }
}

/// JSON body extractor that rejects malformed or invalid payloads with the
/// failure envelope before the handler runs.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value.validate()?;
        Ok(Self(value))
    }
}
