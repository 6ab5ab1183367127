use diesel::result::Error as DieselError;
use rocket::http::Status;
use rocket::request::{FlashMessage, Request};
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;
use serde::Serialize;
use std::collections::HashMap;

/// Errors that escape a route handler. Lookup misses surface as the 404
/// page; anything else is a plain 500.
#[derive(Debug)]
pub enum AppError {
    Database(DieselError),
    Internal,
}

impl From<DieselError> for AppError {
    fn from(err: DieselError) -> AppError {
        AppError::Database(err)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(_: bcrypt::BcryptError) -> AppError {
        AppError::Internal
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for AppError {
    fn respond_to(self, _req: &'r Request<'_>) -> rocket::response::Result<'static> {
        match self {
            AppError::Database(DieselError::NotFound) => Err(Status::NotFound),
            AppError::Database(_) | AppError::Internal => Err(Status::InternalServerError),
        }
    }
}

/// What a page handler answers with: a rendered template or a flash-carrying
/// redirect.
#[derive(Responder)]
pub enum Page {
    Template(Template),
    Redirect(Flash<Redirect>),
}

pub type PageResult = Result<Page, AppError>;

/// One-shot flash text for the template context, consumed on render.
pub fn flash_message(flash: Option<FlashMessage<'_>>) -> Option<String> {
    flash.map(|flash| flash.message().to_string())
}

/// Per-field form error messages, rendered inline when a form is shown
/// again.
#[derive(Debug, Serialize, Default)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    pub fn add_error<K: Into<String>, V: Into<String>>(&mut self, key: K, val: V) {
        let entry = self.0.entry(key.into()).or_default();
        entry.push(val.into());
    }

    pub fn from<K: Into<String>, V: Into<String>>(key: K, val: V) -> Self {
        let mut errors = FormErrors::default();
        errors.add_error(key, val);
        errors
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (key, errors) in other.0.into_iter() {
            let entry = self.0.entry(key).or_default();
            entry.extend(errors);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
