//! Field rules for note create and update requests.
//!
//! Lengths count chars, and nothing is trimmed: a title of only spaces is
//! accepted.

use crate::error::ValidationError;
use notes_types::{CreateNoteRequest, Field, UpdateNoteRequest};

pub const TITLE_MAX_LEN: usize = 200;

const MSG_MISSING: &str = "Missing data for required field.";
const MSG_NULL: &str = "Field may not be null.";
const MSG_TITLE_LEN: &str = "Length must be between 1 and 200.";
const MSG_CONTENT_EMPTY: &str = "Shorter than minimum length 1.";

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

/// A validated update request. `None` leaves the stored field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

pub fn validate_create(req: &CreateNoteRequest) -> Result<NewNote, ValidationError> {
    let mut errors = ValidationError::default();
    let title = errors.collect("title", required(req.title.as_field_ref(), check_title));
    let content = errors.collect("content", required(req.content.as_field_ref(), check_content));

    match (title, content) {
        (Some(title), Some(content)) if errors.is_empty() => Ok(NewNote { title, content }),
        _ => Err(errors),
    }
}

pub fn validate_update(req: &UpdateNoteRequest) -> Result<NotePatch, ValidationError> {
    let mut errors = ValidationError::default();
    let title = errors.collect("title", optional(req.title.as_field_ref(), check_title));
    let content = errors.collect("content", optional(req.content.as_field_ref(), check_content));

    match (title, content) {
        (Some(title), Some(content)) if errors.is_empty() => Ok(NotePatch { title, content }),
        _ => Err(errors),
    }
}

fn check_title(title: &str) -> Result<(), &'static str> {
    let len = title.chars().count();
    if (1..=TITLE_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(MSG_TITLE_LEN)
    }
}

fn check_content(content: &str) -> Result<(), &'static str> {
    if content.is_empty() {
        Err(MSG_CONTENT_EMPTY)
    } else {
        Ok(())
    }
}

fn required(
    field: Field<&String>,
    check: fn(&str) -> Result<(), &'static str>,
) -> Result<String, &'static str> {
    match field {
        Field::Missing => Err(MSG_MISSING),
        Field::Null => Err(MSG_NULL),
        Field::Present(value) => check(value).map(|()| value.clone()),
    }
}

fn optional(
    field: Field<&String>,
    check: fn(&str) -> Result<(), &'static str>,
) -> Result<Option<String>, &'static str> {
    match field {
        Field::Missing => Ok(None),
        Field::Null => Err(MSG_NULL),
        Field::Present(value) => check(value).map(|()| Some(value.clone())),
    }
}
