//! Notes Service: in-memory CRUD API for notes.
//!
//! The [`store::NoteStore`] owns every note and enforces the field rules in
//! [`validation`]. [`routes`] exposes it over HTTP under `/notes/`.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;
pub mod validation;

pub use error::{ApiError, NoteError, ValidationError};
pub use store::NoteStore;
