//! Core shared types for Keystone.
//!
//! This crate is intentionally small: class-name syntax checks, qualified-name helpers and the
//! error taxonomy shared by the model and its producers.

mod error;
mod names;

pub use error::{InvalidNameReason, ModelError};
pub use names::{
    is_identifier_part, is_identifier_start, package_of, qualify, simple_name_of, validate,
    validate_class_name, validate_identifier, validate_package_name,
};
