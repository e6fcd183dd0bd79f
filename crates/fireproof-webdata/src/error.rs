//! Website data store error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebDataError {
    #[error("Operation not supported by this data store: {0}")]
    Unsupported(&'static str),

    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),

    #[error("Web engine error: {0}")]
    Engine(String),
}
