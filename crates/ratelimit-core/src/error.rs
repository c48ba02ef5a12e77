//! Unified error type for the rate limiter using thiserror.
//!
//! Every fallible operation in the core and its adapters returns [`Error`].
//! The HTTP layer owns the single mapping from these variants onto status
//! codes and external bodies; nothing downstream of this crate invents a
//! new error kind.

use thiserror::Error;

/// The unified error type for rate-limiter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The user row does not exist in the user store.
    #[error("User {user_id} not found")]
    NotFound { user_id: String },

    /// The user store (Postgres/Supabase) failed at the transport or schema
    /// level. Never locally recovered.
    #[error("Database error: {message}")]
    UserStoreError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The counter store (Redis) failed at the transport level, or returned
    /// a reply that could not be interpreted as a counter value.
    #[error("Cache error: {message}")]
    StoreError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The tier policy registry has no entry for the requested tier, or an
    /// entry with a non-positive window.
    #[error("Config error: {message}")]
    ConfigError { message: String },

    /// The request was malformed: an invalid UUID, an unparseable body, or
    /// an unknown field.
    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl Error {
    pub fn not_found(user_id: impl Into<String>) -> Self {
        Error::NotFound {
            user_id: user_id.into(),
        }
    }

    pub fn user_store(message: impl Into<String>) -> Self {
        Error::UserStoreError {
            message: message.into(),
            source: None,
        }
    }

    pub fn user_store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::UserStoreError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Error::StoreError {
            message: message.into(),
            source: None,
        }
    }

    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::StoreError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::ConfigError {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    /// HTTP status code for this error, per the error handling design.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::UserStoreError { .. } => 500,
            Error::StoreError { .. } => 500,
            Error::ConfigError { .. } => 500,
            Error::BadRequest { .. } => 400,
        }
    }

    /// The classified message carried in the external error body. Never the
    /// raw `source`, which may leak transport detail.
    pub fn external_message(&self) -> String {
        match self {
            Error::NotFound { user_id } => format!("User {user_id} not found"),
            Error::UserStoreError { .. } => "Database error".to_string(),
            Error::StoreError { .. } => "Cache error".to_string(),
            Error::ConfigError { .. } => "Config error".to_string(),
            Error::BadRequest { message } => message.clone(),
        }
    }
}

/// Result type alias for rate-limiter operations.
pub type Result<T> = std::result::Result<T, Error>;
