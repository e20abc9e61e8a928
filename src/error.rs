//! # Error Types
//!
//! This module defines the error type shared by every fallible part of keyglow.
//!
//! Unrecognized note names are deliberately *not* errors: the pitch resolver returns
//! `None` for them and callers drop those notes silently. Everything below is a failure
//! of an external collaborator or of the user's configuration.
//!
//! ## Error Types
//! - `Resolver` - The theory resolver could not answer a request
//! - `MalformedPayload` - The resolver answered with something that is not a TheoryResult
//! - `Storage` - The key-value store holding presets failed
//! - `Audio` - The audio backend is missing or refused an operation
//! - `Gate` - A wallet, chain or token-contract call failed
//! - `Config` - The YAML configuration is invalid
//! - `Serialization` - A result or view could not be written out as JSON
//!
//! ## Usage
//! ```rust
//! use keyglow::{KeyglowError, TheoryResult};
//!
//! match TheoryResult::from_json("not json") {
//!     Ok(result) => println!("{} {}", result.root, result.kind),
//!     Err(KeyglowError::MalformedPayload(message)) => eprintln!("bad payload: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyglowError {
    /// The theory resolver failed to produce an answer.
    ///
    /// # Example
    /// ```
    /// # use keyglow::KeyglowError;
    /// let err = KeyglowError::Resolver("service unavailable".to_string());
    /// assert_eq!(err.to_string(), "Theory resolver failed: service unavailable");
    /// ```
    #[error("Theory resolver failed: {0}")]
    Resolver(String),

    /// The resolver answered, but the payload is not a usable TheoryResult.
    ///
    /// # Example
    /// ```
    /// # use keyglow::KeyglowError;
    /// let err = KeyglowError::MalformedPayload("notes must not be empty".to_string());
    /// assert_eq!(err.to_string(), "Malformed theory payload: notes must not be empty");
    /// ```
    #[error("Malformed theory payload: {0}")]
    MalformedPayload(String),

    /// Reading or writing the preset store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The audio backend is unavailable or rejected an operation.
    #[error("Audio unavailable: {0}")]
    Audio(String),

    /// A wallet, chain-switch or balance query failed.
    #[error("Token gate error: {0}")]
    Gate(String),

    /// Invalid configuration.
    ///
    /// # Example
    /// ```
    /// # use keyglow::KeyglowError;
    /// let err = KeyglowError::Config("octave-count must be between 1 and 8".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: octave-count must be between 1 and 8");
    /// ```
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Writing a result or view out as JSON failed.
    ///
    /// # Example
    /// ```
    /// # use keyglow::KeyglowError;
    /// let err = KeyglowError::Serialization("key must be a string".to_string());
    /// assert_eq!(err.to_string(), "Serialization failed: key must be a string");
    /// ```
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
