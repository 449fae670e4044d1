//! Storage abstractions for the API key handshake.
//!
//! This crate defines the records and store traits the authentication
//! protocol persists through: registered public keys
//! ([`auth::ApiKeyRecord`] behind [`auth::ApiKeyStore`]) and pending
//! challenges ([`auth::Challenge`] behind [`auth::ChallengeStore`]).
//! In-memory implementations back the test suites and single-process
//! deployments; production backends implement the same traits.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod error;

pub use error::{StorageError, StorageResult};
