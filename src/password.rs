//! Salted and hashed passwords.
//!
//! Passwords are hashed with bcrypt. The raw password only lives for the
//! duration of a request and is never stored.

use bcrypt::{BcryptError, hash, verify};

use crate::Error;

/// A salted and hashed password.
///
/// Does not implement `Serialize`: a hash must never end up in a response body.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt work factor used by the server unless configured otherwise.
    pub const DEFAULT_COST: u32 = 10;

    /// Hash `raw_password` with a new random salt.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the password could not be hashed,
    /// e.g. `cost` is outside of the range bcrypt accepts.
    pub fn new(raw_password: &str, cost: u32) -> Result<Self, Error> {
        match hash(raw_password, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid hash is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
