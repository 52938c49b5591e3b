// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Item-space client error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed token, quoted string, constructor or trailing text.
    #[error("idb syntax: {0}")]
    Syntax(String),
    /// An operation applied to a component or tree shape it does not support.
    #[error("idb type: {0}")]
    Type(String),
    /// Structurally invalid construction.
    #[error("idb value: {0}")]
    Value(String),
    /// Failure reported by an [`ItemSource`](crate::cursor::ItemSource).
    #[error("{0}")]
    RemoteAccess(RemoteError),
    #[error("idb json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A transport failure or non-success status from the remote database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub code: u16,
    pub reason: String,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "idb remote access error {}: {}", self.code, self.reason)
    }
}

impl std::error::Error for RemoteError {}

pub type Result<T> = std::result::Result<T, Error>;

/// Checks whether an error is a remote access error with the specified code.
pub fn is_remote_error(err: &Error, code: u16) -> bool {
    matches!(err, Error::RemoteAccess(RemoteError { code: c, .. }) if *c == code)
}

impl Error {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Error::Syntax(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Error::Type(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Error::Value(msg.into())
    }

    pub fn remote(code: u16, reason: impl Into<String>) -> Self {
        Error::RemoteAccess(RemoteError {
            code,
            reason: reason.into(),
        })
    }
}
