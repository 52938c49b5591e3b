// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of items fetched per window refill.
pub const DEFAULT_BUFFER_SIZE: usize = 1000;

/// Configuration for a [`Cursor`](crate::cursor::Cursor) and its next-item
/// buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub buffer_size: usize,
    /// Database used when a call does not name one.
    pub database: Option<String>,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            database: None,
        }
    }
}

impl CursorConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_buffer_size(self.buffer_size)?;
        if self.database.as_deref() == Some("") {
            return Err(Error::value("database name must not be empty"));
        }
        Ok(())
    }

    /// Reads a config from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn validate_buffer_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::value("buffer size must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_config_defaults() {
        let config = CursorConfig::default();
        assert_eq!(config.buffer_size, 1000);
        assert_eq!(config.database, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_options_apply() {
        let config = CursorConfig::default()
            .with_buffer_size(25)
            .with_database("demo/readonly");
        assert_eq!(config.buffer_size, 25);
        assert_eq!(config.database.as_deref(), Some("demo/readonly"));
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        let err = CursorConfig::default().with_buffer_size(0).validate().unwrap_err();
        assert!(matches!(err, Error::Value(_)));
        assert!(matches!(
            CursorConfig::default().with_database("").validate(),
            Err(Error::Value(_))
        ));
    }

    #[test]
    fn json_config_fills_defaults() {
        let config = CursorConfig::from_json(r#"{"database": "demo/writeable"}"#).unwrap();
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.database.as_deref(), Some("demo/writeable"));
        assert!(matches!(
            CursorConfig::from_json(r#"{"buffer_size": 0}"#),
            Err(Error::Value(_))
        ));
        assert!(matches!(
            CursorConfig::from_json("{"),
            Err(Error::Json(_))
        ));
    }
}
