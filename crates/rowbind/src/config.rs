//! Connection and model configuration.

use crate::error::{OrmError, OrmResult};
use std::time::Duration;

/// Environment variable read by [`ConnectOptions::from_env`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Optional environment variable for the session application name.
pub const APPLICATION_NAME_ENV: &str = "ROWBIND_APPLICATION_NAME";

/// Options passed to a driver when opening a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Driver-specific connection string (e.g. `postgres://user@localhost/db`).
    pub url: String,
    /// Reported to the server where supported.
    pub application_name: Option<String>,
    /// Connection establishment timeout.
    pub connect_timeout: Option<Duration>,
}

impl ConnectOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            application_name: None,
            connect_timeout: None,
        }
    }

    /// Build options from `DATABASE_URL` (and `ROWBIND_APPLICATION_NAME`, if set).
    pub fn from_env() -> OrmResult<Self> {
        let url = std::env::var(DATABASE_URL_ENV)
            .map_err(|_| OrmError::Config(format!("{DATABASE_URL_ENV} is not set")))?;
        let mut opts = Self::new(url);
        if let Ok(name) = std::env::var(APPLICATION_NAME_ENV) {
            opts.application_name = Some(name);
        }
        Ok(opts)
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

/// How the primary-key value is placed in an UPDATE's WHERE clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyBinding {
    /// `WHERE id = 5`: the key is rendered as an escaped SQL literal.
    #[default]
    Interpolate,
    /// `WHERE id = ?`: the key is bound after the SET values.
    Bind,
}

/// Per-model behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Primary-key column used when no field is marked primary.
    pub default_primary_key: String,
    /// Placement of the key value in UPDATE statements.
    pub key_binding: KeyBinding,
    /// Re-query the inserted row to recover an auto-generated key.
    pub recover_generated_key: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_primary_key: "id".to_string(),
            key_binding: KeyBinding::Interpolate,
            recover_generated_key: true,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_primary_key(mut self, column: impl Into<String>) -> Self {
        self.default_primary_key = column.into();
        self
    }

    pub fn key_binding(mut self, binding: KeyBinding) -> Self {
        self.key_binding = binding;
        self
    }

    /// Shorthand for `key_binding(KeyBinding::Bind)`.
    pub fn bind_primary_key(self) -> Self {
        self.key_binding(KeyBinding::Bind)
    }

    pub fn recover_generated_key(mut self, enabled: bool) -> Self {
        self.recover_generated_key = enabled;
        self
    }
}
