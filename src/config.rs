//! Admin settings loaded from JSON.

use std::path::Path;

use serde::Deserialize;

use crate::charset::label::CharsetName;
use crate::charset::normalizer::CharsetSettings;
use crate::error::{Error, Result};

/// Connection-independent settings of the admin tool.
///
/// Every field is optional in the JSON document; missing fields take the
/// defaults below and unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    /// Schema injected into unqualified statements (blank = none).
    pub default_schema: String,
    /// Charset of text returned by the database (blank = same as output).
    pub data_charset: CharsetName,
    /// Charset of driver error messages (blank = use `data_charset`).
    pub error_charset: CharsetName,
    /// Charset the caller reads and writes.
    pub output_charset: CharsetName,
    /// Qualify unqualified table references with the active schema.
    pub auto_schema: bool,
    /// Rows per page in the SQL console.
    pub max_rows: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            default_schema: String::new(),
            data_charset: CharsetName::default(),
            error_charset: CharsetName::default(),
            output_charset: CharsetName::utf8(),
            auto_schema: true,
            max_rows: 50,
        }
    }
}

impl AdminConfig {
    /// Parse settings from a JSON string.
    pub fn load_from_json(json: &str) -> Result<Self> {
        let config: AdminConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON settings file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(Error::Config("max_rows must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Charset configuration handed to the normalizer.
    pub fn charsets(&self) -> CharsetSettings {
        CharsetSettings::new(
            self.data_charset.clone(),
            self.output_charset.clone(),
            self.error_charset.clone(),
        )
    }

    /// Rows per console page.
    pub fn page_size(&self) -> u64 {
        self.max_rows
    }
}
