//! Run configuration.
//!
//! Configuration is read once, before any input is loaded, from a `key=value` properties
//! file and then passed by value into the builder and batch runner. The file is parsed with
//! `dotenvy`'s iterator so nothing is written into the process environment.

use crate::constants::{
    CONFIG_ASID, CONFIG_IMMEDIATE_FAIL, CONFIG_ODS_CODE, CONFIG_OUTPUT, CONFIG_URL,
};
use crate::{EpsError, EpsResult};
use epsfhir_types::optional_text;
use fhir::Format;
use std::collections::HashMap;
use std::path::Path;

/// Identity of the sending system, carried in every message header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SenderConfig {
    pub asid: Option<String>,
    pub ods_code: Option<String>,
    pub endpoint: Option<String>,
}

/// Configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub sender: SenderConfig,
    pub format: Format,
    pub immediate_fail: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sender: SenderConfig::default(),
            format: Format::Json,
            immediate_fail: true,
        }
    }
}

impl RunConfig {
    /// Reads a properties file.
    ///
    /// # Errors
    ///
    /// Returns [`EpsError::Config`] if the file cannot be opened or a line cannot be parsed.
    pub fn load(path: &Path) -> EpsResult<Self> {
        let config_error = |source| EpsError::Config {
            path: path.to_path_buf(),
            source,
        };

        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(config_error)? {
            let (key, value) = item.map_err(config_error)?;
            values.insert(key, value);
        }
        let config = Self::from_values(&values);
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Builds configuration from already-parsed key/value pairs.
    pub fn from_values(values: &HashMap<String, String>) -> Self {
        let get = |key: &str| values.get(key).map(String::as_str);

        let sender_value = |key: &str| {
            let value = get(key).and_then(optional_text);
            if value.is_none() {
                tracing::warn!(key, "sender configuration missing; field will be omitted");
            }
            value
        };

        Self {
            sender: SenderConfig {
                asid: sender_value(CONFIG_ASID),
                ods_code: sender_value(CONFIG_ODS_CODE),
                endpoint: sender_value(CONFIG_URL),
            },
            format: Format::from_config_value(get(CONFIG_OUTPUT)),
            immediate_fail: immediate_fail_from_value(get(CONFIG_IMMEDIATE_FAIL)),
        }
    }
}

/// Immediate-fail toggle: on when absent or `true` (any case), off for anything else.
pub fn immediate_fail_from_value(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.trim().eq_ignore_ascii_case("true"),
    }
}
