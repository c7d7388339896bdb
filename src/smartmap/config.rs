//! Process-wide configuration for attribute-style access.
//!
//! The live [`Configuration`] is held behind a single lock. It is mutated
//! in place through [`configure`], which re-runs the install step whenever
//! the capability ends up enabled — turning the capability on is defined
//! as a side effect of configuring it. [`replace_from_value`] is the
//! loose-data replacement path and is the only fallible entry point.

use crate::error::{Result, SmartMapError};
use crate::key::KeyFormat;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Settings consulted by every container whose own capability state is
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Gate for the install step; containers never honor attribute-style
    /// access before [`install`] has run.
    #[serde(default)]
    pub enabled: bool,

    /// Fallback capability flag for containers that never set their own.
    #[serde(default)]
    pub smart_by_default: bool,

    #[serde(default)]
    default_format: KeyFormat,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback key format for containers that never set their own.
    pub fn default_format(&self) -> KeyFormat {
        self.default_format
    }

    pub fn set_default_format(&mut self, format: KeyFormat) {
        self.default_format = format;
    }

    /// Set the fallback key format by name. Unrecognized names silently
    /// fall back to `Sym`; this is a lenient-default policy, not a
    /// failure path.
    pub fn set_default_format_name(&mut self, name: &str) {
        self.default_format = KeyFormat::from_name(name);
    }
}

static CONFIGURATION: Lazy<RwLock<Configuration>> =
    Lazy::new(|| RwLock::new(Configuration::default()));

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Clone of the live configuration.
pub fn snapshot() -> Configuration {
    CONFIGURATION.read().unwrap().clone()
}

/// Replace the live configuration wholesale.
pub fn replace(config: Configuration) {
    *CONFIGURATION.write().unwrap() = config;
}

/// Replace the live configuration from loosely-typed data, e.g. a parsed
/// settings document. Fails with
/// [`SmartMapError::InvalidConfiguration`] when `value` does not have the
/// [`Configuration`] shape.
pub fn replace_from_value(value: &Value) -> Result<()> {
    let config: Configuration = serde_json::from_value(value.clone())
        .map_err(|_| SmartMapError::InvalidConfiguration(json_kind(value).to_string()))?;
    replace(config);
    Ok(())
}

/// Scoped update of the live configuration. The mutator runs under the
/// store lock; afterwards, if the capability is enabled, the install step
/// runs. This is the supported way to turn attribute-style access on.
pub fn configure<F>(mutator: F)
where
    F: FnOnce(&mut Configuration),
{
    let enabled = {
        let mut config = CONFIGURATION.write().unwrap();
        mutator(&mut config);
        config.enabled
    };

    if enabled {
        install();
    }
}

/// Opt the process into attribute-style access. Idempotent; normally
/// triggered by [`configure`] rather than called directly.
pub fn install() {
    INSTALLED.store(true, Ordering::SeqCst);
}

/// Whether the install step has run.
pub fn installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

/// Whether the capability is enabled in the live configuration.
pub fn enabled() -> bool {
    CONFIGURATION.read().unwrap().enabled
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serializes tests that touch the process-wide configuration. The live
/// configuration is reset to defaults on acquisition and again when the
/// guard drops.
#[cfg(test)]
pub(crate) fn test_lock() -> ConfigGuard {
    use std::sync::Mutex;

    static LOCK: Mutex<()> = Mutex::new(());

    let guard = LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    replace(Configuration::default());
    ConfigGuard { _guard: guard }
}

#[cfg(test)]
pub(crate) struct ConfigGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl Drop for ConfigGuard {
    fn drop(&mut self) {
        replace(Configuration::default());
    }
}
