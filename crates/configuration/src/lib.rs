//! # Bandwatch Configuration
//!
//! Owns the six tunables of the zone engine, the rules that validate them, and
//! the contract of the external service that persists the relative-error
//! thresholds between sessions.
//!
//! A `ZoneConfig` is a plain immutable value. Nothing in this crate mutates a
//! config in place: loading and overriding always produce a fresh candidate
//! that must pass `validate` before anyone may use it.

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;
pub mod store;

// Re-export the core types to provide a clean public API.
pub use error::{ConfigField, StoreError, ValidationError};
pub use logging::init_tracing;
pub use settings::{ZoneConfig, ZoneConfigOverrides, validate};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore, PersistedThresholds};

/// Prefix for environment variable overrides, e.g. `BANDWATCH_AMBER_WIDTH=15`.
pub const ENV_PREFIX: &str = "BANDWATCH";

/// Loads and validates the engine configuration.
///
/// Sources are layered: built-in defaults, then the TOML file (`path`, or an
/// optional `bandwatch.toml` in the working directory), then `BANDWATCH_*`
/// environment variables.
pub fn load_config(path: Option<&Path>) -> Result<ZoneConfig, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("bandwatch").required(false),
    };

    let builder = config::Config::builder()
        .add_source(config::Config::try_from(&ZoneConfig::default())?)
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    // Attempt to deserialize the entire configuration into our `ZoneConfig` struct
    let candidate = builder.try_deserialize::<ZoneConfig>()?;

    Ok(validate(candidate)?)
}
