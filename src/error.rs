//! Error types for erasim.
//!
//! This module provides error types for palette loading, simulation
//! resolution and initialization, and era table configuration.
//!
//! Most runtime conditions are *not* errors: pool exhaustion, a second
//! transition request, and double teardown are silent no-ops. Only the
//! operations a caller can meaningfully react to return `Result`.

use std::fmt;

/// Errors that can occur while loading a palette swatch image.
#[derive(Debug)]
pub enum PaletteError {
    /// Failed to decode the image file.
    ImageLoad(image::ImageError),
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// The image has no pixels to sample.
    Empty,
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::ImageLoad(e) => write!(f, "Failed to load palette image: {}", e),
            PaletteError::Io(e) => write!(f, "Failed to read palette file: {}", e),
            PaletteError::Empty => write!(f, "Palette image contains no pixels"),
        }
    }
}

impl std::error::Error for PaletteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaletteError::ImageLoad(e) => Some(e),
            PaletteError::Io(e) => Some(e),
            PaletteError::Empty => None,
        }
    }
}

impl From<image::ImageError> for PaletteError {
    fn from(e: image::ImageError) -> Self {
        PaletteError::ImageLoad(e)
    }
}

impl From<std::io::Error> for PaletteError {
    fn from(e: std::io::Error) -> Self {
        PaletteError::Io(e)
    }
}

/// Errors that can occur when resolving or starting a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// No simulation is registered under this key.
    UnknownSimulation(String),
    /// The options object could not be deserialized into the simulation's options.
    InvalidOptions {
        /// Registry key of the simulation.
        kind: String,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },
    /// The simulation rejected its configuration during `initialize`.
    Init {
        /// Name of the simulation that failed.
        name: &'static str,
        /// Human readable reason.
        reason: String,
    },
    /// The engine was used before `initialize()`.
    NotInitialized,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::UnknownSimulation(kind) => {
                write!(f, "No simulation registered under '{}'", kind)
            }
            SimulationError::InvalidOptions { kind, source } => {
                write!(f, "Invalid options for simulation '{}': {}", kind, source)
            }
            SimulationError::Init { name, reason } => {
                write!(f, "Simulation '{}' failed to initialize: {}", name, reason)
            }
            SimulationError::NotInitialized => {
                write!(f, "Engine is not initialized. Call Engine::initialize() first.")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::InvalidOptions { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SimulationError {
    /// Shorthand for an initialization failure.
    pub fn init(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::Init {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while loading an era table.
#[derive(Debug)]
pub enum ConfigError {
    /// The table is not valid JSON or does not match the record schema.
    Json(serde_json::Error),
    /// Failed to read the table from disk.
    Io(std::io::Error),
    /// A color parameter was not a `#rrggbb` string.
    InvalidColor(String),
    /// No era with this id exists in the table.
    UnknownEra(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Failed to parse era table: {}", e),
            ConfigError::Io(e) => write!(f, "Failed to read era table: {}", e),
            ConfigError::InvalidColor(s) => {
                write!(f, "Invalid color '{}': expected #rrggbb", s)
            }
            ConfigError::UnknownEra(id) => write!(f, "No era with id {}", id),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unknown_simulation_message() {
        let err = SimulationError::UnknownSimulation("warp".into());
        assert!(err.to_string().contains("warp"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_config_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.source().is_some());
    }
}
