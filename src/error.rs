//! Error types for AD5706R operations.
//!
//! Errors fall into three classes (see [`ErrorKind`]):
//!
//! - **Configuration**: the requested device name is not supported, no matching
//!   device exists in the IIO context, or the driver configuration is invalid.
//!   Construction aborts.
//! - **Validation**: an enumerated attribute was given a value outside the
//!   device-reported `<attr>_available` list. Nothing is written.
//! - **Transport**: the underlying attribute or register primitive failed, or
//!   the device answered with something that does not parse. These propagate
//!   unchanged from the backend.

use thiserror::Error;

/// Result type alias for AD5706R operations.
pub type Result<T> = std::result::Result<T, Ad5706rError>;

/// Errors that can occur when working with an AD5706R over IIO.
#[derive(Error, Debug)]
pub enum Ad5706rError {
    /// Requested device name is not one of the supported parts
    #[error("Not a compatible device: {name}. Supported device names are: {}", .supported.join(","))]
    UnsupportedDevice {
        name: String,
        supported: Vec<String>,
    },

    /// No device with the requested name in the IIO context
    #[error("No IIO device named '{name}' found in context")]
    DeviceNotFound { name: String },

    /// Enumerated attribute value not in the device-reported legal set
    #[error(
        "Attribute value '{value}' not supported for {attr} ({scope}). Use one of: {}",
        .available.join(", ")
    )]
    InvalidOption {
        scope: String,
        attr: String,
        value: String,
        available: Vec<String>,
    },

    /// Device returned a value that could not be parsed
    #[error("Failed to parse {attr} ({scope}) value '{raw}': {message}")]
    Parse {
        scope: String,
        attr: String,
        raw: String,
        message: String,
    },

    /// Attribute or register access failed in the transport layer
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Error reported by libiio
    #[cfg(feature = "hardware")]
    #[error("IIO error: {0}")]
    Iio(#[from] industrial_io::Error),

    /// Driver configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Semantically invalid driver configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Functionality compiled out via cargo features
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}

/// Coarse classification of an [`Ad5706rError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Construction or configuration failure
    Configuration,
    /// Rejected enumerated attribute value, nothing written
    Validation,
    /// Failure in the underlying read/write primitive
    Transport,
}

impl Ad5706rError {
    /// Create a transport error from any displayable message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedDevice { .. }
            | Self::DeviceNotFound { .. }
            | Self::Config(_)
            | Self::InvalidConfig { .. }
            | Self::FeatureNotEnabled(_) => ErrorKind::Configuration,
            Self::InvalidOption { .. } => ErrorKind::Validation,
            Self::Parse { .. } | Self::Transport { .. } => ErrorKind::Transport,
            #[cfg(feature = "hardware")]
            Self::Iio(_) => ErrorKind::Transport,
        }
    }

    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Check if this is a rejected enumerated value.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this error came from the transport layer.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<figment::Error> for Ad5706rError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_device_display() {
        let err = Ad5706rError::UnsupportedDevice {
            name: "ad5754".to_string(),
            supported: vec!["ad5706r".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Not a compatible device: ad5754. Supported device names are: ad5706r"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_option_lists_legal_values() {
        let err = Ad5706rError::InvalidOption {
            scope: "device".to_string(),
            attr: "addr_ascension".to_string(),
            value: "invalid_mode".to_string(),
            available: vec!["increment".to_string(), "decrement".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid_mode"));
        assert!(msg.contains("increment, decrement"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_transport_classification() {
        assert!(Ad5706rError::transport("link down").is_transport());
        let parse = Ad5706rError::Parse {
            scope: "device".into(),
            attr: "reference_volts".into(),
            raw: "abc".into(),
            message: "invalid float literal".into(),
        };
        assert!(parse.is_transport());
        assert!(!parse.is_validation());
    }
}
