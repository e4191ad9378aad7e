//! IIO transport seam.
//!
//! The driver never talks to libiio directly. Everything it needs from the
//! transport (device enumeration, channel enumeration, string attribute
//! access and debug register access) goes through the two traits in this
//! module, so the same binding runs against real hardware
//! ([`crate::iio`], `hardware` feature) or the in-memory simulator
//! ([`crate::mock`]).

use std::fmt;

use crate::error::Result;

/// Scope of an IIO attribute: the device itself or one of its channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrScope {
    /// Device-level attribute
    Device,
    /// Channel-level attribute, keyed by channel identifier (e.g. "current0")
    Channel(String),
}

impl AttrScope {
    /// Channel identifier, if this is a channel scope.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Self::Device => None,
            Self::Channel(id) => Some(id),
        }
    }
}

impl fmt::Display for AttrScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Channel(id) => write!(f, "channel {}", id),
        }
    }
}

/// Channel as reported by the IIO context at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    /// Channel identifier used as the attribute key
    pub id: String,
    /// Declared sample width in bits
    pub bits: u32,
}

impl ChannelDescriptor {
    /// Create a new channel descriptor.
    pub fn new(id: impl Into<String>, bits: u32) -> Self {
        Self {
            id: id.into(),
            bits,
        }
    }
}

/// An IIO context: the set of devices reachable through one connection.
pub trait IioContext {
    /// Device handle type produced by this context.
    type Device: IioDevice;

    /// Enumerate every device in the context, in context order.
    fn devices(&self) -> Result<Vec<Self::Device>>;
}

/// A single IIO device handle.
///
/// All accessors are blocking round trips to the device.
pub trait IioDevice {
    /// Device name as reported by the driver (e.g. "ad5706r").
    fn name(&self) -> Option<String>;

    /// Enumerate the device's channels in driver order.
    fn channels(&self) -> Result<Vec<ChannelDescriptor>>;

    /// Read a string attribute.
    fn attr_read(&self, scope: &AttrScope, attr: &str) -> Result<String>;

    /// Write a string attribute.
    fn attr_write(&self, scope: &AttrScope, attr: &str, value: &str) -> Result<()>;

    /// Read a device register through the debug interface.
    fn reg_read(&self, addr: u32) -> Result<u32>;

    /// Write a device register through the debug interface.
    fn reg_write(&self, addr: u32, value: u32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(AttrScope::Device.to_string(), "device");
        assert_eq!(
            AttrScope::Channel("current2".into()).to_string(),
            "channel current2"
        );
    }

    #[test]
    fn test_scope_channel_id() {
        assert_eq!(AttrScope::Device.channel_id(), None);
        assert_eq!(
            AttrScope::Channel("current0".into()).channel_id(),
            Some("current0")
        );
    }
}
