//! Rust driver for the Analog Devices AD5706R current-output DAC over Linux IIO.
//!
//! The AD5706R is a four-channel, 16-bit current DAC. Its kernel driver
//! exposes configuration as IIO attributes; this crate wraps them in typed
//! accessors, validating every enumerated value against the list the device
//! reports in the companion `<attr>_available` attribute before writing.
//!
//! # Architecture
//!
//! ## Device Access
//! - [`Ad5706r`] - Device binding: discovery, channel enumeration and
//!   device-scoped attributes
//! - [`Ad5706rChannel`] - Channel-scoped attributes, shares the device handle
//!
//! ## Transport
//! - [`IioContext`] / [`IioDevice`] - Attribute and register primitives the
//!   bindings are generic over
//! - [`iio::LibiioContext`] - libiio backend (`hardware` feature)
//! - [`mock::MockContext`] - In-process simulator for tests and demos
//!
//! ## Ambient
//! - [`config::DriverConfig`] - Figment-based configuration (TOML + env)
//! - [`logging`] - `tracing-subscriber` setup
//!
//! # Examples
//!
//! ```
//! use daq_driver_ad5706r::mock::MockContext;
//! use daq_driver_ad5706r::{Ad5706r, Ad5706rError};
//!
//! # fn main() -> daq_driver_ad5706r::Result<()> {
//! let ctx = MockContext::with_ad5706r();
//! let dac = Ad5706r::from_context(&ctx, "ad5706r")?;
//!
//! dac.set_addr_ascension("decrement")?;
//! assert!(matches!(
//!     dac.set_addr_ascension("invalid_mode"),
//!     Err(Ad5706rError::InvalidOption { .. })
//! ));
//! assert_eq!(dac.addr_ascension()?, "decrement");
//!
//! let ch0 = dac.channel_by_id("current0").expect("channel");
//! ch0.set_range_sel("150mA")?;
//! ch0.set_input_register_a(0x1234)?;
//! # Ok(())
//! # }
//! ```
//!
//! With the `hardware` feature enabled, connect to a real board:
//!
//! ```ignore
//! let dac = daq_driver_ad5706r::Ad5706r::connect("ip:192.168.2.1", "ad5706r")?;
//! ```
//!
//! # Feature Flags
//!
//! - `hardware` - libiio backend through the `industrial-io` crate (requires
//!   libiio installed)

pub mod attributes;
pub mod channel;
pub mod config;
pub mod device;
pub mod error;
#[cfg(feature = "hardware")]
pub mod iio;
pub mod logging;
pub mod mock;
pub mod transport;

pub use attributes::{ChannelOption, DeviceOption, EnumAttribute};
pub use channel::Ad5706rChannel;
pub use config::DriverConfig;
pub use device::{resolve_device_name, Ad5706r, SUPPORTED_DEVICES};
pub use error::{Ad5706rError, ErrorKind, Result};
#[cfg(feature = "hardware")]
pub use iio::{LibiioContext, LibiioDevice};
pub use transport::{AttrScope, ChannelDescriptor, IioContext, IioDevice};
