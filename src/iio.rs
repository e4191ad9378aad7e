//! libiio backend (requires the `hardware` feature).
//!
//! Wraps the `industrial-io` bindings so the driver can reach a local IIO
//! context or a remote one through any libiio URI (`ip:`, `usb:`,
//! `serial:<port>,<baud>`).
//!
//! # Example
//!
//! ```no_run
//! use daq_driver_ad5706r::Ad5706r;
//!
//! # fn example() -> daq_driver_ad5706r::Result<()> {
//! let dac = Ad5706r::connect("serial:/dev/ttyACM0,2304000", "ad5706r")?;
//! println!("Output bits: {:?}", dac.output_bits());
//! # Ok(())
//! # }
//! ```

use industrial_io as iio;
use tracing::info;

use crate::device::{resolve_device_name, Ad5706r};
use crate::error::{Ad5706rError, Result};
use crate::transport::{AttrScope, ChannelDescriptor, IioContext, IioDevice};

/// Connected libiio context.
pub struct LibiioContext {
    ctx: iio::Context,
}

impl LibiioContext {
    /// Connect to the context behind `uri`.
    ///
    /// An empty URI or `"local:"` opens the local context.
    pub fn connect(uri: &str) -> Result<Self> {
        let ctx = if uri.is_empty() || uri == "local:" {
            iio::Context::new()?
        } else {
            iio::Context::from_uri(uri)?
        };
        info!(uri, "Connected to IIO context");
        Ok(Self { ctx })
    }
}

impl IioContext for LibiioContext {
    type Device = LibiioDevice;

    fn devices(&self) -> Result<Vec<LibiioDevice>> {
        Ok(self.ctx.devices().map(|dev| LibiioDevice { dev }).collect())
    }
}

/// libiio device handle.
///
/// The handle keeps its context alive; dropping the last handle releases the
/// connection.
pub struct LibiioDevice {
    dev: iio::Device,
}

impl LibiioDevice {
    fn output_channel(&self, id: &str) -> Result<iio::Channel> {
        self.dev.find_channel(id, true).ok_or_else(|| {
            Ad5706rError::transport(format!("Output channel '{}' not found", id))
        })
    }
}

impl IioDevice for LibiioDevice {
    fn name(&self) -> Option<String> {
        self.dev.name()
    }

    fn channels(&self) -> Result<Vec<ChannelDescriptor>> {
        Ok(self
            .dev
            .channels()
            .filter_map(|ch| {
                let id = ch.id()?;
                Some(ChannelDescriptor::new(id, ch.data_format().bits() as u32))
            })
            .collect())
    }

    fn attr_read(&self, scope: &AttrScope, attr: &str) -> Result<String> {
        match scope {
            AttrScope::Device => Ok(self.dev.attr_read_str(attr)?),
            AttrScope::Channel(id) => Ok(self.output_channel(id)?.attr_read_str(attr)?),
        }
    }

    fn attr_write(&self, scope: &AttrScope, attr: &str, value: &str) -> Result<()> {
        match scope {
            AttrScope::Device => Ok(self.dev.attr_write_str(attr, value)?),
            AttrScope::Channel(id) => Ok(self.output_channel(id)?.attr_write_str(attr, value)?),
        }
    }

    fn reg_read(&self, addr: u32) -> Result<u32> {
        Ok(self.dev.reg_read(addr)?)
    }

    fn reg_write(&self, addr: u32, value: u32) -> Result<()> {
        Ok(self.dev.reg_write(addr, value)?)
    }
}

impl Ad5706r<LibiioDevice> {
    /// Connect to `uri` and open the AD5706R named `device_name`.
    ///
    /// The device name is validated before any connection is attempted.
    pub fn connect(uri: &str, device_name: &str) -> Result<Self> {
        resolve_device_name(device_name)?;
        let ctx = LibiioContext::connect(uri)?;
        Self::from_context(&ctx, device_name)
    }
}
