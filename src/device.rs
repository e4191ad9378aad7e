//! Device binding for the AD5706R.
//!
//! [`Ad5706r`] locates the device in an IIO context, enumerates its channels
//! once, and exposes the device-scoped attributes. Channel-scoped attributes
//! live on [`Ad5706rChannel`], reachable by position or by identifier.
//!
//! Nothing is cached: every getter is a fresh read from the device and every
//! setter writes through immediately. The only state fixed at construction is
//! the channel list and the per-channel bit width.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info};

use crate::attributes::{option_accessors, AttrAccess, DeviceOption, EnumAttribute};
use crate::channel::Ad5706rChannel;
use crate::error::{Ad5706rError, Result};
use crate::transport::{AttrScope, IioContext, IioDevice};

/// Device names this driver accepts.
pub const SUPPORTED_DEVICES: &[&str] = &["ad5706r"];

/// Resolve the requested device name, applying the default for an empty one.
///
/// # Errors
///
/// Returns [`Ad5706rError::UnsupportedDevice`] if `device_name` is non-empty
/// and not in [`SUPPORTED_DEVICES`].
pub fn resolve_device_name(device_name: &str) -> Result<&'static str> {
    if device_name.is_empty() {
        return Ok(SUPPORTED_DEVICES[0]);
    }
    SUPPORTED_DEVICES
        .iter()
        .copied()
        .find(|&name| name == device_name)
        .ok_or_else(|| Ad5706rError::UnsupportedDevice {
            name: device_name.to_string(),
            supported: SUPPORTED_DEVICES.iter().map(|s| s.to_string()).collect(),
        })
}

/// AD5706R multi-channel current DAC.
pub struct Ad5706r<D: IioDevice> {
    device: Rc<D>,
    name: String,
    scope: AttrScope,
    output_bits: Vec<u32>,
    channels: Vec<Ad5706rChannel<D>>,
    channel_index: HashMap<String, usize>,
}

impl<D: IioDevice> Ad5706r<D> {
    /// Locate the device in `ctx` and enumerate its channels.
    ///
    /// An empty `device_name` selects the default part (`"ad5706r"`).
    ///
    /// # Errors
    ///
    /// - [`Ad5706rError::UnsupportedDevice`] if `device_name` is not supported
    ///   (checked before the context is touched)
    /// - [`Ad5706rError::DeviceNotFound`] if no device in the context has
    ///   that name
    /// - any transport error raised while enumerating
    pub fn from_context<C>(ctx: &C, device_name: &str) -> Result<Self>
    where
        C: IioContext<Device = D>,
    {
        let name = resolve_device_name(device_name)?;

        let device = ctx
            .devices()?
            .into_iter()
            .find(|dev| dev.name().as_deref() == Some(name))
            .ok_or_else(|| Ad5706rError::DeviceNotFound {
                name: name.to_string(),
            })?;

        Self::from_device(device, name)
    }

    fn from_device(device: D, name: &str) -> Result<Self> {
        let device = Rc::new(device);
        let descriptors = device.channels()?;

        let mut output_bits = Vec::with_capacity(descriptors.len());
        let mut channels = Vec::with_capacity(descriptors.len());
        let mut channel_index = HashMap::with_capacity(descriptors.len());

        for (index, desc) in descriptors.into_iter().enumerate() {
            debug!(channel = %desc.id, bits = desc.bits, "Enumerated channel");
            output_bits.push(desc.bits);
            channel_index.entry(desc.id.clone()).or_insert(index);
            channels.push(Ad5706rChannel::new(Rc::clone(&device), desc.id));
        }

        info!(
            device = name,
            n_channels = channels.len(),
            "Opened AD5706R"
        );

        Ok(Self {
            device,
            name: name.to_string(),
            scope: AttrScope::Device,
            output_bits,
            channels,
            channel_index,
        })
    }

    fn attrs(&self) -> AttrAccess<'_, D> {
        AttrAccess::new(&*self.device, &self.scope)
    }

    /// Name of the matched device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying device handle.
    pub fn handle(&self) -> &D {
        &self.device
    }

    /// Output bit width of every channel, in enumeration order.
    pub fn output_bits(&self) -> &[u32] {
        &self.output_bits
    }

    /// All channels, in enumeration order.
    pub fn channels(&self) -> &[Ad5706rChannel<D>] {
        &self.channels
    }

    /// Channel by position.
    pub fn channel(&self, index: usize) -> Option<&Ad5706rChannel<D>> {
        self.channels.get(index)
    }

    /// Channel by identifier (e.g. "current0").
    pub fn channel_by_id(&self, id: &str) -> Option<&Ad5706rChannel<D>> {
        self.channel_index.get(id).map(|&index| &self.channels[index])
    }

    /// Channel identifiers, in enumeration order.
    pub fn channel_ids(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(Ad5706rChannel::id)
    }

    /// Sampling frequency in Hz.
    pub fn sampling_frequency(&self) -> Result<u64> {
        self.attrs().read_parsed("sampling_frequency")
    }

    /// Set the sampling frequency in Hz.
    pub fn set_sampling_frequency(&self, hz: u64) -> Result<()> {
        self.attrs().write("sampling_frequency", hz)
    }

    /// Multi-drop SPI device address.
    pub fn dev_addr(&self) -> Result<u32> {
        self.attrs().read_parsed("dev_addr")
    }

    /// Set the multi-drop SPI device address.
    pub fn set_dev_addr(&self, addr: u32) -> Result<()> {
        self.attrs().write("dev_addr", addr)
    }

    /// Reference voltage in volts.
    pub fn reference_volts(&self) -> Result<f64> {
        self.attrs().read_parsed("reference_volts")
    }

    /// Set the reference voltage in volts.
    pub fn set_reference_volts(&self, volts: f64) -> Result<()> {
        self.attrs().write("reference_volts", volts)
    }

    /// Multi-DAC input register A.
    pub fn multi_dac_input_a(&self) -> Result<u32> {
        self.attrs().read_parsed("multi_dac_input_a")
    }

    /// Write multi-DAC input register A (applies to channels with
    /// `multi_dac_sel_ch = include`).
    pub fn set_multi_dac_input_a(&self, value: u32) -> Result<()> {
        self.attrs().write("multi_dac_input_a", value)
    }

    /// Current value of an enumerated device attribute.
    pub fn option(&self, option: DeviceOption) -> Result<String> {
        Ok(self.attrs().read(option.attr())?.trim().to_string())
    }

    /// Legal values of an enumerated device attribute, fetched from the device.
    pub fn option_available(&self, option: DeviceOption) -> Result<Vec<String>> {
        self.attrs().available(option)
    }

    /// Set an enumerated device attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Ad5706rError::InvalidOption`] without writing if `value` is
    /// not in the list the device reports right now.
    pub fn set_option(&self, option: DeviceOption, value: &str) -> Result<()> {
        self.attrs().write_checked(option, value)
    }

    option_accessors! {
        DeviceOption {
            AddrAscension => addr_ascension, addr_ascension_available, set_addr_ascension;
            SingleInstr => single_instr, single_instr_available, set_single_instr;
            HwLdacTgState => hw_ldac_tg_state, hw_ldac_tg_state_available, set_hw_ldac_tg_state;
            HwShutdownState => hw_shutdown_state, hw_shutdown_state_available, set_hw_shutdown_state;
            MuxOutSel => mux_out_sel, mux_out_sel_available, set_mux_out_sel;
            RefSelect => ref_select, ref_select_available, set_ref_select;
            MultiDacSwLdacTrigger => multi_dac_sw_ldac_trigger, multi_dac_sw_ldac_trigger_available, set_multi_dac_sw_ldac_trigger;
            HwLdacTgPwm => hw_ldac_tg_pwm, hw_ldac_tg_pwm_available, set_hw_ldac_tg_pwm;
        }
    }

    /// Read a device register through the IIO debug interface.
    pub fn reg_read(&self, addr: u32) -> Result<u32> {
        self.device.reg_read(addr)
    }

    /// Write a device register through the IIO debug interface.
    pub fn reg_write(&self, addr: u32, value: u32) -> Result<()> {
        debug!(addr = %format!("{:#04x}", addr), value, "Writing register");
        self.device.reg_write(addr, value)
    }
}

impl<D: IioDevice> std::fmt::Debug for Ad5706r<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ad5706r")
            .field("name", &self.name)
            .field("channels", &self.channel_ids().collect::<Vec<_>>())
            .field("output_bits", &self.output_bits)
            .finish()
    }
}
