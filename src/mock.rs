//! Simulated AD5706R for testing without hardware.
//!
//! [`MockDevice`] behaves like the IIO view of the kernel driver: it exposes
//! the same attribute catalog and `_available` lists, rejects writes the
//! driver would reject with `-EINVAL`, clamps DAC codes to 16 bits and keeps a
//! small register file so LDAC behaviour can be observed through
//! [`IioDevice::reg_read`].
//!
//! Register map (per channel `n`):
//!
//! | Address          | Contents                 |
//! |------------------|--------------------------|
//! | `0x60 + 2 * n`   | DAC input register A     |
//! | `0x68 + 2 * n`   | DAC data readback        |
//!
//! The readback register follows input register A immediately when the
//! channel's `ldac_trigger_chn` is `None`, on a `multi_dac_sw_ldac_trigger`
//! write when it is `sw_ldac`, and on a low-to-high `hw_ldac_tg_state`
//! transition when it is `hw_ldac`.
//!
//! # Example
//!
//! ```
//! use daq_driver_ad5706r::mock::MockContext;
//! use daq_driver_ad5706r::Ad5706r;
//!
//! let ctx = MockContext::with_ad5706r();
//! let dac = Ad5706r::from_context(&ctx, "ad5706r")?;
//! dac.set_sampling_frequency(400_000)?;
//! assert_eq!(dac.sampling_frequency()?, 400_000);
//! # Ok::<(), daq_driver_ad5706r::Ad5706rError>(())
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::attributes::{parse_available, AVAILABLE_SUFFIX};
use crate::error::{Ad5706rError, Result};
use crate::transport::{AttrScope, ChannelDescriptor, IioContext, IioDevice};

/// Largest code accepted by the 16-bit DAC registers.
pub const DAC_CODE_MAX: i64 = 0xFFFF;

/// Base address of the per-channel DAC input register A.
pub const REG_DAC_INPUT_A: u32 = 0x60;

/// Base address of the per-channel DAC data readback register.
pub const REG_DAC_DATA_READBACK: u32 = 0x68;

const CHANNEL_COUNT: usize = 4;
const CHANNEL_BITS: u32 = 16;

/// Attributes holding DAC codes; writes are clamped to `0..=DAC_CODE_MAX`.
const CODE_ATTRS: &[&str] = &[
    "raw",
    "input_register_a",
    "input_register_b",
    "multi_dac_input_a",
];

const DEVICE_ATTRS: &[(&str, &str, Option<&str>)] = &[
    ("sampling_frequency", "100000", None),
    ("dev_addr", "0", None),
    ("reference_volts", "2.5", None),
    ("multi_dac_input_a", "0", None),
    ("addr_ascension", "increment", Some("increment decrement")),
    (
        "single_instr",
        "single_instruction",
        Some("single_instruction streaming"),
    ),
    ("hw_ldac_tg_state", "low", Some("low high")),
    ("hw_shutdown_state", "low", Some("low high")),
    (
        "mux_out_sel",
        "agnd",
        Some(
            "agnd avdd vref iout0_vmon iout1_vmon iout2_vmon iout3_vmon \
             iout0_imon iout1_imon iout2_imon iout3_imon pvdd0 pvdd1 pvdd2 pvdd3 \
             tdiode_ch0 tdiode_ch1 tdiode_ch2 tdiode_ch3 mux_in0 mux_in1 mux_in2 mux_in3",
        ),
    ),
    ("ref_select", "internal", Some("internal external")),
    ("multi_dac_sw_ldac_trigger", "trigger", Some("trigger")),
    ("hw_ldac_tg_pwm", "disable", Some("disable enable")),
];

const CHANNEL_ATTRS: &[(&str, &str, Option<&str>)] = &[
    ("raw", "0", None),
    ("offset", "0", None),
    ("scale", "0.000762939453125", None),
    ("input_register_a", "0", None),
    ("input_register_b", "0", None),
    (
        "hw_active_edge",
        "rising_edge",
        Some("rising_edge falling_edge any_edge"),
    ),
    ("multi_dac_sel_ch", "exclude", Some("exclude include")),
    ("range_sel", "50mA", Some("50mA 150mA 200mA 300mA")),
    ("ldac_trigger_chn", "None", Some("None sw_ldac hw_ldac")),
    ("toggle_trigger_chn", "None", Some("None sw_toggle hw_toggle")),
    ("hw_func_sel", "None", Some("None LDAC Toggle Dither")),
    (
        "output_state",
        "normal_sw",
        Some(
            "shutdown_to_tristate_sw shutdown_to_gnd_sw normal_sw \
             shutdown_to_tristate_hw shutdown_to_gnd_hw normal_hw",
        ),
    ),
];

/// One attribute write accepted by the simulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrWrite {
    /// Scope written
    pub scope: AttrScope,
    /// Attribute name
    pub attr: String,
    /// Value as stored by the device (after clamping)
    pub value: String,
}

#[derive(Debug)]
struct MockState {
    name: String,
    channels: Vec<ChannelDescriptor>,
    attrs: HashMap<(AttrScope, String), String>,
    registers: BTreeMap<u32, u32>,
    writes: Vec<AttrWrite>,
    connected: bool,
}

impl MockState {
    fn get(&self, scope: &AttrScope, attr: &str) -> Option<&str> {
        self.attrs
            .get(&(scope.clone(), attr.to_string()))
            .map(String::as_str)
    }

    fn set(&mut self, scope: &AttrScope, attr: &str, value: String) {
        self.attrs.insert((scope.clone(), attr.to_string()), value);
    }

    fn channel_index(&self, id: &str) -> Option<usize> {
        self.channels.iter().position(|ch| ch.id == id)
    }

    fn channel_scopes(&self) -> Vec<(usize, AttrScope)> {
        self.channels
            .iter()
            .enumerate()
            .map(|(n, ch)| (n, AttrScope::Channel(ch.id.clone())))
            .collect()
    }

    /// Copy input register A into the readback register of channel `n`.
    fn load_dac(&mut self, n: usize) {
        let code = self
            .registers
            .get(&channel_reg(REG_DAC_INPUT_A, n))
            .copied()
            .unwrap_or(0);
        self.registers
            .insert(channel_reg(REG_DAC_DATA_READBACK, n), code);
    }

    /// Load every channel whose LDAC trigger source is `source`.
    fn load_dacs_triggered_by(&mut self, source: &str) {
        for (n, scope) in self.channel_scopes() {
            if self.get(&scope, "ldac_trigger_chn") == Some(source) {
                self.load_dac(n);
            }
        }
    }

    fn write_input_a(&mut self, n: usize, code: u32) {
        self.registers.insert(channel_reg(REG_DAC_INPUT_A, n), code);
        let scope = AttrScope::Channel(self.channels[n].id.clone());
        self.set(&scope, "input_register_a", code.to_string());
        if self.get(&scope, "ldac_trigger_chn") == Some("None") {
            self.load_dac(n);
        }
    }

    /// Device-side effects of an accepted write.
    fn apply(&mut self, scope: &AttrScope, attr: &str, value: &str, previous: Option<&str>) {
        match (scope, attr) {
            (AttrScope::Channel(id), "input_register_a") => {
                if let (Some(n), Ok(code)) = (self.channel_index(id), value.parse()) {
                    self.write_input_a(n, code);
                }
            }
            (AttrScope::Channel(id), "raw") => {
                if let (Some(n), Ok(code)) = (self.channel_index(id), value.parse()) {
                    self.registers
                        .insert(channel_reg(REG_DAC_DATA_READBACK, n), code);
                }
            }
            (AttrScope::Channel(_), "range_sel") => {
                if let Some(ma) = value.strip_suffix("mA").and_then(|v| v.parse::<f64>().ok()) {
                    let scale = ma / (DAC_CODE_MAX as f64 + 1.0);
                    self.set(scope, "scale", scale.to_string());
                }
            }
            (AttrScope::Device, "multi_dac_input_a") => {
                if let Ok(code) = value.parse() {
                    for (n, ch_scope) in self.channel_scopes() {
                        if self.get(&ch_scope, "multi_dac_sel_ch") == Some("include") {
                            self.write_input_a(n, code);
                        }
                    }
                }
            }
            (AttrScope::Device, "multi_dac_sw_ldac_trigger") => {
                self.load_dacs_triggered_by("sw_ldac");
            }
            (AttrScope::Device, "hw_ldac_tg_state") => {
                if previous == Some("low") && value == "high" {
                    self.load_dacs_triggered_by("hw_ldac");
                }
            }
            _ => {}
        }
    }
}

fn channel_reg(base: u32, n: usize) -> u32 {
    base + 2 * n as u32
}

fn einval(scope: &AttrScope, attr: &str, value: &str) -> Ad5706rError {
    Ad5706rError::transport(format!(
        "Invalid argument writing '{}' to {} ({})",
        value, attr, scope
    ))
}

/// Simulated IIO device.
///
/// Cloning yields another handle to the same simulated device, so tests can
/// keep a handle for inspection after handing one to a binding.
#[derive(Debug, Clone)]
pub struct MockDevice {
    inner: Arc<Mutex<MockState>>,
}

impl MockDevice {
    /// Create a device with the given channels and no attributes.
    pub fn new(name: impl Into<String>, channels: Vec<ChannelDescriptor>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                name: name.into(),
                channels,
                attrs: HashMap::new(),
                registers: BTreeMap::new(),
                writes: Vec::new(),
                connected: true,
            })),
        }
    }

    /// Create a simulated AD5706R with four 16-bit current channels.
    pub fn ad5706r() -> Self {
        let channels = (0..CHANNEL_COUNT)
            .map(|n| ChannelDescriptor::new(format!("current{}", n), CHANNEL_BITS))
            .collect();
        let device = Self::new("ad5706r", channels);

        {
            let mut state = device.inner.lock();
            let device_scope = AttrScope::Device;
            seed(&mut state, &device_scope, DEVICE_ATTRS);
            for (_, scope) in state.channel_scopes() {
                seed(&mut state, &scope, CHANNEL_ATTRS);
            }
        }

        device
    }

    /// Set an attribute directly, bypassing every device-side check.
    ///
    /// Models changes made by something other than this binding.
    pub fn poke(&self, scope: &AttrScope, attr: &str, value: &str) {
        self.inner.lock().set(scope, attr, value.to_string());
    }

    /// Current stored value of an attribute.
    pub fn peek(&self, scope: &AttrScope, attr: &str) -> Option<String> {
        self.inner.lock().get(scope, attr).map(str::to_string)
    }

    /// Replace the legal value list of an enumerated attribute.
    pub fn set_available(&self, scope: &AttrScope, attr: &str, values: &[&str]) {
        self.poke(scope, &format!("{}{}", attr, AVAILABLE_SUFFIX), &values.join(" "));
    }

    /// Every accepted attribute write, oldest first.
    pub fn writes(&self) -> Vec<AttrWrite> {
        self.inner.lock().writes.clone()
    }

    /// Forget recorded writes.
    pub fn clear_writes(&self) {
        self.inner.lock().writes.clear();
    }

    /// Simulate loss of the transport; every access fails until reconnected.
    pub fn disconnect(&self) {
        self.inner.lock().connected = false;
    }

    /// Restore the transport after [`MockDevice::disconnect`].
    pub fn reconnect(&self) {
        self.inner.lock().connected = true;
    }

    fn check_connected(&self, state: &MockState) -> Result<()> {
        if state.connected {
            Ok(())
        } else {
            Err(Ad5706rError::transport(format!(
                "{}: device disconnected",
                state.name
            )))
        }
    }
}

fn seed(state: &mut MockState, scope: &AttrScope, attrs: &[(&str, &str, Option<&str>)]) {
    for (attr, value, available) in attrs {
        state.set(scope, attr, value.to_string());
        if let Some(available) = available {
            state.set(
                scope,
                &format!("{}{}", attr, AVAILABLE_SUFFIX),
                available.to_string(),
            );
        }
    }
}

impl IioDevice for MockDevice {
    fn name(&self) -> Option<String> {
        Some(self.inner.lock().name.clone())
    }

    fn channels(&self) -> Result<Vec<ChannelDescriptor>> {
        let state = self.inner.lock();
        self.check_connected(&state)?;
        Ok(state.channels.clone())
    }

    fn attr_read(&self, scope: &AttrScope, attr: &str) -> Result<String> {
        let state = self.inner.lock();
        self.check_connected(&state)?;
        state.get(scope, attr).map(str::to_string).ok_or_else(|| {
            Ad5706rError::transport(format!("No such attribute: {} ({})", attr, scope))
        })
    }

    fn attr_write(&self, scope: &AttrScope, attr: &str, value: &str) -> Result<()> {
        let mut state = self.inner.lock();
        self.check_connected(&state)?;

        if attr.ends_with(AVAILABLE_SUFFIX) {
            return Err(Ad5706rError::transport(format!(
                "Attribute {} ({}) is read-only",
                attr, scope
            )));
        }
        let previous = state.get(scope, attr).map(str::to_string).ok_or_else(|| {
            Ad5706rError::transport(format!("No such attribute: {} ({})", attr, scope))
        })?;

        let available_attr = format!("{}{}", attr, AVAILABLE_SUFFIX);
        if let Some(available) = state.get(scope, &available_attr) {
            if !parse_available(available).iter().any(|v| v == value) {
                return Err(einval(scope, attr, value));
            }
        }

        let stored = if CODE_ATTRS.contains(&attr) {
            let code: i64 = value
                .trim()
                .parse()
                .map_err(|_| einval(scope, attr, value))?;
            code.clamp(0, DAC_CODE_MAX).to_string()
        } else {
            value.to_string()
        };

        debug!(scope = %scope, attr, value = %stored, "Mock attribute write");
        state.set(scope, attr, stored.clone());
        state.apply(scope, attr, &stored, Some(previous.as_str()));
        state.writes.push(AttrWrite {
            scope: scope.clone(),
            attr: attr.to_string(),
            value: stored,
        });
        Ok(())
    }

    fn reg_read(&self, addr: u32) -> Result<u32> {
        let state = self.inner.lock();
        self.check_connected(&state)?;
        Ok(state.registers.get(&addr).copied().unwrap_or(0))
    }

    fn reg_write(&self, addr: u32, value: u32) -> Result<()> {
        let mut state = self.inner.lock();
        self.check_connected(&state)?;
        state.registers.insert(addr, value);
        Ok(())
    }
}

/// Simulated IIO context holding a fixed list of devices.
#[derive(Debug, Clone, Default)]
pub struct MockContext {
    devices: Vec<MockDevice>,
}

impl MockContext {
    /// Create a context from the given devices, in enumeration order.
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self { devices }
    }

    /// Context containing a single simulated AD5706R.
    pub fn with_ad5706r() -> Self {
        Self::new(vec![MockDevice::ad5706r()])
    }

    /// First device in the context with the given name.
    pub fn device(&self, name: &str) -> Option<MockDevice> {
        self.devices
            .iter()
            .find(|dev| dev.name().as_deref() == Some(name))
            .cloned()
    }
}

impl IioContext for MockContext {
    type Device = MockDevice;

    fn devices(&self) -> Result<Vec<MockDevice>> {
        Ok(self.devices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(n: usize) -> AttrScope {
        AttrScope::Channel(format!("current{}", n))
    }

    #[test]
    fn test_ad5706r_catalog() {
        let dev = MockDevice::ad5706r();
        let channels = dev.channels().unwrap();
        assert_eq!(channels.len(), 4);
        assert!(channels.iter().all(|c| c.bits == 16));
        assert_eq!(
            dev.attr_read(&AttrScope::Device, "addr_ascension_available")
                .unwrap(),
            "increment decrement"
        );
        assert_eq!(dev.attr_read(&ch(3), "range_sel").unwrap(), "50mA");
    }

    #[test]
    fn test_rejects_illegal_enum_value() {
        let dev = MockDevice::ad5706r();
        let err = dev
            .attr_write(&AttrScope::Device, "ref_select", "bogus")
            .unwrap_err();
        assert!(err.is_transport());
        assert!(dev.writes().is_empty());
    }

    #[test]
    fn test_available_is_read_only() {
        let dev = MockDevice::ad5706r();
        assert!(dev
            .attr_write(&AttrScope::Device, "ref_select_available", "internal")
            .is_err());
    }

    #[test]
    fn test_unknown_attribute() {
        let dev = MockDevice::ad5706r();
        assert!(dev.attr_read(&AttrScope::Device, "nonexistent").is_err());
        assert!(dev
            .attr_write(&AttrScope::Device, "nonexistent", "1")
            .is_err());
    }

    #[test]
    fn test_code_clamping() {
        let dev = MockDevice::ad5706r();
        dev.attr_write(&ch(0), "raw", "70000").unwrap();
        assert_eq!(dev.attr_read(&ch(0), "raw").unwrap(), "65535");
        dev.attr_write(&ch(0), "raw", "-5").unwrap();
        assert_eq!(dev.attr_read(&ch(0), "raw").unwrap(), "0");
        assert!(dev.attr_write(&ch(0), "raw", "12.5").is_err());
    }

    #[test]
    fn test_async_ldac_updates_readback() {
        let dev = MockDevice::ad5706r();
        dev.attr_write(&ch(1), "input_register_a", "4660").unwrap();
        assert_eq!(dev.reg_read(REG_DAC_INPUT_A + 2).unwrap(), 0x1234);
        assert_eq!(dev.reg_read(REG_DAC_DATA_READBACK + 2).unwrap(), 0x1234);
    }

    #[test]
    fn test_sw_ldac_waits_for_trigger() {
        let dev = MockDevice::ad5706r();
        dev.attr_write(&ch(0), "ldac_trigger_chn", "sw_ldac").unwrap();
        dev.attr_write(&ch(0), "input_register_a", "9029").unwrap();
        assert_eq!(dev.reg_read(REG_DAC_DATA_READBACK).unwrap(), 0);

        dev.attr_write(&AttrScope::Device, "multi_dac_sw_ldac_trigger", "trigger")
            .unwrap();
        assert_eq!(dev.reg_read(REG_DAC_DATA_READBACK).unwrap(), 0x2345);
    }

    #[test]
    fn test_hw_ldac_on_rising_pin() {
        let dev = MockDevice::ad5706r();
        dev.attr_write(&ch(2), "ldac_trigger_chn", "hw_ldac").unwrap();
        dev.attr_write(&ch(2), "input_register_a", "13398").unwrap();
        assert_eq!(dev.reg_read(REG_DAC_DATA_READBACK + 4).unwrap(), 0);

        dev.attr_write(&AttrScope::Device, "hw_ldac_tg_state", "high")
            .unwrap();
        assert_eq!(dev.reg_read(REG_DAC_DATA_READBACK + 4).unwrap(), 0x3456);
    }

    #[test]
    fn test_multi_dac_input_targets_included_channels() {
        let dev = MockDevice::ad5706r();
        dev.attr_write(&ch(1), "multi_dac_sel_ch", "include").unwrap();
        dev.attr_write(&ch(3), "multi_dac_sel_ch", "include").unwrap();
        dev.attr_write(&AttrScope::Device, "multi_dac_input_a", "100")
            .unwrap();

        assert_eq!(dev.attr_read(&ch(0), "input_register_a").unwrap(), "0");
        assert_eq!(dev.attr_read(&ch(1), "input_register_a").unwrap(), "100");
        assert_eq!(dev.attr_read(&ch(3), "input_register_a").unwrap(), "100");
    }

    #[test]
    fn test_range_updates_scale() {
        let dev = MockDevice::ad5706r();
        dev.attr_write(&ch(0), "range_sel", "300mA").unwrap();
        let scale: f64 = dev.attr_read(&ch(0), "scale").unwrap().parse().unwrap();
        assert!((scale - 300.0 / 65536.0).abs() < 1e-12);
    }

    #[test]
    fn test_disconnect() {
        let dev = MockDevice::ad5706r();
        dev.disconnect();
        assert!(dev.attr_read(&AttrScope::Device, "dev_addr").is_err());
        assert!(dev.reg_read(0x60).is_err());
        dev.reconnect();
        assert_eq!(dev.attr_read(&AttrScope::Device, "dev_addr").unwrap(), "0");
    }

    #[test]
    fn test_context_lookup() {
        let ctx = MockContext::new(vec![
            MockDevice::new("ad9361-phy", vec![]),
            MockDevice::ad5706r(),
        ]);
        assert!(ctx.device("ad5706r").is_some());
        assert!(ctx.device("ad7124").is_none());
        assert_eq!(ctx.devices().unwrap().len(), 2);
    }
}
