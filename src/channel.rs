//! Per-channel attribute access.
//!
//! An [`Ad5706rChannel`] is created by [`crate::Ad5706r`] for every channel
//! found at construction. It shares the device handle with its parent and
//! scopes every attribute access by its channel identifier.

use std::rc::Rc;

use crate::attributes::{option_accessors, AttrAccess, ChannelOption, EnumAttribute};
use crate::error::Result;
use crate::transport::{AttrScope, IioDevice};

/// One AD5706R output channel.
pub struct Ad5706rChannel<D: IioDevice> {
    device: Rc<D>,
    id: String,
    scope: AttrScope,
}

impl<D: IioDevice> Ad5706rChannel<D> {
    pub(crate) fn new(device: Rc<D>, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            device,
            scope: AttrScope::Channel(id.clone()),
            id,
        }
    }

    fn attrs(&self) -> AttrAccess<'_, D> {
        AttrAccess::new(&*self.device, &self.scope)
    }

    /// Channel identifier (e.g. "current0").
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attribute scope of this channel.
    pub fn scope(&self) -> &AttrScope {
        &self.scope
    }

    /// Raw DAC code.
    pub fn raw(&self) -> Result<u32> {
        self.attrs().read_parsed("raw")
    }

    /// Write a raw DAC code.
    pub fn set_raw(&self, value: u32) -> Result<()> {
        self.attrs().write("raw", value)
    }

    /// Channel offset.
    pub fn offset(&self) -> Result<f64> {
        self.attrs().read_parsed("offset")
    }

    /// Set the channel offset.
    pub fn set_offset(&self, value: f64) -> Result<()> {
        self.attrs().write("offset", value)
    }

    /// Channel scale (output units per code).
    pub fn scale(&self) -> Result<f64> {
        self.attrs().read_parsed("scale")
    }

    /// Set the channel scale.
    pub fn set_scale(&self, value: f64) -> Result<()> {
        self.attrs().write("scale", value)
    }

    /// DAC input register A.
    pub fn input_register_a(&self) -> Result<u32> {
        self.attrs().read_parsed("input_register_a")
    }

    /// Write DAC input register A.
    pub fn set_input_register_a(&self, value: u32) -> Result<()> {
        self.attrs().write("input_register_a", value)
    }

    /// DAC input register B (second toggle value).
    pub fn input_register_b(&self) -> Result<u32> {
        self.attrs().read_parsed("input_register_b")
    }

    /// Write DAC input register B.
    pub fn set_input_register_b(&self, value: u32) -> Result<()> {
        self.attrs().write("input_register_b", value)
    }

    /// Current value of an enumerated channel attribute.
    pub fn option(&self, option: ChannelOption) -> Result<String> {
        Ok(self.attrs().read(option.attr())?.trim().to_string())
    }

    /// Legal values of an enumerated channel attribute, fetched from the device.
    pub fn option_available(&self, option: ChannelOption) -> Result<Vec<String>> {
        self.attrs().available(option)
    }

    /// Set an enumerated channel attribute.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Ad5706rError::InvalidOption`] without writing if
    /// `value` is not in the list the device reports right now.
    pub fn set_option(&self, option: ChannelOption, value: &str) -> Result<()> {
        self.attrs().write_checked(option, value)
    }

    option_accessors! {
        ChannelOption {
            HwActiveEdge => hw_active_edge, hw_active_edge_available, set_hw_active_edge;
            MultiDacSelCh => multi_dac_sel_ch, multi_dac_sel_ch_available, set_multi_dac_sel_ch;
            RangeSel => range_sel, range_sel_available, set_range_sel;
            LdacTriggerChn => ldac_trigger_chn, ldac_trigger_chn_available, set_ldac_trigger_chn;
            ToggleTriggerChn => toggle_trigger_chn, toggle_trigger_chn_available, set_toggle_trigger_chn;
            HwFuncSel => hw_func_sel, hw_func_sel_available, set_hw_func_sel;
            OutputState => output_state, output_state_available, set_output_state;
        }
    }
}

impl<D: IioDevice> std::fmt::Debug for Ad5706rChannel<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ad5706rChannel").field("id", &self.id).finish()
    }
}
