//! Attribute catalog and validated attribute access.
//!
//! Enumerated attributes expose a companion `<attr>_available` attribute
//! listing the legal values for the device's current mode. Every write of an
//! enumerated attribute goes through [`AttrAccess::write_checked`], which
//! re-reads that list on each call and compares the candidate verbatim.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{Ad5706rError, Result};
use crate::transport::{AttrScope, IioDevice};

/// Suffix of the attribute listing legal values for an enumerated attribute.
pub const AVAILABLE_SUFFIX: &str = "_available";

/// Enumerated attribute with a device-reported set of legal values.
pub trait EnumAttribute: Copy + fmt::Debug {
    /// IIO attribute name.
    fn attr(self) -> &'static str;

    /// Name of the companion attribute listing legal values.
    fn available_attr(self) -> String {
        format!("{}{}", self.attr(), AVAILABLE_SUFFIX)
    }
}

/// Device-scoped enumerated attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceOption {
    /// Register address auto-increment/decrement during streaming access
    AddrAscension,
    /// Single instruction or streaming SPI mode
    SingleInstr,
    /// Level driven on the HW LDAC/TG pin
    HwLdacTgState,
    /// Level driven on the HW shutdown pin
    HwShutdownState,
    /// Signal routed to the MUX_OUT pin
    MuxOutSel,
    /// Internal or external reference
    RefSelect,
    /// Software LDAC trigger for all channels selected by `multi_dac_sel_ch`
    MultiDacSwLdacTrigger,
    /// PWM on the HW LDAC/TG pin
    HwLdacTgPwm,
}

impl DeviceOption {
    /// Every device-scoped enumerated attribute.
    pub const ALL: [Self; 8] = [
        Self::AddrAscension,
        Self::SingleInstr,
        Self::HwLdacTgState,
        Self::HwShutdownState,
        Self::MuxOutSel,
        Self::RefSelect,
        Self::MultiDacSwLdacTrigger,
        Self::HwLdacTgPwm,
    ];
}

impl EnumAttribute for DeviceOption {
    fn attr(self) -> &'static str {
        match self {
            Self::AddrAscension => "addr_ascension",
            Self::SingleInstr => "single_instr",
            Self::HwLdacTgState => "hw_ldac_tg_state",
            Self::HwShutdownState => "hw_shutdown_state",
            Self::MuxOutSel => "mux_out_sel",
            Self::RefSelect => "ref_select",
            Self::MultiDacSwLdacTrigger => "multi_dac_sw_ldac_trigger",
            Self::HwLdacTgPwm => "hw_ldac_tg_pwm",
        }
    }
}

/// Channel-scoped enumerated attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOption {
    /// Active edge of the HW LDAC/TG input for this channel
    HwActiveEdge,
    /// Include or exclude the channel from multi-DAC operations
    MultiDacSelCh,
    /// Output current range (e.g. "150mA")
    RangeSel,
    /// LDAC trigger source
    LdacTriggerChn,
    /// Toggle trigger source
    ToggleTriggerChn,
    /// Function of the HW LDAC/TG pin for this channel
    HwFuncSel,
    /// Normal operation or shutdown mode
    OutputState,
}

impl ChannelOption {
    /// Every channel-scoped enumerated attribute.
    pub const ALL: [Self; 7] = [
        Self::HwActiveEdge,
        Self::MultiDacSelCh,
        Self::RangeSel,
        Self::LdacTriggerChn,
        Self::ToggleTriggerChn,
        Self::HwFuncSel,
        Self::OutputState,
    ];
}

impl EnumAttribute for ChannelOption {
    fn attr(self) -> &'static str {
        match self {
            Self::HwActiveEdge => "hw_active_edge",
            Self::MultiDacSelCh => "multi_dac_sel_ch",
            Self::RangeSel => "range_sel",
            Self::LdacTriggerChn => "ldac_trigger_chn",
            Self::ToggleTriggerChn => "toggle_trigger_chn",
            Self::HwFuncSel => "hw_func_sel",
            Self::OutputState => "output_state",
        }
    }
}

/// Split an `_available` attribute value into its tokens.
pub fn parse_available(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Attribute accessor bound to one device handle and one scope.
pub(crate) struct AttrAccess<'a, D: IioDevice> {
    device: &'a D,
    scope: &'a AttrScope,
}

impl<'a, D: IioDevice> AttrAccess<'a, D> {
    pub(crate) fn new(device: &'a D, scope: &'a AttrScope) -> Self {
        Self { device, scope }
    }

    /// Read the raw string value.
    pub(crate) fn read(&self, attr: &str) -> Result<String> {
        self.device.attr_read(self.scope, attr)
    }

    /// Read and parse a value.
    pub(crate) fn read_parsed<T>(&self, attr: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.read(attr)?;
        raw.trim().parse().map_err(|e: T::Err| Ad5706rError::Parse {
            scope: self.scope.to_string(),
            attr: attr.to_string(),
            raw: raw.clone(),
            message: e.to_string(),
        })
    }

    /// Write a value unconditionally.
    pub(crate) fn write(&self, attr: &str, value: impl fmt::Display) -> Result<()> {
        let value = value.to_string();
        debug!(scope = %self.scope, attr, value = %value, "Writing attribute");
        self.device.attr_write(self.scope, attr, &value)
    }

    /// Fetch the current legal values of an enumerated attribute.
    pub(crate) fn available<A: EnumAttribute>(&self, option: A) -> Result<Vec<String>> {
        Ok(parse_available(&self.read(&option.available_attr())?))
    }

    /// Validate `value` against the current legal set, then write it.
    pub(crate) fn write_checked<A: EnumAttribute>(&self, option: A, value: &str) -> Result<()> {
        let available = self.available(option)?;
        if !available.iter().any(|legal| legal == value) {
            warn!(
                scope = %self.scope,
                attr = option.attr(),
                value,
                ?available,
                "Rejected unsupported attribute value"
            );
            return Err(Ad5706rError::InvalidOption {
                scope: self.scope.to_string(),
                attr: option.attr().to_string(),
                value: value.to_string(),
                available,
            });
        }
        self.write(option.attr(), value)
    }
}

/// Generate named getter / `_available` / setter triples for enumerated
/// attributes on a binding that provides `option`, `option_available` and
/// `set_option`.
macro_rules! option_accessors {
    ($option:ident { $($variant:ident => $get:ident, $available:ident, $set:ident;)* }) => {
        $(
            #[doc = concat!("Current `", stringify!($get), "` setting.")]
            pub fn $get(&self) -> $crate::error::Result<String> {
                self.option($option::$variant)
            }

            #[doc = concat!("Legal values for `", stringify!($get), "` as reported by the device now.")]
            pub fn $available(&self) -> $crate::error::Result<Vec<String>> {
                self.option_available($option::$variant)
            }

            #[doc = concat!("Set `", stringify!($get), "` after checking it against `", stringify!($available), "`.")]
            pub fn $set(&self, value: &str) -> $crate::error::Result<()> {
                self.set_option($option::$variant, value)
            }
        )*
    };
}

pub(crate) use option_accessors;
