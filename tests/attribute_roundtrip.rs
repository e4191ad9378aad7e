//! Attribute behaviour against the simulated AD5706R.
//!
//! # Test Coverage
//!
//! | Test | Description |
//! |------|-------------|
//! | `test_example_scenario` | Sampling frequency and address ascension walkthrough |
//! | `test_device_options_roundtrip` | Every legal device option value sets and reads back |
//! | `test_channel_options_roundtrip` | Every legal channel option value sets and reads back |
//! | `test_illegal_values_leave_device_unchanged` | Rejected values write nothing |
//! | `test_unsupported_name_fails_before_enumeration` | Name check precedes any device access |
//! | `test_output_bits_in_enumeration_order` | One entry per channel, in order |
//! | `test_register_roundtrip` | Integer register attributes read back what was written |
//! | `test_availability_is_not_cached` | Legal set is fetched on every write |
//! | `test_transport_errors_propagate` | Disconnected transport surfaces unchanged |

use std::cell::Cell;

use daq_driver_ad5706r::mock::{
    MockContext, MockDevice, DAC_CODE_MAX, REG_DAC_DATA_READBACK, REG_DAC_INPUT_A,
};
use daq_driver_ad5706r::{
    Ad5706r, Ad5706rError, AttrScope, ChannelDescriptor, ChannelOption, DeviceOption, ErrorKind,
    IioContext,
};

const ILLEGAL: &str = "not_a_legal_value";

fn open() -> (MockDevice, Ad5706r<MockDevice>) {
    let ctx = MockContext::with_ad5706r();
    let dev = ctx.device("ad5706r").unwrap();
    let dac = Ad5706r::from_context(&ctx, "ad5706r").unwrap();
    (dev, dac)
}

// =============================================================================
// Example scenario
// =============================================================================

#[test]
fn test_example_scenario() {
    let (_dev, dac) = open();

    dac.set_sampling_frequency(400_000).unwrap();
    assert_eq!(dac.sampling_frequency().unwrap(), 400_000);

    dac.set_addr_ascension("increment").unwrap();
    let err = dac.set_addr_ascension("invalid_mode").unwrap_err();
    match &err {
        Ad5706rError::InvalidOption {
            attr,
            value,
            available,
            ..
        } => {
            assert_eq!(attr, "addr_ascension");
            assert_eq!(value, "invalid_mode");
            assert_eq!(available, &["increment", "decrement"]);
        }
        other => panic!("expected InvalidOption, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(dac.addr_ascension().unwrap(), "increment");
}

// =============================================================================
// Enumerated attributes
// =============================================================================

#[test]
fn test_device_options_roundtrip() {
    let (_dev, dac) = open();

    for option in DeviceOption::ALL {
        for value in dac.option_available(option).unwrap() {
            dac.set_option(option, &value)
                .unwrap_or_else(|e| panic!("{:?} = {}: {}", option, value, e));
            assert_eq!(dac.option(option).unwrap(), value, "{:?}", option);
        }
    }
}

#[test]
fn test_channel_options_roundtrip() {
    let (_dev, dac) = open();

    for ch in dac.channels() {
        for option in ChannelOption::ALL {
            for value in ch.option_available(option).unwrap() {
                ch.set_option(option, &value)
                    .unwrap_or_else(|e| panic!("{} {:?} = {}: {}", ch.id(), option, value, e));
                assert_eq!(ch.option(option).unwrap(), value);
            }
        }
    }
}

#[test]
fn test_illegal_values_leave_device_unchanged() {
    let (dev, dac) = open();

    for option in DeviceOption::ALL {
        let before = dac.option(option).unwrap();
        let err = dac.set_option(option, ILLEGAL).unwrap_err();
        assert!(err.is_validation(), "{:?}: {}", option, err);
        assert_eq!(dac.option(option).unwrap(), before);
    }

    let ch = dac.channel(1).unwrap();
    for option in ChannelOption::ALL {
        let before = ch.option(option).unwrap();
        assert!(ch.set_option(option, ILLEGAL).unwrap_err().is_validation());
        assert_eq!(ch.option(option).unwrap(), before);
    }

    assert!(dev.writes().is_empty());
}

#[test]
fn test_named_setters_validate_case_and_whitespace() {
    let (dev, dac) = open();
    let ch = dac.channel_by_id("current2").unwrap();

    assert!(ch.set_range_sel("150MA").is_err());
    assert!(ch.set_range_sel(" 150mA").is_err());
    assert!(dac.set_ref_select("Internal").is_err());
    assert!(dev.writes().is_empty());

    ch.set_range_sel("150mA").unwrap();
    assert_eq!(ch.range_sel().unwrap(), "150mA");
}

// =============================================================================
// Construction
// =============================================================================

/// Context that counts how often it was asked for devices.
struct CountingContext {
    inner: MockContext,
    calls: Cell<usize>,
}

impl IioContext for CountingContext {
    type Device = MockDevice;

    fn devices(&self) -> daq_driver_ad5706r::Result<Vec<MockDevice>> {
        self.calls.set(self.calls.get() + 1);
        self.inner.devices()
    }
}

#[test]
fn test_unsupported_name_fails_before_enumeration() {
    let ctx = CountingContext {
        inner: MockContext::with_ad5706r(),
        calls: Cell::new(0),
    };

    let err = Ad5706r::from_context(&ctx, "ad5766").unwrap_err();
    assert!(matches!(err, Ad5706rError::UnsupportedDevice { .. }));
    assert!(err.to_string().starts_with("Not a compatible device: ad5766"));
    assert_eq!(ctx.calls.get(), 0);

    Ad5706r::from_context(&ctx, "").unwrap();
    assert_eq!(ctx.calls.get(), 1);
}

#[test]
fn test_output_bits_in_enumeration_order() {
    let dev = MockDevice::new(
        "ad5706r",
        vec![
            ChannelDescriptor::new("current2", 16),
            ChannelDescriptor::new("current0", 12),
            ChannelDescriptor::new("current1", 14),
        ],
    );
    let ctx = MockContext::new(vec![dev]);
    let dac = Ad5706r::from_context(&ctx, "ad5706r").unwrap();

    assert_eq!(dac.output_bits(), &[16, 12, 14]);
    assert_eq!(dac.channels().len(), 3);
    assert_eq!(
        dac.channel_ids().collect::<Vec<_>>(),
        vec!["current2", "current0", "current1"]
    );
    assert_eq!(dac.channel_by_id("current0").unwrap().id(), "current0");
}

#[test]
fn test_reference_volts_is_float() {
    let (dev, dac) = open();
    assert_eq!(dac.reference_volts().unwrap(), 2.5);

    dev.poke(&AttrScope::Device, "reference_volts", "4.096\n");
    assert_eq!(dac.reference_volts().unwrap(), 4.096);
}

// =============================================================================
// Integer registers
// =============================================================================

#[test]
fn test_register_roundtrip() {
    let (_dev, dac) = open();
    let ch = dac.channel(0).unwrap();

    for v in [0u32, 1, 0x1234, 0xFFFF] {
        dac.set_multi_dac_input_a(v).unwrap();
        assert_eq!(dac.multi_dac_input_a().unwrap(), v);
        ch.set_input_register_a(v).unwrap();
        assert_eq!(ch.input_register_a().unwrap(), v);
        ch.set_input_register_b(v).unwrap();
        assert_eq!(ch.input_register_b().unwrap(), v);
        ch.set_raw(v).unwrap();
        assert_eq!(ch.raw().unwrap(), v);
    }
}

/// The simulated device clamps codes to 16 bits like the hardware does; the
/// binding passes the value through and reports what the device stored.
#[test]
fn test_register_clamping_is_device_side() {
    let (dev, dac) = open();
    let ch = dac.channel(3).unwrap();

    ch.set_input_register_b(0x1_0000).unwrap();
    assert_eq!(ch.input_register_b().unwrap(), DAC_CODE_MAX as u32);
    assert_eq!(dev.writes()[0].value, DAC_CODE_MAX.to_string());
}

#[test]
fn test_ldac_modes_through_registers() {
    let (_dev, dac) = open();
    let ch = dac.channel(0).unwrap();

    ch.set_ldac_trigger_chn("None").unwrap();
    ch.set_input_register_a(0x1234).unwrap();
    assert_eq!(dac.reg_read(REG_DAC_INPUT_A).unwrap(), 0x1234);
    assert_eq!(dac.reg_read(REG_DAC_DATA_READBACK).unwrap(), 0x1234);

    ch.set_ldac_trigger_chn("sw_ldac").unwrap();
    ch.set_input_register_a(0x2345).unwrap();
    assert_eq!(dac.reg_read(REG_DAC_DATA_READBACK).unwrap(), 0x1234);
    dac.set_multi_dac_sw_ldac_trigger("trigger").unwrap();
    assert_eq!(dac.reg_read(REG_DAC_DATA_READBACK).unwrap(), 0x2345);

    ch.set_ldac_trigger_chn("hw_ldac").unwrap();
    ch.set_input_register_a(0x3456).unwrap();
    assert_eq!(dac.reg_read(REG_DAC_DATA_READBACK).unwrap(), 0x2345);
    dac.set_hw_ldac_tg_state("high").unwrap();
    dac.set_hw_ldac_tg_state("low").unwrap();
    assert_eq!(dac.reg_read(REG_DAC_DATA_READBACK).unwrap(), 0x3456);
}

#[test]
fn test_reg_write_roundtrip() {
    let (_dev, dac) = open();
    dac.reg_write(0x20, 0xAB).unwrap();
    assert_eq!(dac.reg_read(0x20).unwrap(), 0xAB);
}

// =============================================================================
// Freshness and failure
// =============================================================================

#[test]
fn test_availability_is_not_cached() {
    let (dev, dac) = open();
    let ch = dac.channel(0).unwrap();

    ch.set_range_sel("300mA").unwrap();
    dev.set_available(ch.scope(), "range_sel", &["50mA", "150mA"]);

    assert_eq!(ch.range_sel_available().unwrap(), vec!["50mA", "150mA"]);
    let err = ch.set_range_sel("300mA").unwrap_err();
    assert!(err.to_string().contains("50mA, 150mA"));
    ch.set_range_sel("150mA").unwrap();
}

#[test]
fn test_getters_reflect_external_changes() {
    let (dev, dac) = open();
    dev.poke(&AttrScope::Device, "mux_out_sel", "vref");
    assert_eq!(dac.mux_out_sel().unwrap(), "vref");
}

#[test]
fn test_transport_errors_propagate() {
    let (dev, dac) = open();
    dev.disconnect();

    assert!(dac.sampling_frequency().unwrap_err().is_transport());
    assert!(dac.set_sampling_frequency(1).unwrap_err().is_transport());
    // Fetching the legal set fails first; no validation error is invented
    assert!(dac.set_addr_ascension("increment").unwrap_err().is_transport());
    assert!(dac.channel(0).unwrap().raw().unwrap_err().is_transport());
    assert!(dac.reg_read(REG_DAC_INPUT_A).unwrap_err().is_transport());

    dev.reconnect();
    assert_eq!(dac.sampling_frequency().unwrap(), 100_000);
}

#[test]
fn test_enumeration_failure_is_transport() {
    let ctx = MockContext::with_ad5706r();
    ctx.device("ad5706r").unwrap().disconnect();
    let err = Ad5706r::from_context(&ctx, "ad5706r").unwrap_err();
    assert!(err.is_transport());
}
