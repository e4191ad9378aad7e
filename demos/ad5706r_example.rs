//! AD5706R walkthrough.
//!
//! Exercises the device the way a bring-up session would: sampling
//! frequency, channel calibration, address ascension and the three LDAC
//! modes, printing the DAC input and readback registers after each step.
//!
//! # Usage
//!
//! ```bash
//! # Against the built-in simulator
//! cargo run --example ad5706r_example -- --uri mock:
//!
//! # Against hardware (requires libiio)
//! cargo run --features hardware --example ad5706r_example -- \
//!     --uri serial:/dev/ttyACM0,2304000
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use daq_driver_ad5706r::config::{DriverConfig, DEFAULT_CONFIG_PATH};
use daq_driver_ad5706r::mock::{MockContext, REG_DAC_DATA_READBACK, REG_DAC_INPUT_A};
use daq_driver_ad5706r::{logging, Ad5706r, IioDevice};
use std::path::PathBuf;
use tracing::info;

/// AD5706R example - walk through DAC configuration and LDAC modes
#[derive(Parser, Debug)]
#[command(name = "ad5706r_example")]
#[command(about = "Configure an AD5706R and observe its LDAC behaviour")]
struct Args {
    /// libiio URI ("mock:" for the simulator); overrides the config file
    #[arg(long)]
    uri: Option<String>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Channel number to exercise
    #[arg(long, default_value = "0")]
    channel: usize,

    /// Log level; overrides the config file
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DriverConfig::load_from(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(uri) = args.uri {
        config.uri = uri;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    config.validate()?;
    logging::init_from_config(&config)?;

    info!(uri = %config.uri, device = %config.device_name, "Starting AD5706R example");

    if config.is_mock() {
        let ctx = MockContext::with_ad5706r();
        let dac = Ad5706r::from_context(&ctx, &config.device_name)?;
        return run(&dac, args.channel);
    }

    run_hardware(&config, args.channel)
}

#[cfg(feature = "hardware")]
fn run_hardware(config: &DriverConfig, chn: usize) -> Result<()> {
    let dac = Ad5706r::connect(&config.uri, &config.device_name)?;
    run(&dac, chn)
}

#[cfg(not(feature = "hardware"))]
fn run_hardware(_config: &DriverConfig, _chn: usize) -> Result<()> {
    Err(daq_driver_ad5706r::Ad5706rError::FeatureNotEnabled("hardware".to_string()).into())
}

fn run<D: IioDevice>(dac: &Ad5706r<D>, chn: usize) -> Result<()> {
    let ch = dac
        .channel(chn)
        .with_context(|| format!("channel {} not present", chn))?;
    let input_a = REG_DAC_INPUT_A + 2 * chn as u32;
    let readback = REG_DAC_DATA_READBACK + 2 * chn as u32;

    println!("Sampling Frequency: {}", dac.sampling_frequency()?);
    dac.set_sampling_frequency(400_000)?;
    println!("Sampling Frequency: {}", dac.sampling_frequency()?);

    println!("Output Bits: {:?}", dac.output_bits());
    println!("Channel offset: {}", ch.offset()?);
    println!("Channel scale: {}", ch.scale()?);

    println!("\nAddress Ascension Test");
    dac.set_addr_ascension("increment")?;
    ch.set_input_register_a(0x1234)?;
    println!("  input A:  {:#x}", dac.reg_read(input_a)?);
    dac.set_addr_ascension("decrement")?;
    println!("  input A:  {:#x}", dac.reg_read(input_a)?);

    println!("\nASYNC LDAC Test");
    ch.set_hw_func_sel("LDAC")?;
    ch.set_ldac_trigger_chn("None")?;
    println!("  input A:  {:#x}", dac.reg_read(input_a)?);
    println!("  readback: {:#x}", dac.reg_read(readback)?);

    println!("\nSW LDAC Test");
    ch.set_ldac_trigger_chn("sw_ldac")?;
    ch.set_input_register_a(0x2345)?;
    println!("  input A:  {:#x}", dac.reg_read(input_a)?);
    println!("  readback: {:#x}", dac.reg_read(readback)?);
    dac.set_multi_dac_sw_ldac_trigger("trigger")?;
    println!("  readback: {:#x} (after trigger)", dac.reg_read(readback)?);

    println!("\nHW LDAC Test");
    ch.set_ldac_trigger_chn("hw_ldac")?;
    ch.set_input_register_a(0x3456)?;
    println!("  input A:  {:#x}", dac.reg_read(input_a)?);
    println!("  readback: {:#x}", dac.reg_read(readback)?);
    dac.set_hw_ldac_tg_state("high")?;
    dac.set_hw_ldac_tg_state("low")?;
    println!("  readback: {:#x} (after pin pulse)", dac.reg_read(readback)?);

    Ok(())
}
