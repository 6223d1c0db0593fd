//! List available audio devices.

use crate::audio::device::suppress_alsa_warnings;
use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

/// Lists input devices (for `visualize`) and output devices (for `play`).
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    let (inputs, outputs, default_input, default_output) = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let inputs: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate input devices: {e}"))?
            .filter(|d| d.name().is_ok())
            .collect();
        let outputs: Vec<cpal::Device> = host
            .output_devices()
            .map_err(|e| anyhow!("Failed to enumerate output devices: {e}"))?
            .filter(|d| d.name().is_ok())
            .collect();
        let default_input = host.default_input_device().and_then(|d| d.name().ok());
        let default_output = host.default_output_device().and_then(|d| d.name().ok());
        Ok((inputs, outputs, default_input, default_output))
    })?;

    println!();
    print_devices(
        "Input devices (beatbars visualize; [audio] device or --device)",
        &inputs,
        default_input.as_deref(),
        |d| d.default_input_config(),
    );
    print_devices(
        "Output devices (beatbars play; [audio] output_device or --output-device)",
        &outputs,
        default_output.as_deref(),
        |d| d.default_output_config(),
    );

    Ok(())
}

fn print_devices<F>(heading: &str, devices: &[cpal::Device], default_name: Option<&str>, config_of: F)
where
    F: Fn(&cpal::Device) -> Result<cpal::SupportedStreamConfig, cpal::DefaultStreamConfigError>,
{
    println!("{heading}:");
    println!();

    if devices.is_empty() {
        println!("  (none found)");
        println!();
        return;
    }

    for (index, device) in devices.iter().enumerate() {
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let default_indicator = if default_name == Some(device_name.as_str()) {
            " [DEFAULT]"
        } else {
            ""
        };

        let config_info = match config_of(device) {
            Ok(config) => format!(
                " ({}Hz, {} channels, {:?})",
                config.sample_rate().0,
                config.channels(),
                config.sample_format()
            ),
            Err(_) => " (configuration unavailable)".to_string(),
        };

        println!("  ID: {index}");
        println!("    Name: {device_name}{default_indicator}");
        println!("    Config:{config_info}");
        println!();
    }
}
