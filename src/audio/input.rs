//! Live capture from an input device into the analysis window.

use super::analysis::AnalysisTap;
use super::device::{find_device, suppress_alsa_warnings, Direction};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Streams audio from an input device into an [`AnalysisTap`].
///
/// Features:
/// - Captures from a named, indexed or default input device at its native rate
/// - Converts any supported sample format to f32
/// - Downmixes multi-channel input to mono
/// - Pause and resume without tearing down the stream
pub struct AudioInput {
    device_name: String,
    tap: AnalysisTap,
    /// Active input stream (kept alive while capturing)
    stream: Option<cpal::Stream>,
    sample_rate: u32,
    channels: usize,
    is_paused: Arc<AtomicBool>,
}

impl AudioInput {
    /// # Arguments
    /// * `device_name` - "default", a device index, or a device name
    /// * `tap` - Writer for the analysis window
    pub fn new(device_name: String, tap: AnalysisTap) -> Self {
        Self {
            device_name,
            tap,
            stream: None,
            sample_rate: 0,
            channels: 1,
            is_paused: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Opens the device and starts feeding the analysis window.
    ///
    /// # Errors
    /// - If the device is not available
    /// - If the device's sample format is unsupported
    /// - If the stream cannot be created or started
    pub fn start(&mut self) -> Result<()> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            find_device(&host, Direction::Input, &self.device_name)
        })?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Input device: {}", device_name);

        let device_config = device.default_input_config()?;
        self.sample_rate = device_config.sample_rate().0;
        self.channels = device_config.channels() as usize;

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            self.sample_rate,
            self.channels,
            device_config.sample_format()
        );

        let stream_config = device_config.config();
        let stream = match device_config.sample_format() {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(&device, &stream_config)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(&device, &stream_config)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(&device, &stream_config)?,
            cpal::SampleFormat::I32 => self.build_stream::<i32>(&device, &stream_config)?,
            other => return Err(anyhow!("Unsupported input sample format: {other:?}")),
        };

        stream.play()?;
        self.stream = Some(stream);
        tracing::debug!("Input stream started");
        Ok(())
    }

    fn build_stream<T>(&self, device: &cpal::Device, config: &cpal::StreamConfig) -> Result<cpal::Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let tap = self.tap.clone();
        let pause_flag = Arc::clone(&self.is_paused);
        let channels = self.channels;
        let mut scratch: Vec<f32> = Vec::new();

        let stream = device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if pause_flag.load(Ordering::Relaxed) {
                    return;
                }
                scratch.clear();
                scratch.extend(data.iter().map(|&s| s.to_sample::<f32>()));
                tap.write_interleaved(&scratch, channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;
        Ok(stream)
    }

    /// Stops capturing and releases the device.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Input stream stopped");
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::Relaxed)
    }

    /// Toggles between paused and capturing states.
    pub fn toggle_pause(&self) {
        let paused = !self.is_paused.fetch_xor(true, Ordering::Relaxed);
        if paused {
            tracing::debug!("Capture paused");
        } else {
            tracing::debug!("Capture resumed");
        }
    }
}
