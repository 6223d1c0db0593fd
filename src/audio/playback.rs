//! WAV playback through a compensating delay.
//!
//! The analysis window hears each frame as soon as it is read from the file;
//! the speakers hear it `delay_ms` later. With the delay set to one beat, a
//! bar that has scrolled across the whole display lines up with the sound.

use super::analysis::AnalysisTap;
use super::delay::DelayLine;
use super::device::{find_device, suppress_alsa_warnings, Direction};
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A decoded WAV file held in memory as interleaved f32 in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct WavClip {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl WavClip {
    /// Reads and decodes a WAV file.
    ///
    /// # Errors
    /// - If the file cannot be opened or is not a valid WAV
    pub fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
        Self::from_reader(reader)
    }

    /// Decodes from an already-open WAV reader.
    ///
    /// # Errors
    /// - If the sample data is truncated or malformed
    pub fn from_reader<R: Read>(mut reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(anyhow!("WAV file declares zero channels"));
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / max_value))
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(Self {
            samples,
            channels: spec.channels as usize,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    fn frame(&self, index: usize) -> Option<&[f32]> {
        let start = index * self.channels;
        self.samples.get(start..start + self.channels)
    }
}

/// Renders device buffers from a clip: taps the dry signal, delays the wet one.
///
/// Runs on the audio thread; the only shared state is the tap.
#[derive(Debug)]
pub struct PlaybackEngine {
    clip: Arc<WavClip>,
    position: usize,
    device_channels: usize,
    delay: DelayLine,
    tap: AnalysisTap,
    dry: Vec<f32>,
    mono: Vec<f32>,
}

impl PlaybackEngine {
    pub fn new(clip: Arc<WavClip>, device_channels: usize, delay_ms: f64, sample_rate: u32, tap: AnalysisTap) -> Self {
        let device_channels = device_channels.max(1);
        Self {
            delay: DelayLine::from_millis(delay_ms, sample_rate, device_channels),
            clip,
            position: 0,
            device_channels,
            tap,
            dry: Vec::new(),
            mono: Vec::new(),
        }
    }

    /// Fills one interleaved output buffer.
    pub fn fill(&mut self, out: &mut [f32]) {
        let channels = self.device_channels;
        let frames = out.len() / channels;

        self.dry.clear();
        self.mono.clear();
        for _ in 0..frames {
            match self.clip.frame(self.position) {
                Some(frame) => {
                    self.mono.push(frame.iter().sum::<f32>() / frame.len() as f32);
                    map_channels(frame, channels, &mut self.dry);
                }
                None => {
                    self.mono.push(0.0);
                    self.dry.resize(self.dry.len() + channels, 0.0);
                }
            }
            self.position += 1;
        }

        self.tap.write(&self.mono);
        let used = frames * channels;
        self.delay.process(&self.dry, &mut out[..used]);
        out[used..].fill(0.0);
    }

    /// True once the clip and the delayed tail have both been played.
    pub fn is_finished(&self) -> bool {
        self.position >= self.clip.frames() + self.delay.delay_frames()
    }

    pub fn delay_frames(&self) -> usize {
        self.delay.delay_frames()
    }
}

/// Maps one source frame onto `channels` output channels.
fn map_channels(frame: &[f32], channels: usize, dest: &mut Vec<f32>) {
    if channels == 1 {
        dest.push(frame.iter().sum::<f32>() / frame.len() as f32);
    } else {
        dest.extend((0..channels).map(|ch| frame[ch % frame.len()]));
    }
}

/// Plays a [`WavClip`] on an output device.
pub struct AudioPlayer {
    stream: Option<cpal::Stream>,
    is_paused: Arc<AtomicBool>,
    is_finished: Arc<AtomicBool>,
    sample_rate: u32,
}

impl AudioPlayer {
    /// Opens the output device and starts playback immediately.
    ///
    /// # Errors
    /// - If the output device is not available
    /// - If its sample format is unsupported
    /// - If the stream cannot be created or started
    pub fn start(device_spec: &str, clip: Arc<WavClip>, delay_ms: f64, tap: AnalysisTap) -> Result<Self> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            find_device(&host, Direction::Output, device_spec)
        })?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Output device: {}", device_name);

        let supported = output_config_for(&device, clip.sample_rate())?;
        let sample_rate = supported.sample_rate().0;
        if sample_rate != clip.sample_rate() {
            tracing::warn!(
                "File is {}Hz but device plays at {}Hz. Playback pitch will be off.",
                clip.sample_rate(),
                sample_rate
            );
        }

        let config = supported.config();
        let engine = PlaybackEngine::new(clip, config.channels as usize, delay_ms, sample_rate, tap);
        tracing::debug!(
            "Output configuration: {}Hz, {} channels, delay {} frames",
            sample_rate,
            config.channels,
            engine.delay_frames()
        );

        let is_paused = Arc::new(AtomicBool::new(false));
        let is_finished = Arc::new(AtomicBool::new(false));
        let engine = Arc::new(Mutex::new(engine));

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, &engine, &is_paused, &is_finished)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, &engine, &is_paused, &is_finished)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, &engine, &is_paused, &is_finished)?,
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, &engine, &is_paused, &is_finished)?,
            other => return Err(anyhow!("Unsupported output sample format: {other:?}")),
        };
        stream.play()?;
        tracing::debug!("Output stream started");

        Ok(Self {
            stream: Some(stream),
            is_paused,
            is_finished,
            sample_rate,
        })
    }

    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Output stream stopped");
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished.load(Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::Relaxed)
    }

    pub fn toggle_pause(&self) {
        let paused = !self.is_paused.fetch_xor(true, Ordering::Relaxed);
        if paused {
            tracing::debug!("Playback paused");
        } else {
            tracing::debug!("Playback resumed");
        }
    }
}

/// Picks an output config at the clip's rate if the device supports one,
/// otherwise the device default.
fn output_config_for(device: &cpal::Device, sample_rate: u32) -> Result<cpal::SupportedStreamConfig> {
    let wanted = cpal::SampleRate(sample_rate);
    let matching = device
        .supported_output_configs()
        .ok()
        .and_then(|mut configs| {
            configs.find(|range| range.min_sample_rate() <= wanted && wanted <= range.max_sample_rate())
        })
        .map(|range| range.with_sample_rate(wanted));

    match matching {
        Some(config) => Ok(config),
        None => Ok(device.default_output_config()?),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    engine: &Arc<Mutex<PlaybackEngine>>,
    is_paused: &Arc<AtomicBool>,
    is_finished: &Arc<AtomicBool>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let engine = Arc::clone(engine);
    let pause_flag = Arc::clone(is_paused);
    let finished_flag = Arc::clone(is_finished);
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if pause_flag.load(Ordering::Relaxed) {
                data.fill(T::EQUILIBRIUM);
                return;
            }
            scratch.resize(data.len(), 0.0);
            let mut engine = engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            engine.fill(&mut scratch);
            for (out, &sample) in data.iter_mut().zip(&scratch) {
                *out = T::from_sample(sample);
            }
            if engine.is_finished() {
                finished_flag.store(true, Ordering::Relaxed);
            }
        },
        |err| {
            tracing::error!("Audio stream error: {}", err);
        },
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::analysis::AnalysisWindow;

    fn clip(samples: Vec<f32>, channels: usize) -> Arc<WavClip> {
        Arc::new(WavClip {
            samples,
            channels,
            sample_rate: 1000,
        })
    }

    #[test]
    fn test_reads_int_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for sample in [16384i16, -16384, 0, 32767] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let clip = WavClip::open(&path).unwrap();
        assert_eq!(clip.channels(), 2);
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.frames(), 2);
        assert_eq!(clip.frame(0), Some(&[0.5, -0.5][..]));
        assert_eq!(clip.frame(2), None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(WavClip::open(&dir.path().join("nope.wav")).is_err());
    }

    #[test]
    fn test_tap_hears_dry_signal_before_output() {
        let window = AnalysisWindow::new(4);
        // 2ms delay at 1kHz = 2 frames
        let mut engine = PlaybackEngine::new(clip(vec![0.5, -0.25, 1.0, 0.75], 1), 1, 2.0, 1000, window.tap());

        let mut out = [9.0; 4];
        engine.fill(&mut out);
        assert_eq!(window.snapshot(), vec![0.5, -0.25, 1.0, 0.75]);
        assert_eq!(out, [0.0, 0.0, 0.5, -0.25]);
        assert!(!engine.is_finished());

        engine.fill(&mut out);
        assert_eq!(out, [1.0, 0.75, 0.0, 0.0]);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_mono_clip_fans_out_to_stereo_device() {
        let window = AnalysisWindow::new(2);
        let mut engine = PlaybackEngine::new(clip(vec![0.25, 0.5], 1), 2, 0.0, 1000, window.tap());

        let mut out = [0.0; 4];
        engine.fill(&mut out);
        assert_eq!(out, [0.25, 0.25, 0.5, 0.5]);
    }

    #[test]
    fn test_stereo_clip_downmixes_for_analysis() {
        let window = AnalysisWindow::new(2);
        let mut engine = PlaybackEngine::new(clip(vec![1.0, 0.0, -0.5, -0.5], 2), 1, 0.0, 1000, window.tap());

        let mut out = [0.0; 2];
        engine.fill(&mut out);
        assert_eq!(window.snapshot(), vec![0.5, -0.5]);
        assert_eq!(out, [0.5, -0.5]);
    }
}
