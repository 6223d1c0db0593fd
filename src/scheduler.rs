//! Per-frame scheduler driving the sample timer.
//!
//! A tokio interval stands in for the host's per-refresh callback. It makes no
//! promise about spacing: late frames are skipped, and the timer's due count
//! makes up for whatever time passed.

use crate::audio::{AnalysisWindow, AudioInput, AudioPlayer};
use crate::display::{BarHeights, SlidingWindowDisplay};
use crate::timing::{AmplitudeSource, SampleSink, SampleTimer};
use crate::ui::{BeatbarsTui, FrameStats, UserCommand};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// The timer wiring used by the terminal display.
pub type DisplayTimer = SampleTimer<AnalysisWindow, SlidingWindowDisplay<BarHeights>>;

/// Audio that can be paused from the keyboard.
pub trait Transport {
    fn is_paused(&self) -> bool;
    fn toggle_pause(&self);
    /// True when there is nothing left to show.
    fn is_finished(&self) -> bool {
        false
    }
}

impl Transport for AudioInput {
    fn is_paused(&self) -> bool {
        AudioInput::is_paused(self)
    }

    fn toggle_pause(&self) {
        AudioInput::toggle_pause(self)
    }
}

impl Transport for AudioPlayer {
    fn is_paused(&self) -> bool {
        AudioPlayer::is_paused(self)
    }

    fn toggle_pause(&self) {
        AudioPlayer::toggle_pause(self)
    }

    fn is_finished(&self) -> bool {
        AudioPlayer::is_finished(self)
    }
}

/// Gates ticks on the pause state and keeps a running emission count.
///
/// While paused no tick reaches the timer. Every pause transition drops the
/// timer's baseline, so the time spent paused never turns into a burst.
#[derive(Debug)]
pub struct FrameScheduler<S, K> {
    timer: SampleTimer<S, K>,
    paused: bool,
    emitted: u64,
}

impl<S: AmplitudeSource, K: SampleSink> FrameScheduler<S, K> {
    pub fn new(timer: SampleTimer<S, K>) -> Self {
        Self {
            timer,
            paused: false,
            emitted: 0,
        }
    }

    /// Delivers one frame at `now_ms` unless paused; returns samples emitted.
    pub fn frame(&mut self, now_ms: f64) -> usize {
        if self.paused {
            return 0;
        }
        let due = self.timer.on_tick(now_ms);
        self.emitted += due as u64;
        due
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused != self.paused {
            self.paused = paused;
            self.timer.reset();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Total samples emitted since construction.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn timer(&self) -> &SampleTimer<S, K> {
        &self.timer
    }
}

/// Why the frame loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Quit,
    Finished,
}

/// Runs the display until the user quits or the transport finishes.
///
/// # Errors
/// - If input polling or drawing fails
pub async fn run_frame_loop(
    tui: &mut BeatbarsTui,
    scheduler: &mut FrameScheduler<AnalysisWindow, SlidingWindowDisplay<BarHeights>>,
    transport: &dyn Transport,
    frame_rate: u32,
    source_label: &str,
) -> anyhow::Result<LoopExit> {
    let period = Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let origin = Instant::now();
    let tempo = *scheduler.timer().tempo();
    let mut frame_count = 0u64;

    tracing::debug!("Entering frame loop at {} fps", frame_rate);

    loop {
        interval.tick().await;

        match tui.handle_input()? {
            UserCommand::Quit => return Ok(LoopExit::Quit),
            UserCommand::TogglePause => transport.toggle_pause(),
            UserCommand::Continue => {}
        }
        if transport.is_finished() {
            tracing::info!("Playback finished");
            return Ok(LoopExit::Finished);
        }

        scheduler.set_paused(transport.is_paused());
        let now_ms = origin.elapsed().as_secs_f64() * 1000.0;
        scheduler.frame(now_ms);

        frame_count += 1;
        if frame_count.is_multiple_of(600) {
            tracing::debug!(
                "{} frames, {} samples emitted",
                frame_count,
                scheduler.emitted()
            );
        }

        let display = scheduler.timer().sink();
        let heights = display.renderer().as_u64();
        let stats = FrameStats {
            source: source_label,
            bpm: tempo.bpm(),
            bar_count: tempo.bar_count(),
            sample_interval_ms: tempo.sample_interval_ms(),
            level: display.newest(),
            emitted: scheduler.emitted(),
        };
        tui.draw(&heights, &stats)?;
    }
}
