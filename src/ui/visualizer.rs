//! Terminal bar display for the sample window.
//!
//! Draws the current bar heights, a status footer and handles the pause and
//! quit keys. Timing is not decided here; the frame loop calls [`BeatbarsTui::draw`]
//! after each tick.

use crate::config::DisplayStyle;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Sparkline},
};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

/// User input during visualisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// No key or an unbound key
    Continue,
    /// Leave the display (Escape, 'q', Ctrl+C)
    Quit,
    /// Pause or resume the audio (Space)
    TogglePause,
}

/// Values shown in the footer for one frame.
#[derive(Debug, Clone)]
pub struct FrameStats<'a> {
    pub source: &'a str,
    pub bpm: f64,
    pub bar_count: usize,
    pub sample_interval_ms: f64,
    /// Newest sample, normalized
    pub level: f32,
    pub emitted: u64,
}

/// Full-screen bar display.
pub struct BeatbarsTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    style: DisplayStyle,
    max_magnitude: u64,
    started: Instant,
    is_paused: bool,
    /// Total time paused (accumulated when resumed)
    pause_duration: Duration,
    pause_start_time: Option<Instant>,
    active: bool,
}

impl BeatbarsTui {
    /// Creates the display and enters alternate screen mode.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new(style: DisplayStyle, max_magnitude: f32) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            style,
            max_magnitude: max_magnitude.round().max(1.0) as u64,
            started: Instant::now(),
            is_paused: false,
            pause_duration: Duration::ZERO,
            pause_start_time: None,
            active: true,
        })
    }

    /// Renders one frame.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, heights: &[u64], stats: &FrameStats<'_>) -> Result<()> {
        let style = self.style;
        let max = self.max_magnitude;
        let is_paused = self.is_paused;
        let elapsed = self.elapsed();

        self.terminal.draw(|frame| {
            let area = frame.area();
            let [chart_area, footer_area] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

            match style {
                DisplayStyle::Bars => {
                    frame.render_widget(bar_chart(heights, max, chart_area.width), chart_area)
                }
                DisplayStyle::Sparkline => {
                    let columns = stretch(heights, chart_area.width as usize);
                    let sparkline = Sparkline::default()
                        .data(&columns)
                        .max(max)
                        .style(Style::default().fg(Color::Rgb(206, 224, 220)));
                    frame.render_widget(sparkline, chart_area);
                }
            }

            frame.render_widget(footer(stats, elapsed, is_paused), footer_area);
        })?;

        Ok(())
    }

    /// Polls for a key without blocking the frame loop.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<UserCommand> {
        if !event::poll(Duration::ZERO)? {
            return Ok(UserCommand::Continue);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(UserCommand::Continue);
        };

        Ok(match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                tracing::debug!("Escape or 'q' pressed: quitting");
                UserCommand::Quit
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                tracing::debug!("Ctrl+C pressed: quitting");
                UserCommand::Quit
            }
            KeyCode::Char(' ') => {
                tracing::debug!("Space pressed: toggling pause");
                self.toggle_pause_state();
                UserCommand::TogglePause
            }
            _ => UserCommand::Continue,
        })
    }

    fn toggle_pause_state(&mut self) {
        if self.is_paused {
            if let Some(pause_start) = self.pause_start_time.take() {
                self.pause_duration += pause_start.elapsed();
            }
            self.is_paused = false;
        } else {
            self.pause_start_time = Some(Instant::now());
            self.is_paused = true;
        }
    }

    /// Running time, excluding pauses.
    fn elapsed(&self) -> Duration {
        let mut paused = self.pause_duration;
        if let Some(pause_start) = self.pause_start_time {
            paused += pause_start.elapsed();
        }
        self.started.elapsed().saturating_sub(paused)
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    /// - If the cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for BeatbarsTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn bar_chart(heights: &[u64], max: u64, width: u16) -> BarChart<'static> {
    let count = heights.len().max(1) as u16;
    let gap = if width >= count * 2 { 1 } else { 0 };
    let bar_width = (width.saturating_sub(gap * count.saturating_sub(1)) / count).max(1);

    let bars: Vec<Bar<'static>> = heights
        .iter()
        .map(|&h| Bar::default().value(h.min(max)).text_value(String::new()))
        .collect();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(gap)
        .max(max)
        .bar_style(Style::default().fg(Color::Rgb(185, 207, 212)))
}

fn footer(stats: &FrameStats<'_>, elapsed: Duration, is_paused: bool) -> Paragraph<'static> {
    let secs = elapsed.as_secs();
    let indicator = if is_paused {
        Span::styled("⏸ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("● ", Style::default().fg(Color::Green))
    };

    let line = Line::from(vec![
        indicator,
        Span::raw(format!("{}:{:02}", secs / 60, secs % 60)),
        Span::raw(format!(
            " / {:.1} BPM / {} bars @ {:.1}ms / level {:>3.0}% / {} samples / {}",
            stats.bpm,
            stats.bar_count,
            stats.sample_interval_ms,
            (stats.level * 100.0).clamp(0.0, 999.0),
            stats.emitted,
            stats.source
        )),
    ]);

    Paragraph::new(line).style(
        Style::default()
            .fg(Color::Rgb(185, 207, 212))
            .bg(Color::Rgb(0, 0, 0)),
    )
}

/// Spreads `heights` over `width` columns so each sample gets an equal share.
pub fn stretch(heights: &[u64], width: usize) -> Vec<u64> {
    if heights.is_empty() || width == 0 {
        return Vec::new();
    }
    (0..width)
        .map(|column| heights[column * heights.len() / width])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stretch_repeats_each_sample() {
        assert_eq!(stretch(&[1, 2], 6), vec![1, 1, 1, 2, 2, 2]);
        assert_eq!(stretch(&[5, 6, 7], 3), vec![5, 6, 7]);
    }

    #[test]
    fn test_stretch_narrower_than_window_keeps_order() {
        assert_eq!(stretch(&[1, 2, 3, 4], 2), vec![1, 3]);
        assert!(stretch(&[1, 2], 0).is_empty());
        assert!(stretch(&[], 10).is_empty());
    }
}
